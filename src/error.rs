// src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShatterError {
    #[error("Polygon needs at least {expected} vertices, got {actual}")]
    InsufficientVertices { expected: usize, actual: usize },

    #[error("Expected a triangle, got a polygon with {actual} vertices")]
    NotATriangle { actual: usize },

    #[error("No usable chord found after {attempts} attempts")]
    DegenerateChord { attempts: usize },

    #[error("Subdivision stalled before reaching {target} shapes ({attempts} cut attempts)")]
    GenerationStalled { target: usize, attempts: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

pub type ShatterResult<T> = Result<T, ShatterError>;
