// src/lib.rs

pub mod canvas;
pub mod chord;
pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod pulse;
pub mod splitter;

pub use canvas::{CanvasLayout, Orientation};
pub use chord::{Chord, ChordSampler};
pub use config::{ShatterConfig, SubdivisionStrategy};
pub use error::{ShatterError, ShatterResult};
pub use generator::{CellGenerator, CellSet};
pub use geometry::{ConvexPolygon, LineCoefficients, Point2, Rgb, Segment, Shape};
pub use pulse::{BreathingTransform, PulseClock, PulseWave};
pub use splitter::{ChordSplitter, EdgeCrossings, SplitOutcome, TriangleSplitter};
