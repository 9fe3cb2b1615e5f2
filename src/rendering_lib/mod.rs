// src/rendering_lib/mod.rs

pub mod renderer;
pub mod shader;
pub mod vertex;

pub use renderer::CellRenderer;
pub use shader::CELL_SHADER_SOURCE;
pub use vertex::CellVertex;
