//! Vertex grid storage, scrolling, and index tables for the terrain window.
#![forbid(unsafe_code)]

pub mod grid;
pub mod index;
pub mod vertex;

// Re-exports for convenience
pub use grid::VertexGrid;
pub use index::{DrawRange, IndexTable};
pub use vertex::Vertex;
