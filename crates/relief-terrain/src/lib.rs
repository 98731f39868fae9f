//! Height model and surface classification for the terrain window.
#![forbid(unsafe_code)]

pub mod config;
pub mod palette;
pub mod sampler;

// Re-exports for convenience
pub use config::{Fractal, Height, SurfaceEntry, TerrainConfig, TerrainParams};
pub use palette::{SurfacePalette, TerrainType};
pub use sampler::{SurfaceSample, TerrainSampler};
