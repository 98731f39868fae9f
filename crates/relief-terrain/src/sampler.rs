use std::error::Error;

use relief_noise::ValueNoise;

use crate::config::{TerrainConfig, TerrainParams};
use crate::palette::{SurfacePalette, TerrainType};

/// Height and surface properties for one grid vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    pub height: f32,
    pub color: [f32; 4],
    pub shininess: f32,
}

/// Pure world-position to surface function for one seed and config.
///
/// Sampling has no internal state, so any region of the world can be
/// regenerated at any time and land on the same values.
#[derive(Clone, Debug)]
pub struct TerrainSampler {
    noise: ValueNoise,
    params: TerrainParams,
    palette: SurfacePalette,
}

impl TerrainSampler {
    /// Default height model with the built-in palette.
    pub fn new(seed: i32) -> Self {
        let params = TerrainParams::default();
        let palette = SurfacePalette::default_for(params.max_height, params.sea_level);
        Self {
            noise: ValueNoise::with_seed(seed),
            params,
            palette,
        }
    }

    pub fn from_config(cfg: &TerrainConfig, seed: i32) -> Result<Self, Box<dyn Error>> {
        let params = TerrainParams::from_config(cfg);
        if !(params.scale.is_finite() && params.scale > 0.0) {
            return Err(format!(
                "height.scale must be finite and positive, got {}",
                params.scale
            )
            .into());
        }
        if !(params.base_frequency.is_finite() && params.base_frequency > 0.0) {
            return Err(format!(
                "fractal.base_frequency must be finite and positive, got {}",
                params.base_frequency
            )
            .into());
        }
        if params.octaves == 0 {
            return Err("fractal.octaves must be at least 1".into());
        }
        let palette = if cfg.surface.is_empty() {
            // The built-in ceilings start at 0.1 * max above sea level.
            if !(params.max_height > 0.0 && params.sea_level < 0.1 * params.max_height) {
                return Err(format!(
                    "built-in palette needs height.sea_level ({}) below a tenth of height.max ({})",
                    params.sea_level, params.max_height
                )
                .into());
            }
            SurfacePalette::default_for(params.max_height, params.sea_level)
        } else {
            SurfacePalette::from_entries(&cfg.surface)?
        };
        Ok(Self {
            noise: ValueNoise::with_seed(seed),
            params,
            palette,
        })
    }

    /// Flooded terrain height at a world position.
    ///
    /// The layered noise is recentered around zero, scaled to the peak
    /// amplitude, then anything below sea level is flattened into water.
    pub fn height_at(&self, wx: f32, wz: f32) -> f32 {
        let n = self.noise.fractal2(
            wx / self.params.scale,
            wz / self.params.scale,
            self.params.base_frequency,
            self.params.octaves,
        );
        let h = (n * 2.0 - 1.0) * self.params.max_height;
        h.max(self.params.sea_level)
    }

    /// Height plus the color and shininess of the band it falls in.
    pub fn sample(&self, wx: f32, wz: f32) -> SurfaceSample {
        let height = self.height_at(wx, wz);
        let band = self.palette.classify(height);
        SurfaceSample {
            height,
            color: band.color,
            shininess: band.shininess,
        }
    }

    #[inline]
    pub fn classify(&self, height: f32) -> &TerrainType {
        self.palette.classify(height)
    }

    #[inline]
    pub fn palette(&self) -> &SurfacePalette {
        &self.palette
    }

    #[inline]
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.noise.seed()
    }
}
