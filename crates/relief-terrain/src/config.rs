use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub fractal: Fractal,
    /// Classification bands, lowest ceiling first. Empty means the
    /// built-in palette.
    #[serde(default)]
    pub surface: Vec<SurfaceEntry>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height: Height::default(),
            fractal: Fractal::default(),
            surface: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    /// World units per noise-lattice unit.
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Peak amplitude; raw heights span [-max, max] before flooding.
    #[serde(default = "default_max")]
    pub max: f32,
    /// Heights below this are flattened into water.
    #[serde(default = "default_sea_level")]
    pub sea_level: f32,
}
fn default_scale() -> f32 {
    65.5
}
fn default_max() -> f32 {
    30.0
}
fn default_sea_level() -> f32 {
    0.0
}
impl Default for Height {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            max: default_max(),
            sea_level: default_sea_level(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Fractal {
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_base_frequency")]
    pub base_frequency: f32,
}
fn default_octaves() -> u32 {
    5
}
fn default_base_frequency() -> f32 {
    1.0
}
impl Default for Fractal {
    fn default() -> Self {
        Self {
            octaves: default_octaves(),
            base_frequency: default_base_frequency(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SurfaceEntry {
    pub name: String,
    pub color: [f32; 4],
    pub shininess: f32,
    pub ceiling: f32,
}

// Flattened params used in tight loops (snapshot of config)
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub scale: f32,
    pub max_height: f32,
    pub sea_level: f32,
    pub octaves: u32,
    pub base_frequency: f32,
}

impl TerrainParams {
    pub fn default() -> Self {
        Self::from_config(&TerrainConfig::default())
    }

    pub fn from_config(cfg: &TerrainConfig) -> Self {
        Self {
            scale: cfg.height.scale,
            max_height: cfg.height.max,
            sea_level: cfg.height.sea_level,
            octaves: cfg.fractal.octaves,
            base_frequency: cfg.fractal.base_frequency,
        }
    }
}

impl TerrainConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: TerrainConfig = toml::from_str(toml_str)?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let cfg = TerrainConfig::from_toml_str("[height]\nscale = 40.0\n").unwrap();
        assert_eq!(cfg.height.scale, 40.0);
        assert_eq!(cfg.height.max, 30.0);
        assert_eq!(cfg.height.sea_level, 0.0);
        assert_eq!(cfg.fractal.octaves, 5);
        assert_eq!(cfg.fractal.base_frequency, 1.0);
        assert!(cfg.surface.is_empty());
    }

    #[test]
    fn surface_entries_parse() {
        let text = r#"
[[surface]]
name = "mud"
color = [0.3, 0.2, 0.1, 1.0]
shininess = 5.0
ceiling = 2.0

[[surface]]
name = "peak"
color = [0.9, 0.9, 0.9, 1.0]
shininess = 40.0
ceiling = 25.0
"#;
        let cfg = TerrainConfig::from_toml_str(text).unwrap();
        assert_eq!(cfg.surface.len(), 2);
        assert_eq!(cfg.surface[0].name, "mud");
        assert_eq!(cfg.surface[1].ceiling, 25.0);
    }

    #[test]
    fn params_snapshot_flattens_config() {
        let cfg = TerrainConfig::default();
        let params = TerrainParams::from_config(&cfg);
        assert_eq!(params.scale, 65.5);
        assert_eq!(params.max_height, 30.0);
        assert_eq!(params.sea_level, 0.0);
        assert_eq!(params.octaves, 5);
        assert_eq!(params.base_frequency, 1.0);
    }
}
