use std::error::Error;

use crate::config::SurfaceEntry;

/// One classification band of the height palette.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainType {
    pub name: String,
    pub color: [f32; 4],
    pub shininess: f32,
    /// Highest height this band covers; bands are tried lowest first.
    pub ceiling: f32,
}

/// Ordered classification bands covering the full height range.
#[derive(Clone, Debug)]
pub struct SurfacePalette {
    types: Vec<TerrainType>,
}

impl SurfacePalette {
    /// The classic seven-band palette, scaled to the session's height range.
    pub fn default_for(max_height: f32, sea_level: f32) -> Self {
        let band = |name: &str, color: [f32; 4], shininess: f32, ceiling: f32| TerrainType {
            name: name.to_string(),
            color,
            shininess,
            ceiling,
        };
        Self {
            types: vec![
                band("water", [0.2, 0.4, 0.75, 1.0], 150.0, sea_level),
                band("sand", [1.0, 1.0, 0.6, 1.0], 50.0, 0.1 * max_height),
                band("thin grass", [0.35, 0.65, 0.1, 1.0], 10.0, 0.2 * max_height),
                band("grass", [0.3, 0.6, 0.1, 1.0], 10.0, 0.3 * max_height),
                band("thick grass", [0.25, 0.55, 0.1, 1.0], 10.0, 0.4 * max_height),
                band("rock", [0.35, 0.25, 0.25, 1.0], 25.0, 0.7 * max_height),
                band("snow", [1.0, 1.0, 1.0, 1.0], 25.0, max_height),
            ],
        }
    }

    pub fn from_entries(entries: &[SurfaceEntry]) -> Result<Self, Box<dyn Error>> {
        if entries.is_empty() {
            return Err("surface palette needs at least one band".into());
        }
        for pair in entries.windows(2) {
            // Written as !(a < b) so NaN ceilings are rejected too.
            if !(pair[0].ceiling < pair[1].ceiling) {
                return Err(format!(
                    "surface ceilings must strictly ascend: {} ({}) then {} ({})",
                    pair[0].name, pair[0].ceiling, pair[1].name, pair[1].ceiling
                )
                .into());
            }
        }
        Ok(Self {
            types: entries
                .iter()
                .map(|e| TerrainType {
                    name: e.name.clone(),
                    color: e.color,
                    shininess: e.shininess,
                    ceiling: e.ceiling,
                })
                .collect(),
        })
    }

    /// First band whose ceiling is at or above `height`; heights above the
    /// top ceiling stay in the top band.
    #[inline]
    pub fn classify(&self, height: f32) -> &TerrainType {
        let idx = self
            .types
            .iter()
            .position(|t| height <= t.ceiling)
            .unwrap_or(self.types.len() - 1);
        &self.types[idx]
    }

    #[inline]
    pub fn types(&self) -> &[TerrainType] {
        &self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_cover_the_classic_ceilings() {
        let p = SurfacePalette::default_for(30.0, 0.0);
        let ceilings: Vec<f32> = p.types().iter().map(|t| t.ceiling).collect();
        assert_eq!(ceilings, vec![0.0, 3.0, 6.0, 9.0, 12.0, 21.0, 30.0]);
    }

    #[test]
    fn classify_picks_first_band_at_or_above() {
        let p = SurfacePalette::default_for(30.0, 0.0);
        assert_eq!(p.classify(0.0).name, "water");
        assert_eq!(p.classify(3.0).name, "sand");
        assert_eq!(p.classify(3.1).name, "thin grass");
        assert_eq!(p.classify(20.9).name, "rock");
        assert_eq!(p.classify(30.0).name, "snow");
    }

    #[test]
    fn classify_clamps_above_the_top_ceiling() {
        let p = SurfacePalette::default_for(30.0, 0.0);
        assert_eq!(p.classify(1000.0).name, "snow");
    }

    #[test]
    fn from_entries_rejects_empty_and_unsorted() {
        assert!(SurfacePalette::from_entries(&[]).is_err());
        let entry = |name: &str, ceiling: f32| SurfaceEntry {
            name: name.to_string(),
            color: [0.0, 0.0, 0.0, 1.0],
            shininess: 1.0,
            ceiling,
        };
        let unsorted = [entry("low", 5.0), entry("high", 5.0)];
        assert!(SurfacePalette::from_entries(&unsorted).is_err());
        let sorted = [entry("low", 5.0), entry("high", 9.0)];
        let p = SurfacePalette::from_entries(&sorted).unwrap();
        assert_eq!(p.classify(6.0).name, "high");
    }
}
