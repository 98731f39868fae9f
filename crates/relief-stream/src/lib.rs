//! Sliding-window terrain streaming that follows a moving observer.
#![forbid(unsafe_code)]

pub mod phased;

// Re-exports for convenience
pub use phased::{PhasedStream, StreamPhase};

use std::error::Error;
use std::ops::Range;
use std::time::Instant;

use relief_geom::Vec3;
use relief_grid::{DrawRange, IndexTable, Vertex, VertexGrid};
use relief_terrain::TerrainSampler;
use serde::Deserialize;

/// Window geometry and the observer displacement that triggers a scroll.
#[derive(Clone, Debug, Deserialize)]
pub struct StreamConfig {
    /// Vertices per grid axis.
    #[serde(default = "default_side")]
    pub side: usize,
    /// World units between neighboring vertices.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f32,
    /// Displacement on either axis that wakes the stream up.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_side() -> usize {
    500
}

fn default_chunk_size() -> f32 {
    2.0
}

fn default_threshold() -> f32 {
    2.0
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            side: default_side(),
            chunk_size: default_chunk_size(),
            threshold: default_threshold(),
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.side < 2 {
            return Err("stream window needs at least 2 vertices per side".into());
        }
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err("chunk size must be finite and positive".into());
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err("update threshold must be finite and positive".into());
        }
        Ok(())
    }
}

/// Pinned outcome of one delta computation. Later phases run against this
/// even if the observer keeps moving; the next cycle picks up the rest.
#[derive(Clone, Debug)]
pub(crate) struct ScrollPlan {
    pub(crate) chunks_x: i32,
    pub(crate) chunks_z: i32,
    /// Observer position the plan was computed from.
    pub(crate) target: (f32, f32),
    /// Grid origin after the scroll commits.
    pub(crate) origin: (f32, f32),
    pub(crate) row_band: Range<usize>,
    pub(crate) col_band: Range<usize>,
    /// Rows the column band spans: everything the row band does not cover.
    pub(crate) col_rows: Range<usize>,
    pub(crate) full: bool,
}

/// What one committed update did, with per-phase timings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamReport {
    /// Whole chunks scrolled along +x (negative for -x).
    pub chunks_x: i32,
    /// Whole chunks scrolled toward -z (negative for +z).
    pub chunks_z: i32,
    /// Vertices refilled from the sampler.
    pub refilled: usize,
    /// The displacement swept the whole window and everything was rebuilt.
    pub full_regen: bool,
    pub t_shift_us: u32,
    pub t_fill_us: u32,
    pub t_normals_us: u32,
}

#[inline]
pub(crate) fn elapsed_us(t0: Instant) -> u32 {
    t0.elapsed().as_micros().min(u128::from(u32::MAX)) as u32
}

/// Square height-field window that scrolls under a moving observer.
///
/// Rows run toward -z and columns toward +x, so cell `(0, 0)` is the
/// far-left corner at `origin`. Updates shift surviving vertices with two
/// memmoves, refill only the exposed bands, and rebuild normals over the
/// refilled regions plus one surviving line so seams relight correctly.
pub struct TerrainStream {
    sampler: TerrainSampler,
    grid: VertexGrid,
    table: IndexTable,
    chunk_size: f32,
    threshold: f32,
    /// World position of cell (0, 0); advances in whole chunks only.
    origin: (f32, f32),
    /// Raw observer position at the last committed update.
    last_update: (f32, f32),
}

impl TerrainStream {
    /// Builds the window centered on the observer and fills every cell.
    pub fn new(cfg: &StreamConfig, sampler: TerrainSampler, obs_x: f32, obs_z: f32) -> Self {
        assert!(cfg.side >= 2, "stream window needs at least 2 vertices per side");
        assert!(
            cfg.chunk_size.is_finite() && cfg.chunk_size > 0.0,
            "chunk size must be finite and positive"
        );
        assert!(
            cfg.threshold.is_finite() && cfg.threshold > 0.0,
            "update threshold must be finite and positive"
        );
        let half = (cfg.side - 1) as f32 * cfg.chunk_size * 0.5;
        let mut stream = Self {
            sampler,
            grid: VertexGrid::new(cfg.side),
            table: IndexTable::new(cfg.side),
            chunk_size: cfg.chunk_size,
            threshold: cfg.threshold,
            origin: (obs_x - half, obs_z + half),
            last_update: (obs_x, obs_z),
        };
        let t0 = Instant::now();
        let origin = stream.origin;
        let side = cfg.side;
        stream.fill_region(origin, 0..side, 0..side);
        stream.grid.rebuild_normals(0..side, 0..side);
        log::info!(
            "terrain window ready: {}x{} vertices spanning {:.0} world units, seed {}, filled in {} ms",
            side,
            side,
            stream.world_span(),
            stream.sampler.seed(),
            t0.elapsed().as_millis()
        );
        stream
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.grid.side()
    }

    #[inline]
    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// World position of cell (0, 0).
    #[inline]
    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    /// Observer position at the last committed update.
    #[inline]
    pub fn last_update(&self) -> (f32, f32) {
        self.last_update
    }

    /// Full world extent covered per axis.
    #[inline]
    pub fn world_span(&self) -> f32 {
        (self.side() - 1) as f32 * self.chunk_size
    }

    /// World position a cell currently represents.
    #[inline]
    pub fn cell_world(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.origin.0 + col as f32 * self.chunk_size,
            self.origin.1 - row as f32 * self.chunk_size,
        )
    }

    #[inline]
    pub fn sampler(&self) -> &TerrainSampler {
        &self.sampler
    }

    #[inline]
    pub fn grid(&self) -> &VertexGrid {
        &self.grid
    }

    #[inline]
    pub fn index_table(&self) -> &IndexTable {
        &self.table
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        self.grid.vertices()
    }

    /// Triangle indices for the whole window, strip by strip. Computed once
    /// at construction; streaming never touches them.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        self.table.indices()
    }

    /// Per-strip draw descriptors matching [`Self::indices`].
    #[inline]
    pub fn ranges(&self) -> &[DrawRange] {
        self.table.ranges()
    }

    /// Follows the observer: `None` below the threshold, otherwise scroll,
    /// refill, and relight in one call.
    pub fn update(&mut self, obs_x: f32, obs_z: f32) -> Option<StreamReport> {
        let plan = self.plan_scroll(obs_x, obs_z)?;
        if plan.full {
            log::info!(
                "observer jumped ({}, {}) chunks, regenerating the whole window",
                plan.chunks_x,
                plan.chunks_z
            );
        }
        let t0 = Instant::now();
        self.apply_shift(&plan);
        let t_shift_us = elapsed_us(t0);
        let t1 = Instant::now();
        let refilled = self.fill_bands(&plan);
        let t_fill_us = elapsed_us(t1);
        let t2 = Instant::now();
        self.rebuild_plan_normals(&plan);
        let t_normals_us = elapsed_us(t2);
        let report = self.commit(plan, refilled, t_shift_us, t_fill_us, t_normals_us);
        log::debug!(
            "scrolled ({}, {}) chunks, refilled {} vertices in {} us",
            report.chunks_x,
            report.chunks_z,
            report.refilled,
            report.t_shift_us + report.t_fill_us + report.t_normals_us
        );
        Some(report)
    }

    /// Decides whether the observer moved far enough and what to scroll.
    /// Reads state only; nothing changes until the plan commits.
    pub(crate) fn plan_scroll(&self, obs_x: f32, obs_z: f32) -> Option<ScrollPlan> {
        let dx = obs_x - self.last_update.0;
        let dz = obs_z - self.last_update.1;
        if dx.abs() < self.threshold && dz.abs() < self.threshold {
            return None;
        }
        // Rows grow toward -z, so the z delta flips sign.
        let chunks_x = (dx / self.chunk_size).round() as i32;
        let chunks_z = ((self.last_update.1 - obs_z) / self.chunk_size).round() as i32;
        if chunks_x == 0 && chunks_z == 0 {
            return None;
        }
        let n = self.grid.side();
        let kx = (chunks_x.unsigned_abs() as usize).min(n);
        let kz = (chunks_z.unsigned_abs() as usize).min(n);
        let full = kx >= n || kz >= n;
        let origin = (
            self.origin.0 + chunks_x as f32 * self.chunk_size,
            self.origin.1 - chunks_z as f32 * self.chunk_size,
        );
        let (row_band, col_band, col_rows) = if full {
            (0..n, 0..0, 0..0)
        } else {
            let row_band = if chunks_z > 0 { n - kz..n } else { 0..kz };
            let col_band = if chunks_x > 0 { n - kx..n } else { 0..kx };
            let col_rows = if chunks_z > 0 { 0..n - kz } else { kz..n };
            (row_band, col_band, col_rows)
        };
        Some(ScrollPlan {
            chunks_x,
            chunks_z,
            target: (obs_x, obs_z),
            origin,
            row_band,
            col_band,
            col_rows,
            full,
        })
    }

    /// Memmoves surviving vertices toward the trailing edge.
    pub(crate) fn apply_shift(&mut self, plan: &ScrollPlan) {
        if plan.full {
            return;
        }
        self.grid.scroll_rows(plan.chunks_z);
        self.grid.scroll_cols(plan.chunks_x, plan.col_rows.clone());
    }

    /// Samples fresh terrain into the exposed bands. The row band spans the
    /// full width; the column band covers only the surviving rows, so the
    /// two never overlap.
    pub(crate) fn fill_bands(&mut self, plan: &ScrollPlan) -> usize {
        let n = self.grid.side();
        let mut filled = self.fill_region(plan.origin, plan.row_band.clone(), 0..n);
        filled += self.fill_region(plan.origin, plan.col_rows.clone(), plan.col_band.clone());
        filled
    }

    fn fill_region(&mut self, origin: (f32, f32), rows: Range<usize>, cols: Range<usize>) -> usize {
        let mut filled = 0;
        for r in rows {
            let wz = origin.1 - r as f32 * self.chunk_size;
            for c in cols.clone() {
                let wx = origin.0 + c as f32 * self.chunk_size;
                let s = self.sampler.sample(wx, wz);
                self.grid
                    .put_vertex(r, c, Vec3::new(wx, s.height, wz), s.color, s.shininess);
                filled += 1;
            }
        }
        filled
    }

    /// Rebuilds normals over each band widened by one surviving line. The
    /// extra line is the old grid edge; its normals were clamped against
    /// missing neighbors and the fresh band just gave it some.
    pub(crate) fn rebuild_plan_normals(&mut self, plan: &ScrollPlan) {
        let n = self.grid.side();
        if plan.full {
            self.grid.rebuild_normals(0..n, 0..n);
            return;
        }
        if !plan.row_band.is_empty() {
            let rows = if plan.chunks_z > 0 {
                plan.row_band.start.saturating_sub(1)..n
            } else {
                0..(plan.row_band.end + 1).min(n)
            };
            self.grid.rebuild_normals(rows, 0..n);
        }
        if !plan.col_band.is_empty() {
            let cols = if plan.chunks_x > 0 {
                plan.col_band.start.saturating_sub(1)..n
            } else {
                0..(plan.col_band.end + 1).min(n)
            };
            self.grid.rebuild_normals(plan.col_rows.clone(), cols);
        }
    }

    /// Moves the bookkeeping to the scrolled state. Runs last so fills keep
    /// reading band coordinates off the plan, not half-updated fields.
    pub(crate) fn commit(
        &mut self,
        plan: ScrollPlan,
        refilled: usize,
        t_shift_us: u32,
        t_fill_us: u32,
        t_normals_us: u32,
    ) -> StreamReport {
        self.origin = plan.origin;
        self.last_update = plan.target;
        StreamReport {
            chunks_x: plan.chunks_x,
            chunks_z: plan.chunks_z,
            refilled,
            full_regen: plan.full,
            t_shift_us,
            t_fill_us,
            t_normals_us,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_terrain::TerrainSampler;

    fn tiny_config() -> StreamConfig {
        StreamConfig {
            side: 4,
            chunk_size: 2.0,
            threshold: 2.0,
        }
    }

    #[test]
    fn initial_window_is_centered_on_the_observer() {
        let stream = TerrainStream::new(&tiny_config(), TerrainSampler::new(0), 0.0, 0.0);
        assert_eq!(stream.origin(), (-3.0, 3.0));
        assert_eq!(stream.cell_world(0, 0), (-3.0, 3.0));
        assert_eq!(stream.cell_world(3, 3), (3.0, -3.0));
        let xs: Vec<f32> = (0..4).map(|c| stream.cell_world(0, c).0).collect();
        assert_eq!(xs, vec![-3.0, -1.0, 1.0, 3.0]);
        for r in 0..4 {
            for c in 0..4 {
                let (wx, wz) = stream.cell_world(r, c);
                let v = stream.grid().vertex(r, c);
                assert_eq!((v.position.x, v.position.z), (wx, wz));
                assert_eq!(v.position.y, stream.sampler().height_at(wx, wz));
            }
        }
    }

    #[test]
    fn moves_below_the_threshold_are_ignored() {
        let mut stream = TerrainStream::new(&tiny_config(), TerrainSampler::new(0), 0.0, 0.0);
        let before = stream.grid().clone();
        assert!(stream.update(1.9, -1.9).is_none());
        assert_eq!(stream.last_update(), (0.0, 0.0));
        assert_eq!(stream.origin(), (-3.0, 3.0));
        assert_eq!(stream.grid().vertices(), before.vertices());
    }

    #[test]
    fn three_chunk_move_shifts_and_refills_one_band() {
        let mut stream = TerrainStream::new(&tiny_config(), TerrainSampler::new(0), 0.0, 0.0);
        let before = stream.grid().clone();
        let report = stream.update(6.0, 0.0).unwrap();
        assert_eq!(report.chunks_x, 3);
        assert_eq!(report.chunks_z, 0);
        assert!(!report.full_regen);
        assert_eq!(report.refilled, 12);
        assert_eq!(stream.origin(), (3.0, 3.0));
        assert_eq!(stream.last_update(), (6.0, 0.0));
        // Column 3 survived into column 0 with its sampled data intact.
        for r in 0..4 {
            let survivor = stream.grid().vertex(r, 0);
            let old = before.vertex(r, 3);
            assert_eq!(survivor.position, old.position);
            assert_eq!(survivor.color, old.color);
        }
    }

    #[test]
    fn z_moves_fill_the_matching_row_band() {
        let mut stream = TerrainStream::new(&tiny_config(), TerrainSampler::new(0), 0.0, 0.0);
        let before = stream.grid().clone();
        let report = stream.update(0.0, -4.0).unwrap();
        assert_eq!(report.chunks_x, 0);
        assert_eq!(report.chunks_z, 2);
        assert_eq!(report.refilled, 8);
        assert_eq!(stream.origin(), (-3.0, -1.0));
        // Rows 2..4 of the old window survive as rows 0..2.
        for r in 0..2 {
            for c in 0..4 {
                assert_eq!(
                    stream.grid().vertex(r, c).position,
                    before.vertex(r + 2, c).position
                );
            }
        }
    }

    #[test]
    fn window_sized_jump_regenerates_everything() {
        let mut stream = TerrainStream::new(&tiny_config(), TerrainSampler::new(0), 0.0, 0.0);
        let report = stream.update(8.5, 0.0).unwrap();
        assert!(report.full_regen);
        assert_eq!(report.refilled, 16);
        // The origin still advances in whole chunks; it does not recenter
        // on the raw observer position.
        assert_eq!(stream.origin(), (5.0, 3.0));
        assert_eq!(stream.last_update(), (8.5, 0.0));
    }

    #[test]
    fn scrolling_matches_a_fresh_build_at_the_same_center() {
        let cfg = StreamConfig {
            side: 6,
            chunk_size: 2.0,
            threshold: 2.0,
        };
        let mut scrolled = TerrainStream::new(&cfg, TerrainSampler::new(1234), 0.0, 0.0);
        scrolled.update(4.0, 0.0).unwrap();
        scrolled.update(4.0, -6.0).unwrap();
        scrolled.update(-2.0, -6.0).unwrap();
        let fresh = TerrainStream::new(&cfg, TerrainSampler::new(1234), -2.0, -6.0);
        assert_eq!(scrolled.origin(), fresh.origin());
        assert_eq!(scrolled.grid().vertices(), fresh.grid().vertices());
    }

    #[test]
    fn diagonal_move_fills_disjoint_bands() {
        let cfg = StreamConfig {
            side: 6,
            chunk_size: 2.0,
            threshold: 2.0,
        };
        let mut stream = TerrainStream::new(&cfg, TerrainSampler::new(7), 0.0, 0.0);
        let report = stream.update(4.0, 6.0).unwrap();
        assert_eq!(report.chunks_x, 2);
        assert_eq!(report.chunks_z, -3);
        // 3 new rows plus 2 new columns over the 3 surviving rows.
        assert_eq!(report.refilled, 3 * 6 + 2 * 3);
        assert!(!report.full_regen);
        assert_eq!(stream.origin(), (-5.0 + 4.0, 5.0 + 6.0));
    }
}
