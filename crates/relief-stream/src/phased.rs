//! Update pipeline spread over ticks, one phase per call.

use std::time::Instant;

use crate::{ScrollPlan, StreamReport, TerrainStream, elapsed_us};

/// Where a paced update currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    /// Waiting for the observer to leave the threshold box.
    ComputeDelta,
    /// Scroll survivors and refill the exposed bands.
    Fill,
    /// Rebuild normals over the refilled regions.
    Normals,
    /// Commit bookkeeping and emit the report.
    Publish,
}

/// Runs the same pipeline as [`TerrainStream::update`] but one phase per
/// tick, so a frame loop can bound how much terrain work it does between
/// draws. The plan pins the observer position it was computed from;
/// movement during later phases waits for the next cycle.
pub struct PhasedStream {
    stream: TerrainStream,
    phase: StreamPhase,
    plan: Option<ScrollPlan>,
    refilled: usize,
    t_shift_us: u32,
    t_fill_us: u32,
    t_normals_us: u32,
}

impl PhasedStream {
    pub fn new(stream: TerrainStream) -> Self {
        Self {
            stream,
            phase: StreamPhase::ComputeDelta,
            plan: None,
            refilled: 0,
            t_shift_us: 0,
            t_fill_us: 0,
            t_normals_us: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    #[inline]
    pub fn stream(&self) -> &TerrainStream {
        &self.stream
    }

    pub fn into_inner(self) -> TerrainStream {
        self.stream
    }

    /// Advances the pipeline by one phase. Only `ComputeDelta` reads the
    /// observer position; a report surfaces on `Publish`.
    pub fn tick(&mut self, obs_x: f32, obs_z: f32) -> Option<StreamReport> {
        match self.phase {
            StreamPhase::ComputeDelta => {
                if let Some(plan) = self.stream.plan_scroll(obs_x, obs_z) {
                    self.plan = Some(plan);
                    self.phase = StreamPhase::Fill;
                }
                None
            }
            StreamPhase::Fill => {
                let plan = self.plan.as_ref().expect("fill phase holds a plan");
                let t0 = Instant::now();
                self.stream.apply_shift(plan);
                self.t_shift_us = elapsed_us(t0);
                let t1 = Instant::now();
                self.refilled = self.stream.fill_bands(plan);
                self.t_fill_us = elapsed_us(t1);
                self.phase = StreamPhase::Normals;
                None
            }
            StreamPhase::Normals => {
                let plan = self.plan.as_ref().expect("normals phase holds a plan");
                let t0 = Instant::now();
                self.stream.rebuild_plan_normals(plan);
                self.t_normals_us = elapsed_us(t0);
                self.phase = StreamPhase::Publish;
                None
            }
            StreamPhase::Publish => {
                let plan = self.plan.take().expect("publish phase holds a plan");
                let report = self.stream.commit(
                    plan,
                    self.refilled,
                    self.t_shift_us,
                    self.t_fill_us,
                    self.t_normals_us,
                );
                self.refilled = 0;
                self.t_shift_us = 0;
                self.t_fill_us = 0;
                self.t_normals_us = 0;
                self.phase = StreamPhase::ComputeDelta;
                Some(report)
            }
        }
    }
}
