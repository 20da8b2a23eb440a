use std::mem;
use std::time::{Duration, Instant};

use tracing::info;

use super::pacing::TickBudget;

/// Loop health over one logging interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LoopMetricsSnapshot {
    pub(crate) fps: f32,
    pub(crate) tps: f32,
    pub(crate) frame_time_ms: f32,
    pub(crate) worst_frame_ms: f32,
    /// Frames that hit the tick cap and dropped backlog.
    pub(crate) sim_clamps: u32,
}

impl LoopMetricsSnapshot {
    pub(crate) fn log(&self) {
        info!(
            fps = self.fps,
            tps = self.tps,
            frame_time_ms = self.frame_time_ms,
            worst_frame_ms = self.worst_frame_ms,
            sim_clamps = self.sim_clamps,
            "loop_metrics"
        );
    }
}

#[derive(Debug)]
pub(crate) struct IntervalMetrics {
    started: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    sim_clamps: u32,
    frame_time_total: Duration,
    worst_frame: Duration,
}

impl IntervalMetrics {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            started: now,
            interval: if interval.is_zero() {
                Duration::from_secs(1)
            } else {
                interval
            },
            frames: 0,
            ticks: 0,
            sim_clamps: 0,
            frame_time_total: Duration::ZERO,
            worst_frame: Duration::ZERO,
        }
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    pub(crate) fn record(&mut self, frame_dt: Duration, budget: TickBudget) {
        self.frames = self.frames.saturating_add(1);
        self.ticks = self.ticks.saturating_add(budget.ticks);
        if !budget.dropped_backlog.is_zero() {
            self.sim_clamps = self.sim_clamps.saturating_add(1);
        }
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
        self.worst_frame = self.worst_frame.max(frame_dt);
    }

    /// Closes the interval once it has elapsed and starts a fresh one at `now`.
    pub(crate) fn report_if_due(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.interval {
            return None;
        }
        let interval = self.interval;
        let done = mem::replace(self, Self::new(interval, now));

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match done.frames {
            0 => 0.0,
            frames => done.frame_time_total.as_secs_f32() * 1000.0 / frames as f32,
        };
        Some(LoopMetricsSnapshot {
            fps: done.frames as f32 / seconds,
            tps: done.ticks as f32 / seconds,
            frame_time_ms,
            worst_frame_ms: done.worst_frame.as_secs_f32() * 1000.0,
            sim_clamps: done.sim_clamps,
        })
    }
}
