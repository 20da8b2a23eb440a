use std::mem;
use std::time::{Duration, Instant};

const FALLBACK_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Ticks owed for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickBudget {
    pub(crate) ticks: u32,
    /// Time thrown away because the per-frame tick cap was reached.
    pub(crate) dropped_backlog: Duration,
}

/// Fixed-timestep accumulator. Wall time is clamped before it is banked and
/// backlog past the per-frame cap is discarded, never replayed.
#[derive(Debug)]
pub(crate) struct TickClock {
    tick: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    banked: Duration,
}

impl TickClock {
    pub(crate) fn new(tick: Duration, max_frame_delta: Duration, max_ticks_per_frame: u32) -> Self {
        Self {
            tick: if tick.is_zero() {
                Duration::from_millis(1)
            } else {
                tick
            },
            max_frame_delta: if max_frame_delta.is_zero() {
                FALLBACK_MAX_FRAME_DELTA
            } else {
                max_frame_delta
            },
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            banked: Duration::ZERO,
        }
    }

    pub(crate) fn tick_seconds(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    pub(crate) fn max_ticks_per_frame(&self) -> u32 {
        self.max_ticks_per_frame
    }

    pub(crate) fn bank(&mut self, frame_dt: Duration) -> TickBudget {
        self.banked = self
            .banked
            .saturating_add(frame_dt.min(self.max_frame_delta));

        let mut ticks = 0;
        while self.banked >= self.tick && ticks < self.max_ticks_per_frame {
            self.banked -= self.tick;
            ticks += 1;
        }

        let dropped_backlog = if self.banked >= self.tick {
            mem::take(&mut self.banked)
        } else {
            Duration::ZERO
        };
        TickBudget {
            ticks,
            dropped_backlog,
        }
    }
}

/// Optional presentation cap, measured from the previous present.
#[derive(Debug)]
pub(crate) struct RenderPacer {
    max_fps: Option<u32>,
    last_present: Instant,
}

impl RenderPacer {
    pub(crate) fn new(max_fps: Option<u32>, now: Instant) -> Self {
        Self {
            max_fps: max_fps.filter(|fps| *fps > 0),
            last_present: now,
        }
    }

    pub(crate) fn cap_label(&self) -> String {
        self.max_fps
            .map_or_else(|| "off".to_string(), |fps| fps.to_string())
    }

    pub(crate) fn sleep_needed(&self, now: Instant) -> Duration {
        let Some(fps) = self.max_fps else {
            return Duration::ZERO;
        };
        let frame_target = Duration::from_secs_f64(1.0 / f64::from(fps));
        frame_target.saturating_sub(now.saturating_duration_since(self.last_present))
    }

    pub(crate) fn mark_presented(&mut self, now: Instant) {
        self.last_present = now;
    }
}
