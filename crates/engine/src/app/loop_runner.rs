use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::camera::{VIEWPORT_HEIGHT_PX, VIEWPORT_WIDTH_PX};
use crate::StartupError;

use super::input::InputCollector;
use super::metrics::IntervalMetrics;
use super::pacing::{RenderPacer, TickClock};
use super::scene::SceneHost;
use super::{Renderer, Scene, SceneCommand};

pub const SLOW_FRAME_ENV_VAR: &str = "OVERWORLD_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    /// Logical framebuffer size; the window is this times `window_scale`.
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub window_scale: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Debug perturbation; `OVERWORLD_SLOW_FRAME_MS` overrides it.
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Overworld".to_string(),
            viewport_width: VIEWPORT_WIDTH_PX,
            viewport_height: VIEWPORT_HEIGHT_PX,
            window_scale: 2,
            target_tps: 30,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: Some(60),
        }
    }
}

impl LoopConfig {
    fn logical_size(&self) -> (u32, u32) {
        (self.viewport_width.max(1), self.viewport_height.max(1))
    }

    fn window_size(&self) -> (u32, u32) {
        let (width, height) = self.logical_size();
        let scale = self.window_scale.max(1);
        (width.saturating_mul(scale), height.saturating_mul(scale))
    }

    fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_tps.max(1)))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` at a fixed tick rate until it quits
/// or the window closes.
pub fn run_app(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    asset_root: PathBuf,
) -> Result<(), AppError> {
    let (window_width, window_height) = config.window_size();
    let (logical_width, logical_height) = config.logical_size();

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(window_width as f64, window_height as f64))
            .with_min_inner_size(LogicalSize::new(logical_width as f64, logical_height as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    info!(asset_root = %asset_root.display(), "renderer_asset_root");
    let renderer = Renderer::new(
        Arc::clone(&window),
        asset_root,
        (logical_width, logical_height),
    )
    .map_err(AppError::CreateRenderer)?;

    let mut driver = LoopDriver::new(&config, SceneHost::new(scene), window, renderer);
    driver.start(&config);

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run(move |event, window_target| {
            let next = match event {
                Event::WindowEvent { window_id, event } if window_id == driver.window.id() => {
                    driver.handle_window_event(event)
                }
                Event::AboutToWait => {
                    driver.window.request_redraw();
                    Next::Continue
                }
                Event::LoopExiting => {
                    driver.host.shutdown();
                    info!("shutdown");
                    Next::Continue
                }
                _ => Next::Continue,
            };
            if next == Next::Exit {
                window_target.exit();
            }
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Continue,
    Exit,
}

/// Everything the event loop closure owns between callbacks.
struct LoopDriver {
    host: SceneHost,
    window: Arc<Window>,
    renderer: Renderer,
    input: InputCollector,
    clock: TickClock,
    pacer: RenderPacer,
    metrics: IntervalMetrics,
    slow_frame_delay: Duration,
    last_frame: Instant,
    default_title: String,
    applied_title: Option<String>,
}

impl LoopDriver {
    fn new(config: &LoopConfig, host: SceneHost, window: Arc<Window>, renderer: Renderer) -> Self {
        let now = Instant::now();
        Self {
            host,
            window,
            renderer,
            input: InputCollector::default(),
            clock: TickClock::new(
                config.tick_duration(),
                config.max_frame_delta,
                config.max_ticks_per_frame,
            ),
            pacer: RenderPacer::new(config.max_render_fps, now),
            metrics: IntervalMetrics::new(config.metrics_log_interval, now),
            slow_frame_delay: resolve_slow_frame_delay(config.simulated_slow_frame_ms),
            last_frame: now,
            default_title: config.window_title.clone(),
            applied_title: None,
        }
    }

    fn start(&mut self, config: &LoopConfig) {
        self.host.load();
        info!(title = ?self.host.debug_title(), "scene_loaded");

        let (viewport_width, viewport_height) = config.logical_size();
        info!(
            target_tps = config.target_tps.max(1),
            viewport_width,
            viewport_height,
            window_scale = config.window_scale.max(1),
            max_ticks_per_frame = self.clock.max_ticks_per_frame(),
            metrics_log_interval_ms = self.metrics.interval().as_millis() as u64,
            slow_frame_delay_ms = self.slow_frame_delay.as_millis() as u64,
            render_fps_cap = %self.pacer.cap_label(),
            "loop_config"
        );
        self.last_frame = Instant::now();
    }

    fn handle_window_event(&mut self, event: WindowEvent) -> Next {
        match event {
            WindowEvent::CloseRequested => {
                self.input.request_quit();
                info!(reason = "window_close", "shutdown_requested");
                Next::Exit
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height)
            }
            WindowEvent::Focused(false) => {
                self.input.clear_held();
                Next::Continue
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.on_key_event(&event);
                if self.input.quit_requested() {
                    info!(reason = "quit_key", "shutdown_requested");
                    Next::Exit
                } else {
                    Next::Continue
                }
            }
            WindowEvent::RedrawRequested => self.frame(),
            _ => Next::Continue,
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> Next {
        match self.renderer.resize(width, height) {
            Ok(()) => Next::Continue,
            Err(error) => {
                warn!(error = %error, "renderer_resize_failed");
                Next::Exit
            }
        }
    }

    /// One presented frame: run the owed ticks, then draw once.
    fn frame(&mut self) -> Next {
        if !self.slow_frame_delay.is_zero() {
            thread::sleep(self.slow_frame_delay);
        }

        let now = Instant::now();
        let frame_dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        let budget = self.clock.bank(frame_dt);
        let mut next = Next::Continue;
        for _ in 0..budget.ticks {
            let input = self.input.snapshot_for_tick();
            match self.host.update(self.clock.tick_seconds(), &input) {
                SceneCommand::None => {}
                SceneCommand::ClearInput => self.input.clear_held(),
                SceneCommand::Quit => {
                    info!(reason = "scene_command", "shutdown_requested");
                    next = Next::Exit;
                    break;
                }
            }
        }
        if !budget.dropped_backlog.is_zero() {
            warn!(
                dropped_backlog_ms = budget.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame = self.clock.max_ticks_per_frame(),
                "sim_clamp_triggered"
            );
        }

        let cap_sleep = self.pacer.sleep_needed(Instant::now());
        if !cap_sleep.is_zero() {
            thread::sleep(cap_sleep);
        }
        if let Some(frame) = self.host.render() {
            if let Err(error) = self.renderer.render_frame(&frame) {
                warn!(error = %error, "renderer_draw_failed");
                next = Next::Exit;
            }
        }
        self.pacer.mark_presented(Instant::now());
        self.refresh_title();

        self.metrics.record(frame_dt, budget);
        if let Some(snapshot) = self.metrics.report_if_due(now) {
            snapshot.log();
        }
        next
    }

    fn refresh_title(&mut self) {
        let title = self.host.debug_title();
        if title == self.applied_title {
            return;
        }
        self.window
            .set_title(title.as_deref().unwrap_or(&self.default_title));
        self.applied_title = title;
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    Duration::from_millis(parse_slow_frame_ms(
        env::var(SLOW_FRAME_ENV_VAR),
        config_slow_frame_ms,
    ))
}

fn parse_slow_frame_ms(raw: Result<String, env::VarError>, fallback_ms: u64) -> u64 {
    match raw {
        Ok(value) => value.trim().parse::<u64>().unwrap_or_else(|_| {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                value = value.as_str(),
                "invalid_slow_frame_env_value_using_config"
            );
            fallback_ms
        }),
        Err(env::VarError::NotPresent) => fallback_ms,
        Err(error) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %error,
                "unreadable_slow_frame_env_value_using_config"
            );
            fallback_ms
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_gba_viewport_at_thirty_tps() {
        let config = LoopConfig::default();
        assert_eq!(config.logical_size(), (240, 160));
        assert_eq!(config.window_size(), (480, 320));
        assert!((config.tick_duration().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_config_values_are_floored() {
        let config = LoopConfig {
            viewport_width: 0,
            window_scale: 0,
            target_tps: 0,
            ..LoopConfig::default()
        };
        assert_eq!(config.window_size(), (1, 160));
        assert_eq!(config.tick_duration(), Duration::from_secs(1));
    }

    #[test]
    fn slow_frame_env_overrides_config() {
        assert_eq!(parse_slow_frame_ms(Ok("40".to_string()), 0), 40);
        assert_eq!(parse_slow_frame_ms(Ok(" 7 ".to_string()), 0), 7);
    }

    #[test]
    fn slow_frame_env_falls_back_when_unset_or_invalid() {
        assert_eq!(parse_slow_frame_ms(Err(env::VarError::NotPresent), 15), 15);
        assert_eq!(parse_slow_frame_ms(Ok("fast".to_string()), 15), 15);
    }
}
