use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::sim::{Color, PlayField};

use super::input::InputCollector;
use super::metrics::MetricsAccumulator;
use super::scene::SceneRuntime;
use super::{MetricsHandle, Renderer, Scene};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    pub clear_color: Color,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Arcade".to_string(),
            window_width: 640,
            window_height: 480,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
            clear_color: Color::BLACK,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app<S: Scene>(config: LoopConfig, scene: S) -> Result<(), AppError> {
    let metrics_handle = MetricsHandle::default();
    run_app_with_metrics(config, scene, metrics_handle)
}

/// Opens the window and drives `scene` until the window closes or Escape is pressed.
///
/// The registry is advanced on a fixed timestep of `1 / target_tps` seconds; the play-field
/// always matches the window's inner size in physical pixels.
pub fn run_app_with_metrics<S: Scene>(
    config: LoopConfig,
    scene: S,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), config.clear_color).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut fixed_step = FixedStep::new(
        config.target_tps,
        config.max_frame_delta,
        config.max_ticks_per_frame,
    );
    let tick_seconds = fixed_step.tick.as_secs_f32();
    let render_cap = RenderCap::from_fps(config.max_render_fps);
    let metrics_log_interval = if config.metrics_log_interval.is_zero() {
        Duration::from_secs(1)
    } else {
        config.metrics_log_interval
    };

    let viewport = renderer.viewport();
    let mut input_collector = InputCollector::new(viewport.width, viewport.height);
    let mut runtime = SceneRuntime::new(scene, play_field_for(input_collector.window_size()));
    runtime.load();
    info!(
        entity_count = runtime.registry().len(),
        play_field_width = viewport.width,
        play_field_height = viewport.height,
        "scene_loaded"
    );

    info!(
        tick_ms = fixed_step.tick.as_secs_f64() * 1000.0,
        max_frame_delta_ms = fixed_step.max_frame_delta.as_millis() as u64,
        max_ticks_per_frame = fixed_step.max_ticks,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %render_cap,
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    runtime.set_play_field(play_field_for(input_collector.window_size()));
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    runtime.set_play_field(play_field_for(input_collector.window_size()));
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_all();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector
                        .handle_key(event.physical_key, event.state == ElementState::Pressed);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let budget = fixed_step.advance(raw_frame_dt);
                    for _ in 0..budget.ticks {
                        let stats = runtime.advance_frame(input_collector.pressed(), tick_seconds);
                        metrics_accumulator.record_tick(&stats);
                    }

                    if !budget.dropped.is_zero() {
                        warn!(
                            dropped_backlog_ms = budget.dropped.as_millis() as u64,
                            max_ticks_per_frame = fixed_step.max_ticks,
                            "sim_clamp_triggered"
                        );
                    }

                    let cap_sleep = render_cap
                        .sleep_after(Instant::now().saturating_duration_since(last_present_instant));
                    if !cap_sleep.is_zero() {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.render_registry(runtime.registry()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = runtime.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            colliding_pairs = snapshot.colliding_pairs,
                            edges_hit = snapshot.edges_hit,
                            entity_count = runtime.registry().len(),
                            frame = runtime.registry().frame_count(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                runtime.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn play_field_for((width, height): (u32, u32)) -> PlayField {
    PlayField::new(width as f32, height as f32)
}

/// Fixed-timestep scheduler: converts wall-clock frame time into whole simulation ticks.
#[derive(Debug, Clone, Copy)]
struct FixedStep {
    tick: Duration,
    max_frame_delta: Duration,
    max_ticks: u32,
    backlog: Duration,
}

/// Ticks to run this frame, and the backlog discarded because the per-frame cap was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickBudget {
    ticks: u32,
    dropped: Duration,
}

impl FixedStep {
    fn new(target_tps: u32, max_frame_delta: Duration, max_ticks: u32) -> Self {
        Self {
            tick: Duration::from_secs_f64(1.0 / target_tps.max(1) as f64),
            max_frame_delta: if max_frame_delta.is_zero() {
                Duration::from_millis(250)
            } else {
                max_frame_delta
            },
            max_ticks: max_ticks.max(1),
            backlog: Duration::ZERO,
        }
    }

    fn advance(&mut self, frame_dt: Duration) -> TickBudget {
        self.backlog = self
            .backlog
            .saturating_add(frame_dt.min(self.max_frame_delta));

        let mut ticks = 0;
        while self.backlog >= self.tick && ticks < self.max_ticks {
            self.backlog -= self.tick;
            ticks += 1;
        }

        let dropped = if self.backlog >= self.tick {
            std::mem::take(&mut self.backlog)
        } else {
            Duration::ZERO
        };
        TickBudget { ticks, dropped }
    }
}

/// Optional ceiling on presented frames per second; `None` or `Some(0)` means uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenderCap {
    frame: Option<Duration>,
    fps: Option<u32>,
}

impl RenderCap {
    fn from_fps(fps: Option<u32>) -> Self {
        let fps = fps.filter(|fps| *fps > 0);
        Self {
            frame: fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64)),
            fps,
        }
    }

    fn sleep_after(&self, since_last_present: Duration) -> Duration {
        self.frame
            .map_or(Duration::ZERO, |frame| frame.saturating_sub(since_last_present))
    }
}

impl fmt::Display for RenderCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fps {
            Some(fps) => write!(f, "{fps}"),
            None => f.write_str("off"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn sixty_tps_runs_one_tick_per_display_frame() {
        let mut step = FixedStep::new(60, ms(250), 5);
        let frame = Duration::from_secs_f64(1.0 / 60.0);

        let ticks: Vec<u32> = (0..4).map(|_| step.advance(frame).ticks).collect();

        assert_eq!(ticks, vec![1, 1, 1, 1]);
    }

    #[test]
    fn short_frames_accumulate_until_a_tick_is_due() {
        let mut step = FixedStep::new(50, ms(250), 5);

        assert_eq!(step.advance(ms(12)).ticks, 0);
        assert_eq!(step.advance(ms(12)).ticks, 1);
        assert_eq!(step.backlog, ms(4));
    }

    #[test]
    fn long_frame_is_clamped_before_ticks_are_counted() {
        let mut step = FixedStep::new(100, ms(50), 10);

        let budget = step.advance(Duration::from_secs(3));

        assert_eq!(
            budget,
            TickBudget {
                ticks: 5,
                dropped: Duration::ZERO
            }
        );
    }

    #[test]
    fn backlog_past_the_tick_cap_is_dropped() {
        let mut step = FixedStep::new(100, ms(250), 3);

        let budget = step.advance(ms(75));

        assert_eq!(budget.ticks, 3);
        assert_eq!(budget.dropped, ms(45));
        assert_eq!(step.backlog, Duration::ZERO);
    }

    #[test]
    fn zero_settings_fall_back_to_usable_values() {
        let step = FixedStep::new(0, Duration::ZERO, 0);

        assert_eq!(step.tick, Duration::from_secs(1));
        assert_eq!(step.max_frame_delta, ms(250));
        assert_eq!(step.max_ticks, 1);
    }

    #[test]
    fn render_cap_sleeps_only_for_the_unused_part_of_a_frame() {
        let cap = RenderCap::from_fps(Some(50));

        assert_eq!(cap.sleep_after(ms(5)), ms(15));
        assert_eq!(cap.sleep_after(ms(30)), Duration::ZERO);
        assert_eq!(cap.to_string(), "50");
    }

    #[test]
    fn zero_render_cap_means_uncapped() {
        for cap in [RenderCap::from_fps(None), RenderCap::from_fps(Some(0))] {
            assert_eq!(cap.sleep_after(Duration::ZERO), Duration::ZERO);
            assert_eq!(cap.to_string(), "off");
        }
    }

    #[test]
    fn play_field_matches_window_size() {
        assert_eq!(play_field_for((800, 600)), PlayField::new(800.0, 600.0));
    }

    #[test]
    fn default_config_targets_sixty_ticks() {
        let config = LoopConfig::default();
        assert_eq!(config.target_tps, 60);
        assert_eq!((config.window_width, config.window_height), (640, 480));
    }
}
