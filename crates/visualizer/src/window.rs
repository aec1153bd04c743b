use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Sender};
use ledmodel::Model;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use tracing::{debug, error, info, warn};

use crate::colors::LedColors;
use crate::gpu::GpuState;
use crate::runtime::{FpsCounter, FrameScheduler};
use crate::scene::SceneState;
use crate::types::VisualizerConfig;

/// Pixels of touchpad scrolling treated as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Close,
    ToggleDebug,
    ResetCamera,
}

fn key_action(event: &KeyEvent) -> Option<KeyAction> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    logical_key_action(&event.logical_key)
}

fn logical_key_action(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::Escape) => Some(KeyAction::Close),
        Key::Character(value) if value.eq_ignore_ascii_case("d") => Some(KeyAction::ToggleDebug),
        Key::Character(value) if value.eq_ignore_ascii_case("r") => Some(KeyAction::ResetCamera),
        _ => None,
    }
}

/// Wheel delta in lines; positive zooms in.
fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
    }
}

/// Window, GPU and scene owned by the render thread.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    scene: SceneState,
    colors: LedColors,
    fps: FpsCounter,
}

impl WindowState {
    fn new(
        window: Arc<Window>,
        model: &Model,
        colors: LedColors,
        config: &VisualizerConfig,
    ) -> Result<Self> {
        let scene = SceneState::new(model, config);
        let gpu = GpuState::new(
            window.as_ref(),
            window.inner_size(),
            model,
            scene.led_positions(),
            config,
        )?;
        Ok(Self {
            window,
            gpu,
            scene,
            colors,
            fps: FpsCounter::new(Instant::now()),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn render_frame(&mut self, now: Instant) -> Result<(), wgpu::SurfaceError> {
        self.scene.sync_colors(&self.colors);
        if self.scene.take_pending_upload() {
            self.gpu
                .upload_leds(self.scene.led_positions(), self.scene.led_colors());
        }

        let frame = self.scene.advance(now, self.gpu.aspect());
        self.gpu.render(&frame)?;

        if let Some(fps) = self.fps.record(now) {
            if self.scene.debug() {
                let camera = self.scene.camera();
                info!(
                    fps = format_args!("{fps:.1}"),
                    frames = self.scene.frames(),
                    distance = format_args!("{:.2}", camera.distance()),
                    horizontal = format_args!("{:.3}", camera.horizontal_angle()),
                    vertical = format_args!("{:.3}", camera.vertical_angle()),
                    hdr = ?frame.hdr,
                    "frame stats"
                );
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, action: KeyAction) -> bool {
        match action {
            KeyAction::Close => return false,
            KeyAction::ToggleDebug => {
                let enabled = self.scene.toggle_debug();
                info!(enabled, "debug markers toggled");
            }
            KeyAction::ResetCamera => {
                self.scene.camera_mut().reset();
                debug!("camera reset");
            }
        }
        true
    }

    fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        let camera = self.scene.camera_mut();
        match state {
            ElementState::Pressed => camera.begin_drag(),
            ElementState::Released => camera.end_drag(),
        }
    }
}

#[derive(Debug, Clone)]
enum WindowCommand {
    Shutdown,
}

/// Handle to the render thread.
pub(crate) struct WindowRuntime {
    proxy: EventLoopProxy<WindowCommand>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl WindowRuntime {
    /// Starts the render thread and waits until its window and GPU state
    /// exist; initialization errors are returned here.
    pub(crate) fn spawn(config: VisualizerConfig, model: Model, colors: LedColors) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("led-visualizer".into())
            .spawn(move || run_window_thread(config, model, colors, ready_tx))
            .map_err(|err| anyhow!("failed to spawn render thread: {err}"))?;

        let proxy = ready_rx
            .recv()
            .map_err(|err| anyhow!("render thread failed to initialise: {err}"))??;

        Ok(Self {
            proxy,
            join_handle: Some(handle),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub(crate) fn shutdown(&mut self) -> Result<()> {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(WindowCommand::Shutdown);
            handle
                .join()
                .map_err(|err| anyhow!("render thread panicked: {err:?}"))??;
        }
        Ok(())
    }
}

impl Drop for WindowRuntime {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(WindowCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

type ReadySender = Sender<Result<EventLoopProxy<WindowCommand>, anyhow::Error>>;

fn initialise(
    config: &VisualizerConfig,
    model: &Model,
    colors: LedColors,
) -> Result<(EventLoop<WindowCommand>, WindowState)> {
    let mut builder = EventLoopBuilder::<WindowCommand>::with_user_event();
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        use winit::platform::wayland::EventLoopBuilderExtWayland;
        EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
    }

    #[cfg(any(
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    }

    #[cfg(target_os = "windows")]
    {
        use winit::platform::windows::EventLoopBuilderExtWindows;
        EventLoopBuilderExtWindows::with_any_thread(&mut builder, true);
    }

    let event_loop = builder
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.window_size;
    let window = WindowBuilder::new()
        .with_title(config.window_title.clone())
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create visualizer window: {err}"))?;
    let window = Arc::new(window);

    let state = WindowState::new(window, model, colors, config)
        .context("failed to initialise window renderer")?;
    Ok((event_loop, state))
}

fn run_window_thread(
    config: VisualizerConfig,
    model: Model,
    colors: LedColors,
    ready_tx: ReadySender,
) -> Result<()> {
    let (event_loop, mut state) = match initialise(&config, &model, colors) {
        Ok(parts) => parts,
        Err(err) => {
            let message = format!("{err:#}");
            let _ = ready_tx.send(Err(anyhow!(message)));
            return Err(err);
        }
    };

    let size = state.gpu.size();
    info!(
        model = model.display_name(),
        leds = model.led_count(),
        triangles = model.triangle_count(),
        width = size.width,
        height = size.height,
        "visualizer window ready"
    );

    let mut scheduler = FrameScheduler::new(config.target_fps);
    state.window().request_redraw();

    let _ = ready_tx.send(Ok(event_loop.create_proxy()));

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::UserEvent(WindowCommand::Shutdown) => {
            info!("shutdown requested; closing visualizer");
            elwt.exit();
        }
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let Some(action) = key_action(&event) {
                        if !state.handle_key(action) {
                            info!("escape pressed; closing visualizer");
                            elwt.exit();
                        }
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    state.scene.camera_mut().drag_to(position.x, position.y);
                }
                WindowEvent::MouseInput {
                    state: button_state,
                    button,
                    ..
                } => {
                    state.handle_mouse_button(button, button_state);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    state.scene.camera_mut().scroll(scroll_lines(delta));
                }
                WindowEvent::Resized(new_size) => {
                    state.gpu.resize(new_size);
                }
                WindowEvent::ScaleFactorChanged {
                    mut inner_size_writer,
                    ..
                } => {
                    let _ = inner_size_writer.request_inner_size(state.gpu.size());
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    match state.render_frame(now) {
                        Ok(()) => scheduler.mark_rendered(now),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.gpu.reconfigure();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; closing visualizer");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if scheduler.ready_for_frame(now) {
                tracing::trace!("scheduler: issuing redraw now");
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = scheduler.next_deadline() {
                let ms = deadline.saturating_duration_since(now).as_millis();
                tracing::trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
