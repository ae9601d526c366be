use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::DeviceInit;
use crate::frame::{Renderer, RendererConfig};
use crate::input::{InputFrame, InputState};
use crate::time::{FrameClock, FrameTime};

use super::translate::{translate_device_event, translate_window_event};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Physical size; also the render resolution for the whole session.
    pub width: u32,
    pub height: u32,
    /// Hide and lock the cursor so raw motion drives the view.
    pub grab_cursor: bool,
    /// Report this `dt` every frame instead of wall time.
    pub fixed_dt: Option<f32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            width: 1280,
            height: 720,
            grab_cursor: true,
            fixed_dt: None,
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn set_cursor_grab(&mut self, grab: bool) {
        self.commands.push(Command::GrabCursor(grab));
    }
}

enum Command {
    GrabCursor(bool),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, builds the renderer and drives `app` until it asks
    /// to exit or the window closes. Returns the first fatal error.
    pub fn run<A>(config: RuntimeConfig, device: DeviceInit, renderer: RendererConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, device, renderer, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: Renderer<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    device: DeviceInit,
    renderer: RendererConfig,
    app: A,

    entry: Option<WindowEntry>,
    started: bool,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, device: DeviceInit, renderer: RendererConfig, app: A) -> Self {
        Self {
            config,
            device,
            renderer,
            app,
            entry: None,
            started: false,
            exit_requested: false,
            fatal: None,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn fail(&mut self, err: anyhow::Error) {
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.request_exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        if self.config.grab_cursor {
            grab_cursor(&window, true);
        }

        let device = self.device.clone();
        let renderer = self.renderer.clone();

        let mut entry = WindowEntryTryBuilder {
            input_state: InputState {
                focused: true,
                ..InputState::default()
            },
            input_frame: InputFrame::default(),
            clock: self.config.fixed_dt.map_or_else(FrameClock::new, FrameClock::fixed),
            window,
            renderer_builder: |w| Renderer::new(w, &device, renderer),
        }
            .try_build()
            .context("renderer initialization failed")?;

        let app = &mut self.app;
        entry
            .with_renderer_mut(|r| app.on_ready(r))
            .context("failed to prepare the scene")?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    /// Releases GPU resources before the window goes away.
    fn destroy_window_entry(&mut self) {
        if let Some(mut entry) = self.entry.take() {
            entry.with_renderer_mut(|r| r.shutdown());
        }
    }

    fn apply_commands(&mut self, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::GrabCursor(grab) => {
                    if let Some(entry) = &self.entry {
                        entry.with_window(|w| grab_cursor(w, grab));
                    }
                }
                Command::Exit => self.request_exit(),
            }
        }
    }

    fn finish_if_requested(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            self.destroy_window_entry();
            event_loop.exit();
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(e);
        }
        self.finish_if_requested(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            self.finish_if_requested(event_loop);
            return;
        }

        // Continuous redraw: the raytracer converges only while frames keep coming.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if let Some(ev) = translate_device_event(&event) {
            entry.with_mut(|fields| {
                if fields.input_state.focused {
                    fields.input_state.apply_event(fields.input_frame, ev);
                }
            });
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            self.finish_if_requested(event_loop);
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        if let Some(ev) = translate_window_event(&event) {
            entry.with_mut(|fields| fields.input_state.apply_event(fields.input_frame, ev));
        }

        if app.on_window_event(&event) == AppControl::Exit {
            self.request_exit();
            self.finish_if_requested(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(),

            WindowEvent::Focused(true) if self.config.grab_cursor => {
                entry.with_window(|w| grab_cursor(w, true));
            }

            WindowEvent::Resized(new_size) => {
                entry.with_renderer_mut(|r| r.resize_surface(new_size.width, new_size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let mut runtime_ctx = RuntimeCtx::default();
                let mut app_control = AppControl::Continue;

                entry.with_mut(|fields| {
                    let ft: FrameTime = fields.clock.tick();

                    // Scope to ensure `ctx` is dropped before mutating frame state.
                    {
                        let mut ctx = FrameCtx {
                            window: WindowCtx { window: fields.window },
                            renderer: fields.renderer,
                            input: fields.input_state,
                            input_frame: fields.input_frame,
                            time: ft,
                            runtime: &mut runtime_ctx,
                        };

                        app_control = app.on_frame(&mut ctx);
                    }

                    // Clear per-frame deltas after the frame is consumed.
                    fields.input_frame.clear();
                });

                if app_control == AppControl::Exit {
                    runtime_ctx.exit();
                }

                self.apply_commands(runtime_ctx);
            }

            _ => {}
        }

        self.finish_if_requested(event_loop);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.destroy_window_entry();
    }
}

fn grab_cursor(window: &Window, grab: bool) {
    if grab {
        let locked = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(err) = locked {
            log::warn!("cursor grab unavailable: {err}");
        }
    } else if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
        log::warn!("failed to release cursor: {err}");
    }
    window.set_cursor_visible(!grab);
}
