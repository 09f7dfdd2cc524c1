use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::winit_events::translate_window_event;
use crate::input::{InputFrame, InputState};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "rivet".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            resizable: true,
        }
    }
}

/// Single-window event loop driving an [`App`].
pub struct Runtime;

impl Runtime {
    /// Opens the window and runs until it closes or the app exits.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            gpu_init,
            app,
            entry: None,
            exit_requested: false,
            error: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error {
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
    gpu: Gpu<'this>,
}

struct AppState<A: App + 'static> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
    /// First fatal error; returned from [`Runtime::run`].
    error: Option<anyhow::Error>,
}

impl<A: App + 'static> AppState<A> {
    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(entry) = self.entry.as_mut() else { return };
        entry.with_gpu_mut(|gpu| gpu.resize(new_size));
        entry.with_window(|w| w.request_redraw());

        if new_size.width > 0 && new_size.height > 0 {
            self.app.on_resize(Viewport::new(new_size.width, new_size.height));
        }
    }

    fn redraw(&mut self) -> AppControl {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx { window: fields.window },
                    gpu: fields.gpu,
                    input: fields.input_state,
                    input_frame: fields.input_frame,
                    time,
                };
                app.on_frame(&mut ctx)
            };
            fields.input_frame.clear();
            control
        })
    }
}

impl<A: App + 'static> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                let size = entry.with_window(|w| {
                    w.request_redraw();
                    w.inner_size()
                });
                self.entry = Some(entry);
                log::info!("window created ({}x{})", size.width, size.height);
                self.app.on_resize(Viewport::new(size.width, size.height));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if let Some(entry) = self.entry.as_mut() {
            entry.with_mut(|fields| {
                if let Some(ev) = translate_window_event(fields.input_state, &event) {
                    fields.input_state.apply_event(fields.input_frame, ev);
                }
            });
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                // Drop the surface before the loop winds down.
                self.entry = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    self.exit_requested = true;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}
