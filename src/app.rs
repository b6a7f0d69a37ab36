use std::sync::Arc;

use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    field::store::FlowField,
    foundation::{
        config::FlowConfig,
        error::{FlowError, FlowResult},
    },
    playback::ActiveFrame,
    render::{
        camera::{CameraFit, Viewport},
        gpu::GpuContext,
        renderer::FrameRenderer,
    },
};

/// The only inputs the viewer reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerCommand {
    AdvanceTime,
    Quit,
}

/// `T` steps time, `Escape` quits; every other key is ignored.
pub fn command_for_key(code: KeyCode) -> Option<ViewerCommand> {
    match code {
        KeyCode::KeyT => Some(ViewerCommand::AdvanceTime),
        KeyCode::Escape => Some(ViewerCommand::Quit),
        _ => None,
    }
}

struct WindowState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    gpu: GpuContext,
    renderer: FrameRenderer,
}

/// Interactive viewer: owns the field, the time cursor and, once the event
/// loop resumes, the window and renderer.
pub struct FlowApp {
    config: FlowConfig,
    field: FlowField,
    frame: ActiveFrame,
    camera: CameraFit,
    state: Option<WindowState>,
    error: Option<FlowError>,
}

impl FlowApp {
    pub fn new(config: FlowConfig, field: FlowField) -> FlowResult<Self> {
        let frame = ActiveFrame::new(field.time_steps())?;
        let camera = CameraFit::for_layout(field.layout());
        Ok(Self {
            config,
            field,
            frame,
            camera,
            state: None,
            error: None,
        })
    }

    pub fn frame(&self) -> &ActiveFrame {
        &self.frame
    }

    /// Apply a command; returns `false` when the viewer should exit.
    pub fn apply(&mut self, cmd: ViewerCommand) -> bool {
        match cmd {
            ViewerCommand::AdvanceTime => {
                self.frame.advance_time();
                debug!(t = self.frame.time_index(), "advanced time");
                if let Some(state) = &self.state {
                    state.window.set_title(&self.title());
                    state.window.request_redraw();
                }
                true
            }
            ViewerCommand::Quit => false,
        }
    }

    /// Window title naming the current step and its physical time.
    pub fn title(&self) -> String {
        let t = self.frame.time_index();
        format!(
            "{}  t={:.3} ({}/{})",
            self.config.window.title,
            self.field.layout().time_at(t),
            t + 1,
            self.frame.time_steps()
        )
    }

    fn init_window(&self, event_loop: &ActiveEventLoop) -> FlowResult<WindowState> {
        let attrs = Window::default_attributes()
            .with_title(self.title())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| FlowError::window(format!("create window: {e}")))?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| FlowError::gpu(format!("create surface: {e}")))?;
        let gpu = GpuContext::for_surface(instance, &surface)?;

        let caps = surface.get_capabilities(&gpu.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| FlowError::gpu("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &surface_config);

        let renderer = FrameRenderer::setup(&gpu, format, &self.config)?;
        info!(?format, width = size.width, height = size.height, "viewer window ready");

        Ok(WindowState {
            window,
            surface,
            surface_config,
            gpu,
            renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if size.width == 0 || size.height == 0 {
            return;
        }
        state.surface_config.width = size.width;
        state.surface_config.height = size.height;
        state
            .surface
            .configure(&state.gpu.device, &state.surface_config);
        state.window.request_redraw();
    }

    fn redraw(&mut self) -> FlowResult<()> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };

        let output = match state.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost or outdated, reconfiguring");
                state
                    .surface
                    .configure(&state.gpu.device, &state.surface_config);
                state.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(FlowError::gpu(format!("acquire surface texture: {e}"))),
        };

        let viewport = Viewport::new(output.texture.width(), output.texture.height());
        let camera = self.camera.matrices(viewport);
        state.renderer.draw(
            &state.gpu,
            &output.texture,
            &self.field,
            &mut self.frame,
            &camera,
            viewport,
        )?;
        state.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: FlowError) {
        error!(%err, "viewer stopped");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for FlowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init_window(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if let Some(cmd) = command_for_key(code) {
                    if !self.apply(cmd) {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }
}

/// Open the viewer window and block until it closes.
pub fn run(config: FlowConfig, field: FlowField) -> FlowResult<()> {
    let event_loop =
        EventLoop::new().map_err(|e| FlowError::window(format!("create event loop: {e}")))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = FlowApp::new(config, field)?;
    event_loop
        .run_app(&mut app)
        .map_err(|e| FlowError::window(format!("event loop: {e}")))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../tests/unit/app.rs"]
mod tests;
