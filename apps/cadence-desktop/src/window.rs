use cadence_common::{BoxError, Viewport};
use cadence_input::{InputState, Key, MouseButton};
use cadence_kernel::{Surface, Window, WindowConfig};
use cadence_render_wgpu::WgpuGpu;
use std::sync::Arc;
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowId;

/// Pumps before giving up on the platform delivering `resumed`.
const OPEN_ATTEMPTS: usize = 100;

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyZ => Key::Z,
        KeyCode::KeyX => Key::X,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

/// Window-side state fed by winit events.
pub struct WindowState {
    config: WindowConfig,
    window: Option<Arc<winit::window::Window>>,
    open_error: Option<String>,
    input: InputState,
    size: Viewport,
    resized: bool,
    close_requested: bool,
}

impl WindowState {
    fn new(config: WindowConfig) -> Self {
        let size = Viewport::new(config.width, config.height);
        Self {
            config,
            window: None,
            open_error: None,
            input: InputState::new(),
            size,
            resized: false,
            close_requested: false,
        }
    }

    fn on_key(&mut self, code: KeyCode, pressed: bool) {
        let Some(key) = map_key(code) else {
            return;
        };
        if key == Key::Escape && !pressed {
            tracing::info!("escape released, closing");
            self.close_requested = true;
        }
        self.input.on_key(key, pressed);
    }
}

impl Surface for WindowState {
    fn size(&self) -> Viewport {
        self.size
    }

    fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = winit::window::Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let inner = window.inner_size();
                self.size = Viewport::new(inner.width, inner.height);
                self.window = Some(Arc::new(window));
            }
            Err(e) => {
                self.open_error = Some(e.to_string());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(new_size) => {
                self.size = Viewport::new(new_size.width, new_size.height);
                self.resized = true;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.on_key(code, state == ElementState::Pressed),
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button) = map_button(button) {
                    self.input.on_button(button, state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorEntered { .. } => self.input.on_cursor_entered(true),
            WindowEvent::CursorLeft { .. } => self.input.on_cursor_entered(false),
            _ => {}
        }
    }
}

fn build_event_loop() -> Result<EventLoop<()>, winit::error::EventLoopError> {
    #[allow(unused_mut)]
    let mut builder = EventLoop::builder();
    // The loop may run on a dedicated thread rather than the process main thread.
    #[cfg(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "dragonfly",
        target_os = "netbsd",
        target_os = "openbsd"
    ))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        builder.with_any_thread(true);
    }
    #[cfg(target_os = "windows")]
    {
        use winit::platform::windows::EventLoopBuilderExtWindows;
        builder.with_any_thread(true);
    }
    builder.build()
}

/// Native window with a wgpu surface.
///
/// Events are pumped without blocking after every present, so the scheduler
/// keeps control of the loop.
pub struct DesktopWindow {
    event_loop: EventLoop<()>,
    state: WindowState,
    gpu: WgpuGpu,
}

impl DesktopWindow {
    pub fn open(config: WindowConfig) -> Result<Self, BoxError> {
        let mut event_loop = build_event_loop()?;
        let mut state = WindowState::new(config);

        let mut attempts = 0;
        let window = loop {
            if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut state) {
                let reason = state.open_error.take().unwrap_or_default();
                return Err(format!("event loop exited with code {code} while opening window: {reason}").into());
            }
            if let Some(window) = &state.window {
                break window.clone();
            }
            attempts += 1;
            if attempts >= OPEN_ATTEMPTS {
                return Err("window was not created".into());
            }
        };

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;
        let gpu = WgpuGpu::new(&instance, surface, state.size, state.config.vsync)?;

        tracing::info!(
            title = %state.config.title,
            width = state.size.width,
            height = state.size.height,
            vsync = state.config.vsync,
            "window opened"
        );
        Ok(Self { event_loop, state, gpu })
    }

    pub fn gpu_mut(&mut self) -> &mut WgpuGpu {
        &mut self.gpu
    }

    /// Borrow the surface and the GPU at the same time, for rendering.
    pub fn frame_parts(&mut self) -> (&mut WindowState, &mut WgpuGpu) {
        (&mut self.state, &mut self.gpu)
    }

    fn pump(&mut self) {
        if let PumpStatus::Exit(_) = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state) {
            self.state.close_requested = true;
        }
    }
}

impl Surface for DesktopWindow {
    fn size(&self) -> Viewport {
        self.state.size
    }

    fn take_resized(&mut self) -> bool {
        self.state.take_resized()
    }
}

impl Window for DesktopWindow {
    fn should_close(&self) -> bool {
        self.state.close_requested
    }

    fn vsync_enabled(&self) -> bool {
        self.state.config.vsync
    }

    fn present(&mut self) -> Result<(), BoxError> {
        self.gpu.present_frame()?;
        self.pump();
        Ok(())
    }

    fn input(&self) -> &InputState {
        &self.state.input
    }

    fn input_mut(&mut self) -> &mut InputState {
        &mut self.state.input
    }
}
