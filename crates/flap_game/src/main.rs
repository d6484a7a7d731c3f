//! Flapper -- window, event wiring and the per-frame render pass.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. The
//! game loop itself lives in `flap_core::Game`; this file plays the host:
//!
//!   1. Key-down and mouse-press events go to the `InputDispatcher`, which
//!      forwards them to the game's jump debouncer while the game is running.
//!   2. `RedrawScheduler` turns the game's frame requests into
//!      `request_redraw()`; a `RedrawRequested` that answers a request runs
//!      exactly one `Game::tick`.
//!   3. The tick draws into a `QuadBatch`, which is uploaded and drawn, then
//!      the egui overlay is composited on top.
//!
//! Redraws the game did not ask for (expose, overlay repaint) re-present the
//! last frame without advancing physics.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use flap_core::surface::BACKGROUND_COLOR;
use flap_core::time::HostClock;
use flap_core::{
    load_config_or_default, FrameScheduler, Game, GameConfig, InitError, InputDispatcher, Key,
    MouseBtn,
};
use flap_devtools::{DebugOverlay, OverlayStats};
use flap_platform::window::PlatformConfig;
use flap_render::{Camera2D, GpuContext, QuadBatch, QuadPipeline};

const CONFIG_PATH: &str = "assets/config/game.json";

/// Frame scheduling on top of winit redraws. Remembers whether a frame was
/// actually requested so unrelated redraws do not tick the game.
struct RedrawScheduler {
    window: Arc<Window>,
    pending: bool,
}

impl RedrawScheduler {
    fn take_pending(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.window.request_redraw();
    }
}

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    camera: Camera2D,
    quad_pipeline: QuadPipeline,
    batch: QuadBatch,
    debug_overlay: DebugOverlay,
    scheduler: RedrawScheduler,
    input: InputDispatcher,
    game: Game,
}

impl EngineState {
    fn new(window: Arc<Window>, config: &GameConfig) -> Result<Self, InitError> {
        let gpu = GpuContext::new(window.clone())?;
        let logical = window
            .inner_size()
            .to_logical::<f32>(window.scale_factor());

        // Fails for a zero-area surface before anything is scheduled.
        let game = Game::new(config, (logical.width, logical.height))?;

        let camera = Camera2D::new(logical.width, logical.height);
        let quad_pipeline = QuadPipeline::new(&gpu.device, gpu.surface_format, &camera);
        let batch = QuadBatch::new(logical.width, logical.height, BACKGROUND_COLOR);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        let mut state = Self {
            scheduler: RedrawScheduler {
                window: window.clone(),
                pending: false,
            },
            window,
            gpu,
            camera,
            quad_pipeline,
            batch,
            debug_overlay,
            input: InputDispatcher::new(),
            game,
        };
        // First picture before the loop runs.
        state.game.render(&mut state.batch);
        Ok(state)
    }

    fn start(&mut self, now_ms: f64) {
        self.game.start(now_ms, &mut self.scheduler, &self.input);
    }

    fn toggle_running(&mut self, now_ms: f64) {
        if self.game.is_running() {
            self.game.stop();
        } else {
            self.start(now_ms);
        }
    }

    fn reset(&mut self) {
        self.game.reset();
        // While stopped nothing else redraws the reset bird.
        self.game.render(&mut self.batch);
        self.window.request_redraw();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let logical = winit::dpi::PhysicalSize::new(width, height)
            .to_logical::<f32>(self.window.scale_factor());
        self.camera.viewport = (logical.width, logical.height);
        self.batch.resize(logical.width, logical.height);
        self.game.resize(logical.width, logical.height);
        log::info!("Resized to {}x{}", width, height);
    }

    /// Host keys that are not jump input. Returns true to exit.
    fn handle_host_key(&mut self, key: Key, now_ms: f64) -> bool {
        match key {
            Key::Escape => return true,
            Key::F3 => self.debug_overlay.toggle(),
            Key::P => self.toggle_running(now_ms),
            Key::R => self.reset(),
            _ => {}
        }
        false
    }

    fn redraw(&mut self, now_ms: f64) {
        if self.scheduler.take_pending() {
            self.game.tick(now_ms, &mut self.scheduler, &mut self.batch);
        }

        self.quad_pipeline
            .update_camera(&self.gpu.queue, &self.camera);
        self.quad_pipeline
            .upload(&self.gpu.device, &self.gpu.queue, &self.batch);

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = OverlayStats::from_game(&self.game);
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.debug_overlay
                .prepare(&self.window, self.game.clock(), &stats);

        if overlay_actions.toggle_running {
            self.toggle_running(now_ms);
        }
        if overlay_actions.reset {
            self.reset();
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            self.quad_pipeline.draw(&mut render_pass);
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    config: GameConfig,
    clock: HostClock,
    state: Option<EngineState>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        Self {
            config,
            clock: HostClock::new(),
            state: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<EngineState, InitError> {
        let platform = PlatformConfig::from(&self.config.window);
        let window = flap_platform::window::create_window(event_loop, &platform)?;
        EngineState::new(window, &self.config)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(mut state) => {
                state.start(self.clock.now_ms());
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("Failed to initialize game: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };
        let now_ms = self.clock.now_ms();

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                state.game.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.resize(w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let PhysicalKey::Code(key_code) = event.physical_key else {
                    return;
                };
                let Some(key) = map_key(key_code) else {
                    return;
                };
                // Held keys auto-repeat; the debouncer's cooldown absorbs them.
                if state.input.dispatch_key_down(key, now_ms).is_consumed() {
                    return;
                }
                if !event.repeat && state.handle_host_key(key, now_ms) {
                    log::info!("Escape pressed, exiting.");
                    state.game.stop();
                    event_loop.exit();
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } if !egui_consumed => {
                if let Some(btn) = map_button(button) {
                    state.input.dispatch_pointer_down(btn, now_ms);
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }
                state.redraw(now_ms);
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::KeyR => Some(Key::R),
        _ => None,
    }
}

fn map_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Flapper starting...");

    let config = load_config_or_default(std::path::Path::new(CONFIG_PATH));

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
        std::process::exit(1);
    }
}
