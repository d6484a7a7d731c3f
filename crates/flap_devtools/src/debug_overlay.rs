//! Debug overlay rendered via egui on top of the game.
//!
//! Integration pattern: egui requires a three-phase render split because
//! `egui_wgpu::Renderer::render()` needs a `RenderPass<'static>`, while
//! `begin_render_pass` borrows the encoder. The phases are:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The overlay starts visible (it carries the bird readout) and is toggled
//! with F3. egui event handling is always active so the overlay can intercept
//! clicks when it is shown.

use flap_core::time::FrameClock;
use flap_core::Game;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub bird_y: f32,
    pub bird_vy: f32,
    /// Current tilt in radians; shown in degrees.
    pub rotation: f32,
    /// "Running" or "Stopped"
    pub loop_state_label: String,
    pub running: bool,
    pub boundary_hits: u64,
    pub input_attached: bool,
}

impl OverlayStats {
    pub fn from_game(game: &Game) -> Self {
        let bird = game.bird();
        Self {
            bird_y: bird.y,
            bird_vy: bird.velocity_y,
            rotation: bird.rotation,
            loop_state_label: game.state().label().to_string(),
            running: game.is_running(),
            boundary_hits: game.boundary_hits(),
            input_attached: game.is_input_attached(),
        }
    }

    pub fn y_label(&self) -> String {
        format!("Bird Y: {}", self.bird_y.round())
    }

    pub fn vy_label(&self) -> String {
        format!("Bird VY: {}", (self.bird_vy * 10.0).round() / 10.0)
    }

    pub fn rotation_label(&self) -> String {
        format!("Rotation: {}\u{b0}", self.rotation.to_degrees().round())
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    /// User clicked Start/Stop
    pub toggle_running: bool,
    /// User clicked Reset
    pub reset: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: true,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        // The game only redraws while running; keep the overlay responsive
        // when it is stopped.
        if response.repaint && self.visible {
            window.request_redraw();
        }
        response.consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &FrameClock,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if self.visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 10.0])
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.label(stats.y_label());
                        ui.label(stats.vy_label());
                        ui.label(stats.rotation_label());

                        ui.separator();
                        ui.label(format!("FPS: {:.1}", clock.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", clock.smoothed_frame_time_ms));
                        ui.label(format!("Frame: {}", clock.frame_count));
                        ui.label(format!("Boundary hits: {}", stats.boundary_hits));

                        ui.separator();
                        ui.label(format!("Loop: {}", stats.loop_state_label));
                        ui.label(format!(
                            "Input: {}",
                            if stats.input_attached { "attached" } else { "detached" }
                        ));
                        ui.horizontal(|ui| {
                            let run_label = if stats.running { "Stop" } else { "Start" };
                            if ui.button(run_label).clicked() {
                                actions.toggle_running = true;
                            }
                            if ui.button("Reset").clicked() {
                                actions.reset = true;
                            }
                        });
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(y: f32, vy: f32, rotation: f32) -> OverlayStats {
        OverlayStats {
            bird_y: y,
            bird_vy: vy,
            rotation,
            ..OverlayStats::default()
        }
    }

    #[test]
    fn y_label_rounds_to_whole_pixels() {
        assert_eq!(stats(300.6, 0.0, 0.0).y_label(), "Bird Y: 301");
    }

    #[test]
    fn vy_label_keeps_one_decimal() {
        assert_eq!(stats(0.0, -7.5, 0.0).vy_label(), "Bird VY: -7.5");
        assert_eq!(stats(0.0, 2.0, 0.0).vy_label(), "Bird VY: 2");
    }

    #[test]
    fn rotation_label_is_in_degrees() {
        let label = stats(0.0, 0.0, std::f32::consts::FRAC_PI_4).rotation_label();
        assert_eq!(label, "Rotation: 45\u{b0}");
    }

    #[test]
    fn from_game_reads_current_state() {
        let game = Game::new(&flap_core::GameConfig::default(), (400.0, 600.0))
            .expect("game should initialize");
        let stats = OverlayStats::from_game(&game);
        assert_eq!(stats.bird_y, 300.0);
        assert_eq!(stats.loop_state_label, "Stopped");
        assert!(!stats.running);
        assert!(!stats.input_attached);
    }
}
