//! The player-controlled bird: gravity, jump impulse, and a velocity-driven tilt.
//!
//! Integration is a fixed unit step per frame. `update` accepts the elapsed
//! frame time but does not scale by it, so a bird falls the same distance per
//! frame regardless of the host's refresh rate.

use std::f32::consts::PI;

use glam::Vec2;
use serde::Deserialize;

use crate::surface::{Color, DrawSurface, Rect};

pub const BIRD_WIDTH: f32 = 34.0;
pub const BIRD_HEIGHT: f32 = 24.0;

pub const SPAWN_X: f32 = 80.0;
pub const SPAWN_Y: f32 = 300.0;

/// Nose-up limit (-30 degrees).
pub const MIN_ROTATION: f32 = -PI / 6.0;
/// Nose-down limit (45 degrees).
pub const MAX_ROTATION: f32 = PI / 4.0;

const ROTATION_PER_VELOCITY: f32 = 0.1;
const EYE_SIZE: f32 = 4.0;

pub const BODY_COLOR: Color = Color::rgb(1.0, 0.843, 0.0);
pub const EYE_COLOR: Color = Color::rgb(0.0, 0.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to `vy` every frame (pixels/frame, downward positive).
    pub gravity: f32,
    /// Assigned to `vy` on jump. Negative is upward.
    pub jump_impulse: f32,
    /// Upper bound on `vy` after an update.
    pub terminal_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            jump_impulse: -8.0,
            terminal_velocity: 8.0,
        }
    }
}

/// Read-only collision/render snapshot of the bird's box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_y: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Bird {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub rotation: f32,
    pub config: PhysicsConfig,
    spawn: Vec2,
}

impl Bird {
    pub fn new(x: f32, y: f32) -> Self {
        Self::with_config(x, y, PhysicsConfig::default())
    }

    pub fn with_config(x: f32, y: f32, config: PhysicsConfig) -> Self {
        Self {
            x,
            y,
            velocity_x: 0.0,
            velocity_y: 0.0,
            rotation: 0.0,
            config,
            spawn: Vec2::new(SPAWN_X, SPAWN_Y),
        }
    }

    /// Overrides the point `reset` returns to.
    pub fn with_spawn(mut self, spawn_x: f32, spawn_y: f32) -> Self {
        self.spawn = Vec2::new(spawn_x, spawn_y);
        self
    }

    pub fn width(&self) -> f32 {
        BIRD_WIDTH
    }

    pub fn height(&self) -> f32 {
        BIRD_HEIGHT
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    /// Advances one frame. `_elapsed_ms` is intentionally unused: velocity is a
    /// per-frame displacement.
    pub fn update(&mut self, _elapsed_ms: f64) {
        // Clamp only the downward bound; upward speed is left alone.
        self.velocity_y =
            (self.velocity_y + self.config.gravity).min(self.config.terminal_velocity);

        self.x += self.velocity_x;
        self.y += self.velocity_y;

        self.rotation = tilt_for_velocity(self.velocity_y);
    }

    pub fn jump(&mut self) {
        self.velocity_y = self.config.jump_impulse;
    }

    pub fn reset(&mut self) {
        self.x = self.spawn.x;
        self.y = self.spawn.y;
        self.velocity_x = 0.0;
        self.velocity_y = 0.0;
        self.rotation = 0.0;
    }

    pub fn bounds(&self) -> BirdBounds {
        BirdBounds {
            x: self.x,
            y: self.y,
            width: BIRD_WIDTH,
            height: BIRD_HEIGHT,
            center_x: self.x + BIRD_WIDTH / 2.0,
            center_y: self.y + BIRD_HEIGHT / 2.0,
        }
    }

    pub fn is_at_top_boundary(&self) -> bool {
        self.y <= 0.0
    }

    pub fn is_at_bottom_boundary(&self, screen_height: f32) -> bool {
        self.y + BIRD_HEIGHT >= screen_height
    }

    /// Draws the body and eye rotated about the bird's center.
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        let bounds = self.bounds();
        let pivot = Vec2::new(bounds.center_x, bounds.center_y);
        let (w, h) = (bounds.width, bounds.height);

        let mut draw = |s: &mut dyn DrawSurface| {
            s.fill_rect(Rect::new(-w / 2.0, -h / 2.0, w, h), BODY_COLOR);
            s.fill_rect(Rect::new(-w / 4.0, -h / 4.0, EYE_SIZE, EYE_SIZE), EYE_COLOR);
        };
        surface.with_transform(pivot, self.rotation, &mut draw);
    }
}

/// Falling tilts nose-down, rising (or hovering) tilts nose-up.
fn tilt_for_velocity(velocity_y: f32) -> f32 {
    let tilt = velocity_y * ROTATION_PER_VELOCITY;
    if velocity_y > 0.0 {
        tilt.min(MAX_ROTATION)
    } else {
        tilt.max(MIN_ROTATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{DrawCall, RecordingSurface};

    const EPS: f32 = 1e-5;

    #[test]
    fn new_bird_starts_at_rest() {
        let bird = Bird::new(100.0, 200.0);
        assert_eq!(bird.x, 100.0);
        assert_eq!(bird.y, 200.0);
        assert_eq!(bird.velocity_x, 0.0);
        assert_eq!(bird.velocity_y, 0.0);
        assert_eq!(bird.rotation, 0.0);
        assert_eq!(bird.width(), 34.0);
        assert_eq!(bird.height(), 24.0);
        assert_eq!(bird.config.gravity, 0.5);
        assert_eq!(bird.config.jump_impulse, -8.0);
        assert_eq!(bird.config.terminal_velocity, 8.0);
    }

    #[test]
    fn single_update_applies_gravity_then_moves() {
        let mut bird = Bird::new(100.0, 200.0);
        bird.update(16.0);
        assert_eq!(bird.velocity_y, 0.5);
        assert_eq!(bird.y, 200.5);

        bird.update(16.0);
        assert_eq!(bird.velocity_y, 1.0);
        assert_eq!(bird.y, 201.5);
    }

    #[test]
    fn five_frames_of_free_fall_accumulate() {
        let mut bird = Bird::new(100.0, 200.0);
        for _ in 0..5 {
            bird.update(16.0);
        }
        assert_eq!(bird.velocity_y, 2.5);
        assert_eq!(bird.y, 207.5);
    }

    #[test]
    fn elapsed_time_does_not_scale_integration() {
        let mut fast = Bird::new(0.0, 100.0);
        let mut slow = Bird::new(0.0, 100.0);
        fast.update(1.0);
        slow.update(250.0);
        assert_eq!(fast.y, slow.y);
        assert_eq!(fast.velocity_y, slow.velocity_y);
    }

    #[test]
    fn velocity_rises_strictly_until_terminal_then_holds() {
        let mut bird = Bird::new(100.0, 200.0);
        let mut previous = bird.velocity_y;
        let mut reached_terminal = false;
        for _ in 0..40 {
            bird.update(16.0);
            assert!(bird.velocity_y <= bird.config.terminal_velocity);
            if reached_terminal {
                assert_eq!(bird.velocity_y, bird.config.terminal_velocity);
            } else {
                assert!(bird.velocity_y > previous);
                reached_terminal = bird.velocity_y == bird.config.terminal_velocity;
            }
            previous = bird.velocity_y;
        }
        assert!(reached_terminal);
    }

    #[test]
    fn terminal_clamp_leaves_upward_speed_alone() {
        let mut bird = Bird::new(0.0, 300.0);
        bird.velocity_y = -20.0;
        bird.update(16.0);
        assert_eq!(bird.velocity_y, -19.5);
    }

    #[test]
    fn jump_overrides_vertical_velocity_only() {
        let mut bird = Bird::new(100.0, 200.0);
        bird.update(16.0);
        assert_eq!(bird.velocity_y, 0.5);
        bird.velocity_x = 5.0;

        bird.jump();
        assert_eq!(bird.velocity_y, -8.0);
        assert_eq!(bird.velocity_x, 5.0);

        bird.update(16.0);
        assert_eq!(bird.velocity_y, -7.5);
        bird.jump();
        assert_eq!(bird.velocity_y, -8.0);
    }

    #[test]
    fn horizontal_velocity_moves_x() {
        let mut bird = Bird::new(10.0, 200.0);
        bird.velocity_x = 2.0;
        bird.update(16.0);
        assert_eq!(bird.x, 12.0);
    }

    #[test]
    fn rotation_follows_velocity_sign() {
        let mut bird = Bird::new(100.0, 200.0);
        bird.velocity_y = 4.0;
        bird.update(16.0);
        assert!(bird.rotation > 0.0);
        assert!((bird.rotation - 0.45).abs() < EPS);

        bird.jump();
        bird.update(16.0);
        assert!(bird.rotation < 0.0);
        assert!((bird.rotation - MIN_ROTATION).abs() < EPS);
    }

    #[test]
    fn rotation_stays_clamped_across_mixed_sequences() {
        let mut bird = Bird::new(80.0, 300.0);
        for frame in 0..200 {
            if frame % 13 == 0 || frame % 29 == 0 {
                bird.jump();
            }
            bird.update(16.0);
            assert!(bird.rotation >= MIN_ROTATION - EPS);
            assert!(bird.rotation <= MAX_ROTATION + EPS);
        }
    }

    #[test]
    fn steep_fall_saturates_at_max_rotation() {
        let mut bird = Bird::with_config(
            0.0,
            0.0,
            PhysicsConfig {
                terminal_velocity: 30.0,
                ..PhysicsConfig::default()
            },
        );
        bird.velocity_y = 20.0;
        bird.update(16.0);
        assert_eq!(bird.rotation, MAX_ROTATION);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let mut bird = Bird::new(100.0, 200.0);

        bird.y = -1.0;
        assert!(bird.is_at_top_boundary());
        bird.y = 0.0;
        assert!(bird.is_at_top_boundary());
        bird.y = 1.0;
        assert!(!bird.is_at_top_boundary());

        bird.y = 600.0 - BIRD_HEIGHT;
        assert!(bird.is_at_bottom_boundary(600.0));
        bird.y = 600.0 - BIRD_HEIGHT + 1.0;
        assert!(bird.is_at_bottom_boundary(600.0));
        bird.y = 600.0 - BIRD_HEIGHT - 1.0;
        assert!(!bird.is_at_bottom_boundary(600.0));
    }

    #[test]
    fn bounds_report_box_and_center() {
        let bird = Bird::new(100.0, 200.0);
        assert_eq!(
            bird.bounds(),
            BirdBounds {
                x: 100.0,
                y: 200.0,
                width: 34.0,
                height: 24.0,
                center_x: 117.0,
                center_y: 212.0,
            }
        );
    }

    #[test]
    fn reset_returns_to_spawn() {
        let mut bird = Bird::new(100.0, 200.0);
        bird.update(16.0);
        bird.jump();
        bird.update(16.0);
        bird.x = 150.0;
        bird.y = 250.0;
        bird.velocity_x = 3.0;

        bird.reset();
        assert_eq!(bird.x, 80.0);
        assert_eq!(bird.y, 300.0);
        assert_eq!(bird.velocity_x, 0.0);
        assert_eq!(bird.velocity_y, 0.0);
        assert_eq!(bird.rotation, 0.0);
    }

    #[test]
    fn reset_honors_configured_spawn() {
        let mut bird = Bird::new(0.0, 0.0).with_spawn(40.0, 120.0);
        bird.update(16.0);
        bird.reset();
        assert_eq!((bird.x, bird.y), (40.0, 120.0));
    }

    #[test]
    fn render_draws_around_center_without_mutation() {
        let mut bird = Bird::new(100.0, 200.0);
        bird.velocity_y = 3.0;
        bird.update(16.0);
        let before = (bird.x, bird.y, bird.velocity_y, bird.rotation);

        let mut surface = RecordingSurface::new(400.0, 600.0);
        bird.render(&mut surface);

        assert_eq!(before, (bird.x, bird.y, bird.velocity_y, bird.rotation));
        assert_eq!(surface.depth(), 0);
        assert_eq!(
            surface.calls[0],
            DrawCall::PushTransform {
                pivot: Vec2::new(bird.x + 17.0, bird.y + 12.0),
                rotation: bird.rotation,
            }
        );
        assert_eq!(
            surface.calls[1],
            DrawCall::FillRect {
                rect: Rect::new(-17.0, -12.0, 34.0, 24.0),
                color: BODY_COLOR,
            }
        );
        assert!(matches!(
            surface.calls[2],
            DrawCall::FillRect { color, .. } if color == EYE_COLOR
        ));
        assert_eq!(surface.calls[3], DrawCall::PopTransform);
    }
}
