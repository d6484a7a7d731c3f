//! Drawing-surface abstraction the game renders through.
//!
//! Coordinates are canvas-style: origin at the top-left, +y pointing down,
//! units in logical pixels. Transforms are scoped: `with_transform` applies a
//! translate-then-rotate for the duration of the closure and restores the
//! previous transform afterwards.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Sky blue behind the bird.
pub const BACKGROUND_COLOR: Color = Color::rgb(0.439, 0.773, 0.808);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
            Vec2::new(self.x, self.y + self.height),
        ]
    }
}

pub trait DrawSurface {
    /// Logical size of the drawable area.
    fn size(&self) -> (f32, f32);

    fn clear_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Runs `draw` with the origin moved to `pivot` and rotated by `rotation`
    /// radians. The previous transform is restored when `draw` returns.
    fn with_transform(
        &mut self,
        pivot: Vec2,
        rotation: f32,
        draw: &mut dyn FnMut(&mut dyn DrawSurface),
    );
}
