//! CPU-side drawing surface. Every `fill_rect` becomes one transformed quad;
//! the batch is uploaded and drawn in a single call by `QuadPipeline`.

use flap_core::{Color, DrawSurface, Rect};
use glam::{Affine2, Vec2};

use crate::vertex::{linear_color, ColorVertex};

pub struct QuadBatch {
    size: (f32, f32),
    clear_color: Color,
    transform: Affine2,
    vertices: Vec<ColorVertex>,
    indices: Vec<u32>,
}

impl QuadBatch {
    pub fn new(width: f32, height: f32, clear_color: Color) -> Self {
        Self {
            size: (width, height),
            clear_color,
            transform: Affine2::IDENTITY,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = (width, height);
    }

    pub fn vertices(&self) -> &[ColorVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn push_quad(&mut self, rect: Rect, color: Color) {
        let base = self.vertices.len() as u32;
        let color = linear_color(color);
        for corner in rect.corners() {
            self.vertices.push(ColorVertex {
                position: self.transform.transform_point2(corner).to_array(),
                color,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn covers_surface(&self, rect: Rect) -> bool {
        self.transform == Affine2::IDENTITY
            && rect.x <= 0.0
            && rect.y <= 0.0
            && rect.x + rect.width >= self.size.0
            && rect.y + rect.height >= self.size.1
    }
}

impl DrawSurface for QuadBatch {
    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn clear_rect(&mut self, rect: Rect) {
        // A full clear drops everything queued; anything smaller is painted
        // over with the clear color.
        if self.covers_surface(rect) {
            self.vertices.clear();
            self.indices.clear();
        } else {
            self.push_quad(rect, self.clear_color);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push_quad(rect, color);
    }

    fn with_transform(
        &mut self,
        pivot: Vec2,
        rotation: f32,
        draw: &mut dyn FnMut(&mut dyn DrawSurface),
    ) {
        let saved = self.transform;
        self.transform = saved * Affine2::from_angle_translation(rotation, pivot);
        draw(&mut *self);
        self.transform = saved;
    }
}
