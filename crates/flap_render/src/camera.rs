use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Fixed canvas-style camera: (0, 0) is the top-left corner of the viewport,
/// +y points down, one unit is one logical pixel.
pub struct Camera2D {
    pub viewport: (f32, f32),
}

impl Camera2D {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn projection(&self) -> Mat4 {
        // bottom = height, top = 0 flips y to match canvas coordinates.
        Mat4::orthographic_rh(0.0, self.viewport.0, self.viewport.1, 0.0, -1.0, 1.0)
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.projection().to_cols_array_2d(),
        }
    }
}
