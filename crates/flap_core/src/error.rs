use thiserror::Error;

/// Startup failures. Any of these means the loop never starts.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("drawing surface unavailable: {width}x{height} has no drawable area")]
    SurfaceUnavailable { width: f32, height: f32 },
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("graphics initialization failed: {0}")]
    Gpu(String),
}
