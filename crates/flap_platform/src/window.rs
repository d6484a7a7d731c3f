use std::sync::Arc;

use flap_core::config::WindowConfig;
use flap_core::InitError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::from(&WindowConfig::default())
    }
}

impl From<&WindowConfig> for PlatformConfig {
    fn from(window: &WindowConfig) -> Self {
        Self {
            title: window.title.clone(),
            width: window.width,
            height: window.height,
        }
    }
}

/// The playfield has a fixed height the bird collides with, so the window is
/// not user-resizable.
pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, InitError> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_resizable(false)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

    let window = event_loop
        .create_window(attrs)
        .map_err(|e| InitError::Window(e.to_string()))?;
    log::info!("Window created: {}x{}", config.width, config.height);
    Ok(Arc::new(window))
}
