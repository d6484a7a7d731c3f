use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::bird::{PhysicsConfig, SPAWN_X, SPAWN_Y};
use crate::input::DEFAULT_JUMP_COOLDOWN_MS;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub jump_cooldown_ms: f64,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub window: WindowConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            jump_cooldown_ms: DEFAULT_JUMP_COOLDOWN_MS,
            spawn_x: SPAWN_X,
            spawn_y: SPAWN_Y,
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Flapper".to_string(),
            width: 400,
            height: 600,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Missing file means defaults; a broken file is logged and also falls back
/// to defaults so a bad tweak never blocks startup.
pub fn load_config_or_default(path: &Path) -> GameConfig {
    if !path.exists() {
        log::info!("No config at '{}', using defaults", path.display());
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config from '{}'", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}; using defaults");
            GameConfig::default()
        }
    }
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    let physics = &config.physics;
    if physics.gravity <= 0.0 {
        return Err("Config validation failed: physics.gravity must be > 0".to_string());
    }
    if physics.terminal_velocity <= 0.0 {
        return Err("Config validation failed: physics.terminal_velocity must be > 0".to_string());
    }
    if physics.jump_impulse >= 0.0 {
        return Err("Config validation failed: physics.jump_impulse must be < 0".to_string());
    }
    if config.jump_cooldown_ms < 0.0 {
        return Err("Config validation failed: jump_cooldown_ms must be >= 0".to_string());
    }
    if config.window.width == 0 || config.window.height == 0 {
        return Err("Config validation failed: window dimensions must be > 0".to_string());
    }
    Ok(())
}
