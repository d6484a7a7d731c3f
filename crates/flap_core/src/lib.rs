pub mod bird;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod input;
#[cfg(test)]
mod replay;
pub mod surface;
pub mod time;

pub use bird::{Bird, BirdBounds, PhysicsConfig};
pub use config::{load_config_or_default, GameConfig};
pub use error::InitError;
pub use game_loop::{Boundary, FrameReport, FrameScheduler, Game, LoopController, LoopState};
pub use input::{EventDisposition, InputDispatcher, JumpDebouncer, Key, MouseBtn};
pub use surface::{Color, DrawSurface, Rect};
