//! Frame loop: a two-state controller plus the `Game` that composes the bird,
//! the jump debouncer and the controller.
//!
//! The host owns scheduling. `start` asks the host for one frame; every
//! executed tick asks for the next one. `stop` only flips the state, so a tick
//! the host already queued still arrives, sees `Stopped`, and returns without
//! doing work or rescheduling.
//!
//! Per-frame order is fixed: poll input, jump, update, boundary check, render.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bird::{Bird, BirdBounds};
use crate::config::GameConfig;
use crate::error::InitError;
use crate::input::{InputDispatcher, InputSubscription, JumpDebouncer};
use crate::surface::{DrawSurface, Rect, BACKGROUND_COLOR};
use crate::time::FrameClock;

/// "Call my tick once, as soon as you can."
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

impl LoopState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Running => "Running",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Top,
    Bottom,
}

/// What one executed tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub elapsed_ms: f64,
    pub jumped: bool,
    pub boundary: Option<Boundary>,
}

#[derive(Debug, Clone)]
pub struct LoopController {
    state: LoopState,
    last_timestamp_ms: f64,
}

impl LoopController {
    pub fn new() -> Self {
        Self {
            state: LoopState::Stopped,
            last_timestamp_ms: 0.0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn last_timestamp_ms(&self) -> f64 {
        self.last_timestamp_ms
    }

    /// Returns false if already running.
    pub fn start(&mut self, now_ms: f64, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = LoopState::Running;
        self.last_timestamp_ms = now_ms;
        scheduler.request_frame();
        true
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    /// Elapsed time since the previous tick, or `None` when stopped.
    pub fn advance(&mut self, now_ms: f64) -> Option<f64> {
        if !self.is_running() {
            return None;
        }
        let elapsed = now_ms - self.last_timestamp_ms;
        self.last_timestamp_ms = now_ms;
        Some(elapsed)
    }
}

impl Default for LoopController {
    fn default() -> Self {
        Self::new()
    }
}

/// One game session. Owned by the host; there is no global instance.
pub struct Game {
    bird: Bird,
    input: Rc<RefCell<JumpDebouncer>>,
    subscription: Option<InputSubscription>,
    controller: LoopController,
    clock: FrameClock,
    screen_width: f32,
    screen_height: f32,
    boundary_hits: u64,
}

impl Game {
    /// Fails when the surface has no drawable area.
    pub fn new(config: &GameConfig, surface_size: (f32, f32)) -> Result<Self, InitError> {
        let (width, height) = surface_size;
        if !(width > 0.0 && height > 0.0) {
            return Err(InitError::SurfaceUnavailable { width, height });
        }

        let bird = Bird::with_config(config.spawn_x, config.spawn_y, config.physics)
            .with_spawn(config.spawn_x, config.spawn_y);
        let input = Rc::new(RefCell::new(JumpDebouncer::with_cooldown(
            config.jump_cooldown_ms,
        )));

        log::info!("Game initialized: surface {width}x{height}");

        Ok(Self {
            bird,
            input,
            subscription: None,
            controller: LoopController::new(),
            clock: FrameClock::new(),
            screen_width: width,
            screen_height: height,
            boundary_hits: 0,
        })
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn bounds(&self) -> BirdBounds {
        self.bird.bounds()
    }

    pub fn state(&self) -> LoopState {
        self.controller.state()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn boundary_hits(&self) -> u64 {
        self.boundary_hits
    }

    pub fn is_input_attached(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(InputSubscription::is_attached)
    }

    /// Host hook for window resizes. Boundary checks use the new height from
    /// the next tick on.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.screen_width = width;
            self.screen_height = height;
        }
    }

    /// Starts the loop and attaches jump input. No-op if already running.
    pub fn start(
        &mut self,
        now_ms: f64,
        scheduler: &mut dyn FrameScheduler,
        source: &InputDispatcher,
    ) {
        if !self.controller.start(now_ms, scheduler) {
            return;
        }
        self.subscription = Some(source.subscribe(self.input.clone()));
        log::info!("Game started");
    }

    /// Stops the loop and detaches jump input.
    pub fn stop(&mut self) {
        if !self.controller.is_running() {
            return;
        }
        self.controller.stop();
        self.subscription = None;
        log::info!("Game stopped");
    }

    /// Returns the bird and input to their initial state. The loop keeps
    /// whatever state it is in.
    pub fn reset(&mut self) {
        self.bird.reset();
        self.input.borrow_mut().reset();
        self.boundary_hits = 0;
        log::info!("Game reset");
    }

    /// One frame callback from the host. Does nothing, and does not
    /// reschedule, once the loop is stopped.
    pub fn tick(
        &mut self,
        now_ms: f64,
        scheduler: &mut dyn FrameScheduler,
        surface: &mut dyn DrawSurface,
    ) -> Option<FrameReport> {
        let elapsed_ms = self.controller.advance(now_ms)?;
        self.clock.record_frame(elapsed_ms);

        let jumped = self.input.borrow_mut().poll_and_clear();
        if jumped {
            self.bird.jump();
        }
        self.bird.update(elapsed_ms);

        let boundary = self.check_boundary();
        if let Some(side) = boundary {
            // No terminal state yet; the hit is only reported.
            self.boundary_hits += 1;
            log::debug!("Bird hit {side:?} boundary at y={:.1}", self.bird.y);
        }

        self.render(surface);
        scheduler.request_frame();

        Some(FrameReport {
            elapsed_ms,
            jumped,
            boundary,
        })
    }

    fn check_boundary(&self) -> Option<Boundary> {
        if self.bird.is_at_top_boundary() {
            Some(Boundary::Top)
        } else if self.bird.is_at_bottom_boundary(self.screen_height) {
            Some(Boundary::Bottom)
        } else {
            None
        }
    }

    pub fn render(&self, surface: &mut dyn DrawSurface) {
        let full = Rect::new(0.0, 0.0, self.screen_width, self.screen_height);
        surface.clear_rect(full);
        surface.fill_rect(full, BACKGROUND_COLOR);
        self.bird.render(surface);
    }
}
