//! Jump input: a cooldown-gated, edge-triggered flag fed by raw key and
//! pointer events.
//!
//! - **Debounce:** `JumpDebouncer::notify_raw_input` accepts a request only if
//!   at least `cooldown_ms` passed since the last accepted one. Rejected
//!   requests are dropped, never queued.
//!
//! - **Edge-triggered read:** `poll_and_clear` returns the pending flag and
//!   clears it in the same call. The loop polls exactly once per frame, so one
//!   accepted press produces exactly one jump.
//!
//! - **Scoped subscription:** handlers attach to an `InputDispatcher` through
//!   an `InputSubscription` handle. Dropping the handle detaches the handler, so
//!   a stopped or torn-down game never receives stray callbacks.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub const DEFAULT_JUMP_COOLDOWN_MS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    F3,
    W,
    A,
    S,
    D,
    P,
    R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

/// Whether a handler claimed an event. Consumed events should have the
/// source's default handling suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Consumed,
    Ignored,
}

impl EventDisposition {
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }

    fn merge(self, other: Self) -> Self {
        if self.is_consumed() || other.is_consumed() {
            Self::Consumed
        } else {
            Self::Ignored
        }
    }
}

pub fn is_jump_key(key: Key) -> bool {
    matches!(key, Key::Space | Key::Up)
}

pub fn is_jump_button(button: MouseBtn) -> bool {
    button == MouseBtn::Left
}

/// Entry points a raw-event source invokes.
pub trait RawInputHandler {
    fn on_key_down(&mut self, key: Key, now_ms: f64) -> EventDisposition;
    fn on_pointer_down(&mut self, button: MouseBtn, now_ms: f64) -> EventDisposition;
}

#[derive(Debug, Clone)]
pub struct JumpDebouncer {
    pending: bool,
    last_accepted_ms: f64,
    cooldown_ms: f64,
}

impl JumpDebouncer {
    pub fn new() -> Self {
        Self::with_cooldown(DEFAULT_JUMP_COOLDOWN_MS)
    }

    pub fn with_cooldown(cooldown_ms: f64) -> Self {
        Self {
            pending: false,
            last_accepted_ms: 0.0,
            cooldown_ms,
        }
    }

    /// Returns true if the request was accepted.
    pub fn notify_raw_input(&mut self, now_ms: f64) -> bool {
        if now_ms - self.last_accepted_ms >= self.cooldown_ms {
            self.pending = true;
            self.last_accepted_ms = now_ms;
            log::debug!("Jump input accepted at {now_ms:.1}ms");
            true
        } else {
            false
        }
    }

    pub fn poll_and_clear(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    /// Peeks without consuming.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_accepted_ms(&self) -> f64 {
        self.last_accepted_ms
    }

    pub fn cooldown_ms(&self) -> f64 {
        self.cooldown_ms
    }

    pub fn reset(&mut self) {
        self.pending = false;
        self.last_accepted_ms = 0.0;
    }
}

impl Default for JumpDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl RawInputHandler for JumpDebouncer {
    fn on_key_down(&mut self, key: Key, now_ms: f64) -> EventDisposition {
        if !is_jump_key(key) {
            return EventDisposition::Ignored;
        }
        self.notify_raw_input(now_ms);
        EventDisposition::Consumed
    }

    fn on_pointer_down(&mut self, button: MouseBtn, now_ms: f64) -> EventDisposition {
        if !is_jump_button(button) {
            return EventDisposition::Ignored;
        }
        self.notify_raw_input(now_ms);
        EventDisposition::Consumed
    }
}

pub type SharedInputHandler = Rc<RefCell<dyn RawInputHandler>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, SharedInputHandler)>,
}

/// The raw-event source handlers subscribe to. The host forwards key-down and
/// pointer-down events here.
#[derive(Default)]
pub struct InputDispatcher {
    listeners: Rc<RefCell<Listeners>>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: SharedInputHandler) -> InputSubscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, handler));
        InputSubscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    pub fn dispatch_key_down(&self, key: Key, now_ms: f64) -> EventDisposition {
        self.dispatch(|handler| handler.on_key_down(key, now_ms))
    }

    pub fn dispatch_pointer_down(&self, button: MouseBtn, now_ms: f64) -> EventDisposition {
        self.dispatch(|handler| handler.on_pointer_down(button, now_ms))
    }

    fn dispatch(
        &self,
        mut deliver: impl FnMut(&mut dyn RawInputHandler) -> EventDisposition,
    ) -> EventDisposition {
        // Snapshot first so a handler may subscribe or release during delivery.
        let handlers: Vec<SharedInputHandler> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        handlers
            .iter()
            .fold(EventDisposition::Ignored, |acc, handler| {
                acc.merge(deliver(&mut *handler.borrow_mut()))
            })
    }
}

/// Live attachment of one handler to an `InputDispatcher`. Detaches on drop.
pub struct InputSubscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl InputSubscription {
    /// Detaches now. Equivalent to dropping the handle.
    pub fn release(self) {}

    pub fn is_attached(&self) -> bool {
        self.listeners
            .upgrade()
            .is_some_and(|l| l.borrow().entries.iter().any(|(id, _)| *id == self.id))
    }
}

impl Drop for InputSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}
