//! Edge-detecting key state.
//!
//! Actions like jumping and firing must trigger once per press, not once per
//! frame while the key is held. [`KeyLatch`] makes that contract explicit:
//! the key must pass through `Released` before it can produce another
//! `JustPressed` edge.

/// Lifecycle of a latched key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatchState {
    /// Key is up.
    #[default]
    Released,
    /// Key went down this tick; the edge is available exactly once.
    JustPressed,
    /// Key is still down; the edge has been consumed.
    Held,
}

/// Per-key edge detector, stepped once per tick with the raw held state.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLatch {
    state: LatchState,
}

impl KeyLatch {
    /// Creates a latch in the released state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> LatchState {
        self.state
    }

    /// True only on the tick the key transitioned released -> pressed.
    #[must_use]
    pub fn just_pressed(&self) -> bool {
        self.state == LatchState::JustPressed
    }

    /// True while the key is down (edge tick included).
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.state != LatchState::Released
    }

    /// Advances the latch with this tick's raw held flag and reports whether
    /// a press edge fired.
    pub fn step(&mut self, held: bool) -> bool {
        self.state = match (self.state, held) {
            (LatchState::Released, true) => LatchState::JustPressed,
            (LatchState::JustPressed | LatchState::Held, true) => LatchState::Held,
            (_, false) => LatchState::Released,
        };
        self.just_pressed()
    }

    /// Forces the latch back to released (used on mode teardown).
    pub fn reset(&mut self) {
        self.state = LatchState::Released;
    }
}
