//! Session lifecycle flags.

use crate::observable::Observable;

/// Started/over flags of the running session.
#[derive(Debug, Default)]
pub struct GameState {
    started: Observable<bool>,
    over: Observable<bool>,
    /// Incremented on every restart.
    session: u32,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started.value()
    }

    pub fn is_over(&self) -> bool {
        self.over.value()
    }

    pub fn session(&self) -> u32 {
        self.session
    }

    pub fn set_game_started(&mut self) {
        self.started.set(true);
    }

    /// Returns true on the transition into game over.
    pub fn set_game_over(&mut self) -> bool {
        self.over.set(true)
    }

    pub fn restart(&mut self) {
        self.started.set(false);
        self.over.set(false);
        self.session += 1;
    }

    pub fn on_started_changed(&mut self, listener: impl FnMut(&bool) + Send + 'static) {
        self.started.subscribe(listener);
    }

    pub fn on_over_changed(&mut self, listener: impl FnMut(&bool) + Send + 'static) {
        self.over.subscribe(listener);
    }
}
