//! Corridor dedupe state machine
//!
//! Per-ticker decision of alert vs. skip vs. silent reset. The recorded
//! corridor state is breach memory: it changes only when an alert fires or
//! when the price returns inside the band.

use crate::models::{Corridor, Direction};

/// Outcome of observing one direction reading against the recorded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Corridor,
    pub fire: bool,
}

impl Transition {
    fn to(next: Corridor, fire: bool) -> Self {
        Self { next, fire }
    }
}

impl Corridor {
    /// An alert fires only on a transition into a breached direction that
    /// differs from the recorded one. Returning inside clears the memory
    /// without notifying, so the next re-breach of the same direction fires
    /// again — at most one alert per directional breach episode.
    pub fn transition(self, direction: Direction) -> Transition {
        match (self, direction) {
            (Corridor::None, Direction::Up) => Transition::to(Corridor::Up, true),
            (Corridor::None, Direction::Down) => Transition::to(Corridor::Down, true),
            (Corridor::None, Direction::Inside) => Transition::to(Corridor::None, false),

            (Corridor::Up, Direction::Up) => Transition::to(Corridor::Up, false),
            (Corridor::Up, Direction::Down) => Transition::to(Corridor::Down, true),
            (Corridor::Up, Direction::Inside) => Transition::to(Corridor::None, false),

            (Corridor::Down, Direction::Up) => Transition::to(Corridor::Up, true),
            (Corridor::Down, Direction::Down) => Transition::to(Corridor::Down, false),
            (Corridor::Down, Direction::Inside) => Transition::to(Corridor::None, false),
        }
    }
}
