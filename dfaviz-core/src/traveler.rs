//! The occupant of the automaton's current state during a run.

use crate::definition::StateId;
use crate::error::CoreError;
use async_trait::async_trait;

/// Something that occupies a state of the automaton and can move along its
/// transitions.
///
/// `transit_to` resolves only once the move is complete. Callers must not
/// start a second transit before the previous one resolved; taking
/// `&mut self` makes that a borrow error rather than a runtime race.
#[async_trait]
pub trait Traveler: Send {
    /// Moves to `next`. Errors leave [`Traveler::current`] at the last
    /// committed state.
    async fn transit_to(&mut self, next: &StateId) -> Result<(), CoreError>;

    /// Returns the last committed state.
    fn current(&self) -> &StateId;

    /// Terminal notification for an accepted run.
    async fn finish(&mut self);

    /// Terminal notification for a run that ended in error.
    async fn error(&mut self, message: &str);
}

/// How a run reported its end to a [`HeadlessTraveler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Finished,
    Errored(String),
}

/// A traveler without any rendering. Transits resolve immediately.
#[derive(Debug, Clone)]
pub struct HeadlessTraveler {
    current: StateId,
    path: Vec<StateId>,
    terminals: Vec<Terminal>,
}

impl HeadlessTraveler {
    pub fn new(init: StateId) -> Self {
        Self {
            path: vec![init.clone()],
            current: init,
            terminals: Vec::new(),
        }
    }

    /// Every committed state, starting with the initial one.
    pub fn path(&self) -> &[StateId] {
        &self.path
    }

    /// Terminal notifications received so far. A well-behaved run leaves
    /// exactly one.
    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }
}

#[async_trait]
impl Traveler for HeadlessTraveler {
    async fn transit_to(&mut self, next: &StateId) -> Result<(), CoreError> {
        self.current = next.clone();
        self.path.push(next.clone());
        Ok(())
    }

    fn current(&self) -> &StateId {
        &self.current
    }

    async fn finish(&mut self) {
        self.terminals.push(Terminal::Finished);
    }

    async fn error(&mut self, message: &str) {
        self.terminals.push(Terminal::Errored(message.to_string()));
    }
}
