//! Executor - drives one input string through the automaton and a traveler.

use crate::definition::{Automaton, StateId, Symbol};
use crate::error::CoreError;
use crate::traveler::Traveler;
use std::sync::Arc;
use tracing::Instrument;

/// Message sent when a symbol has no transition from the current state.
pub const NO_NEXT_STATE: &str = "Cannot find next state";

/// Message sent when the input ends in a non-accepting state.
pub const NON_ACCEPTING: &str = "Finished with non-accepting state";

/// Message sent when a run was stopped before the input was consumed.
pub const STOPPED: &str = "Stopped";

/// Why a run was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The symbol had no transition from the current state.
    NoTransition { symbol: Symbol },
    /// All input was consumed but the final state is not accepting.
    NonAccepting,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::NoTransition { .. } => NO_NEXT_STATE,
            Rejection::NonAccepting => NON_ACCEPTING,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Accepted {
        state: StateId,
        steps: usize,
    },
    Rejected {
        state: StateId,
        steps: usize,
        reason: Rejection,
    },
    Stopped {
        state: StateId,
        steps: usize,
    },
}

impl RunOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RunOutcome::Accepted { .. })
    }

    /// The state the run ended in.
    pub fn state(&self) -> &StateId {
        match self {
            RunOutcome::Accepted { state, .. }
            | RunOutcome::Rejected { state, .. }
            | RunOutcome::Stopped { state, .. } => state,
        }
    }

    /// Number of transitions that completed.
    pub fn steps(&self) -> usize {
        match self {
            RunOutcome::Accepted { steps, .. }
            | RunOutcome::Rejected { steps, .. }
            | RunOutcome::Stopped { steps, .. } => *steps,
        }
    }
}

/// Runs input strings against an automaton, one transition at a time.
pub struct Executor<T> {
    automaton: Arc<Automaton>,
    traveler: T,
}

impl<T: Traveler> Executor<T> {
    pub fn new(automaton: Arc<Automaton>, traveler: T) -> Self {
        Self {
            automaton,
            traveler,
        }
    }

    pub fn traveler(&self) -> &T {
        &self.traveler
    }

    pub fn into_traveler(self) -> T {
        self.traveler
    }

    /// Consumes `input` symbol by symbol.
    ///
    /// Every transition is awaited before the next symbol is read. Exactly
    /// one terminal notification (`finish` or `error`) reaches the traveler,
    /// and it is the last thing the traveler hears about this run. Setup
    /// failures are returned as `Err` after that notification.
    pub async fn execute(&mut self, input: &str) -> Result<RunOutcome, CoreError> {
        let span = tracing::info_span!(
            "run",
            run_id = %uuid::Uuid::new_v4(),
            automaton = %self.automaton.checksum,
        );
        self.run(input).instrument(span).await
    }

    async fn run(&mut self, input: &str) -> Result<RunOutcome, CoreError> {
        let automaton = Arc::clone(&self.automaton);
        let mut current = automaton.init_state().clone();
        let mut steps = 0;

        tracing::info!(input_len = input.chars().count(), init = %current, "run started");

        for symbol in input.chars() {
            let Some(next) = automaton.next_state(&current, symbol) else {
                tracing::warn!(state = %current, %symbol, "no transition");
                self.traveler.error(NO_NEXT_STATE).await;
                return Ok(RunOutcome::Rejected {
                    state: current,
                    steps,
                    reason: Rejection::NoTransition { symbol },
                });
            };

            tracing::debug!(from = %current, to = %next, %symbol, "transition");

            match self.traveler.transit_to(next).await {
                Ok(()) => {
                    current = next.clone();
                    steps += 1;
                }
                Err(CoreError::Stopped) => {
                    tracing::info!(state = %current, steps, "run stopped");
                    self.traveler.error(STOPPED).await;
                    return Ok(RunOutcome::Stopped {
                        state: current,
                        steps,
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, code = e.error_code(), "setup failure");
                    self.traveler.error(&format!("Setup failure: {}", e)).await;
                    return Err(e);
                }
            }
        }

        if automaton.is_accepting(&current) {
            tracing::info!(state = %current, steps, "run accepted");
            self.traveler.finish().await;
            Ok(RunOutcome::Accepted {
                state: current,
                steps,
            })
        } else {
            tracing::warn!(state = %current, steps, "run ended in non-accepting state");
            self.traveler.error(NON_ACCEPTING).await;
            Ok(RunOutcome::Rejected {
                state: current,
                steps,
                reason: Rejection::NonAccepting,
            })
        }
    }
}
