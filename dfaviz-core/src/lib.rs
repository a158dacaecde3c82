//! # dfaviz-core
//!
//! Automaton engine for dfaviz.
//!
//! This crate provides:
//! - Automaton definition parsing and validation
//! - The `Traveler` capability and a headless implementation
//! - The executor that feeds input through the automaton one symbol at a time

pub mod definition;
pub mod error;
pub mod executor;
pub mod traveler;

pub use definition::{
    Automaton, AutomatonDefinitionRaw, EdgeSpec, StateId, Symbol, SymbolKey, SymbolTransitions,
};
pub use error::{CoreError, DefinitionError, StateRef};
pub use executor::{Executor, Rejection, RunOutcome};
pub use traveler::{HeadlessTraveler, Terminal, Traveler};
