//! Core error types.

use thiserror::Error;

/// Where an undeclared state was referenced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRef {
    InitState,
    AcceptingState,
    TransitionSource,
    TransitionTarget,
}

impl std::fmt::Display for StateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StateRef::InitState => "init_state",
            StateRef::AcceptingState => "accepting_state",
            StateRef::TransitionSource => "transition source",
            StateRef::TransitionTarget => "transition target",
        };
        f.write_str(s)
    }
}

/// Errors raised while building an automaton from a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Cannot find init_state")]
    MissingInitState,

    #[error("Cannot find accepting_state")]
    MissingAcceptingStates,

    #[error("The state {state} doesn't exists ({referenced_by})")]
    UndeclaredState {
        state: String,
        referenced_by: StateRef,
    },

    #[error("The length of alpha should be 1, got '{symbol}'")]
    InvalidSymbol { symbol: String },

    #[error("state '{state}' declared more than once")]
    DuplicateState { state: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DefinitionError {
    /// Returns a stable code identifying the kind of definition error.
    pub fn error_code(&self) -> &'static str {
        match self {
            DefinitionError::MissingInitState => "MISSING_INIT_STATE",
            DefinitionError::MissingAcceptingStates => "MISSING_ACCEPTING_STATE",
            DefinitionError::UndeclaredState { .. } => "UNDECLARED_STATE",
            DefinitionError::InvalidSymbol { .. } => "INVALID_SYMBOL",
            DefinitionError::DuplicateState { .. } => "DUPLICATE_STATE",
            DefinitionError::Yaml(_) | DefinitionError::Json(_) => "SYNTAX",
        }
    }
}

/// Errors from the automaton runtime.
///
/// Apart from [`CoreError::Definition`] and [`CoreError::Stopped`], every
/// variant means the rendered graph does not match the automaton.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid automaton definition: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Cannot find edges from '{from}' to '{to}'")]
    NoEdge { from: String, to: String },

    #[error("found {count} parallel edges from '{from}' to '{to}', expected exactly one")]
    AmbiguousEdge {
        from: String,
        to: String,
        count: usize,
    },

    #[error("node not found in rendered graph: {node}")]
    UnknownNode { node: String },

    #[error("edge not found in rendered graph: {edge}")]
    UnknownEdge { edge: usize },

    #[error("no symbol leads from '{from}' to '{to}'")]
    NoSymbol { from: String, to: String },

    #[error("run stopped")]
    Stopped,
}

impl CoreError {
    /// Returns true for errors that mean the setup is broken, as opposed to
    /// a bad definition or a requested stop.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CoreError::Definition(_) | CoreError::Stopped)
    }

    /// Returns an error code suitable for status output.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Definition(e) => e.error_code(),
            CoreError::NoEdge { .. } => "NO_EDGE",
            CoreError::AmbiguousEdge { .. } => "AMBIGUOUS_EDGE",
            CoreError::UnknownNode { .. } => "UNKNOWN_NODE",
            CoreError::UnknownEdge { .. } => "UNKNOWN_EDGE",
            CoreError::NoSymbol { .. } => "NO_SYMBOL",
            CoreError::Stopped => "STOPPED",
        }
    }
}
