//! Automaton definition types.
//!
//! Automata are defined in YAML (JSON of the same shape is accepted too):
//!
//! ```yaml
//! init_state: 0
//! nodes:
//!   - 0
//!   - 1
//! transitions:
//!   0:
//!     a: 1
//!     b: 0
//!   1:
//!     a: 0
//!     b: 1
//! accepting_state:
//!   - 0
//! ```
//!
//! Scalar names are normalized to strings, so `0` and `"0"` are the same
//! state.

use crate::error::{DefinitionError, StateRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::str::FromStr;

/// An input symbol. Always a single character.
pub type Symbol = char;

/// Identifier of a state in the automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StateId(pub String);

impl StateId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for StateId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserialize_scalar(deserializer).map(StateId)
    }
}

/// A transition key exactly as written in the definition.
///
/// Kept as a string so that malformed keys (`ab`, empty) survive parsing and
/// are reported by validation instead of as a syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SymbolKey(pub String);

impl<'de> Deserialize<'de> for SymbolKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserialize_scalar(deserializer).map(SymbolKey)
    }
}

/// Outgoing transitions of one state, in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTransitions(pub Vec<(SymbolKey, StateId)>);

impl Serialize for SymbolTransitions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, target) in &self.0 {
            map.serialize_entry(key, target)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SymbolTransitions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{MapAccess, Visitor};
        use std::fmt;

        struct TransitionsVisitor;

        impl<'de> Visitor<'de> for TransitionsVisitor {
            type Value = SymbolTransitions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of symbol to target state")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, target)) = map.next_entry::<SymbolKey, StateId>()? {
                    entries.push((key, target));
                }
                Ok(SymbolTransitions(entries))
            }
        }

        deserializer.deserialize_map(TransitionsVisitor)
    }
}

fn deserialize_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}

/// Raw automaton definition as written by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatonDefinitionRaw {
    /// Initial state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_state: Option<StateId>,

    /// All declared states, in declaration order.
    #[serde(default)]
    pub nodes: Vec<StateId>,

    /// Transitions as source -> symbol -> target.
    #[serde(default)]
    pub transitions: BTreeMap<StateId, SymbolTransitions>,

    /// Accepting states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepting_state: Option<Vec<StateId>>,
}

/// A distinct (from, to) pair of the transition graph and the symbols that
/// take it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSpec {
    pub from: StateId,
    pub to: StateId,
    pub symbols: Vec<Symbol>,
}

impl EdgeSpec {
    /// Display label, symbols joined by commas.
    pub fn label(&self) -> String {
        self.symbols
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }
}

static NO_TRANSITIONS: BTreeMap<Symbol, StateId> = BTreeMap::new();

/// Validated, immutable deterministic finite automaton.
#[derive(Debug, Clone)]
pub struct Automaton {
    /// Initial state.
    init_state: StateId,

    /// Declared states in declaration order.
    order: Vec<StateId>,

    /// Declared states.
    states: HashSet<StateId>,

    /// Transition function indexed by source state.
    transitions: HashMap<StateId, BTreeMap<Symbol, StateId>>,

    /// Symbols of each source state in the order they were written.
    symbol_order: HashMap<StateId, Vec<Symbol>>,

    /// Accepting states.
    accepting: HashSet<StateId>,

    /// Original raw definition.
    pub raw: AutomatonDefinitionRaw,

    /// Hash of the definition for identifying it in logs.
    pub checksum: String,
}

impl Automaton {
    /// Parses and validates an automaton from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, DefinitionError> {
        let raw: AutomatonDefinitionRaw = serde_yaml::from_str(text)?;
        Self::from_raw(raw)
    }

    /// Parses and validates an automaton from JSON.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, DefinitionError> {
        let raw: AutomatonDefinitionRaw = serde_json::from_value(json.clone())?;
        Self::from_raw(raw)
    }

    /// Creates an automaton from raw parts.
    pub fn from_raw(raw: AutomatonDefinitionRaw) -> Result<Self, DefinitionError> {
        let init_state = raw
            .init_state
            .clone()
            .ok_or(DefinitionError::MissingInitState)?;
        let accepting_list = raw
            .accepting_state
            .as_ref()
            .ok_or(DefinitionError::MissingAcceptingStates)?;

        // Build state set
        let mut states = HashSet::with_capacity(raw.nodes.len());
        for node in &raw.nodes {
            if !states.insert(node.clone()) {
                return Err(DefinitionError::DuplicateState {
                    state: node.0.clone(),
                });
            }
        }

        let declared = |state: &StateId, referenced_by: StateRef| {
            if states.contains(state) {
                Ok(())
            } else {
                Err(DefinitionError::UndeclaredState {
                    state: state.0.clone(),
                    referenced_by,
                })
            }
        };

        declared(&init_state, StateRef::InitState)?;

        let mut accepting = HashSet::with_capacity(accepting_list.len());
        for state in accepting_list {
            declared(state, StateRef::AcceptingState)?;
            accepting.insert(state.clone());
        }

        // Build and validate transitions
        let mut transitions: HashMap<StateId, BTreeMap<Symbol, StateId>> = HashMap::new();
        let mut symbol_order: HashMap<StateId, Vec<Symbol>> = HashMap::new();
        for (from, by_symbol) in &raw.transitions {
            for (key, to) in &by_symbol.0 {
                let symbol = single_char(&key.0).ok_or_else(|| DefinitionError::InvalidSymbol {
                    symbol: key.0.clone(),
                })?;
                declared(from, StateRef::TransitionSource)?;
                declared(to, StateRef::TransitionTarget)?;

                let replaced = transitions
                    .entry(from.clone())
                    .or_default()
                    .insert(symbol, to.clone());
                if replaced.is_none() {
                    symbol_order.entry(from.clone()).or_default().push(symbol);
                }
            }
        }

        // Compute checksum
        let json_bytes = serde_json::to_vec(&raw)?;
        let checksum = format!("{:08x}", crc32c::crc32c(&json_bytes));

        tracing::debug!(
            states = states.len(),
            accepting = accepting.len(),
            checksum = %checksum,
            "automaton built"
        );

        Ok(Self {
            init_state,
            order: raw.nodes.clone(),
            states,
            transitions,
            symbol_order,
            accepting,
            raw,
            checksum,
        })
    }

    /// Returns the initial state.
    pub fn init_state(&self) -> &StateId {
        &self.init_state
    }

    /// Looks up the target of `symbol` from `current`.
    ///
    /// Returns `None` if `current` is unknown or has no transition on
    /// `symbol`.
    pub fn next_state(&self, current: &StateId, symbol: Symbol) -> Option<&StateId> {
        self.transitions.get(current)?.get(&symbol)
    }

    /// Returns the outgoing transitions of `state`, empty for unknown states.
    pub fn transitions_from(&self, state: &StateId) -> &BTreeMap<Symbol, StateId> {
        self.transitions.get(state).unwrap_or(&NO_TRANSITIONS)
    }

    /// Finds a symbol leading from `from` to `to`.
    ///
    /// When several symbols lead to the same target the first one written in
    /// the definition wins. Callers must not rely on which one is picked.
    pub fn symbol_to(&self, from: &StateId, to: &StateId) -> Option<Symbol> {
        self.symbols_from(from)
            .find(|(_, target)| *target == to)
            .map(|(symbol, _)| symbol)
    }

    /// Outgoing transitions of `from` in the order they were written.
    fn symbols_from<'a>(
        &'a self,
        from: &StateId,
    ) -> impl Iterator<Item = (Symbol, &'a StateId)> + 'a {
        let by_symbol = self.transitions_from(from);
        self.symbol_order
            .get(from)
            .into_iter()
            .flatten()
            .filter_map(move |symbol| by_symbol.get(symbol).map(|to| (*symbol, to)))
    }

    /// Returns true if the given state is accepting.
    pub fn is_accepting(&self, state: &StateId) -> bool {
        self.accepting.contains(state)
    }

    /// Returns true if the given state is declared.
    pub fn has_state(&self, state: &StateId) -> bool {
        self.states.contains(state)
    }

    /// Returns the declared states in declaration order.
    pub fn states(&self) -> &[StateId] {
        &self.order
    }

    /// Returns the accepting states in declaration order.
    pub fn accepting_states(&self) -> Vec<&StateId> {
        self.order
            .iter()
            .filter(|s| self.accepting.contains(*s))
            .collect()
    }

    /// Returns every symbol used by some transition.
    pub fn alphabet(&self) -> BTreeSet<Symbol> {
        self.transitions
            .values()
            .flat_map(|by_symbol| by_symbol.keys().copied())
            .collect()
    }

    /// Returns the distinct (from, to) pairs of the transition graph.
    ///
    /// Sources follow declaration order; targets and their symbols follow the
    /// order the transitions were written in.
    pub fn edges(&self) -> Vec<EdgeSpec> {
        let mut edges = Vec::new();
        for from in &self.order {
            let mut by_target: Vec<EdgeSpec> = Vec::new();
            for (symbol, to) in self.symbols_from(from) {
                match by_target.iter_mut().find(|e| &e.to == to) {
                    Some(edge) => edge.symbols.push(symbol),
                    None => by_target.push(EdgeSpec {
                        from: from.clone(),
                        to: to.clone(),
                        symbols: vec![symbol],
                    }),
                }
            }
            edges.extend(by_target);
        }
        edges
    }
}

impl FromStr for Automaton {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yaml(s)
    }
}

fn single_char(s: &str) -> Option<Symbol> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVEN_A: &str = "\
init_state: 0
nodes:
  - 0
  - 1
transitions:
  0:
    a: 1
    b: 0
  1:
    a: 0
    b: 1
accepting_state:
  - 0
";

    #[test]
    fn test_parse_definition() {
        let automaton = Automaton::from_yaml(EVEN_A).unwrap();

        assert_eq!(automaton.init_state().as_str(), "0");
        assert_eq!(automaton.states().len(), 2);
        assert!(automaton.is_accepting(&StateId::from("0")));
        assert!(!automaton.is_accepting(&StateId::from("1")));
        assert_eq!(automaton.checksum.len(), 8);
    }

    #[test]
    fn test_transition_lookup() {
        let automaton = Automaton::from_yaml(EVEN_A).unwrap();
        let zero = StateId::from("0");

        assert_eq!(automaton.next_state(&zero, 'a').unwrap().as_str(), "1");
        assert_eq!(automaton.next_state(&zero, 'b').unwrap().as_str(), "0");
        assert!(automaton.next_state(&zero, 'c').is_none());
        assert!(automaton.next_state(&StateId::from("9"), 'a').is_none());
    }

    #[test]
    fn test_transitions_from_unknown_state_is_empty() {
        let automaton = Automaton::from_yaml(EVEN_A).unwrap();
        assert!(automaton.transitions_from(&StateId::from("9")).is_empty());
        assert_eq!(automaton.transitions_from(&StateId::from("1")).len(), 2);
    }

    #[test]
    fn test_string_and_integer_names_are_equal() {
        let yaml = "\
init_state: \"0\"
nodes: [0, q1]
transitions:
  \"0\": { x: q1 }
accepting_state: [q1]
";
        let automaton = Automaton::from_yaml(yaml).unwrap();
        assert_eq!(
            automaton.next_state(&StateId::from("0"), 'x'),
            Some(&StateId::from("q1"))
        );
    }

    #[test]
    fn test_missing_init_state() {
        let yaml = "nodes: [0]\naccepting_state: [0]\n";
        let result = Automaton::from_yaml(yaml);
        assert!(matches!(result, Err(DefinitionError::MissingInitState)));
    }

    #[test]
    fn test_missing_init_state_and_nodes() {
        let result = Automaton::from_yaml("accepting_state: [0]\n");
        assert!(matches!(result, Err(DefinitionError::MissingInitState)));

        let result = Automaton::from_yaml("init_state: 0\n");
        assert!(matches!(result, Err(DefinitionError::MissingAcceptingStates)));
    }

    #[test]
    fn test_missing_nodes_reports_undeclared_init() {
        let result = Automaton::from_yaml("init_state: 0\naccepting_state: []\n");
        assert!(matches!(
            result,
            Err(DefinitionError::UndeclaredState {
                referenced_by: StateRef::InitState,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_accepting_state() {
        let yaml = "init_state: 0\nnodes: [0]\n";
        let result = Automaton::from_yaml(yaml);
        assert!(matches!(result, Err(DefinitionError::MissingAcceptingStates)));
    }

    #[test]
    fn test_empty_accepting_state_is_allowed() {
        let yaml = "init_state: 0\nnodes: [0]\naccepting_state: []\n";
        let automaton = Automaton::from_yaml(yaml).unwrap();
        assert!(automaton.accepting_states().is_empty());
    }

    #[test]
    fn test_undeclared_transition_source() {
        let yaml = "\
init_state: 0
nodes: [0]
transitions:
  7: { a: 0 }
accepting_state: []
";
        let result = Automaton::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(DefinitionError::UndeclaredState {
                referenced_by: StateRef::TransitionSource,
                ..
            })
        ));
    }

    #[test]
    fn test_undeclared_transition_target() {
        let yaml = "\
init_state: 0
nodes: [0]
transitions:
  0: { a: 7 }
accepting_state: []
";
        let result = Automaton::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(DefinitionError::UndeclaredState {
                referenced_by: StateRef::TransitionTarget,
                ..
            })
        ));
    }

    #[test]
    fn test_multi_character_symbol_rejected() {
        let yaml = "\
init_state: 0
nodes: [0]
transitions:
  0: { ab: 0 }
accepting_state: []
";
        let result = Automaton::from_yaml(yaml);
        assert!(matches!(result, Err(DefinitionError::InvalidSymbol { .. })));
    }

    #[test]
    fn test_duplicate_state_rejected() {
        let yaml = "init_state: 0\nnodes: [0, 0]\naccepting_state: []\n";
        let result = Automaton::from_yaml(yaml);
        assert!(matches!(result, Err(DefinitionError::DuplicateState { .. })));
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({
            "init_state": "s",
            "nodes": ["s", "t"],
            "transitions": { "s": { "0": "t" } },
            "accepting_state": ["t"]
        });
        let automaton = Automaton::from_json(&json).unwrap();
        assert_eq!(
            automaton.next_state(&StateId::from("s"), '0'),
            Some(&StateId::from("t"))
        );
    }

    #[test]
    fn test_edges_group_symbols_by_target() {
        let yaml = "\
init_state: 0
nodes: [0, 1]
transitions:
  0: { a: 1, b: 1, c: 0 }
accepting_state: []
";
        let automaton = Automaton::from_yaml(yaml).unwrap();
        let edges = automaton.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].to.as_str(), "1");
        assert_eq!(edges[0].label(), "a,b");
        assert!(edges[1].is_loop());
        assert_eq!(
            automaton.symbol_to(&StateId::from("0"), &StateId::from("1")),
            Some('a')
        );
    }

    #[test]
    fn test_symbol_to_prefers_first_written_symbol() {
        let yaml = "\
init_state: 0
nodes: [0, 1]
transitions:
  0: { b: 1, a: 1 }
accepting_state: []
";
        let automaton = Automaton::from_yaml(yaml).unwrap();
        assert_eq!(
            automaton.symbol_to(&StateId::from("0"), &StateId::from("1")),
            Some('b')
        );
        assert_eq!(automaton.edges()[0].label(), "b,a");
        assert!(automaton.symbol_to(&StateId::from("1"), &StateId::from("0")).is_none());
    }

    #[test]
    fn test_checksum_is_stable() {
        let a = Automaton::from_yaml(EVEN_A).unwrap();
        let b = Automaton::from_yaml(EVEN_A).unwrap();
        assert_eq!(a.checksum, b.checksum);
    }
}
