//! Animation phases of a token crossing one transition.
//!
//! A transition is drawn in three phases: from the source node's center to
//! the edge's start, along the edge, and from the edge's end to the target
//! node's center. Each phase carries its own normalized progress.

use crate::config::AnimationConfig;
use crate::geometry::{EdgeGeometry, Position};
use crate::renderer::{EdgeId, Renderer};
use dfaviz_core::{CoreError, StateId};

/// Which leg of a transition a token is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    FromNode,
    Edge,
    ToNode,
}

/// Private animation state of one in-flight transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenState {
    /// Leaving the source node toward the edge's start.
    InFromNode {
        from_pos: Position,
        to_pos: Position,
        from_node: StateId,
        to_node: StateId,
        elapsed: f64,
    },
    /// Travelling along the edge.
    InEdge {
        edge: EdgeId,
        to_node: StateId,
        elapsed: f64,
    },
    /// Approaching the target node's center.
    InToNode {
        from_pos: Position,
        to_pos: Position,
        elapsed: f64,
    },
}

/// What one tick did to a token.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Still in the same phase, further along.
    Moved(TokenState),
    /// Entered a new phase.
    Entered(TokenState),
    /// Reached the target node. `at` is its graph-space center.
    Arrived { at: Position },
}

impl TokenState {
    /// Starts a transition from `from` to `to` at the source node's center.
    pub fn start<R: Renderer>(
        renderer: &R,
        from: &StateId,
        to: &StateId,
    ) -> Result<Self, CoreError> {
        let from_pos = renderer.require_node(from)?;
        let edge = renderer.edge_between(from, to)?;
        let to_pos = renderer.require_edge(edge)?.start();

        Ok(TokenState::InFromNode {
            from_pos,
            to_pos,
            from_node: from.clone(),
            to_node: to.clone(),
            elapsed: 0.0,
        })
    }

    pub fn phase(&self) -> Phase {
        match self {
            TokenState::InFromNode { .. } => Phase::FromNode,
            TokenState::InEdge { .. } => Phase::Edge,
            TokenState::InToNode { .. } => Phase::ToNode,
        }
    }

    pub fn elapsed(&self) -> f64 {
        match self {
            TokenState::InFromNode { elapsed, .. }
            | TokenState::InEdge { elapsed, .. }
            | TokenState::InToNode { elapsed, .. } => *elapsed,
        }
    }

    /// Current graph-space position.
    pub fn position<R: Renderer>(&self, renderer: &R) -> Result<Position, CoreError> {
        match self {
            TokenState::InFromNode {
                from_pos,
                to_pos,
                elapsed,
                ..
            }
            | TokenState::InToNode {
                from_pos,
                to_pos,
                elapsed,
            } => Ok(from_pos.lerp(*to_pos, *elapsed)),
            TokenState::InEdge { edge, elapsed, .. } => {
                Ok(renderer.require_edge(*edge)?.point_at(*elapsed))
            }
        }
    }

    /// Current screen-space position.
    pub fn screen_position<R: Renderer>(&self, renderer: &R) -> Result<Position, CoreError> {
        Ok(renderer.to_screen(self.position(renderer)?))
    }

    /// Advances progress by one tick and changes phase once it reaches 1.
    ///
    /// Edges advance by `edge_step`, the legs to and from node centers by
    /// `node_step`.
    pub fn advance<R: Renderer>(
        self,
        config: &AnimationConfig,
        renderer: &R,
    ) -> Result<Advance, CoreError> {
        let step = match self.phase() {
            Phase::Edge => config.edge_step,
            Phase::FromNode | Phase::ToNode => config.node_step,
        };
        let elapsed = (self.elapsed() + step).min(1.0);

        if elapsed < 1.0 {
            return Ok(Advance::Moved(self.with_elapsed(elapsed)));
        }

        match self {
            TokenState::InFromNode {
                from_node, to_node, ..
            } => {
                let edge = renderer.edge_between(&from_node, &to_node)?;
                Ok(Advance::Entered(TokenState::InEdge {
                    edge,
                    to_node,
                    elapsed: 0.0,
                }))
            }
            TokenState::InEdge { edge, to_node, .. } => {
                let from_pos = renderer.require_edge(edge)?.end();
                let to_pos = renderer.require_node(&to_node)?;
                Ok(Advance::Entered(TokenState::InToNode {
                    from_pos,
                    to_pos,
                    elapsed: 0.0,
                }))
            }
            TokenState::InToNode { to_pos, .. } => Ok(Advance::Arrived { at: to_pos }),
        }
    }

    fn with_elapsed(mut self, value: f64) -> Self {
        match &mut self {
            TokenState::InFromNode { elapsed, .. }
            | TokenState::InEdge { elapsed, .. }
            | TokenState::InToNode { elapsed, .. } => *elapsed = value,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::GraphLayout;
    use dfaviz_core::Automaton;
    use proptest::prelude::*;

    fn layout() -> GraphLayout {
        let yaml = "\
init_state: 0
nodes: [0, 1]
transitions:
  0: { a: 1 }
accepting_state: []
";
        let automaton = Automaton::from_yaml(yaml).unwrap();
        GraphLayout::from_automaton(&automaton, &LayoutConfig::default())
    }

    fn run_to_arrival(
        mut state: TokenState,
        config: &AnimationConfig,
        layout: &GraphLayout,
    ) -> (Vec<(Phase, f64)>, Position) {
        let mut seen = Vec::new();
        loop {
            seen.push((state.phase(), state.elapsed()));
            match state.advance(config, layout).unwrap() {
                Advance::Moved(next) | Advance::Entered(next) => state = next,
                Advance::Arrived { at } => return (seen, at),
            }
        }
    }

    #[test]
    fn test_start_at_source_center() {
        let layout = layout();
        let state = TokenState::start(&layout, &StateId::from("0"), &StateId::from("1")).unwrap();
        assert_eq!(state.phase(), Phase::FromNode);
        assert_eq!(
            state.position(&layout).unwrap(),
            layout.node_position(&StateId::from("0")).unwrap()
        );
    }

    #[test]
    fn test_phases_in_order_and_arrive_at_target() {
        let layout = layout();
        let config = AnimationConfig::default();
        let state = TokenState::start(&layout, &StateId::from("0"), &StateId::from("1")).unwrap();

        let (seen, at) = run_to_arrival(state, &config, &layout);

        let phases: Vec<Phase> = seen.iter().map(|(p, _)| *p).collect();
        let first_edge = phases.iter().position(|p| *p == Phase::Edge).unwrap();
        let first_to = phases.iter().position(|p| *p == Phase::ToNode).unwrap();
        assert!(phases[..first_edge].iter().all(|p| *p == Phase::FromNode));
        assert!(phases[first_edge..first_to].iter().all(|p| *p == Phase::Edge));
        assert!(phases[first_to..].iter().all(|p| *p == Phase::ToNode));

        // The edge takes longer than either leg.
        assert!(first_to - first_edge > first_edge);
        assert_eq!(at, layout.node_position(&StateId::from("1")).unwrap());
    }

    #[test]
    fn test_elapsed_never_regresses_within_phase() {
        let layout = layout();
        let config = AnimationConfig::default();
        let state = TokenState::start(&layout, &StateId::from("0"), &StateId::from("1")).unwrap();

        let (seen, _) = run_to_arrival(state, &config, &layout);
        for pair in seen.windows(2) {
            if pair[0].0 == pair[1].0 {
                assert!(pair[1].1 > pair[0].1);
            } else {
                assert_eq!(pair[1].1, 0.0);
            }
        }
    }

    #[test]
    fn test_missing_edge_is_fatal() {
        let layout = layout();
        let result = TokenState::start(&layout, &StateId::from("1"), &StateId::from("0"));
        assert!(matches!(result, Err(CoreError::NoEdge { .. })));
    }

    #[test]
    fn test_unknown_node_is_fatal() {
        let layout = layout();
        let result = TokenState::start(&layout, &StateId::from("9"), &StateId::from("0"));
        assert!(matches!(result, Err(CoreError::UnknownNode { .. })));
    }

    proptest! {
        #[test]
        fn prop_any_steps_reach_target(node_step in 0.01f64..=1.0, edge_step in 0.01f64..=1.0) {
            let layout = layout();
            let config = AnimationConfig {
                tick_interval_ms: 20,
                node_step,
                edge_step,
            };
            let state = TokenState::start(&layout, &StateId::from("0"), &StateId::from("1")).unwrap();

            let (seen, at) = run_to_arrival(state, &config, &layout);

            let mut phases: Vec<Phase> = seen.iter().map(|(p, _)| *p).collect();
            phases.dedup();
            prop_assert_eq!(phases, vec![Phase::FromNode, Phase::Edge, Phase::ToNode]);
            prop_assert!(seen.iter().all(|(_, e)| (0.0..1.0).contains(e)));
            prop_assert_eq!(at, layout.node_position(&StateId::from("1")).unwrap());
        }
    }
}
