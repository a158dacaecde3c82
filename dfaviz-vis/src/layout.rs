//! Static circular layout of an automaton graph.
//!
//! Nodes sit on a circle in declaration order. Each distinct (from, to)
//! pair gets exactly one edge: straight when only one direction exists,
//! bent when both do, and an arc for self loops. Edge ends are trimmed to the
//! node boundary.

use crate::config::LayoutConfig;
use crate::geometry::{EdgeShape, Position};
use crate::renderer::{EdgeId, EdgeRef, Renderer};
use dfaviz_core::{Automaton, StateId};
use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// A drawn edge.
#[derive(Debug, Clone)]
pub struct LaidOutEdge {
    pub edge: EdgeRef,
    pub label: String,
    pub shape: EdgeShape,
}

/// A node and where it ended up on screen.
#[derive(Debug, Clone, Serialize)]
pub struct NodePlacement {
    pub id: StateId,
    pub screen: Position,
    pub accepting: bool,
}

/// Circular layout of one automaton.
#[derive(Debug, Clone)]
pub struct GraphLayout {
    nodes: HashMap<StateId, Position>,
    edges: Vec<LaidOutEdge>,
    config: LayoutConfig,
}

impl GraphLayout {
    /// Lays out every state and transition of `automaton`.
    pub fn from_automaton(automaton: &Automaton, config: &LayoutConfig) -> Self {
        let states = automaton.states();
        let count = states.len();

        let nodes: HashMap<StateId, Position> = states
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let pos = if count == 1 {
                    Position::default()
                } else {
                    let angle = -FRAC_PI_2 + TAU * i as f64 / count as f64;
                    Position::new(config.radius * angle.cos(), config.radius * angle.sin())
                };
                (id.clone(), pos)
            })
            .collect();

        let specs = automaton.edges();
        let mut edges = Vec::with_capacity(specs.len());
        for (id, spec) in specs.iter().enumerate() {
            let from = nodes[&spec.from];
            let to = nodes[&spec.to];

            let shape = if spec.is_loop() {
                loop_shape(from, config)
            } else if specs.iter().any(|o| o.from == spec.to && o.to == spec.from) {
                curve_shape(from, to, config)
            } else {
                EdgeShape::Line {
                    from: from.toward(to, config.node_radius),
                    to: to.toward(from, config.node_radius),
                }
            };

            edges.push(LaidOutEdge {
                edge: EdgeRef {
                    id,
                    from: spec.from.clone(),
                    to: spec.to.clone(),
                },
                label: spec.label(),
                shape,
            });
        }

        tracing::debug!(nodes = nodes.len(), edges = edges.len(), "graph laid out");

        Self {
            nodes,
            edges,
            config: config.clone(),
        }
    }

    pub fn edges(&self) -> &[LaidOutEdge] {
        &self.edges
    }

    /// Screen positions of every node of `automaton`, in declaration order.
    pub fn placements(&self, automaton: &Automaton) -> Vec<NodePlacement> {
        automaton
            .states()
            .iter()
            .filter_map(|id| {
                self.nodes.get(id).map(|pos| NodePlacement {
                    id: id.clone(),
                    screen: self.to_screen(*pos),
                    accepting: automaton.is_accepting(id),
                })
            })
            .collect()
    }
}

fn curve_shape(from: Position, to: Position, config: &LayoutConfig) -> EdgeShape {
    let mid = from.lerp(to, 0.5);
    let len = from.distance(to).max(f64::EPSILON);
    // Left-hand normal of from -> to; the reverse edge bends the other way.
    let normal = Position::new(-(to.y - from.y) / len, (to.x - from.x) / len);
    let control = Position::new(
        mid.x + normal.x * config.curve_bend,
        mid.y + normal.y * config.curve_bend,
    );
    EdgeShape::Curve {
        from: from.toward(control, config.node_radius),
        control,
        to: to.toward(control, config.node_radius),
    }
}

fn loop_shape(node: Position, config: &LayoutConfig) -> EdgeShape {
    // Loops point away from the layout center, or up for a lone node.
    let outward = if node.distance(Position::default()) <= f64::EPSILON {
        -FRAC_PI_2
    } else {
        node.y.atan2(node.x)
    };
    let rn = config.node_radius;
    let rl = config.loop_radius;
    let center = Position::new(node.x + rn * outward.cos(), node.y + rn * outward.sin());

    // Angle at the loop center between the node center and the points where
    // the two circles cross.
    let phi = if rn > 0.0 {
        (rl / (2.0 * rn)).min(1.0).acos()
    } else {
        0.0
    };

    EdgeShape::Loop {
        center,
        radius: rl,
        start_angle: outward + PI + phi,
        sweep: TAU - 2.0 * phi,
    }
}

impl Renderer for GraphLayout {
    type Edge = EdgeShape;

    fn node_position(&self, node: &StateId) -> Option<Position> {
        self.nodes.get(node).copied()
    }

    fn connected_edges(&self, node: &StateId) -> Vec<EdgeRef> {
        self.edges
            .iter()
            .filter(|e| &e.edge.from == node || &e.edge.to == node)
            .map(|e| e.edge.clone())
            .collect()
    }

    fn edge_geometry(&self, edge: EdgeId) -> Option<&EdgeShape> {
        self.edges.get(edge).map(|e| &e.shape)
    }

    fn to_screen(&self, pos: Position) -> Position {
        Position::new(
            pos.x * self.config.scale + self.config.offset_x,
            pos.y * self.config.scale + self.config.offset_y,
        )
    }
}
