//! The query surface a traveler needs from whatever draws the graph.

use crate::geometry::{EdgeGeometry, Position};
use dfaviz_core::{CoreError, StateId};

/// Identifier of a drawn edge.
pub type EdgeId = usize;

/// A drawn edge and the nodes it connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub from: StateId,
    pub to: StateId,
}

/// Read-only access to a rendered automaton graph.
///
/// Node positions and edge geometry are in graph space; [`Renderer::to_screen`]
/// converts to screen space.
pub trait Renderer: Send + Sync {
    type Edge: EdgeGeometry;

    /// Graph-space position of a node's center.
    fn node_position(&self, node: &StateId) -> Option<Position>;

    /// Edges touching `node`, in either direction.
    fn connected_edges(&self, node: &StateId) -> Vec<EdgeRef>;

    /// Drawable geometry of an edge.
    fn edge_geometry(&self, edge: EdgeId) -> Option<&Self::Edge>;

    /// Converts a graph-space position to screen space.
    fn to_screen(&self, pos: Position) -> Position;

    /// Finds the single edge drawn from `from` to `to`.
    ///
    /// Zero or several matching edges mean the drawing does not match the
    /// automaton.
    fn edge_between(&self, from: &StateId, to: &StateId) -> Result<EdgeId, CoreError> {
        let matching: Vec<EdgeId> = self
            .connected_edges(from)
            .into_iter()
            .filter(|e| &e.from == from && &e.to == to)
            .map(|e| e.id)
            .collect();

        match matching.as_slice() {
            [id] => Ok(*id),
            [] => Err(CoreError::NoEdge {
                from: from.to_string(),
                to: to.to_string(),
            }),
            many => Err(CoreError::AmbiguousEdge {
                from: from.to_string(),
                to: to.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Like [`Renderer::node_position`], failing for unknown nodes.
    fn require_node(&self, node: &StateId) -> Result<Position, CoreError> {
        self.node_position(node).ok_or_else(|| CoreError::UnknownNode {
            node: node.to_string(),
        })
    }

    /// Like [`Renderer::edge_geometry`], failing for unknown edges.
    fn require_edge(&self, edge: EdgeId) -> Result<&Self::Edge, CoreError> {
        self.edge_geometry(edge)
            .ok_or(CoreError::UnknownEdge { edge })
    }
}
