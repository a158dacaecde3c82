//! Positions and edge shapes.

use serde::{Deserialize, Serialize};

/// A 2D position, in graph space or screen space depending on context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation. `t = 0` yields `self`, `t = 1` yields `to`
    /// exactly.
    pub fn lerp(self, to: Position, t: f64) -> Position {
        Position {
            x: self.x * (1.0 - t) + to.x * t,
            y: self.y * (1.0 - t) + to.y * t,
        }
    }

    pub fn distance(self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Moves `self` by `amount` toward `target`. Stays put if the two
    /// coincide.
    pub fn toward(self, target: Position, amount: f64) -> Position {
        let d = self.distance(target);
        if d <= f64::EPSILON {
            return self;
        }
        self.lerp(target, amount / d)
    }
}

/// Parametric geometry of a drawn edge.
pub trait EdgeGeometry {
    /// Point at normalized position `t` in `[0, 1]` along the edge.
    fn point_at(&self, t: f64) -> Position;

    fn start(&self) -> Position {
        self.point_at(0.0)
    }

    fn end(&self) -> Position {
        self.point_at(1.0)
    }
}

/// The shapes [`crate::layout::GraphLayout`] draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeShape {
    /// Straight segment.
    Line { from: Position, to: Position },
    /// Quadratic Bézier, used when both directions between two nodes exist.
    Curve {
        from: Position,
        control: Position,
        to: Position,
    },
    /// Self loop: an arc of a circle, `sweep` radians from `start_angle`.
    Loop {
        center: Position,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

impl EdgeGeometry for EdgeShape {
    fn point_at(&self, t: f64) -> Position {
        let t = t.clamp(0.0, 1.0);
        match *self {
            EdgeShape::Line { from, to } => from.lerp(to, t),
            EdgeShape::Curve { from, control, to } => {
                let a = from.lerp(control, t);
                let b = control.lerp(to, t);
                a.lerp(b, t)
            }
            EdgeShape::Loop {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let angle = start_angle + sweep * t;
                Position::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            }
        }
    }
}
