//! # dfaviz-vis
//!
//! Animation side of dfaviz.
//!
//! This crate provides:
//! - The `Renderer` query surface and a static circular `GraphLayout`
//! - The three-phase token state machine
//! - `VisTraveler`, which animates each transition before resolving it
//! - The UI notification sink and a channel-backed implementation
//! - Animation and layout configuration

pub mod config;
pub mod geometry;
pub mod layout;
pub mod renderer;
pub mod token;
pub mod traveler;
pub mod ui;

pub use config::{AnimationConfig, Config, ConfigError, LayoutConfig};
pub use geometry::{EdgeGeometry, EdgeShape, Position};
pub use layout::{GraphLayout, NodePlacement};
pub use renderer::{EdgeId, EdgeRef, Renderer};
pub use token::{Advance, Phase, TokenState};
pub use traveler::{StopHandle, VisTraveler};
pub use ui::{ChannelUi, TravelerUi, UiEvent};
