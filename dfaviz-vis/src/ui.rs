//! Notifications from a traveler to whatever displays it.

use crate::geometry::Position;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One-way callbacks a [`crate::VisTraveler`] reports progress through.
///
/// Implementations must deliver notifications in the order they are made.
#[async_trait]
pub trait TravelerUi: Send + Sync {
    /// The token moved to a screen-space position.
    async fn on_token_move(&self, pos: Position);

    /// The run was accepted.
    async fn on_finish(&self);

    /// The run ended in error.
    async fn on_error(&self, message: &str);

    /// The "current symbol" label changed.
    async fn on_current_symbol_change(&self, label: &str);
}

/// A notification as sent through a [`ChannelUi`].
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    TokenMoved(Position),
    Finished,
    Errored(String),
    SymbolChanged(String),
}

impl UiEvent {
    /// Status bar text for this event, if it changes the status.
    pub fn status_text(&self) -> Option<String> {
        match self {
            UiEvent::TokenMoved(_) => None,
            UiEvent::Finished => Some("Accepted".to_string()),
            UiEvent::Errored(msg) => Some(format!("Not accepted: {}", msg)),
            UiEvent::SymbolChanged(label) => Some(format!("Current: {}", label)),
        }
    }

    /// Returns true for the event that ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UiEvent::Finished | UiEvent::Errored(_))
    }
}

/// Forwards notifications over an unbounded channel, preserving order.
#[derive(Debug, Clone)]
pub struct ChannelUi {
    sender: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelUi {
    /// Creates a sink and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: UiEvent) {
        // Ignore send errors (receiver dropped)
        let _ = self.sender.send(event);
    }
}

#[async_trait]
impl TravelerUi for ChannelUi {
    async fn on_token_move(&self, pos: Position) {
        self.send(UiEvent::TokenMoved(pos));
    }

    async fn on_finish(&self) {
        self.send(UiEvent::Finished);
    }

    async fn on_error(&self, message: &str) {
        self.send(UiEvent::Errored(message.to_string()));
    }

    async fn on_current_symbol_change(&self, label: &str) {
        self.send(UiEvent::SymbolChanged(label.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(UiEvent::Finished.status_text().unwrap(), "Accepted");
        assert_eq!(
            UiEvent::Errored("Cannot find next state".into())
                .status_text()
                .unwrap(),
            "Not accepted: Cannot find next state"
        );
        assert_eq!(
            UiEvent::SymbolChanged("Read a".into()).status_text().unwrap(),
            "Current: Read a"
        );
        assert!(UiEvent::TokenMoved(Position::default())
            .status_text()
            .is_none());
    }

    #[tokio::test]
    async fn test_channel_preserves_order() {
        let (ui, mut rx) = ChannelUi::new();
        ui.on_token_move(Position::new(1.0, 2.0)).await;
        ui.on_current_symbol_change("Read a").await;
        ui.on_finish().await;
        drop(ui);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                UiEvent::TokenMoved(Position::new(1.0, 2.0)),
                UiEvent::SymbolChanged("Read a".into()),
                UiEvent::Finished,
            ]
        );
        assert!(events[2].is_terminal());
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped_is_ignored() {
        let (ui, rx) = ChannelUi::new();
        drop(rx);
        ui.on_error("gone").await;
    }
}
