//! Animated traveler.

use crate::config::{AnimationConfig, ConfigError};
use crate::renderer::Renderer;
use crate::token::{Advance, TokenState};
use crate::ui::TravelerUi;
use async_trait::async_trait;
use dfaviz_core::{Automaton, CoreError, StateId, Traveler};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Default)]
struct StopState {
    stopped: AtomicBool,
    notify: Notify,
}

/// Requests that a [`VisTraveler`] abandon its run.
///
/// A stopped traveler never commits the transition it was animating; its
/// current state stays at the last node it fully arrived at.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopState>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::Relaxed);
        self.inner.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Relaxed)
    }
}

/// A traveler that animates every transition on a rendered graph.
///
/// Each [`Traveler::transit_to`] runs a tick loop that moves the token through
/// the three [`TokenState`] phases, reporting positions and labels to the UI,
/// and resolves once the token reaches the target node.
pub struct VisTraveler<R, U> {
    current: StateId,
    automaton: Arc<Automaton>,
    renderer: Arc<R>,
    ui: U,
    config: AnimationConfig,
    stop: StopHandle,
}

impl<R: Renderer, U: TravelerUi> VisTraveler<R, U> {
    /// Creates a traveler sitting on the automaton's initial state.
    ///
    /// Fails if `config` has a zero tick interval or a step outside (0, 1],
    /// either of which would keep a transit from ever completing.
    pub fn new(
        automaton: Arc<Automaton>,
        renderer: Arc<R>,
        ui: U,
        config: AnimationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            current: automaton.init_state().clone(),
            automaton,
            renderer,
            ui,
            config,
            stop: StopHandle::default(),
        })
    }

    /// Returns a handle that stops this traveler.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Label shown when the token enters `state`.
    fn label_for(&self, state: &TokenState, next: &StateId) -> Result<String, CoreError> {
        match state {
            TokenState::InEdge { .. } => {
                let symbol = self.automaton.symbol_to(&self.current, next).ok_or_else(|| {
                    CoreError::NoSymbol {
                        from: self.current.to_string(),
                        to: next.to_string(),
                    }
                })?;
                Ok(format!("Read {}", symbol))
            }
            TokenState::InFromNode { .. } => Ok(format!("Current {}", self.current)),
            TokenState::InToNode { .. } => Ok(format!("Current {}", next)),
        }
    }
}

#[async_trait]
impl<R: Renderer, U: TravelerUi> Traveler for VisTraveler<R, U> {
    async fn transit_to(&mut self, next: &StateId) -> Result<(), CoreError> {
        if self.stop.is_stopped() {
            return Err(CoreError::Stopped);
        }

        let renderer = Arc::clone(&self.renderer);
        let mut state = TokenState::start(&*renderer, &self.current, next)?;

        tracing::debug!(from = %self.current, to = %next, "transit started");

        let mut ticker = tokio::time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.stop.inner.notify.notified() => {}
                _ = ticker.tick() => {}
            }
            if self.stop.is_stopped() {
                tracing::debug!(at = %self.current, "transit stopped");
                return Err(CoreError::Stopped);
            }

            let pos = state.screen_position(&*renderer)?;
            self.ui.on_token_move(pos).await;

            match state.advance(&self.config, &*renderer)? {
                Advance::Moved(moved) => state = moved,
                Advance::Entered(entered) => {
                    tracing::trace!(phase = ?entered.phase(), "phase changed");
                    let label = self.label_for(&entered, next)?;
                    self.ui.on_current_symbol_change(&label).await;
                    state = entered;
                }
                Advance::Arrived { at } => {
                    self.ui.on_token_move(renderer.to_screen(at)).await;
                    self.current = next.clone();
                    tracing::debug!(at = %self.current, "transit complete");
                    return Ok(());
                }
            }
        }
    }

    fn current(&self) -> &StateId {
        &self.current
    }

    async fn finish(&mut self) {
        self.ui.on_finish().await;
    }

    async fn error(&mut self, message: &str) {
        self.ui.on_error(message).await;
    }
}
