//! Delivery of watch loop updates
//!
//! Publishing is synchronous with respect to the loop: it awaits the
//! subscriber before moving on, so a slow subscriber throttles polling.

use crate::error::WatchError;
use crate::state::{StateModel, StateSnapshot};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// Receives state and errors from [`StateModel::watch`]
#[async_trait]
pub trait Subscriber: Send {
    /// Called with the current state; the model must only be read
    async fn on_state(&mut self, state: &StateModel);

    /// Called when a status or metrics call of the loop failed
    async fn on_error(&mut self, error: &WatchError);
}

/// Event passed to closure subscribers
#[derive(Debug, Clone, Copy)]
pub enum WatchEvent<'a> {
    State(&'a StateModel),
    Error(&'a WatchError),
}

#[async_trait]
impl<F> Subscriber for F
where
    F: for<'a> FnMut(WatchEvent<'a>) + Send,
{
    async fn on_state(&mut self, state: &StateModel) {
        (*self)(WatchEvent::State(state))
    }

    async fn on_error(&mut self, error: &WatchError) {
        (*self)(WatchEvent::Error(error))
    }
}

/// Owned update sent over a channel
#[derive(Debug, Clone)]
pub enum WatchUpdate {
    Snapshot(Box<StateSnapshot>),
    Error(WatchError),
}

/// Forwards updates to a bounded channel
///
/// A full channel holds the loop until the receiver catches up. When the
/// receiver is gone the model is told to stop.
#[derive(Debug, Clone)]
pub struct ChannelSubscriber {
    sender: mpsc::Sender<WatchUpdate>,
}

impl ChannelSubscriber {
    pub fn new(sender: mpsc::Sender<WatchUpdate>) -> Self {
        Self { sender }
    }

    /// Creates a subscriber and the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<WatchUpdate>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn on_state(&mut self, state: &StateModel) {
        let update = WatchUpdate::Snapshot(Box::new(state.snapshot()));
        if self.sender.send(update).await.is_err() {
            debug!("update receiver dropped, stopping watch loop");
            state.stop();
        }
    }

    async fn on_error(&mut self, error: &WatchError) {
        if self.sender.send(WatchUpdate::Error(error.clone())).await.is_err() {
            debug!("update receiver dropped");
        }
    }
}
