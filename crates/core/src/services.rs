//! Collaborators injected into the engine

use crate::clock::{Clock, SystemClock};
use nodewatch_rpc_client::{NodeApi, PublicFeed};
use std::sync::Arc;

/// Capabilities handed to every engine component at construction
#[derive(Clone)]
pub struct NodeServices {
    /// Daemon API
    pub node: Arc<dyn NodeApi>,
    /// Public catchpoint and release feeds
    pub feed: Arc<dyn PublicFeed>,
    /// Wall clock used for sampling and expiry prediction
    pub clock: Arc<dyn Clock>,
}

impl NodeServices {
    /// Services backed by the system clock
    pub fn new(node: Arc<dyn NodeApi>, feed: Arc<dyn PublicFeed>) -> Self {
        Self {
            node,
            feed,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for NodeServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeServices").finish_non_exhaustive()
    }
}
