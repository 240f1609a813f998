//! Endpoint handles
//!
//! An endpoint is one connected transport (one WebSocket). The handle pairs
//! the authenticated identity with the endpoint's outbound queue; whoever
//! holds a clone can enqueue messages without knowing anything about the
//! socket behind it.

use ringline_session_core::UserId;
use tokio::sync::mpsc;
use tracing::debug;

use crate::events::ServerEvent;

/// Endpoint ID type
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct EndpointId(pub uuid::Uuid);

impl EndpointId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live, authenticated endpoint.
#[derive(Debug, Clone)]
pub struct EndpointHandle {
    pub id: EndpointId,
    pub user_id: UserId,
    pub username: String,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl EndpointHandle {
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Self {
            id: EndpointId::new(),
            user_id,
            username: username.into(),
            tx,
        };
        (handle, rx)
    }

    /// Enqueue an event for this endpoint. A closed queue (endpoint already
    /// gone) is logged and absorbed: one dead recipient must not disturb a
    /// broadcast to the others.
    pub fn send(&self, event: ServerEvent) {
        if self.tx.send(event).is_err() {
            debug!(endpoint = %self.id, "Dropping event for closed endpoint");
        }
    }
}
