//! Session storage capability and adapters
//!
//! The state machine talks to a `SessionStore`; everything it needs from a
//! backing store is insert, read-by-id and a compare-and-swap status update.
//! Status strings exist only inside the adapters; the rest of the crate
//! sees the `CallState` enumeration.

mod memory;
mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use crate::errors::Result;
use crate::types::{CallSession, CallState, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable record of call sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a freshly created session.
    async fn insert(&self, session: &CallSession) -> Result<()>;

    /// Read a session by id. `None` if absent.
    async fn get(&self, session_id: &SessionId) -> Result<Option<CallSession>>;

    /// Compare-and-swap status update: the write happens only if the stored
    /// status still equals `expected`. Returns whether the swap happened.
    ///
    /// This is what keeps a concurrent answer/reject pair from both
    /// succeeding: the second writer sees `false` and re-reads.
    async fn update_status(
        &self,
        session_id: &SessionId,
        expected: CallState,
        new: CallState,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<bool>;
}
