//! In-memory session store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::SessionStore;
use crate::errors::{Result, SessionError};
use crate::types::{CallSession, CallState, SessionId};

/// Session storage backed by a process-local map.
///
/// Used by tests and single-node development setups; the lock makes each
/// read-modify-write atomic, which is all the CAS contract requires.
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, CallSession>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &CallSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.session_id) {
            return Err(SessionError::StoreUnavailable(format!(
                "session {} already exists",
                session.session_id
            )));
        }
        sessions.insert(session.session_id.clone(), session.clone());
        debug!("Inserted session {}", session.session_id);
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<CallSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn update_status(
        &self,
        session_id: &SessionId,
        expected: CallState,
        new: CallState,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) if session.state == expected => {
                session.state = new;
                if ended_at.is_some() {
                    session.ended_at = ended_at;
                }
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }
}
