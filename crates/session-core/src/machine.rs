//! Call state machine
//!
//! One authority for every status transition, whether it was triggered over
//! the WebSocket relay or the REST surface. Each mutating operation performs
//! a precondition check, a compare-and-swap store write, and only then hands
//! back whatever notification the caller is supposed to fan out.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::errors::{Result, SessionError};
use crate::store::SessionStore;
use crate::types::{CallSession, CallState, SessionId, TerminationNotice, TerminationReason, UserId};

/// The slice of the identity subsystem the state machine needs: existence
/// checks for call participants.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve_user(&self, user_id: UserId) -> Result<bool>;
}

pub struct CallStateMachine {
    store: Arc<dyn SessionStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl CallStateMachine {
    pub fn new(store: Arc<dyn SessionStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Create a new pending session between two distinct, existing users.
    pub async fn create(&self, caller_id: UserId, callee_id: UserId) -> Result<CallSession> {
        if caller_id == callee_id {
            return Err(SessionError::InvalidParticipants);
        }
        if !self.identity.resolve_user(caller_id).await?
            || !self.identity.resolve_user(callee_id).await?
        {
            return Err(SessionError::InvalidParticipants);
        }

        let session = CallSession::new(caller_id, callee_id);
        self.store.insert(&session).await?;
        info!(
            session_id = %session.session_id,
            caller_id, callee_id, "Created pending call session"
        );
        Ok(session)
    }

    /// Callee accepts a pending call: `pending -> active`.
    pub async fn answer(&self, session_id: &SessionId, acting_user: UserId) -> Result<CallSession> {
        let session = self.lookup(session_id).await?;
        if acting_user != session.callee_id {
            warn!(
                session_id = %session_id,
                acting_user, "Answer attempt by non-callee"
            );
            return Err(SessionError::Unauthorized {
                session: session_id.clone(),
                user: acting_user,
            });
        }
        self.transition(&session, CallState::Pending, CallState::Active, false)
            .await?;
        info!(session_id = %session_id, "Call answered");
        self.lookup(session_id).await
    }

    /// Callee rejects a pending call: `pending -> rejected`, terminal.
    pub async fn reject(&self, session_id: &SessionId, acting_user: UserId) -> Result<CallSession> {
        let session = self.lookup(session_id).await?;
        if acting_user != session.callee_id {
            warn!(
                session_id = %session_id,
                acting_user, "Reject attempt by non-callee"
            );
            return Err(SessionError::Unauthorized {
                session: session_id.clone(),
                user: acting_user,
            });
        }
        self.transition(&session, CallState::Pending, CallState::Rejected, true)
            .await?;
        info!(session_id = %session_id, "Call rejected");
        self.lookup(session_id).await
    }

    /// Terminate a pending or active call with `ended` or `declined`.
    ///
    /// The returned notice is only produced after the store write committed;
    /// a failed write means no notification is fanned out.
    pub async fn terminate(
        &self,
        session_id: &SessionId,
        reason: TerminationReason,
    ) -> Result<TerminationNotice> {
        let Some(new_state) = reason.stored_state() else {
            // Busy never persists; the relay builds that notice itself.
            return Ok(TerminationNotice::new(session_id.clone(), reason));
        };

        let session = self.lookup(session_id).await?;
        if session.is_terminal() {
            return Err(SessionError::AlreadyTerminal(session.session_id.clone()));
        }
        self.transition(&session, session.state, new_state, true).await?;
        info!(session_id = %session_id, %reason, "Call terminated");
        Ok(TerminationNotice::new(session_id.clone(), reason))
    }

    pub async fn lookup(&self, session_id: &SessionId) -> Result<CallSession> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))
    }

    /// CAS transition with the error mapping shared by every operation:
    /// a lost race re-reads the row and reports `AlreadyTerminal` or
    /// `InvalidTransition` depending on where the winner left it.
    async fn transition(
        &self,
        session: &CallSession,
        expected: CallState,
        new: CallState,
        terminal: bool,
    ) -> Result<()> {
        if session.state != expected {
            return Err(self.stale_state_error(session));
        }
        let ended_at = terminal.then(Utc::now);
        let swapped = self
            .store
            .update_status(&session.session_id, expected, new, ended_at)
            .await?;
        if swapped {
            return Ok(());
        }
        let current = self.lookup(&session.session_id).await?;
        Err(self.stale_state_error(&current))
    }

    fn stale_state_error(&self, session: &CallSession) -> SessionError {
        if session.is_terminal() {
            SessionError::AlreadyTerminal(session.session_id.clone())
        } else {
            SessionError::InvalidTransition {
                session: session.session_id.clone(),
                from: session.state,
            }
        }
    }
}
