//! Error types for session-core

use crate::types::{CallState, SessionId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("User {user} is not allowed to perform this transition on session {session}")]
    Unauthorized { session: SessionId, user: i64 },

    #[error("Invalid transition from {from} on session {session}")]
    InvalidTransition { session: SessionId, from: CallState },

    #[error("Session {0} is already in a terminal state")]
    AlreadyTerminal(SessionId),

    #[error("A call needs two distinct, existing participants")]
    InvalidParticipants,

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

impl From<sqlx::Error> for SessionError {
    fn from(e: sqlx::Error) -> Self {
        SessionError::StoreUnavailable(e.to_string())
    }
}
