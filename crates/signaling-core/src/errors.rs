//! Error types for signaling-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalingError {
    #[error("Malformed event: {0}")]
    BadEvent(String),

    #[error("Endpoint is not a member of the session room {0}")]
    NotRoomMember(String),

    #[error(transparent)]
    Session(#[from] ringline_session_core::SessionError),
}

pub type Result<T> = std::result::Result<T, SignalingError>;
