//! Core types for call sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// Session ID type
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Call state (closed enumeration at the state-machine boundary)
///
/// `busy` is deliberately absent: a busy callee produces a notification but
/// never a stored status.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    Pending,
    Active,
    Rejected,
    Declined,
    Ended,
}

impl CallState {
    /// Whether this state is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Rejected | CallState::Declined | CallState::Ended)
    }

    /// Storage representation. Used only by store adapters.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            CallState::Pending => "pending",
            CallState::Active => "active",
            CallState::Rejected => "rejected",
            CallState::Declined => "declined",
            CallState::Ended => "ended",
        }
    }

    /// Parse the storage representation. Used only by store adapters.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CallState::Pending),
            "active" => Some(CallState::Active),
            "rejected" => Some(CallState::Rejected),
            "declined" => Some(CallState::Declined),
            "ended" => Some(CallState::Ended),
            _ => None,
        }
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// Why a call reached (or was reported as reaching) its end.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationReason {
    Ended,
    Declined,
    /// Notification-only: never persisted as a session status.
    Busy,
}

impl TerminationReason {
    /// The stored status this reason maps to, if it persists at all.
    pub fn stored_state(&self) -> Option<CallState> {
        match self {
            TerminationReason::Ended => Some(CallState::Ended),
            TerminationReason::Declined => Some(CallState::Declined),
            TerminationReason::Busy => None,
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TerminationReason::Ended => "ended",
            TerminationReason::Declined => "declined",
            TerminationReason::Busy => "busy",
        };
        write!(f, "{}", s)
    }
}

/// A call session binding a caller and a callee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    pub session_id: SessionId,
    pub caller_id: UserId,
    pub callee_id: UserId,
    pub state: CallState,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl CallSession {
    /// Create a fresh pending session. Participant validation is the
    /// state machine's job, not the constructor's.
    pub fn new(caller_id: UserId, callee_id: UserId) -> Self {
        Self {
            session_id: SessionId::new(),
            caller_id,
            callee_id,
            state: CallState::Pending,
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

/// The notification a terminal transition fans out to the session room.
///
/// Emitted by the state machine only after the store write succeeded, so
/// peers are never told a call ended while the store still shows it live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminationNotice {
    pub session_id: SessionId,
    pub reason: TerminationReason,
    pub message: String,
}

impl TerminationNotice {
    pub fn new(session_id: SessionId, reason: TerminationReason) -> Self {
        let message = match reason {
            TerminationReason::Ended => "Call ended",
            TerminationReason::Declined => "Call was declined",
            TerminationReason::Busy => "User is busy",
        };
        Self {
            session_id,
            reason,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_db_str_round_trip() {
        for state in [
            CallState::Pending,
            CallState::Active,
            CallState::Rejected,
            CallState::Declined,
            CallState::Ended,
        ] {
            assert_eq!(CallState::from_db_str(state.as_db_str()), Some(state));
        }
        assert_eq!(CallState::from_db_str("busy"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CallState::Pending.is_terminal());
        assert!(!CallState::Active.is_terminal());
        assert!(CallState::Rejected.is_terminal());
        assert!(CallState::Declined.is_terminal());
        assert!(CallState::Ended.is_terminal());
    }

    #[test]
    fn test_busy_never_persists() {
        assert_eq!(TerminationReason::Busy.stored_state(), None);
        assert_eq!(TerminationReason::Ended.stored_state(), Some(CallState::Ended));
        assert_eq!(
            TerminationReason::Declined.stored_state(),
            Some(CallState::Declined)
        );
    }
}
