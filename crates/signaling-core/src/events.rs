//! Signaling wire messages
//!
//! Frames are JSON objects of the form `{"event": <name>, "data": {...}}`.
//! The event names and payload fields are a compatibility surface; clients
//! in the field depend on them.

use ringline_session_core::{SessionId, TerminationNotice, TerminationReason, UserId};
use serde::{Deserialize, Serialize};

/// Routed-but-opaque payload: the relay reads `session_id` and forwards the
/// remaining fields verbatim, codecs and all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalPayload {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// Messages clients send to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinUserRoom,
    JoinCall {
        session_id: SessionId,
    },
    LeaveCall {
        session_id: SessionId,
    },
    Offer(SignalPayload),
    Answer(SignalPayload),
    IceCandidate(SignalPayload),
    IncomingCall {
        session_id: SessionId,
        callee_id: UserId,
        caller_name: String,
    },
    CallAnswered(SignalPayload),
    CallRejected(SignalPayload),
    CallEnded {
        session_id: SessionId,
    },
    CallDeclined {
        session_id: SessionId,
    },
    UserBusy {
        session_id: SessionId,
    },
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    UserJoined {
        user: String,
    },
    UserLeft {
        user: String,
    },
    Offer(SignalPayload),
    Answer(SignalPayload),
    IceCandidate(SignalPayload),
    IncomingCallNotification {
        session_id: SessionId,
        caller_name: String,
        caller_id: UserId,
    },
    CallAnswered(SignalPayload),
    CallRejected(SignalPayload),
    CallTerminated {
        session_id: SessionId,
        reason: TerminationReason,
        message: String,
    },
    /// Delivered to the originating endpoint only, never broadcast.
    Error {
        message: String,
    },
}

impl From<TerminationNotice> for ServerEvent {
    fn from(notice: TerminationNotice) -> Self {
        ServerEvent::CallTerminated {
            session_id: notice.session_id,
            reason: notice.reason,
            message: notice.message,
        }
    }
}
