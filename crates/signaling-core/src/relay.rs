//! Signaling relay
//!
//! The event router. Negotiation payloads are forwarded without inspection;
//! lifecycle events go through the call state machine (and therefore the
//! session store) before any notification is fanned out. Errors surface to
//! the originating endpoint only; the room never hears about them.

use std::sync::Arc;

use ringline_session_core::{CallStateMachine, SessionId, TerminationNotice, TerminationReason};
use tracing::{debug, warn};

use crate::endpoint::{EndpointHandle, EndpointId};
use crate::errors::{Result, SignalingError};
use crate::events::{ClientEvent, ServerEvent, SignalPayload};
use crate::registry::{ConnectionRegistry, RoomId};

pub struct SignalingRelay {
    registry: Arc<ConnectionRegistry>,
    machine: Arc<CallStateMachine>,
}

impl SignalingRelay {
    pub fn new(registry: Arc<ConnectionRegistry>, machine: Arc<CallStateMachine>) -> Self {
        Self { registry, machine }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Route one inbound event from a connected endpoint.
    pub async fn handle_event(&self, endpoint: &EndpointHandle, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::JoinUserRoom => {
                self.registry.join(RoomId::user(endpoint.user_id), endpoint);
                Ok(())
            }

            ClientEvent::JoinCall { session_id } => {
                let room = RoomId::session(session_id);
                self.registry.join(room.clone(), endpoint);
                self.broadcast_except(
                    &room,
                    endpoint.id,
                    ServerEvent::UserJoined {
                        user: endpoint.username.clone(),
                    },
                );
                Ok(())
            }

            ClientEvent::LeaveCall { session_id } => {
                let room = RoomId::session(session_id);
                self.registry.leave(&room, endpoint.id);
                self.broadcast(
                    &room,
                    ServerEvent::UserLeft {
                        user: endpoint.username.clone(),
                    },
                );
                Ok(())
            }

            ClientEvent::Offer(payload) => {
                self.forward_negotiation(endpoint, payload, ServerEvent::Offer)
            }
            ClientEvent::Answer(payload) => {
                self.forward_negotiation(endpoint, payload, ServerEvent::Answer)
            }
            ClientEvent::IceCandidate(payload) => {
                self.forward_negotiation(endpoint, payload, ServerEvent::IceCandidate)
            }

            ClientEvent::IncomingCall {
                session_id,
                callee_id,
                caller_name,
            } => {
                // The callee has not joined the session room at ring time,
                // so this targets the user-room namespace. Caller identity
                // comes from the authenticated endpoint, not the payload.
                debug!(
                    %session_id, callee_id,
                    "Ringing callee via user room"
                );
                self.broadcast(
                    &RoomId::user(callee_id),
                    ServerEvent::IncomingCallNotification {
                        session_id,
                        caller_name,
                        caller_id: endpoint.user_id,
                    },
                );
                Ok(())
            }

            ClientEvent::CallAnswered(payload) => {
                let room = RoomId::session(payload.session_id.clone());
                self.broadcast_except(&room, endpoint.id, ServerEvent::CallAnswered(payload));
                Ok(())
            }
            ClientEvent::CallRejected(payload) => {
                let room = RoomId::session(payload.session_id.clone());
                self.broadcast_except(&room, endpoint.id, ServerEvent::CallRejected(payload));
                Ok(())
            }

            ClientEvent::CallEnded { session_id } => {
                self.terminate(session_id, TerminationReason::Ended).await
            }
            ClientEvent::CallDeclined { session_id } => {
                self.terminate(session_id, TerminationReason::Declined).await
            }

            ClientEvent::UserBusy { session_id } => {
                // Notification-only: the callee never agreed to join this
                // session, so nothing is persisted.
                let notice = TerminationNotice::new(session_id.clone(), TerminationReason::Busy);
                self.broadcast(&RoomId::session(session_id), notice.into());
                Ok(())
            }
        }
    }

    /// Disconnect teardown. Must run exactly once per endpoint; a vanished
    /// endpoint that skips this leaks phantom broadcast targets.
    pub fn handle_disconnect(&self, endpoint: &EndpointHandle) {
        self.registry.leave_all(endpoint.id);
        debug!(endpoint = %endpoint.id, user = %endpoint.username, "Endpoint disconnected");
    }

    /// Terminal lifecycle event: store write first, then fan out to the
    /// full session room, sender included, so every party converges on the
    /// same terminal state.
    async fn terminate(&self, session_id: SessionId, reason: TerminationReason) -> Result<()> {
        let notice = self.machine.terminate(&session_id, reason).await?;
        self.broadcast(&RoomId::session(session_id), notice.into());
        Ok(())
    }

    /// Forward an opaque negotiation payload to the other occupants of the
    /// session room. The sender is excluded: each side already applied its
    /// own local description.
    fn forward_negotiation(
        &self,
        endpoint: &EndpointHandle,
        payload: SignalPayload,
        wrap: fn(SignalPayload) -> ServerEvent,
    ) -> Result<()> {
        let room = RoomId::session(payload.session_id.clone());
        if !self.registry.is_member(&room, endpoint.id) {
            warn!(
                endpoint = %endpoint.id, user = endpoint.user_id, %room,
                "Negotiation payload from non-member"
            );
            return Err(SignalingError::NotRoomMember(room.to_string()));
        }
        self.broadcast_except(&room, endpoint.id, wrap(payload));
        Ok(())
    }

    /// Deliver to every current member. An empty room delivers to nobody;
    /// the other party may simply not have connected yet.
    fn broadcast(&self, room: &RoomId, event: ServerEvent) {
        for member in self.registry.members(room) {
            member.send(event.clone());
        }
    }

    fn broadcast_except(&self, room: &RoomId, sender: EndpointId, event: ServerEvent) {
        for member in self.registry.members(room) {
            if member.id != sender {
                member.send(event.clone());
            }
        }
    }
}
