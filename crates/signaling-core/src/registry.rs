//! Connection registry
//!
//! In-memory bookkeeping of which endpoints currently occupy which rooms.
//! Two namespaces exist on purpose: a user room (`user:<id>`) reaches a
//! party that has not yet joined any call, a session room (`session:<id>`)
//! reaches the parties of one call. Membership mutations are serialized per
//! room by the map's sharding; there is no global lock.

use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use ringline_session_core::{SessionId, UserId};
use tracing::debug;

use crate::endpoint::{EndpointHandle, EndpointId};

/// Room identifier: one of the two namespaces.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum RoomId {
    User(UserId),
    Session(SessionId),
}

impl RoomId {
    pub fn user(id: UserId) -> Self {
        RoomId::User(id)
    }

    pub fn session(id: SessionId) -> Self {
        RoomId::Session(id)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomId::User(id) => write!(f, "user:{}", id),
            RoomId::Session(id) => write!(f, "session:{}", id),
        }
    }
}

/// Registry of live room memberships.
pub struct ConnectionRegistry {
    /// Room -> member handles
    rooms: DashMap<RoomId, HashMap<EndpointId, EndpointHandle>>,
    /// Endpoint -> rooms it belongs to (for disconnect cleanup)
    memberships: DashMap<EndpointId, HashSet<RoomId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Add an endpoint to a room. Joining twice is a no-op.
    pub fn join(&self, room: RoomId, endpoint: &EndpointHandle) {
        self.rooms
            .entry(room.clone())
            .or_insert_with(HashMap::new)
            .insert(endpoint.id, endpoint.clone());
        self.memberships
            .entry(endpoint.id)
            .or_insert_with(HashSet::new)
            .insert(room.clone());
        debug!(endpoint = %endpoint.id, %room, "Endpoint joined room");
    }

    /// Remove an endpoint from a room; the room is deleted once empty.
    /// Leaving a room the endpoint never joined is a no-op.
    pub fn leave(&self, room: &RoomId, endpoint_id: EndpointId) {
        let mut emptied = false;
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&endpoint_id);
            emptied = members.is_empty();
        }
        if emptied {
            self.rooms.remove_if(room, |_, members| members.is_empty());
        }
        if let Some(mut rooms) = self.memberships.get_mut(&endpoint_id) {
            rooms.remove(room);
        }
        debug!(endpoint = %endpoint_id, %room, "Endpoint left room");
    }

    /// Snapshot of a room's members. Unknown rooms are empty, not errors.
    pub fn members(&self, room: &RoomId) -> Vec<EndpointHandle> {
        self.rooms
            .get(room)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether an endpoint currently occupies a room.
    pub fn is_member(&self, room: &RoomId, endpoint_id: EndpointId) -> bool {
        self.rooms
            .get(room)
            .map(|members| members.contains_key(&endpoint_id))
            .unwrap_or(false)
    }

    /// Disconnect cleanup: remove the endpoint from every room it occupies.
    pub fn leave_all(&self, endpoint_id: EndpointId) {
        let Some((_, rooms)) = self.memberships.remove(&endpoint_id) else {
            return;
        };
        for room in rooms {
            let mut emptied = false;
            if let Some(mut members) = self.rooms.get_mut(&room) {
                members.remove(&endpoint_id);
                emptied = members.is_empty();
            }
            if emptied {
                self.rooms.remove_if(&room, |_, members| members.is_empty());
            }
        }
        debug!(endpoint = %endpoint_id, "Endpoint left all rooms");
    }

    /// Number of occupied rooms, for diagnostics.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(user_id: UserId) -> EndpointHandle {
        let (handle, _rx) = EndpointHandle::new(user_id, format!("user{user_id}"));
        handle
    }

    #[test]
    fn test_join_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let e = endpoint(1);
        let room = RoomId::user(1);

        registry.join(room.clone(), &e);
        registry.join(room.clone(), &e);
        assert_eq!(registry.members(&room).len(), 1);
    }

    #[test]
    fn test_empty_room_is_deleted() {
        let registry = ConnectionRegistry::new();
        let e = endpoint(1);
        let room = RoomId::session(ringline_session_core::SessionId::new());

        registry.join(room.clone(), &e);
        assert_eq!(registry.room_count(), 1);

        registry.leave(&room, e.id);
        assert_eq!(registry.room_count(), 0);
        assert!(registry.members(&room).is_empty());
    }

    #[test]
    fn test_leave_of_absent_endpoint_is_noop() {
        let registry = ConnectionRegistry::new();
        let e = endpoint(1);
        let room = RoomId::user(1);

        registry.leave(&room, e.id);
        assert!(registry.members(&room).is_empty());
    }

    #[test]
    fn test_leave_all_clears_every_membership() {
        let registry = ConnectionRegistry::new();
        let e = endpoint(1);
        let user_room = RoomId::user(1);
        let session_room = RoomId::session(ringline_session_core::SessionId::new());

        registry.join(user_room.clone(), &e);
        registry.join(session_room.clone(), &e);

        registry.leave_all(e.id);
        assert!(registry.members(&user_room).is_empty());
        assert!(registry.members(&session_room).is_empty());
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_members_excludes_other_rooms() {
        let registry = ConnectionRegistry::new();
        let a = endpoint(1);
        let b = endpoint(2);

        registry.join(RoomId::user(1), &a);
        registry.join(RoomId::user(2), &b);

        let members = registry.members(&RoomId::user(1));
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, 1);
    }
}
