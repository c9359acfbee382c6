use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::message::ServerMessage;

pub type ConnectionId = Uuid;
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Named multicast groups of live connections. Membership reads and writes
/// are synchronized per room; a multicast iterates a snapshot of the
/// membership taken at send time, so it never observes a half-applied
/// join or leave.
#[derive(Clone, Default)]
pub struct Rooms {
    inner: Arc<DashMap<String, HashMap<ConnectionId, OutboundSender>>>,
}

impl Rooms {
    pub fn join(&self, room: &str, id: ConnectionId, sender: OutboundSender) {
        self.inner.entry(room.to_string()).or_default().insert(id, sender);
    }

    pub fn leave(&self, room: &str, id: ConnectionId) {
        if let Some(mut members) = self.inner.get_mut(room) {
            members.remove(&id);
        }
    }

    /// Drop the connection from every room it joined.
    pub fn remove_connection(&self, id: ConnectionId) {
        for mut entry in self.inner.iter_mut() {
            entry.value_mut().remove(&id);
        }
    }

    pub fn contains(&self, room: &str, id: ConnectionId) -> bool {
        self.inner
            .get(room)
            .is_some_and(|members| members.contains_key(&id))
    }

    pub fn member_count(&self, room: &str) -> usize {
        self.inner.get(room).map_or(0, |members| members.len())
    }

    /// Send `message` to every member of `room`. A failed send only skips
    /// that connection; an empty room is a no-op. Returns the number of
    /// members reached.
    pub fn broadcast(&self, room: &str, message: &ServerMessage) -> usize {
        let senders: Vec<OutboundSender> = match self.inner.get(room) {
            Some(members) => members.values().cloned().collect(),
            None => return 0,
        };

        let mut reached = 0;
        for sender in senders {
            if sender.send(message.clone()).is_ok() {
                reached += 1;
            }
        }
        reached
    }
}
