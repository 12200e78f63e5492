//! # Event Bus
//!
//! Room-based pub/sub for live connections.
//!
//! ```text
//! WebSocket session ── connect() ──► EventBus ◄── broadcast(room) ── OrderLifecycle
//!        ▲                            │
//!        └──── mpsc::Receiver ◄───────┘  (one bounded queue per connection)
//! ```
//!
//! - A connection is registered on transport connect but belongs to no room until it
//!   sends a join message.
//! - A connection holds at most one room for its lifetime.
//! - Delivery is best-effort: no replay, and a connection whose queue is full misses
//!   the event while everyone else still gets it.
//!
//! The bus is constructed once and handed out by clone; all clones share one registry.

pub mod events;

pub use events::{ClientMessage, LiveEvent, Room};

use dashmap::{DashMap, DashSet};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BusError {
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    #[error("Connection already joined {current}, cannot join {requested}")]
    RoomAlreadyAssigned { current: Room, requested: Room },
}

/// Queue end handed to the session that owns a connection.
pub type EventReceiver = mpsc::Receiver<Arc<LiveEvent>>;

struct Connection {
    sender: mpsc::Sender<Arc<LiveEvent>>,
    room: Option<Room>,
}

struct Registry {
    connections: DashMap<ConnectionId, Connection>,
    rooms: DashMap<Room, DashSet<ConnectionId>>,
    next_id: AtomicU64,
    capacity: usize,
}

#[derive(Clone)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    /// `capacity` bounds the number of undelivered events queued per connection.
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: Arc::new(Registry {
                connections: DashMap::new(),
                rooms: DashMap::new(),
                next_id: AtomicU64::new(1),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Registers a new connection with no room membership.
    pub fn connect(&self) -> (ConnectionId, EventReceiver) {
        let id = ConnectionId(self.registry.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.registry.capacity);
        self.registry
            .connections
            .insert(id, Connection { sender, room: None });
        debug!(connection = %id, "Live connection registered");
        (id, receiver)
    }

    /// Adds `conn` to `room`. Joining the room it already holds is a no-op.
    pub fn join(&self, conn: ConnectionId, room: Room) -> Result<(), BusError> {
        {
            let mut entry = self
                .registry
                .connections
                .get_mut(&conn)
                .ok_or(BusError::UnknownConnection(conn))?;
            match &entry.room {
                Some(current) if *current == room => return Ok(()),
                Some(current) => {
                    return Err(BusError::RoomAlreadyAssigned {
                        current: current.clone(),
                        requested: room,
                    })
                }
                None => entry.room = Some(room.clone()),
            }
        }

        self.registry
            .rooms
            .entry(room.clone())
            .or_default()
            .insert(conn);

        // lost a race with on_disconnect
        if !self.registry.connections.contains_key(&conn) {
            self.remove_member(&room, conn);
            return Err(BusError::UnknownConnection(conn));
        }

        info!(connection = %conn, %room, "Joined room");
        Ok(())
    }

    /// Removes `conn` from `room` if it is a member there.
    pub fn leave(&self, conn: ConnectionId, room: &Room) {
        if let Some(mut entry) = self.registry.connections.get_mut(&conn) {
            if entry.room.as_ref() == Some(room) {
                entry.room = None;
            }
        }
        self.remove_member(room, conn);
    }

    /// Forgets `conn` entirely: memberships and queue.
    pub fn on_disconnect(&self, conn: ConnectionId) {
        if let Some((_, connection)) = self.registry.connections.remove(&conn) {
            if let Some(room) = connection.room {
                self.remove_member(&room, conn);
            }
            debug!(connection = %conn, "Live connection removed");
        }
    }

    /// Delivers `event` to every current member of `room`. Returns how many queues took it.
    pub fn broadcast(&self, room: &Room, event: LiveEvent) -> usize {
        let members: Vec<ConnectionId> = match self.registry.rooms.get(room) {
            Some(set) => set.iter().map(|id| *id).collect(),
            None => return 0,
        };
        let event = Arc::new(event);
        let delivered = members
            .into_iter()
            .filter(|id| self.send_to(*id, &event))
            .count();
        debug!(%room, event = event.name(), delivered, "Broadcast");
        delivered
    }

    /// Delivers `event` to every connection, in a room or not.
    pub fn broadcast_all(&self, event: LiveEvent) -> usize {
        let ids: Vec<ConnectionId> = self
            .registry
            .connections
            .iter()
            .map(|entry| *entry.key())
            .collect();
        let event = Arc::new(event);
        let delivered = ids
            .into_iter()
            .filter(|id| self.send_to(*id, &event))
            .count();
        debug!(event = event.name(), delivered, "Broadcast to all");
        delivered
    }

    /// Current members of `room`, sorted.
    pub fn members(&self, room: &Room) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self
            .registry
            .rooms
            .get(room)
            .map(|set| set.iter().map(|id| *id).collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn room_of(&self, conn: ConnectionId) -> Option<Room> {
        self.registry
            .connections
            .get(&conn)
            .and_then(|entry| entry.room.clone())
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connections.len()
    }

    fn send_to(&self, id: ConnectionId, event: &Arc<LiveEvent>) -> bool {
        let Some(sender) = self
            .registry
            .connections
            .get(&id)
            .map(|entry| entry.sender.clone())
        else {
            return false;
        };
        match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(connection = %id, event = event.name(), "Live queue full, event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    fn remove_member(&self, room: &Room, conn: ConnectionId) {
        if let Some(set) = self.registry.rooms.get(room) {
            set.remove(&conn);
        }
        self.registry.rooms.remove_if(room, |_, set| set.is_empty());
    }
}
