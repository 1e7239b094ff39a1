//! Connection registry for the single room.
//!
//! Tracks every accepted connection and, once it has joined, the display
//! name it joined under and whether it is currently announced as typing.
//! Ordered by session ID so fan-out order is deterministic.

use std::collections::BTreeMap;

use sunona_core::Identity;

/// Information about a registered connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    /// Display name. `None` until the connection sends `joinRoom`.
    pub name: Option<Identity>,
    /// Last presence signal from this connection was "typing".
    pub typing: bool,
}

impl SessionInfo {
    /// Create info for a connection that has not joined yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the connection has joined the room.
    pub fn is_joined(&self) -> bool {
        self.name.is_some()
    }
}

/// Registry of live connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Session ID → session info
    sessions: BTreeMap<u64, SessionInfo>,
}

impl ConnectionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session.
    ///
    /// Returns `false` if the session already exists.
    pub fn register_session(&mut self, session_id: u64) -> bool {
        if self.sessions.contains_key(&session_id) {
            return false;
        }
        self.sessions.insert(session_id, SessionInfo::new());
        true
    }

    /// Unregister a session, returning its info if it existed.
    pub fn unregister_session(&mut self, session_id: u64) -> Option<SessionInfo> {
        self.sessions.remove(&session_id)
    }

    /// Session metadata. `None` if session doesn't exist.
    pub fn session(&self, session_id: u64) -> Option<&SessionInfo> {
        self.sessions.get(&session_id)
    }

    /// Mutable session metadata. `None` if session doesn't exist.
    pub fn session_mut(&mut self, session_id: u64) -> Option<&mut SessionInfo> {
        self.sessions.get_mut(&session_id)
    }

    /// Check if a session is registered.
    pub fn has_session(&self, session_id: u64) -> bool {
        self.sessions.contains_key(&session_id)
    }

    /// Sessions that have joined the room, in ID order.
    pub fn joined_sessions(&self) -> impl Iterator<Item = u64> + '_ {
        self.sessions.iter().filter(|(_, info)| info.is_joined()).map(|(id, _)| *id)
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True if no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_twice_fails() {
        let mut registry = ConnectionRegistry::new();
        assert!(registry.register_session(1));
        assert!(!registry.register_session(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn joined_sessions_skips_unjoined() {
        let mut registry = ConnectionRegistry::new();
        registry.register_session(3);
        registry.register_session(1);
        registry.register_session(2);
        for id in [3, 1] {
            if let Some(info) = registry.session_mut(id) {
                info.name = Some(Identity::parse("x").unwrap());
            }
        }

        assert_eq!(registry.joined_sessions().collect::<Vec<_>>(), [1, 3]);
    }

    #[test]
    fn unregister_returns_info() {
        let mut registry = ConnectionRegistry::new();
        registry.register_session(7);
        registry.session_mut(7).unwrap().typing = true;

        let info = registry.unregister_session(7).unwrap();
        assert!(info.typing);
        assert!(!registry.has_session(7));
        assert!(registry.unregister_session(7).is_none());
    }
}
