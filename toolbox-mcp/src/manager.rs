//! Session registry for the HTTP/SSE transport (§4.9 "Session state machine").
//!
//! One [`SessionManager`] is shared by every request the HTTP transport
//! dispatches; it owns every live session and runs the idle-reaping sweep
//! (§4.9 "Idle sessions are closed after a configurable timeout").

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use uuid::Uuid;

use crate::session::{Session, SessionState, DEFAULT_IDLE_TIMEOUT, DEFAULT_QUEUE_CAPACITY};

pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    idle_timeout: Duration,
    queue_capacity: usize,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_IDLE_TIMEOUT, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_config(idle_timeout: Duration, queue_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            queue_capacity,
        }
    }

    /// Open a new session addressed at `toolset` and return its handle.
    pub fn create(&self, toolset: impl Into<String>) -> Arc<Session> {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Session::with_capacity(id.clone(), toolset, self.queue_capacity));
        self.sessions.write().expect("session map lock poisoned").insert(id, session.clone());
        session
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().expect("session map lock poisoned").get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.write().expect("session map lock poisoned").remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().expect("session map lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close and drop every session idle past the configured timeout (§4.9).
    /// Returns the ids reaped, for logging by the caller.
    pub fn reap_idle(&self) -> Vec<String> {
        let expired: Vec<String> = {
            let sessions = self.sessions.read().expect("session map lock poisoned");
            sessions
                .values()
                .filter(|s| s.idle_for() >= self.idle_timeout)
                .map(|s| s.id.clone())
                .collect()
        };
        let mut sessions = self.sessions.write().expect("session map lock poisoned");
        for id in &expired {
            if let Some(session) = sessions.remove(id) {
                session.transition(SessionState::Closed);
            }
        }
        expired
    }

    /// Spawn the background sweep that periodically calls [`reap_idle`]
    /// (§4.9, grounded on the teacher's session-cleanup sweep pattern).
    pub fn spawn_reaper(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                for id in self.reap_idle() {
                    tracing::debug!(session_id = %id, "reaped idle MCP session");
                }
            }
        })
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
