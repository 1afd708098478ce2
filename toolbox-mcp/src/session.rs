//! HTTP/SSE session lifecycle (§4.9, §5).
//!
//! Each session owns a bounded ring buffer of outbound events. One producer
//! (the request handler serving `tools/call` and friends) and one consumer
//! (the SSE writer) share it; overflow drops the oldest event and records a
//! sentinel so a resuming client can tell it missed something rather than
//! silently skipping ahead (§5 "Shared resources").

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Default bounded-queue capacity per session (§5).
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// Default idle-session timeout (§4.9).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    Initialized,
    Active,
    Closed,
}

impl SessionState {
    /// Only `initialize` is allowed while a session is `New` (§4.9).
    pub fn allows(self, method: &str) -> bool {
        match self {
            SessionState::New => method == "initialize",
            SessionState::Initialized | SessionState::Active => true,
            SessionState::Closed => false,
        }
    }
}

/// One buffered outbound event, carrying the monotonic id an SSE `id:` field
/// uses as a resumable cursor (§4.9).
#[derive(Debug, Clone)]
pub struct BufferedEvent {
    pub id: u64,
    pub event: String,
    pub data: Value,
    /// Set on the first event of a replay that could not resume exactly from
    /// the client's `Last-Event-Id` (§4.9: "sets a resumed=false flag").
    pub resumed: Option<bool>,
}

struct RingBuffer {
    capacity: usize,
    events: VecDeque<(u64, String, Value)>,
    dropped_count: u64,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
            dropped_count: 0,
        }
    }

    fn push(&mut self, id: u64, event: String, data: Value) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
            self.dropped_count += 1;
        }
        self.events.push_back((id, event, data));
    }

    /// Events after `last_event_id`, or the whole buffer (flagged `resumed:
    /// false` on the first entry) if that id has already fallen off the
    /// ring (§4.9).
    fn since(&self, last_event_id: Option<u64>) -> Vec<BufferedEvent> {
        let Some(last_id) = last_event_id else {
            return Vec::new();
        };
        let position = self.events.iter().position(|(id, _, _)| *id == last_id);
        let (slice_start, resumed_exactly) = match position {
            Some(pos) => (pos + 1, true),
            None => (0, false),
        };
        self.events
            .iter()
            .skip(slice_start)
            .enumerate()
            .map(|(i, (id, event, data))| BufferedEvent {
                id: *id,
                event: event.clone(),
                data: data.clone(),
                resumed: if i == 0 && !resumed_exactly { Some(false) } else { None },
            })
            .collect()
    }
}

/// An MCP HTTP/SSE session (§3 Data Model: MCP Session).
pub struct Session {
    pub id: String,
    /// Toolset the client addressed at `initialize` time (`""` = every tool).
    pub toolset: String,
    state: Mutex<SessionState>,
    buffer: Mutex<RingBuffer>,
    next_event_id: AtomicU64,
    last_activity: Mutex<Instant>,
}

impl Session {
    pub fn new(id: impl Into<String>, toolset: impl Into<String>) -> Self {
        Self::with_capacity(id, toolset, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(id: impl Into<String>, toolset: impl Into<String>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            toolset: toolset.into(),
            state: Mutex::new(SessionState::New),
            buffer: Mutex::new(RingBuffer::new(capacity)),
            next_event_id: AtomicU64::new(1),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().expect("session state lock poisoned")
    }

    pub fn transition(&self, next: SessionState) {
        *self.state.lock().expect("session state lock poisoned") = next;
    }

    /// Whether `method` is allowed in the session's current state (§4.9).
    pub fn allows(&self, method: &str) -> bool {
        self.state().allows(method)
    }

    pub fn touch(&self) {
        *self.last_activity.lock().expect("session activity lock poisoned") = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().expect("session activity lock poisoned").elapsed()
    }

    /// Enqueue an outbound event, returning the id it was assigned.
    pub fn push_event(&self, event: impl Into<String>, data: Value) -> u64 {
        let id = self.next_event_id.fetch_add(1, Ordering::SeqCst);
        self.buffer.lock().expect("session buffer lock poisoned").push(id, event.into(), data);
        self.touch();
        id
    }

    /// Events to replay on an SSE (re)connect with an optional `Last-Event-Id`
    /// (§4.9, §8 "SSE reconnect with Last-Event-Id = N ...").
    pub fn events_since(&self, last_event_id: Option<u64>) -> Vec<BufferedEvent> {
        self.buffer.lock().expect("session buffer lock poisoned").since(last_event_id)
    }
}
