//! Test doubles for the application ports.

use crate::ports::auth::AuthToken;
use crate::ports::conversation_logger::{ConversationEvent, ConversationEventKind, ConversationLogger};
use crate::ports::session_listener::SessionListener;
use crate::ports::storage::{KeyValueStorage, StorageError};
use crate::ports::transport::{ChatRequest, ChatTransport, StreamHandle, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use streamchat_domain::{ConversationId, SessionState, StreamEvent};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

// ==================== Storage ====================

#[derive(Default)]
pub(crate) struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryStorage {
    pub(crate) fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub(crate) fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        *self.writes.lock().unwrap() += 1;
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

// ==================== Transport ====================

/// The producer side of a live stream, handed to the test.
pub(crate) struct LiveStream {
    pub(crate) events: mpsc::Sender<StreamEvent>,
    pub(crate) close: CancellationToken,
}

/// How the next `open` call behaves.
pub(crate) enum Script {
    /// Deliver these events, then end the channel.
    Events(Vec<StreamEvent>),
    /// Refuse to open.
    Fail(TransportError),
    /// Hand the producer side to the test.
    Live(oneshot::Sender<LiveStream>),
}

/// Transport that replays scripted responses and records requests.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<(ChatRequest, String)>>,
}

impl ScriptedTransport {
    pub(crate) fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub(crate) fn push_events(&self, events: Vec<StreamEvent>) {
        self.push(Script::Events(events));
    }

    /// Queue a live stream and return the receiver for its producer side.
    pub(crate) fn push_live(&self) -> oneshot::Receiver<LiveStream> {
        let (tx, rx) = oneshot::channel();
        self.push(Script::Live(tx));
        rx
    }

    pub(crate) fn requests(&self) -> Vec<(ChatRequest, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn open(
        &self,
        request: ChatRequest,
        token: &AuthToken,
    ) -> Result<StreamHandle, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((request, token.expose().to_string()));

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Events(vec![StreamEvent::Done]));

        match script {
            Script::Events(events) => {
                let (tx, _close, handle) = StreamHandle::channel(events.len() + 1);
                for event in events {
                    tx.try_send(event).expect("scripted channel has room");
                }
                Ok(handle)
            }
            Script::Fail(error) => Err(error),
            Script::Live(reply) => {
                let (events, close, handle) = StreamHandle::channel(16);
                let _ = reply.send(LiveStream { events, close });
                Ok(handle)
            }
        }
    }
}

// ==================== Listener ====================

#[derive(Default)]
pub(crate) struct RecordingListener {
    pub(crate) chunks: Mutex<Vec<String>>,
    pub(crate) settled: Mutex<Vec<(ConversationId, SessionState)>>,
}

impl SessionListener for RecordingListener {
    fn on_chunk(&self, _conversation_id: &ConversationId, chunk: &str) {
        self.chunks.lock().unwrap().push(chunk.to_string());
    }

    fn on_session_settled(&self, conversation_id: &ConversationId, state: SessionState) {
        self.settled
            .lock()
            .unwrap()
            .push((conversation_id.clone(), state));
    }
}

#[derive(Default)]
pub(crate) struct RecordingLogger {
    pub(crate) events: Mutex<Vec<ConversationEvent>>,
}

impl RecordingLogger {
    pub(crate) fn kinds(&self) -> Vec<ConversationEventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
