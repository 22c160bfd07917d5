//! Streaming session controller.
//!
//! Drives the single in-flight assistant reply, mapping transport events
//! onto conversation store mutations:
//!
//! 1. Append the user message and an empty assistant placeholder
//! 2. Open the transport with the history before the placeholder
//! 3. Append each chunk to the placeholder, in arrival order
//! 4. Settle on `[DONE]`, a transport error, or cancellation: close the
//!    stream, release the slot, persist a snapshot
//!
//! At most one session exists at a time. A send while one is streaming is
//! ignored, not queued.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::ports::auth::AuthToken;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationEventKind, ConversationLogger, NoConversationLogger,
};
use crate::ports::session_listener::{NoSessionListener, SessionListener};
use crate::ports::transport::{ChatRequest, ChatTransport, StreamHandle, TransportError};
use crate::use_cases::persistence::SnapshotStore;
use crate::use_cases::store::ConversationStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use streamchat_domain::core::string::preview;
use streamchat_domain::{
    ConversationId, DomainError, Message, SessionState, StreamEvent, StreamingSession,
};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Advisory callback run after a reply completes normally.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Why a send did not start a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The question was empty after trimming.
    EmptyQuestion,
    /// Another reply is still streaming.
    Busy,
}

/// Result of [`StreamingController::send_message`].
pub enum SendOutcome {
    Started(SessionHandle),
    Ignored(IgnoreReason),
}

impl SendOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, SendOutcome::Started(_))
    }

    pub fn into_handle(self) -> Option<SessionHandle> {
        match self {
            SendOutcome::Started(handle) => Some(handle),
            SendOutcome::Ignored(_) => None,
        }
    }
}

/// Awaitable view of a started session.
pub struct SessionHandle {
    conversation_id: ConversationId,
    settled: oneshot::Receiver<SessionState>,
}

impl SessionHandle {
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Wait until the session has settled and return its terminal state.
    ///
    /// By the time this resolves the slot is released and the snapshot
    /// written.
    pub async fn settled(self) -> SessionState {
        // The sender only disappears if the streaming task panicked.
        self.settled.await.unwrap_or(SessionState::Failed)
    }
}

/// The occupied session slot.
struct ActiveSlot {
    conversation_id: ConversationId,
    cancel: CancellationToken,
}

/// How a session ended.
enum Settlement {
    Completed,
    Failed(TransportError),
    Cancelled,
    /// The target conversation or placeholder can no longer be resolved.
    TargetLost(DomainError),
}

/// Owns the single-flight streaming slot.
#[derive(Clone)]
pub struct StreamingController {
    transport: Arc<dyn ChatTransport>,
    store: ConversationStore,
    snapshots: Arc<SnapshotStore>,
    config: Arc<SessionConfig>,
    listener: Arc<dyn SessionListener>,
    conversation_logger: Arc<dyn ConversationLogger>,
    slot: Arc<Mutex<Option<ActiveSlot>>>,
}

impl StreamingController {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: ConversationStore,
        snapshots: Arc<SnapshotStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            transport,
            store,
            snapshots,
            config: Arc::new(config),
            listener: Arc::new(NoSessionListener),
            conversation_logger: Arc::new(NoConversationLogger),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Create with a session listener.
    pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn snapshots(&self) -> &Arc<SnapshotStore> {
        &self.snapshots
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn conversation_logger(&self) -> &Arc<dyn ConversationLogger> {
        &self.conversation_logger
    }

    /// Whether a reply is currently streaming.
    pub fn is_loading(&self) -> bool {
        self.lock_slot().is_some()
    }

    /// Conversation the live reply is being written to, if any.
    pub fn active_target(&self) -> Option<ConversationId> {
        self.lock_slot()
            .as_ref()
            .map(|active| active.conversation_id.clone())
    }

    /// Request cancellation of the live session.
    ///
    /// Returns `false` when nothing is streaming. The slot is released by
    /// the streaming task shortly after; a chunk already dequeued may still
    /// be applied.
    pub fn cancel(&self) -> bool {
        match self.lock_slot().as_ref() {
            Some(active) => {
                info!("Cancelling stream for conversation {}", active.conversation_id);
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Send `question` in the active conversation and start streaming the
    /// reply.
    ///
    /// Returns as soon as the stream task is spawned; await
    /// [`SessionHandle::settled`] (or rely on `on_complete`) for the end.
    /// Must be called from within a Tokio runtime.
    pub fn send_message(
        &self,
        question: &str,
        token: AuthToken,
        on_complete: Option<CompletionCallback>,
    ) -> Result<SendOutcome, SessionError> {
        if question.trim().is_empty() {
            debug!("Ignoring empty message");
            return Ok(SendOutcome::Ignored(IgnoreReason::EmptyQuestion));
        }

        let mut slot = self.lock_slot();
        if slot.is_some() {
            debug!("A reply is already streaming, ignoring send");
            return Ok(SendOutcome::Ignored(IgnoreReason::Busy));
        }

        let conversation_id = self
            .store
            .active_id()
            .ok_or(SessionError::NoActiveConversation)?;

        let (placeholder_index, history) =
            self.store
                .write(|c| -> Result<(usize, Vec<Message>), DomainError> {
                    c.append_message(&conversation_id, Message::user(question))?;
                    let index = c.append_message(&conversation_id, Message::placeholder())?;
                    let history = c.history_before(&conversation_id, index)?;
                    Ok((index, history))
                })?;

        let cancel = CancellationToken::new();
        *slot = Some(ActiveSlot {
            conversation_id: conversation_id.clone(),
            cancel: cancel.clone(),
        });
        drop(slot);

        info!(
            "Streaming reply into conversation {} ({} messages of history): {}",
            conversation_id,
            history.len(),
            preview(question, 60)
        );
        self.conversation_logger.log(
            ConversationEvent::new(ConversationEventKind::SessionStarted, &conversation_id)
                .with_details(serde_json::json!({
                    "history_len": history.len(),
                    "question": question,
                })),
        );
        self.listener.on_session_started(&conversation_id);

        let session = StreamingSession::start(conversation_id.clone(), placeholder_index);
        let request = ChatRequest::new(history);
        let (settled_tx, settled_rx) = oneshot::channel();
        let controller = self.clone();

        tokio::spawn(async move {
            let state = controller
                .drive(session, request, token, cancel, on_complete)
                .await;
            // The caller may have dropped the handle; that's fine
            let _ = settled_tx.send(state);
        });

        Ok(SendOutcome::Started(SessionHandle {
            conversation_id,
            settled: settled_rx,
        }))
    }

    async fn drive(
        &self,
        mut session: StreamingSession,
        request: ChatRequest,
        token: AuthToken,
        cancel: CancellationToken,
        on_complete: Option<CompletionCallback>,
    ) -> SessionState {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.transport.open(request, &token) => Some(result),
        };

        let mut handle = match opened {
            None => return self.settle(session, Settlement::Cancelled, None, on_complete),
            Some(Err(e)) => return self.settle(session, Settlement::Failed(e), None, on_complete),
            Some(Ok(handle)) => handle,
        };

        let settlement = loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Settlement::Cancelled,
                event = handle.recv() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    if let Err(e) = self.store.append_chunk(
                        session.conversation_id(),
                        session.placeholder_index(),
                        &chunk,
                    ) {
                        break Settlement::TargetLost(e);
                    }
                    if let Err(e) = session.record_chunk() {
                        warn!("Chunk applied outside of streaming: {}", e);
                    }
                    self.listener.on_chunk(session.conversation_id(), &chunk);
                }
                Some(StreamEvent::Done) => break Settlement::Completed,
                Some(StreamEvent::Error(message)) => {
                    break Settlement::Failed(TransportError::StreamError(message));
                }
                None => break Settlement::Failed(TransportError::UnexpectedEnd),
            }
        };

        self.settle(session, settlement, Some(handle), on_complete)
    }

    fn settle(
        &self,
        mut session: StreamingSession,
        settlement: Settlement,
        handle: Option<StreamHandle>,
        on_complete: Option<CompletionCallback>,
    ) -> SessionState {
        let conversation_id = session.conversation_id().clone();
        let index = session.placeholder_index();

        let transition = match &settlement {
            Settlement::Completed => session.complete(),
            Settlement::Failed(error) => {
                warn!("Stream for conversation {} failed: {}", conversation_id, error);
                if let Err(e) =
                    self.store
                        .replace_content(&conversation_id, index, &self.config.error_message)
                {
                    warn!("Could not write error message: {}", e);
                }
                session.fail()
            }
            Settlement::Cancelled => {
                self.fill_empty_placeholder(&conversation_id, index);
                session.cancel()
            }
            Settlement::TargetLost(error) => {
                warn!("Live stream lost its target, aborting: {}", error);
                session.cancel()
            }
        };
        if let Err(e) = transition {
            warn!("Unexpected session transition: {}", e);
        }

        if let Some(mut handle) = handle {
            handle.close();
        }
        *self.lock_slot() = None;
        self.snapshots.save_or_warn(&self.store.snapshot());

        self.log_settlement(&session, &settlement);
        self.listener
            .on_session_settled(&conversation_id, session.state());

        if matches!(settlement, Settlement::Completed)
            && let Some(callback) = on_complete
        {
            callback();
        }

        session.state()
    }

    /// Keep partial output; only an untouched placeholder gets the notice.
    fn fill_empty_placeholder(&self, conversation_id: &ConversationId, index: usize) {
        let empty = self.store.read(|c| {
            c.get(conversation_id)
                .and_then(|conversation| conversation.messages().get(index))
                .is_some_and(|message| message.content.is_empty())
        });
        if empty
            && let Err(e) =
                self.store
                    .append_chunk(conversation_id, index, &self.config.cancelled_message)
        {
            warn!("Could not mark cancelled reply: {}", e);
        }
    }

    fn log_settlement(&self, session: &StreamingSession, settlement: &Settlement) {
        let reply_bytes = self.store.read(|c| {
            c.get(session.conversation_id())
                .and_then(|conversation| conversation.messages().get(session.placeholder_index()))
                .map(|message| message.content.len())
                .unwrap_or(0)
        });
        let mut details = serde_json::json!({
            "chunks": session.chunks_applied(),
            "reply_bytes": reply_bytes,
        });

        let kind = match settlement {
            Settlement::Completed => {
                info!(
                    "Stream completed for conversation {} ({} chunks, {} bytes)",
                    session.conversation_id(),
                    session.chunks_applied(),
                    reply_bytes
                );
                ConversationEventKind::StreamCompleted
            }
            Settlement::Failed(error) => {
                details["error"] = serde_json::json!(error.to_string());
                ConversationEventKind::StreamFailed
            }
            Settlement::Cancelled | Settlement::TargetLost(_) => {
                info!(
                    "Stream cancelled for conversation {} after {} chunks",
                    session.conversation_id(),
                    session.chunks_applied()
                );
                ConversationEventKind::StreamCancelled
            }
        };

        self.conversation_logger.log(
            ConversationEvent::new(kind, session.conversation_id()).with_details(details),
        );
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<ActiveSlot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
