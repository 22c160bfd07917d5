//! Server-sent events chat transport.
//!
//! POSTs the conversation history as JSON and reads the reply as an SSE
//! stream. Assistant turns go out under a configurable role tag, `"ai"`
//! unless overridden, which is what the chat backend expects. Each `data:` payload of a default (`message`) event is one
//! chunk; the payload `[DONE]` ends the reply. An `event: error` frame, a
//! decoding failure or a non-2xx status become [`StreamEvent::Error`] or a
//! [`TransportError`] from `open`.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use std::time::Duration;
use streamchat_application::ports::auth::AuthToken;
use streamchat_application::ports::transport::{
    ChatRequest, ChatTransport, StreamHandle, TransportError,
};
use streamchat_domain::{Message, Role, StreamEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Events buffered between the reader task and the session.
const EVENT_BUFFER: usize = 64;

/// Role tag the backend uses for assistant turns.
pub const DEFAULT_ASSISTANT_ROLE: &str = "ai";

/// JSON body of a chat request.
#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> ChatBody<'a> {
    fn new(messages: &'a [Message], assistant_role: &'a str) -> Self {
        let messages = messages
            .iter()
            .map(|message| WireMessage {
                role: match message.role {
                    Role::User => "user",
                    Role::Assistant => assistant_role,
                },
                content: &message.content,
            })
            .collect();
        Self { messages }
    }
}

/// Chat transport speaking HTTP + server-sent events
pub struct SseChatTransport {
    client: reqwest::Client,
    url: String,
    assistant_role: String,
}

impl SseChatTransport {
    /// Create a transport posting to `url`.
    ///
    /// `connect_timeout` bounds connection setup only; a reply may stream
    /// for as long as the server keeps it open.
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::ConnectionError(e.to_string()))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            assistant_role: DEFAULT_ASSISTANT_ROLE.to_string(),
        }
    }

    /// Send assistant turns under `role` instead of `"ai"`.
    pub fn with_assistant_role(mut self, role: impl Into<String>) -> Self {
        self.assistant_role = role.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn assistant_role(&self) -> &str {
        &self.assistant_role
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::ConnectionError(e.to_string())
    }
}

#[async_trait]
impl ChatTransport for SseChatTransport {
    async fn open(
        &self,
        request: ChatRequest,
        token: &AuthToken,
    ) -> Result<StreamHandle, TransportError> {
        debug!(
            "Opening chat stream at {} with {} messages",
            self.url,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose()))
            .header(ACCEPT, "text/event-stream")
            .json(&ChatBody::new(&request.messages, &self.assistant_role))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Chat stream rejected with status {}", status);
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let (tx, close, handle) = StreamHandle::channel(EVENT_BUFFER);
        tokio::spawn(read_events(response, tx, close));
        Ok(handle)
    }
}

/// Forward SSE frames as [`StreamEvent`]s until the reply ends, the
/// receiver goes away or the handle is closed.
///
/// Returning drops the response, which closes the connection.
async fn read_events(
    response: reqwest::Response,
    tx: mpsc::Sender<StreamEvent>,
    close: CancellationToken,
) {
    let mut events = response.bytes_stream().eventsource();

    loop {
        let next = tokio::select! {
            biased;
            _ = close.cancelled() => {
                debug!("Chat stream closed by client");
                return;
            }
            next = events.next() => next,
        };

        let event = match next {
            Some(Ok(frame)) => match frame.event.as_str() {
                "" | "message" => StreamEvent::from_data(&frame.data),
                "error" => StreamEvent::Error(frame.data),
                other => {
                    debug!("Ignoring SSE event '{}'", other);
                    continue;
                }
            },
            Some(Err(e)) => StreamEvent::Error(e.to_string()),
            None => {
                debug!("Chat stream ended by server");
                return;
            }
        };

        let terminal = event.is_terminal();
        if matches!(event, StreamEvent::Done) {
            info!("Received [DONE], closing chat stream");
        }
        if tx.send(event).await.is_err() || terminal {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/event-stream")
            .set_body_string(body.to_string())
    }

    async fn transport(server: &MockServer) -> SseChatTransport {
        SseChatTransport::new(
            format!("{}/api/ai/chat/sse", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest::new(vec![Message::user("Hi")])
    }

    async fn collect_text(mut handle: StreamHandle) -> Result<String, TransportError> {
        let mut text = String::new();
        while let Some(event) = handle.recv().await {
            match event {
                StreamEvent::Delta(chunk) => text.push_str(&chunk),
                StreamEvent::Done => return Ok(text),
                StreamEvent::Error(e) => return Err(TransportError::StreamError(e)),
            }
        }
        Err(TransportError::UnexpectedEnd)
    }

    fn second_turn() -> ChatRequest {
        ChatRequest::new(vec![
            Message::user("q1"),
            Message::assistant("a"),
            Message::user("q2"),
        ])
    }

    #[tokio::test]
    async fn test_history_sends_assistant_turns_as_ai() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({
                "messages": [
                    { "role": "user", "content": "q1" },
                    { "role": "ai", "content": "a" },
                    { "role": "user", "content": "q2" }
                ]
            })))
            .respond_with(sse("data: ok\n\ndata: [DONE]\n\n"))
            .expect(1)
            .mount(&server)
            .await;

        let handle = transport(&server)
            .await
            .open(second_turn(), &AuthToken::new("t"))
            .await
            .unwrap();

        assert_eq!(collect_text(handle).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_assistant_role_is_configurable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({
                "messages": [
                    { "role": "user", "content": "q1" },
                    { "role": "assistant", "content": "a" },
                    { "role": "user", "content": "q2" }
                ]
            })))
            .respond_with(sse("data: [DONE]\n\n"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(&server).await.with_assistant_role("assistant");
        assert_eq!(transport.assistant_role(), "assistant");

        let handle = transport
            .open(second_turn(), &AuthToken::new("t"))
            .await
            .unwrap();
        assert_eq!(collect_text(handle).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_streams_chunks_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/chat/sse"))
            .and(header("authorization", "Bearer secret"))
            .and(header("accept", "text/event-stream"))
            .and(body_json(serde_json::json!({
                "messages": [{ "role": "user", "content": "Hi" }]
            })))
            .respond_with(sse(
                "data: Hel\n\ndata: lo\n\ndata:  world\n\ndata: [DONE]\n\ndata: ignored\n\n",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let handle = transport(&server)
            .await
            .open(request(), &AuthToken::new("secret"))
            .await
            .unwrap();

        assert_eq!(collect_text(handle).await.unwrap(), "Hello world");
    }

    #[tokio::test]
    async fn test_error_status_fails_open() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .open(request(), &AuthToken::new("wrong"))
            .await
            .err()
            .unwrap();

        assert_eq!(
            err,
            TransportError::HttpStatus {
                status: 401,
                body: "bad token".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_error_event_ends_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse("data: partial\n\nevent: error\ndata: upstream failed\n\n"))
            .mount(&server)
            .await;

        let mut handle = transport(&server)
            .await
            .open(request(), &AuthToken::new("t"))
            .await
            .unwrap();

        assert_eq!(
            handle.recv().await,
            Some(StreamEvent::Delta("partial".to_string()))
        );
        assert_eq!(
            handle.recv().await,
            Some(StreamEvent::Error("upstream failed".to_string()))
        );
        assert_eq!(handle.recv().await, None);
    }

    #[tokio::test]
    async fn test_stream_without_done_ends_unexpectedly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse("event: ping\ndata: keepalive\n\ndata: cut\n\n"))
            .mount(&server)
            .await;

        let handle = transport(&server)
            .await
            .open(request(), &AuthToken::new("t"))
            .await
            .unwrap();

        assert_eq!(
            collect_text(handle).await.unwrap_err(),
            TransportError::UnexpectedEnd
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_open() {
        // Reserve a free port, then release it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let url = format!("http://127.0.0.1:{}/api/ai/chat/sse", port);

        let transport = SseChatTransport::new(url, Duration::from_secs(1)).unwrap();
        let result = transport.open(request(), &AuthToken::new("t")).await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectionError(_)) | Err(TransportError::Timeout)
        ));
    }
}
