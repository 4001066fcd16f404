//! HTTP handlers for the question answering endpoints.

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use bometa_core::{Message, Role, ToolScope};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::auth::Identity;
use crate::error::{ServerError, ServerResult};
use crate::session::Session;
use crate::state::AppState;

/// Frame sent after the last chunk of a streamed answer.
pub const DONE_MARKER: &str = "[DONE]";

/// One turn of the conversation as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Request body for both chat endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatData {
    /// Conversation so far, ending with the user's question.
    pub messages: Vec<ChatMessage>,
    /// Extra instructions appended to the bot's system prompt.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl ChatData {
    fn into_messages(self) -> ServerResult<Vec<Message>> {
        match self.messages.last() {
            None => {
                return Err(ServerError::InvalidRequest(
                    "messages must not be empty".to_string(),
                ))
            }
            Some(last) if last.role != Role::User => {
                return Err(ServerError::InvalidRequest(
                    "the last message must come from the user".to_string(),
                ))
            }
            Some(_) => {}
        }

        Ok(self
            .messages
            .into_iter()
            .map(|m| match m.role {
                Role::User => Message::user(m.content),
                Role::Assistant => Message::assistant(m.content),
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolCallSummary {
    pub name: String,
    pub success: bool,
}

/// Response body of `qa`.
#[derive(Debug, Clone, Serialize)]
pub struct QaResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCallSummary>,
}

struct ChatRun {
    agent: bometa_core::Agent,
    messages: Vec<Message>,
}

fn prepare(
    state: &AppState,
    identity: Option<Extension<Identity>>,
    session: Option<Extension<Session>>,
    payload: Result<Json<ChatData>, JsonRejection>,
) -> ServerResult<ChatRun> {
    let Json(data) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let prompt = data.prompt.clone();
    let anonymous = identity
        .as_ref()
        .is_some_and(|Extension(i)| i.is_anonymous());
    let mut scope = ToolScope {
        bot_id: data.bot_id.clone(),
        ..ToolScope::default()
    }
    .with_anonymous(anonymous);
    if let Some(token) = session.as_ref().and_then(|Extension(s)| s.github_token()) {
        scope = scope.with_github_token(token);
    }

    tracing::info!(
        identity = identity.as_ref().map_or("absent", |Extension(i)| i.kind()),
        bot_id = scope.bot_id.as_deref().unwrap_or("-"),
        turns = data.messages.len(),
        "chat request"
    );

    let messages = data.into_messages()?;
    let agent = state.agent_for(&scope, prompt.as_deref())?;
    Ok(ChatRun { agent, messages })
}

/// Answer a conversation in one response.
pub async fn qa(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    session: Option<Extension<Session>>,
    payload: Result<Json<ChatData>, JsonRejection>,
) -> ServerResult<Json<QaResponse>> {
    let ChatRun { agent, messages } = prepare(&state, identity, session, payload)?;

    let response = agent.run_chat(messages).await.map_err(|e| {
        tracing::warn!(error = %e, "chat run failed");
        ServerError::from(e)
    })?;

    tracing::info!(
        model = agent.model_name(),
        model_calls = response.model_calls,
        tool_calls = response.tool_calls.len(),
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        elapsed_ms = response.duration.as_millis() as u64,
        "chat answered"
    );

    Ok(Json(QaResponse {
        text: response.text,
        tool_calls: response
            .tool_calls
            .into_iter()
            .map(|call| ToolCallSummary {
                name: call.name,
                success: call.success,
            })
            .collect(),
    }))
}

/// Answer a conversation as Server-Sent Events.
///
/// Each text chunk is one `data:` frame, followed by a final `[DONE]` frame.
/// A failed run ends the stream with a single `error` event instead.
pub async fn stream_qa(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    session: Option<Extension<Session>>,
    payload: Result<Json<ChatData>, JsonRejection>,
) -> ServerResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let ChatRun { agent, messages } = prepare(&state, identity, session, payload)?;

    let (tx, rx) = mpsc::channel::<Event>(64);

    tokio::spawn(async move {
        let mut chunks = agent.run_stream(messages);
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(text) => {
                    // Receiver gone means the client disconnected
                    if tx.send(Event::default().data(text)).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "chat stream failed");
                    let _ = tx
                        .send(Event::default().event("error").data(e.to_string()))
                        .await;
                    return;
                }
            }
        }
        let _ = tx.send(Event::default().data(DONE_MARKER)).await;
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
