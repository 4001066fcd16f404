//! Streaming model responses

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::model::{ModelResponse, TokenUsage};
use crate::provider::StreamEvent;
use crate::types::{Message, StopReason, ToolDefinition, ToolUseBlock};

use super::helpers::assemble_message;
use super::types::AgentError;
use super::Agent;

impl Agent {
    /// Call the model with streaming and collect one complete turn
    pub(super) async fn generate_with_streaming(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
    ) -> Result<ModelResponse, AgentError> {
        let mut stream = self
            .provider
            .generate_stream(messages, tools, self.system_prompt.clone())
            .await?;

        let mut text_content = String::new();
        let mut tool_uses: Vec<ToolUseBlock> = Vec::new();
        let mut stop_reason = StopReason::EndTurn;
        let mut usage: Option<TokenUsage> = None;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::TextDelta(delta) => text_content.push_str(&delta),
                StreamEvent::ToolUse(tool_use) => tool_uses.push(tool_use),
                StreamEvent::Stop {
                    stop_reason: reason,
                    usage: u,
                } => {
                    stop_reason = reason;
                    usage = u;
                }
            }
        }

        Ok(ModelResponse {
            message: assemble_message(text_content, tool_uses)?,
            stop_reason,
            usage,
        })
    }

    /// Run the agent and stream the reply as text chunks
    ///
    /// `messages` is the conversation so far, ending with the user's
    /// question. Text deltas are yielded as the model produces them, across
    /// every model turn of the run; tool calls are executed between turns
    /// and are not part of the stream. The stream ends after the final turn
    /// or with a single error item.
    pub fn run_stream(self, messages: Vec<Message>) -> BoxStream<'static, Result<String, AgentError>> {
        Box::pin(async_stream::try_stream! {
            let mut messages = messages;
            let mut tool_call_infos = Vec::new();
            let mut finished = false;

            for _ in 0..self.max_iterations {
                let mut stream = self
                    .provider
                    .generate_stream(
                        messages.clone(),
                        self.tools.definitions(),
                        self.system_prompt.clone(),
                    )
                    .await?;

                let mut text = String::new();
                let mut tool_uses = Vec::new();
                let mut stop_reason = StopReason::EndTurn;

                while let Some(event) = stream.next().await {
                    match event? {
                        StreamEvent::TextDelta(delta) => {
                            text.push_str(&delta);
                            yield delta;
                        }
                        StreamEvent::ToolUse(tool_use) => tool_uses.push(tool_use),
                        StreamEvent::Stop { stop_reason: reason, .. } => stop_reason = reason,
                    }
                }

                let message = assemble_message(text, tool_uses)?;

                match stop_reason {
                    StopReason::ToolUse => {
                        let results = self
                            .process_tool_calls(&message, &mut tool_call_infos)
                            .await;
                        messages.push(message);
                        messages.push(Message::tool_results(results));
                    }
                    StopReason::EndTurn | StopReason::StopSequence => {
                        finished = true;
                        break;
                    }
                    StopReason::MaxTokens => {
                        Err::<(), _>(AgentError::MaxTokensExceeded)?;
                    }
                    StopReason::Unknown => {
                        Err::<(), _>(AgentError::UnexpectedStopReason("Unknown".to_string()))?;
                    }
                }
            }

            if !finished {
                Err::<(), _>(AgentError::MaxIterationsExceeded(self.max_iterations))?;
            }
        })
    }
}
