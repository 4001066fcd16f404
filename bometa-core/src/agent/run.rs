//! The chat loop: call the model, run the tools it asks for, repeat

use std::time::Instant;

use crate::model::TokenUsage;
use crate::types::{Message, StopReason};

use super::helpers::extract_text_response;
use super::types::{AgentError, AgentResponse, ToolCallInfo};
use super::Agent;

impl Agent {
    /// Run the agent with a single user message
    pub async fn run(&self, user_message: &str) -> Result<AgentResponse, AgentError> {
        self.run_chat(vec![Message::user(user_message)]).await
    }

    /// Run the agent over a conversation ending with the user's question
    ///
    /// Calls the model and executes tools until the model returns a final
    /// text response.
    ///
    /// # Errors
    ///
    /// - `Provider` - API errors (authentication, rate limits, network issues)
    /// - `NoResponse` - Model finished without any text
    /// - `MaxTokensExceeded` - Response hit token limit
    /// - `MaxIterationsExceeded` - Model kept calling tools
    pub async fn run_chat(&self, messages: Vec<Message>) -> Result<AgentResponse, AgentError> {
        let run_start = Instant::now();
        let mut messages = messages;

        let mut tool_call_infos: Vec<ToolCallInfo> = Vec::new();
        let mut usage = TokenUsage::default();
        let mut model_call_count: usize = 0;

        while model_call_count < self.max_iterations {
            let response = self
                .generate_with_streaming(messages.clone(), self.tools.definitions())
                .await?;

            model_call_count += 1;
            if let Some(call_usage) = response.usage {
                usage += call_usage;
            }

            match response.stop_reason {
                StopReason::ToolUse => {
                    let tool_results = self
                        .process_tool_calls(&response.message, &mut tool_call_infos)
                        .await;
                    messages.push(response.message);
                    messages.push(Message::tool_results(tool_results));
                }
                StopReason::EndTurn | StopReason::StopSequence => {
                    let text =
                        extract_text_response(&response.message).ok_or(AgentError::NoResponse)?;

                    return Ok(AgentResponse {
                        text,
                        tool_calls: tool_call_infos,
                        usage,
                        model_calls: model_call_count,
                        duration: run_start.elapsed(),
                    });
                }
                StopReason::MaxTokens => return Err(AgentError::MaxTokensExceeded),
                StopReason::Unknown => {
                    return Err(AgentError::UnexpectedStopReason("Unknown".to_string()))
                }
            }
        }

        Err(AgentError::MaxIterationsExceeded(self.max_iterations))
    }
}
