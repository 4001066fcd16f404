//! Tool execution for Agent

use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde_json::Value;

use crate::tool::ToolResult;
use crate::types::{Message, ToolResultBlock, ToolResultStatus, ToolUseBlock};

use super::types::{AgentError, ToolCallInfo};
use super::Agent;

impl Agent {
    /// Execute a single tool call requested by the model
    pub(super) async fn execute_tool(
        &self,
        tool_use: &ToolUseBlock,
    ) -> Result<ToolResult, AgentError> {
        // Tool input must be a JSON object
        if !tool_use.input.is_object() {
            let type_name = match &tool_use.input {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            };
            return Err(AgentError::InvalidToolInput(format!(
                "Tool input must be a JSON object, got: {}",
                type_name
            )));
        }

        let tool = self
            .tools
            .get(&tool_use.name)
            .ok_or_else(|| AgentError::ToolNotFound(tool_use.name.clone()))?;

        tracing::debug!(tool = %tool_use.name, id = %tool_use.id, "executing tool");

        Ok(tool.execute_raw(tool_use.input.clone()).await?)
    }

    /// Process tool calls from a model response
    ///
    /// Executes all tool calls concurrently (up to max_concurrent_tools).
    /// Results come back in request order; failures become error results
    /// the model can react to rather than aborting the run.
    pub(super) async fn process_tool_calls(
        &self,
        message: &Message,
        tool_call_infos: &mut Vec<ToolCallInfo>,
    ) -> Vec<ToolResultBlock> {
        let tool_use_blocks: Vec<ToolUseBlock> = message.tool_uses().into_iter().cloned().collect();

        let results: Vec<_> = stream::iter(tool_use_blocks)
            .map(|tool_use| async move {
                let start = Instant::now();
                let result = self.execute_tool(&tool_use).await;
                (tool_use, result, start.elapsed())
            })
            .buffered(self.max_concurrent_tools)
            .collect()
            .await;

        results
            .into_iter()
            .map(|(tool_use, result, elapsed)| {
                tracing::debug!(
                    tool = %tool_use.name,
                    success = result.is_ok(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "tool call finished"
                );
                tool_call_infos.push(ToolCallInfo {
                    name: tool_use.name.clone(),
                    success: result.is_ok(),
                });

                match result {
                    Ok(tool_result) => ToolResultBlock {
                        tool_use_id: tool_use.id,
                        content: tool_result,
                        status: ToolResultStatus::Success,
                    },
                    Err(e) => {
                        tracing::warn!(tool = %tool_use.name, error = %e, "tool call failed");
                        ToolResultBlock {
                            tool_use_id: tool_use.id,
                            content: ToolResult::Text(format!("Error: {}", e)),
                            status: ToolResultStatus::Error,
                        }
                    }
                }
            })
            .collect()
    }
}
