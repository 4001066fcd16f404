//! Wire types for the Anthropic Messages API and conversions to bometa types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::TokenUsage;
use crate::tool::ToolResult;
use crate::types::{
    ContentBlock, Message, Role, StopReason, ToolDefinition, ToolResultStatus, ToolUseBlock,
};

#[derive(Debug, Serialize)]
pub struct MessageCreateParams {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<MessageParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolParam>,
}

#[derive(Debug, Serialize)]
pub struct MessageParam {
    pub role: &'static str,
    pub content: Vec<ContentBlockParam>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlockParam {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct ToolParam {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub content: Vec<ResponseContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

// ===== bometa -> Anthropic =====

pub fn to_anthropic_message(msg: &Message) -> MessageParam {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let content = msg
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::Text(text) => ContentBlockParam::Text { text: text.clone() },
            ContentBlock::ToolUse(tool_use) => ContentBlockParam::ToolUse {
                id: tool_use.id.clone(),
                name: tool_use.name.clone(),
                input: tool_use.input.clone(),
            },
            ContentBlock::ToolResult(result) => ContentBlockParam::ToolResult {
                tool_use_id: result.tool_use_id.clone(),
                content: match &result.content {
                    ToolResult::Text(text) => text.clone(),
                    ToolResult::Json(json) => json.to_string(),
                },
                is_error: result.status == ToolResultStatus::Error,
            },
        })
        .collect();

    MessageParam { role, content }
}

pub fn to_anthropic_tool(tool: ToolDefinition) -> ToolParam {
    ToolParam {
        name: tool.name,
        description: tool.description,
        input_schema: tool.input_schema,
    }
}

// ===== Anthropic -> bometa =====

pub fn from_anthropic_content(blocks: Vec<ResponseContentBlock>) -> Vec<ContentBlock> {
    blocks
        .into_iter()
        .filter_map(|block| match block {
            ResponseContentBlock::Text { text } => Some(ContentBlock::Text(text)),
            ResponseContentBlock::ToolUse { id, name, input } => {
                Some(ContentBlock::ToolUse(ToolUseBlock { id, name, input }))
            }
            ResponseContentBlock::Unsupported => None,
        })
        .collect()
}

pub fn from_anthropic_stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("end_turn") => StopReason::EndTurn,
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        _ => StopReason::Unknown,
    }
}

pub fn from_anthropic_usage(usage: Option<Usage>) -> Option<TokenUsage> {
    usage.map(|u| TokenUsage {
        input_tokens: u.input_tokens,
        output_tokens: u.output_tokens,
    })
}
