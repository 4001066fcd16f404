//! Helper functions for the Agent module

use crate::types::{ContentBlock, Message, Role, ToolUseBlock};

use super::types::AgentError;

/// Extract the first text content from a message
///
/// Returns the first text block found in the message content,
/// or None if no text content exists.
pub fn extract_text_response(message: &Message) -> Option<String> {
    message.content.iter().find_map(|c| {
        if let ContentBlock::Text(t) = c {
            Some(t.clone())
        } else {
            None
        }
    })
}

/// Assemble the assistant message for one streamed model turn
pub fn assemble_message(text: String, tool_uses: Vec<ToolUseBlock>) -> Result<Message, AgentError> {
    let mut content = Vec::new();
    if !text.is_empty() {
        content.push(ContentBlock::Text(text));
    }
    content.extend(tool_uses.into_iter().map(ContentBlock::ToolUse));

    if content.is_empty() {
        return Err(AgentError::EmptyResponse);
    }

    Ok(Message {
        role: Role::Assistant,
        content,
    })
}
