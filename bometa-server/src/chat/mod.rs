//! Question answering endpoints.

mod handler;

pub use handler::{qa, stream_qa, ChatData, ChatMessage, QaResponse, ToolCallSummary, DONE_MARKER};
