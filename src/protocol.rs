//! Wire protocol between the relay and its chat clients
//!
//! One duplex channel per session. Relay → client messages are
//! [`StreamChunk`]s: `partial: true` marks a fragment of an in-progress
//! assistant answer, `partial: false` with empty content terminates a
//! fragment run, and an absent/false `partial` with content is a complete,
//! non-streamed message. Client → relay messages are plain user turns.

use serde::{Deserialize, Serialize};

/// Transient notice sent while a turn is being processed. Clients suppress
/// this exact content even as a notification.
pub const PROCESSING_NOTICE: &str = "Processing your request...";

/// Message role on the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Transient notification, never part of the transcript
    System,
    /// Assistant output (streamed or complete)
    Assistant,
    /// User input
    User,
}

/// A unit sent over the duplex channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Sender role
    pub role: Role,
    /// Content fragment or full message text
    pub content: String,
    /// `Some(true)`: more fragments follow. `Some(false)` with empty
    /// content: end of a fragment run. Absent: non-streamed message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
}

impl StreamChunk {
    /// A fragment of an in-progress assistant answer
    pub fn fragment(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            partial: Some(true),
        }
    }

    /// The end-of-stream marker for a fragment run
    pub fn terminator() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            partial: Some(false),
        }
    }

    /// A complete, non-streamed assistant message
    pub fn complete(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            partial: None,
        }
    }

    /// A transient system notification
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            partial: None,
        }
    }

    /// Whether more fragments follow this chunk
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.partial.unwrap_or(false)
    }
}

/// A user turn received from the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMessage {
    /// Must be [`Role::User`]
    pub role: Role,
    /// The user's message text
    pub content: String,
}

impl UserMessage {
    /// Build a user message
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Connection state reported by `/api/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Gateway reachable
    Connected,
    /// Gateway unreachable
    Disconnected,
    /// Probe failed with an error
    Error,
}

/// Response body of `/api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Connection state
    pub status: ConnectionStatus,
    /// Gateway endpoint the relay is bound to
    pub mcp_server: String,
    /// Error detail, when status is `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_wire_shape() {
        let json = serde_json::to_value(StreamChunk::fragment("Your available ")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "Your available ");
        assert_eq!(json["partial"], true);
    }

    #[test]
    fn test_terminator_wire_shape() {
        let json = serde_json::to_value(StreamChunk::terminator()).unwrap();
        assert_eq!(json["partial"], false);
        assert_eq!(json["content"], "");
    }

    #[test]
    fn test_complete_message_omits_partial() {
        let json = serde_json::to_value(StreamChunk::complete("Welcome")).unwrap();
        assert!(json.get("partial").is_none());
    }

    #[test]
    fn test_absent_partial_deserializes_as_none() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"role": "assistant", "content": "hi"}"#).unwrap();
        assert_eq!(chunk.partial, None);
        assert!(!chunk.is_partial());
    }

    #[test]
    fn test_user_message_round_trip() {
        let json = serde_json::to_string(&UserMessage::new("Show my funds")).unwrap();
        let parsed: UserMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.role, Role::User);
        assert_eq!(parsed.content, "Show my funds");
    }

    #[test]
    fn test_status_response_shape() {
        let json = serde_json::to_value(StatusResponse {
            status: ConnectionStatus::Connected,
            mcp_server: "http://localhost:8001/sse".to_string(),
            message: None,
        })
        .unwrap();
        assert_eq!(json["status"], "connected");
        assert!(json.get("message").is_none());
    }
}
