//! Per-connection session state
//!
//! A session is one browser tab or terminal client: its transcript and the
//! single nullable slot for the assistant message currently being streamed.
//! Sessions live exactly as long as their channel and are never persisted.

use crate::protocol::Role;
use algodesk_llm::Message;
use chrono::{DateTime, Utc};

/// Most recent transcript entries included in the model context
/// (ten exchanges)
pub const HISTORY_WINDOW: usize = 20;

/// One turn in the transcript
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    /// user or assistant (system chunks are never transcribed)
    pub role: Role,
    /// Message text
    pub content: String,
    /// When the entry was recorded
    pub timestamp: DateTime<Utc>,
}

/// One chat session
#[derive(Debug)]
pub struct Session {
    /// Opaque session identifier
    pub id: String,
    transcript: Vec<TranscriptEntry>,
    open_message: Option<String>,
}

impl Session {
    /// Create a session for a connected client
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transcript: Vec::new(),
            open_message: None,
        }
    }

    /// Record a user turn. Any stale open assistant message is discarded
    /// first so a new turn can never append to it.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.open_message = None;
        self.transcript.push(TranscriptEntry {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    /// Record a complete assistant turn
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    /// Open the streaming slot. At most one assistant message is open for
    /// append at any time; opening replaces a stale slot.
    pub fn open_assistant(&mut self) {
        self.open_message = Some(String::new());
    }

    /// Append a fragment to the open assistant message
    pub fn append_open(&mut self, fragment: &str) {
        if let Some(open) = self.open_message.as_mut() {
            open.push_str(fragment);
        }
    }

    /// Close the open assistant message, committing the concatenation of
    /// all fragments to the transcript.
    pub fn close_open(&mut self) {
        if let Some(content) = self.open_message.take() {
            if !content.is_empty() {
                self.push_assistant(content);
            }
        }
    }

    /// Discard the open assistant message without committing it
    pub fn discard_open(&mut self) {
        self.open_message = None;
    }

    /// Whether an assistant message is open for append
    #[must_use]
    pub fn has_open(&self) -> bool {
        self.open_message.is_some()
    }

    /// Text accumulated in the open slot
    #[must_use]
    pub fn open_text(&self) -> Option<&str> {
        self.open_message.as_deref()
    }

    /// Full transcript
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Conversation context for the model: the system prompt followed by
    /// the most recent transcript window.
    #[must_use]
    pub fn context_messages(&self, system_prompt: &str) -> Vec<Message> {
        let start = self.transcript.len().saturating_sub(HISTORY_WINDOW);
        let mut messages = vec![Message::system(system_prompt)];
        for entry in &self.transcript[start..] {
            match entry.role {
                Role::User => messages.push(Message::user(&entry.content)),
                Role::Assistant => messages.push(Message::assistant(&entry.content)),
                Role::System => {}
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_append_close() {
        let mut session = Session::new("tab-1");
        session.push_user("Show my funds");
        session.open_assistant();
        session.append_open("Your available ");
        session.append_open("margin is ₹50,000.");
        session.close_open();

        assert!(!session.has_open());
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].content, "Your available margin is ₹50,000.");
        assert_eq!(transcript[1].role, Role::Assistant);
    }

    #[test]
    fn test_new_user_turn_discards_stale_open_message() {
        let mut session = Session::new("tab-1");
        session.open_assistant();
        session.append_open("half an ans");
        session.push_user("new question");

        assert!(!session.has_open());
        // The half-finished message never reached the transcript
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_discard_open_commits_nothing() {
        let mut session = Session::new("tab-1");
        session.open_assistant();
        session.append_open("doomed");
        session.discard_open();
        session.close_open();
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_close_without_content_commits_nothing() {
        let mut session = Session::new("tab-1");
        session.open_assistant();
        session.close_open();
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_context_window_bounded() {
        let mut session = Session::new("tab-1");
        for i in 0..30 {
            session.push_user(format!("q{i}"));
            session.push_assistant(format!("a{i}"));
        }

        let messages = session.context_messages("prompt");
        // system prompt + bounded window
        assert_eq!(messages.len(), 1 + HISTORY_WINDOW);
        assert_eq!(messages[1].content, "q20");
    }
}
