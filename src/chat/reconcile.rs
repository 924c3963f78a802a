//! Streaming reconciliation state machine
//!
//! Reconstructs one growing message bubble from an ordered chunk sequence
//! and presents non-streamed messages without disrupting an in-progress
//! stream. Pure state: rendering side effects are described by the returned
//! [`RenderEvent`] and performed by the caller.

use crate::chat::markdown::repair_tables;
use crate::protocol::{Role, StreamChunk, PROCESSING_NOTICE};

/// What the UI should do in response to one chunk
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Show a transient notification; never enters the transcript
    Notification(String),
    /// A fragment arrived for the open bubble. `rendered` is the repaired
    /// markdown of the full accumulated text, recomputed on every append so
    /// formatting stays correct across fragment boundaries.
    Fragment {
        /// The fragment just appended
        text: String,
        /// Repaired markdown of the whole bubble so far
        rendered: String,
        /// Whether this fragment opened the bubble
        opened: bool,
    },
    /// The open bubble closed normally
    Closed {
        /// Raw accumulated text
        raw: String,
        /// Repaired markdown of the final text
        rendered: String,
    },
    /// A complete, non-streamed message: one bubble, opened and closed
    Complete {
        /// Raw message text
        raw: String,
        /// Repaired markdown
        rendered: String,
    },
}

/// Per-channel reconciliation state
#[derive(Debug, Default)]
pub struct Reconciler {
    stream_open: bool,
    buffer: String,
    transcript: Vec<(Role, String)>,
}

impl Reconciler {
    /// Create a fresh reconciler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stream is currently open
    #[must_use]
    pub fn stream_open(&self) -> bool {
        self.stream_open
    }

    /// Finished turns, in arrival order. System chunks never appear here.
    #[must_use]
    pub fn transcript(&self) -> &[(Role, String)] {
        &self.transcript
    }

    /// Raw text of the open bubble
    #[must_use]
    pub fn open_text(&self) -> &str {
        &self.buffer
    }

    /// The user is sending a new message: force-reset stream state so a
    /// stale in-flight stream can never be appended to afterwards.
    pub fn on_user_send(&mut self, text: &str) {
        self.stream_open = false;
        self.buffer.clear();
        self.transcript.push((Role::User, text.to_string()));
    }

    /// Process one incoming chunk
    pub fn on_chunk(&mut self, chunk: &StreamChunk) -> Option<RenderEvent> {
        match chunk.role {
            Role::System => {
                if chunk.content == PROCESSING_NOTICE {
                    None
                } else {
                    Some(RenderEvent::Notification(chunk.content.clone()))
                }
            }
            Role::Assistant => {
                if chunk.is_partial() {
                    let opened = !self.stream_open;
                    if opened {
                        self.stream_open = true;
                        self.buffer.clear();
                    }
                    self.buffer.push_str(&chunk.content);
                    Some(RenderEvent::Fragment {
                        text: chunk.content.clone(),
                        rendered: repair_tables(&self.buffer),
                        opened,
                    })
                } else if self.stream_open {
                    // Terminal transition. Defined to carry empty content;
                    // tolerated with content by closing without appending.
                    self.stream_open = false;
                    let raw = std::mem::take(&mut self.buffer);
                    self.transcript.push((Role::Assistant, raw.clone()));
                    let rendered = repair_tables(&raw);
                    Some(RenderEvent::Closed { raw, rendered })
                } else if !chunk.content.is_empty() {
                    // Standalone complete message: open and close in one step
                    self.transcript
                        .push((Role::Assistant, chunk.content.clone()));
                    Some(RenderEvent::Complete {
                        raw: chunk.content.clone(),
                        rendered: repair_tables(&chunk.content),
                    })
                } else {
                    None
                }
            }
            Role::User => None,
        }
    }
}
