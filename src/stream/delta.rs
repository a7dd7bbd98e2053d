//! Delta extraction from cumulative answers.

use tracing::warn;

use super::event::StreamEvent;
use super::frame::DataFrame;

/// Cursor over the cumulative answer of one stream.
///
/// Owned by the stream's producer task and dropped with it.
#[derive(Debug, Default)]
pub struct StreamState {
    previous_full: String,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last cumulative answer seen.
    pub fn previous_full(&self) -> &str {
        &self.previous_full
    }

    /// Apply one data frame, returning the event to emit, if any.
    ///
    /// Frames with an empty answer are heartbeats and produce nothing. An
    /// answer that does not extend the previous one replaces it: the whole new
    /// answer becomes the delta.
    pub fn apply(&mut self, frame: DataFrame) -> Option<StreamEvent> {
        if frame.answer.is_empty() {
            return None;
        }

        let delta = match frame.answer.strip_prefix(self.previous_full.as_str()) {
            Some(suffix) => suffix.to_string(),
            None => {
                warn!(
                    previous_len = self.previous_full.len(),
                    answer_len = frame.answer.len(),
                    "cumulative answer does not extend the previous one, treating it as a replacement"
                );
                frame.answer.clone()
            }
        };

        self.previous_full.clone_from(&frame.answer);

        Some(StreamEvent {
            delta,
            full: frame.answer,
            id: frame.id,
            session_id: frame.session_id,
            reference: frame.reference,
            done: false,
        })
    }
}
