//! Events delivered to stream consumers.

/// One observable increment of the assistant's answer, or the completion marker.
///
/// When `done` is true every other field is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamEvent {
    /// Text added since the previous event
    pub delta: String,
    /// Cumulative answer so far
    pub full: String,
    /// Message ID assigned by the server
    pub id: String,
    pub session_id: String,
    /// Retrieval references (chunks, documents) attached to the answer
    pub reference: serde_json::Value,
    pub done: bool,
}

impl StreamEvent {
    /// The terminal completion marker.
    pub fn done() -> Self {
        Self {
            done: true,
            ..Self::default()
        }
    }
}
