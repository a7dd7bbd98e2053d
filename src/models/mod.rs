//! Wire models for the RAGFlow HTTP API.
//!
//! - `envelope` - `{code, message, data}` wrappers shared by every endpoint
//! - `assistant` - chat assistants (`/api/v1/chats`)
//! - `session` - conversation sessions (`/api/v1/chats/{id}/sessions`)
//! - `chat` - completion requests (`/api/v1/chats/{id}/completions`)
//! - `list` - pagination and filtering options

mod assistant;
mod chat;
mod envelope;
mod list;
mod session;

pub use assistant::{Assistant, CreateAssistantRequest, Llm, Prompt, PromptVariable};
pub(crate) use assistant::AssistantPayload;
pub use chat::ChatRequest;
pub use envelope::{ListResponse, Response};
pub(crate) use envelope::Status;
pub use list::ListOptions;
pub use session::{CreateSessionRequest, Session, SessionMessage, UpdateSessionRequest};

use serde::{Deserialize, Deserializer};

/// Deserialize an identifier sent as a string, an integer, or `null`.
///
/// Missing and `null` values become an empty string.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Str(s)) => s,
        Some(RawId::Int(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Deserialize a string that may be sent as `null`.
///
/// Missing and `null` values become an empty string.
pub(crate) fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
