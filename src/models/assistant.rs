use serde::{Deserialize, Serialize};

use super::deserialize_id;

/// A chat assistant as returned by `/api/v1/chats`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Assistant {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub dataset_ids: Vec<String>,
    /// Dataset summaries; the server fills this on reads instead of `dataset_ids`
    #[serde(default)]
    pub datasets: Vec<serde_json::Value>,
    #[serde(default)]
    pub llm: Option<Llm>,
    #[serde(default)]
    pub prompt: Option<Prompt>,
    #[serde(default)]
    pub status: Option<String>,
    /// Creation time in milliseconds since the epoch
    #[serde(default)]
    pub create_time: Option<i64>,
    #[serde(default)]
    pub update_time: Option<i64>,
}

/// LLM settings of an assistant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Llm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Prompt and retrieval settings of an assistant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Reply used when retrieval finds nothing relevant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_response: Option<String>,
    /// Greeting shown at the start of a session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<PromptVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_quote: Option<bool>,
}

/// A `{key}` placeholder referenced by the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVariable {
    pub key: String,
    #[serde(default)]
    pub optional: bool,
}

impl PromptVariable {
    pub fn required(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            optional: false,
        }
    }

    pub fn optional(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            optional: true,
        }
    }
}

/// Parameters for creating or updating an assistant.
///
/// The flat caller-facing shape is converted to the nested wire body
/// (`prompt: {..}`, `llm: {model_name}`) before sending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateAssistantRequest {
    pub name: String,
    pub prompt: Option<String>,
    pub empty_response: Option<String>,
    pub variables: Vec<PromptVariable>,
    pub llm_model: Option<String>,
    pub dataset_ids: Vec<String>,
}

impl CreateAssistantRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_empty_response(mut self, reply: impl Into<String>) -> Self {
        self.empty_response = Some(reply.into());
        self
    }

    pub fn with_variable(mut self, variable: PromptVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_llm_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = Some(model.into());
        self
    }

    pub fn with_dataset_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dataset_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Wire body for `POST /api/v1/chats` and `PUT /api/v1/chats/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AssistantPayload {
    name: String,
    prompt: Prompt,
    #[serde(skip_serializing_if = "Option::is_none")]
    llm: Option<Llm>,
    dataset_ids: Vec<String>,
}

impl From<&CreateAssistantRequest> for AssistantPayload {
    fn from(req: &CreateAssistantRequest) -> Self {
        Self {
            name: req.name.clone(),
            prompt: Prompt {
                prompt: req.prompt.clone(),
                empty_response: req.empty_response.clone(),
                variables: req.variables.clone(),
                ..Prompt::default()
            },
            llm: req.llm_model.as_ref().map(|model| Llm {
                model_name: Some(model.clone()),
                ..Llm::default()
            }),
            dataset_ids: req.dataset_ids.clone(),
        }
    }
}
