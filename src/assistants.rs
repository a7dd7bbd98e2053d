//! Chat assistant operations (`/api/v1/chats`).

use reqwest::Method;
use tracing::debug;

use crate::client::RagflowClient;
use crate::error::Result;
use crate::models::{Assistant, AssistantPayload, CreateAssistantRequest, ListOptions, ListResponse};

const CHATS_PATH: &str = "/api/v1/chats";

fn assistant_path(assistant_id: &str) -> String {
    format!("{}/{}", CHATS_PATH, assistant_id)
}

impl RagflowClient {
    /// Create an assistant.
    ///
    /// POST /api/v1/chats
    pub async fn create_assistant(&self, req: &CreateAssistantRequest) -> Result<Assistant> {
        let body = AssistantPayload::from(req);
        let assistant: Assistant = self
            .call(self.request(Method::POST, CHATS_PATH).json(&body))
            .await?;
        debug!(assistant_id = %assistant.id, "assistant created");
        Ok(assistant)
    }

    /// Fetch one assistant.
    ///
    /// GET /api/v1/chats/{id}
    pub async fn get_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        self.call(self.request(Method::GET, &assistant_path(assistant_id)))
            .await
    }

    /// Replace an assistant's name, prompt, model and datasets.
    ///
    /// PUT /api/v1/chats/{id}
    pub async fn update_assistant(
        &self,
        assistant_id: &str,
        req: &CreateAssistantRequest,
    ) -> Result<Assistant> {
        let body = AssistantPayload::from(req);
        self.call(
            self.request(Method::PUT, &assistant_path(assistant_id))
                .json(&body),
        )
        .await
    }

    /// Delete an assistant.
    ///
    /// DELETE /api/v1/chats/{id}
    pub async fn delete_assistant(&self, assistant_id: &str) -> Result<()> {
        self.call_empty(self.request(Method::DELETE, &assistant_path(assistant_id)))
            .await?;
        debug!(assistant_id, "assistant deleted");
        Ok(())
    }

    /// List assistants, optionally paginated and filtered.
    ///
    /// GET /api/v1/chats
    pub async fn list_assistants(
        &self,
        options: Option<&ListOptions>,
    ) -> Result<ListResponse<Assistant>> {
        let query = options.map(ListOptions::to_query).unwrap_or_default();
        self.call_list(self.request(Method::GET, CHATS_PATH).query(&query))
            .await
    }
}
