//! Session operations (`/api/v1/chats/{chat_id}/sessions`).

use reqwest::Method;
use tracing::debug;

use crate::client::RagflowClient;
use crate::error::Result;
use crate::models::{CreateSessionRequest, ListOptions, ListResponse, Session, UpdateSessionRequest};

fn sessions_path(chat_id: &str) -> String {
    format!("/api/v1/chats/{}/sessions", chat_id)
}

fn session_path(chat_id: &str, session_id: &str) -> String {
    format!("{}/{}", sessions_path(chat_id), session_id)
}

impl RagflowClient {
    /// Open a session with an assistant.
    ///
    /// POST /api/v1/chats/{chat_id}/sessions
    pub async fn create_session(&self, chat_id: &str, req: &CreateSessionRequest) -> Result<Session> {
        let session: Session = self
            .call(self.request(Method::POST, &sessions_path(chat_id)).json(req))
            .await?;
        debug!(chat_id, session_id = %session.id, "session created");
        Ok(session)
    }

    /// Fetch one session.
    ///
    /// GET /api/v1/chats/{chat_id}/sessions/{session_id}
    pub async fn get_session(&self, chat_id: &str, session_id: &str) -> Result<Session> {
        self.call(self.request(Method::GET, &session_path(chat_id, session_id)))
            .await
    }

    /// Rename a session.
    ///
    /// PUT /api/v1/chats/{chat_id}/sessions/{session_id}
    pub async fn update_session(
        &self,
        chat_id: &str,
        session_id: &str,
        req: &UpdateSessionRequest,
    ) -> Result<Session> {
        self.call(
            self.request(Method::PUT, &session_path(chat_id, session_id))
                .json(req),
        )
        .await
    }

    /// DELETE /api/v1/chats/{chat_id}/sessions/{session_id}
    pub async fn delete_session(&self, chat_id: &str, session_id: &str) -> Result<()> {
        self.call_empty(self.request(Method::DELETE, &session_path(chat_id, session_id)))
            .await
    }

    /// List an assistant's sessions.
    ///
    /// GET /api/v1/chats/{chat_id}/sessions
    pub async fn list_sessions(
        &self,
        chat_id: &str,
        options: Option<&ListOptions>,
    ) -> Result<ListResponse<Session>> {
        let query = options.map(ListOptions::to_query).unwrap_or_default();
        self.call_list(self.request(Method::GET, &sessions_path(chat_id)).query(&query))
            .await
    }
}
