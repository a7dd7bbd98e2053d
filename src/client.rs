//! RAGFlow API client.
//!
//! This module provides the HTTP client for the RAGFlow REST API: bearer
//! authentication, envelope decoding for regular calls, and the transport
//! side of streaming chat completions. Resource operations live in
//! [`assistants`](crate::assistants) and [`sessions`](crate::sessions).

use bytes::Bytes;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::models::{ChatRequest, ListResponse, Response, Status};
use crate::stream::{ChatStream, StreamOptions};

/// Client for the RAGFlow HTTP API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RagflowClient {
    config: ClientConfig,
    http: Client,
}

impl RagflowClient {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().map_err(Error::Transport)?;
        Ok(Self { config, http })
    }

    /// Create a client with a caller-supplied `reqwest::Client`.
    pub fn with_http_client(config: ClientConfig, http: Client) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, http })
    }

    /// Create a client from `RAGFLOW_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Start a request with authentication applied.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.config.api_key.as_deref() {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Send a non-streaming request and return the raw body of a successful envelope.
    async fn execute(&self, builder: RequestBuilder) -> Result<Bytes> {
        let builder = match self.config.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        let response = check_status(builder.send().await?).await?;
        let body = response.bytes().await?;
        serde_json::from_slice::<Status>(&body)?.into_result()?;
        Ok(body)
    }

    /// Send a request and decode the `data` field of its envelope.
    pub(crate) async fn call<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.execute(builder).await?;
        let envelope: Response<T> = serde_json::from_slice(&body)?;
        Ok(envelope.data)
    }

    /// Send a request to a list endpoint.
    pub(crate) async fn call_list<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ListResponse<T>> {
        let body = self.execute(builder).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request whose payload is ignored.
    pub(crate) async fn call_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.execute(builder).await.map(|_| ())
    }

    /// Ask an assistant a question and wait for the whole answer.
    ///
    /// Returns the concatenated answer text, or the first error the stream
    /// reports.
    pub async fn chat(&self, chat_id: &str, request: ChatRequest) -> Result<String> {
        self.chat_stream(chat_id, request).await?.collect_text().await
    }

    /// Ask an assistant a question and consume the answer incrementally.
    pub async fn chat_stream(&self, chat_id: &str, request: ChatRequest) -> Result<ChatStream> {
        self.chat_stream_with_cancel(chat_id, request, CancellationToken::new())
            .await
    }

    /// Like [`chat_stream`](Self::chat_stream), observing `cancel` while the
    /// request is in flight and before every line of the answer.
    pub async fn chat_stream_with_cancel(
        &self,
        chat_id: &str,
        mut request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<ChatStream> {
        request.stream = true;
        let path = format!("/api/v1/chats/{}/completions", chat_id);
        let builder = self
            .request(Method::POST, &path)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(&request);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = builder.send() => response?,
        };
        let response = check_status(response).await?;
        debug!(chat_id, session_id = ?request.session_id, "chat stream opened");

        let options = StreamOptions {
            max_line_bytes: self.config.max_line_bytes,
            buffer: self.config.stream_buffer,
        };
        Ok(ChatStream::from_body(response.bytes_stream(), options, cancel))
    }
}

/// Pass a successful response through; turn anything else into an error.
///
/// The body of a failed response is read in full and decoded as
/// `{code, message}` when possible. A body that cannot be read is a transport
/// error.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(status = status.as_u16(), error = %e, "failed to read error body");
            return Err(Error::Transport(e));
        }
    };
    debug!(status = status.as_u16(), "request failed");
    Err(decode_error_body(status.as_u16(), &body))
}

/// Map a non-success status and its body to an [`Error`].
pub(crate) fn decode_error_body(status: u16, body: &str) -> Error {
    match serde_json::from_str::<Status>(body) {
        Ok(parsed) if parsed.code != 0 => Error::HttpStatus {
            status,
            error: ApiError::new(parsed.code, parsed.message),
        },
        _ => Error::UnexpectedStatus {
            status,
            body: body.to_string(),
        },
    }
}
