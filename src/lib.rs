//! Async client for the RAGFlow chat assistant API.
//!
//! The centerpiece is [`RagflowClient::chat_stream`], which consumes a
//! server-sent completion stream and yields one [`StreamEvent`] per answer
//! increment. Assistant and session management are plain request/response
//! calls on the same client.
//!
//! # Example
//!
//! ```no_run
//! use ragflow::{ChatRequest, ClientConfig, RagflowClient};
//!
//! # async fn run() -> ragflow::Result<()> {
//! let client = RagflowClient::new(
//!     ClientConfig::new("http://localhost:9380").with_api_key("ragflow-xxxx"),
//! )?;
//! let mut stream = client.chat_stream("chat-id", ChatRequest::new("What is RAG?")).await?;
//! while let Some(event) = stream.recv().await {
//!     let event = event?;
//!     if event.done {
//!         break;
//!     }
//!     print!("{}", event.delta);
//! }
//! # Ok(())
//! # }
//! ```

pub mod assistants;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod sessions;
pub mod stream;

pub use client::RagflowClient;
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result};
pub use models::{
    Assistant, ChatRequest, CreateAssistantRequest, CreateSessionRequest, ListOptions,
    ListResponse, Llm, Prompt, PromptVariable, Response, Session, SessionMessage,
    UpdateSessionRequest,
};
pub use stream::{ChatStream, StreamEvent, StreamOptions};
