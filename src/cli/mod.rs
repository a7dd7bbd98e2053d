//! CLI module for `ragflow-chat`.
//!
//! - Argument parsing
//! - Version display
//! - Streaming a chat answer to stdout
//!
//! # Usage
//!
//! ```ignore
//! use ragflow::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Chat(args) => { /* run_chat(...) */ }
//!     other => { /* version, help, invalid */ }
//! }
//! ```

pub mod args;
pub mod chat;
pub mod version;

pub use args::{parse_args, ChatArgs, CliCommand, USAGE};
pub use chat::run_chat;
pub use version::{version_string, VERSION};
