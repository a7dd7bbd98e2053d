//! `ragflow-chat <chat_id> <question>`: stream an answer to stdout.

use std::io::Write;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::args::ChatArgs;
use crate::client::RagflowClient;
use crate::models::ChatRequest;

impl ChatArgs {
    /// Build the completion request for these arguments.
    pub fn to_request(&self) -> ChatRequest {
        let mut request = ChatRequest::new(self.question.clone());
        request.session_id = self.session_id.clone();
        request.user_id = self.user_id.clone();
        request
    }
}

/// Ask the question and write the answer to `out`.
///
/// Deltas are written as they arrive unless `quiet` is set, followed by the
/// session ID on stderr. Ctrl+C cancels the stream.
pub async fn run_chat<W: Write>(client: &RagflowClient, args: &ChatArgs, out: &mut W) -> Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, cancelling stream");
            ctrl_c_cancel.cancel();
        }
    });

    let result = stream_answer(client, args, cancel, out).await;
    ctrl_c.abort();
    result
}

async fn stream_answer<W: Write>(
    client: &RagflowClient,
    args: &ChatArgs,
    cancel: CancellationToken,
    out: &mut W,
) -> Result<()> {
    let mut stream = client
        .chat_stream_with_cancel(&args.chat_id, args.to_request(), cancel)
        .await
        .wrap_err_with(|| format!("failed to open chat with assistant {}", args.chat_id))?;

    if args.quiet {
        let answer = stream.collect_text().await.wrap_err("chat stream failed")?;
        writeln!(out, "{}", answer)?;
        return Ok(());
    }

    let mut session_id = None;
    while let Some(event) = stream.recv().await {
        let event = event.wrap_err("chat stream failed")?;
        if event.done {
            break;
        }
        if session_id.is_none() && !event.session_id.is_empty() {
            session_id = Some(event.session_id.clone());
        }
        write!(out, "{}", event.delta)?;
        out.flush()?;
    }
    writeln!(out)?;

    if let Some(id) = session_id {
        debug!(session_id = %id, "answer complete");
        eprintln!("session: {}", id);
    }
    Ok(())
}
