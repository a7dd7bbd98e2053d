//! Streaming chat completions.
//!
//! A completion body is consumed by one background task per stream:
//!
//! ```text
//! response body -> FrameReader -> RawFrame::classify -> StreamState -> mpsc -> ChatStream
//!                                                                 \-> oneshot (terminal error)
//! ```
//!
//! Events arrive in the order their frames were read. Every stream ends with
//! exactly one of: a `done` event, an error, or (if the body closes without a
//! completion frame) plain end of stream.
//!
//! # Module structure
//! - `event` - [`StreamEvent`]
//! - `frame` - frame classification ([`RawFrame`])
//! - `delta` - delta extraction ([`StreamState`])
//! - `reader` - buffered line reader ([`FrameReader`])

mod delta;
mod event;
mod frame;
mod reader;

pub use delta::StreamState;
pub use event::StreamEvent;
pub use frame::{DataFrame, RawFrame};
pub use reader::FrameReader;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::config::{DEFAULT_MAX_LINE_BYTES, DEFAULT_STREAM_BUFFER};
use crate::error::{BoxError, Error, Result};

/// Tuning for one stream's producer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Maximum size of a single line
    pub max_line_bytes: usize,
    /// Event channel capacity
    pub buffer: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            buffer: DEFAULT_STREAM_BUFFER,
        }
    }
}

/// Handle to a running chat completion stream.
///
/// Consume it with [`recv`](Self::recv), as a [`futures::Stream`], or drain
/// it with [`collect_text`](Self::collect_text). Dropping the handle cancels
/// the producer task and releases the response body.
pub struct ChatStream {
    events: mpsc::Receiver<StreamEvent>,
    error: oneshot::Receiver<Error>,
    /// The error slot has resolved (value taken or sender dropped)
    error_done: bool,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl ChatStream {
    /// Start consuming `body` on a background task.
    ///
    /// `cancel` is observed before every line read; cancelling it ends the
    /// stream with [`Error::Cancelled`]. Must be called within a tokio runtime.
    pub fn from_body<S, E>(body: S, options: StreamOptions, cancel: CancellationToken) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let (event_tx, events) = mpsc::channel(options.buffer.max(1));
        let (error_tx, error) = oneshot::channel();
        let reader = FrameReader::new(body, options.max_line_bytes);

        // Child token: dropping the handle must not cancel the caller's token.
        let cancel = cancel.child_token();
        let producer_cancel = cancel.clone();

        tokio::spawn(async move {
            match produce(reader, event_tx, producer_cancel).await {
                Ok(()) => debug!("chat stream finished"),
                Err(err) => {
                    debug!(error = %err, "chat stream failed");
                    let _ = error_tx.send(err);
                }
            }
        });

        Self {
            events,
            error,
            error_done: false,
            _guard: cancel.clone().drop_guard(),
            cancel,
        }
    }

    /// Request cancellation. The stream then ends with [`Error::Cancelled`]
    /// unless it already terminated.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token controlling this stream.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Receive the next event.
    ///
    /// Yields events in order, then at most one `Err`, then `None`.
    pub async fn recv(&mut self) -> Option<Result<StreamEvent>> {
        std::future::poll_fn(|cx| self.poll_item(cx)).await
    }

    /// Drain the stream into the full answer text.
    ///
    /// Returns the first error observed, even if events are still buffered.
    /// A `done` event, or the end of the stream without an error, returns the
    /// concatenated deltas.
    pub async fn collect_text(self) -> Result<String> {
        let ChatStream {
            mut events,
            mut error,
            mut error_done,
            _guard,
            ..
        } = self;
        let mut full = String::new();

        loop {
            tokio::select! {
                biased;

                res = &mut error, if !error_done => match res {
                    Ok(err) => return Err(err),
                    Err(_) => error_done = true,
                },

                event = events.recv() => match event {
                    Some(event) if event.done => return Ok(full),
                    Some(event) => full.push_str(&event.delta),
                    None if error_done => return Ok(full),
                    None => {
                        // The producer deposits its error before releasing the slot.
                        return match error.await {
                            Ok(err) => Err(err),
                            Err(_) => Ok(full),
                        };
                    }
                },
            }
        }
    }

    fn poll_item(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<StreamEvent>>> {
        match self.events.poll_recv(cx) {
            Poll::Ready(Some(event)) => return Poll::Ready(Some(Ok(event))),
            Poll::Ready(None) => {}
            Poll::Pending => return Poll::Pending,
        }

        if self.error_done {
            return Poll::Ready(None);
        }

        match Pin::new(&mut self.error).poll(cx) {
            Poll::Ready(res) => {
                self.error_done = true;
                Poll::Ready(res.ok().map(Err))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Stream for ChatStream {
    type Item = Result<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_item(cx)
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("error_done", &self.error_done)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Producer loop: read, classify, extract, deliver.
///
/// Returns `Ok(())` on a completion frame, body exhaustion, or a departed
/// consumer; any other exit is the stream's terminal error.
async fn produce(
    mut reader: FrameReader,
    events: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut state = StreamState::new();

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let payload = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            next = reader.next_data() => match next {
                Some(payload) => payload?,
                None => {
                    debug!("stream body ended without a completion frame");
                    return Ok(());
                }
            },
        };

        let event = match RawFrame::classify(&payload) {
            RawFrame::Sentinel => {
                deliver(&events, StreamEvent::done(), &cancel).await?;
                return Ok(());
            }
            RawFrame::Error(api) => return Err(Error::Api(api)),
            RawFrame::Data(frame) => match state.apply(frame) {
                Some(event) => event,
                None => continue,
            },
            RawFrame::Unparseable => {
                debug!(len = payload.len(), "skipping unparseable frame");
                continue;
            }
        };

        if !deliver(&events, event, &cancel).await? {
            debug!("stream consumer dropped, stopping");
            return Ok(());
        }
    }
}

/// Hand one event to the consumer. `Ok(false)` means the receiver is gone.
async fn deliver(
    events: &mpsc::Sender<StreamEvent>,
    event: StreamEvent,
    cancel: &CancellationToken,
) -> Result<bool> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        sent = events.send(event) => Ok(sent.is_ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use futures::{stream, StreamExt};
    use std::io;
    use std::time::Duration;

    fn body(lines: &[&str]) -> impl Stream<Item = std::result::Result<Bytes, io::Error>> + Send + 'static {
        let chunks: Vec<_> = lines
            .iter()
            .map(|l| Ok::<_, io::Error>(Bytes::from(format!("{}\n", l))))
            .collect();
        stream::iter(chunks)
    }

    fn open(lines: &[&str]) -> ChatStream {
        ChatStream::from_body(body(lines), StreamOptions::default(), CancellationToken::new())
    }

    async fn drain(mut stream: ChatStream) -> (Vec<StreamEvent>, Vec<Error>) {
        let mut events = Vec::new();
        let mut errors = Vec::new();
        while let Some(item) = stream.recv().await {
            match item {
                Ok(e) => events.push(e),
                Err(e) => errors.push(e),
            }
        }
        (events, errors)
    }

    #[tokio::test]
    async fn test_hello_world_scenario() {
        let (events, errors) = drain(open(&[
            r#"data:{"data":{"answer":"Hello"}}"#,
            r#"data:{"data":{"answer":"Hello world"}}"#,
            "data: true",
        ]))
        .await;

        assert!(errors.is_empty());
        assert_eq!(events.len(), 3);
        assert_eq!((events[0].delta.as_str(), events[0].full.as_str()), ("Hello", "Hello"));
        assert_eq!((events[1].delta.as_str(), events[1].full.as_str()), (" world", "Hello world"));
        assert_eq!(events[2], StreamEvent::done());
    }

    #[tokio::test]
    async fn test_error_frame_ends_stream_without_done() {
        let (events, errors) = drain(open(&[
            r#"data:{"data":{"answer":"Hi"}}"#,
            r#"data:{"code":500,"message":"internal"}"#,
            r#"data:{"data":{"answer":"Hi there"}}"#,
            "data: true",
        ]))
        .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].delta, "Hi");
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], Error::Api(e) if *e == ApiError::new(500, "internal")));
        assert_eq!(errors[0].to_string(), "API error 500: internal");
    }

    #[tokio::test]
    async fn test_error_frame_with_null_message_ends_stream() {
        let (events, errors) = drain(open(&[
            r#"data:{"code":500,"message":null}"#,
            "data:true",
        ]))
        .await;

        assert!(events.iter().all(|e| !e.done), "no done event after an error");
        assert!(events.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], Error::Api(e) if *e == ApiError::new(500, "")));
        assert_eq!(errors[0].to_string(), "API error 500: ");
    }

    #[tokio::test]
    async fn test_malformed_frames_are_ignored() {
        let (events, errors) = drain(open(&[
            "data:not-json",
            r#"data:{"data":{"answer":"OK"}}"#,
            "data:{broken",
            "data:true",
        ]))
        .await;

        assert!(errors.is_empty());
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].delta.as_str(), events[0].full.as_str()), ("OK", "OK"));
        assert!(events[1].done);
    }

    #[tokio::test]
    async fn test_exhaustion_without_sentinel_is_silent() {
        let (events, errors) = drain(open(&[r#"data:{"data":{"answer":"partial"}}"#])).await;
        assert_eq!(events.len(), 1);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_exactly_one_terminal_signal() {
        let cases: Vec<Vec<&str>> = vec![
            vec![r#"data:{"data":{"answer":"a"}}"#, "data:true", "data:true"],
            vec![r#"data:{"code":1,"message":"x"}"#, "data:true"],
            vec!["data:true", r#"data:{"code":1,"message":"x"}"#],
        ];
        for lines in cases {
            let (events, errors) = drain(open(&lines)).await;
            let terminals = events.iter().filter(|e| e.done).count() + errors.len();
            assert_eq!(terminals, 1, "lines: {:?}", lines);
        }
    }

    #[tokio::test]
    async fn test_collect_text() {
        let text = open(&[
            r#"data:{"data":{"answer":"Hello"}}"#,
            ": comment",
            r#"data:{"data":{"answer":""}}"#,
            r#"data:{"data":{"answer":"Hello world"}}"#,
            "data: true",
        ])
        .collect_text()
        .await
        .unwrap();
        assert_eq!(text, "Hello world");
    }

    #[tokio::test]
    async fn test_collect_text_returns_error() {
        let err = open(&[
            r#"data:{"data":{"answer":"Hi"}}"#,
            r#"data:{"code":500,"message":"internal"}"#,
        ])
        .collect_text()
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "API error 500: internal");
    }

    #[tokio::test]
    async fn test_collect_text_on_exhaustion() {
        let text = open(&[r#"data:{"data":{"answer":"cut"}}"#]).collect_text().await.unwrap();
        assert_eq!(text, "cut");
    }

    #[tokio::test]
    async fn test_read_error_surfaces_after_events() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"data:{\"data\":{\"answer\":\"a\"}}\n")),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed")),
        ]);
        let (events, errors) = drain(ChatStream::from_body(
            body,
            StreamOptions::default(),
            CancellationToken::new(),
        ))
        .await;
        assert_eq!(events.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::Read(_)));
    }

    #[tokio::test]
    async fn test_cancel_while_body_is_stalled() {
        let first = stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(
            b"data:{\"data\":{\"answer\":\"a\"}}\n",
        ))]);
        let body = first.chain(stream::pending());
        let token = CancellationToken::new();
        let mut stream = ChatStream::from_body(body, StreamOptions::default(), token.clone());

        let first = stream.recv().await.unwrap().unwrap();
        assert_eq!(first.delta, "a");

        token.cancel();
        let next = tokio::time::timeout(Duration::from_secs(1), stream.recv())
            .await
            .expect("cancellation should not hang");
        assert!(matches!(next, Some(Err(Error::Cancelled))));
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_handle_cancel_method() {
        let body = stream::pending::<std::result::Result<Bytes, io::Error>>();
        let stream = ChatStream::from_body(body, StreamOptions::default(), CancellationToken::new());
        stream.cancel();
        let err = tokio::time::timeout(Duration::from_secs(1), stream.collect_text())
            .await
            .unwrap()
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropping_handle_leaves_caller_token_alone() {
        let token = CancellationToken::new();
        let stream = ChatStream::from_body(
            stream::pending::<std::result::Result<Bytes, io::Error>>(),
            StreamOptions::default(),
            token.clone(),
        );
        let child = stream.cancellation_token().clone();
        drop(stream);
        assert!(child.is_cancelled());
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_slow_consumer_receives_everything_in_order() {
        let lines: Vec<String> = (1..=50)
            .map(|n| format!(r#"data:{{"data":{{"answer":"{}"}}}}"#, "x".repeat(n)))
            .chain(std::iter::once("data:true".to_string()))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let options = StreamOptions {
            buffer: 1,
            ..StreamOptions::default()
        };
        let mut stream = ChatStream::from_body(body(&refs), options, CancellationToken::new());

        let mut fulls = Vec::new();
        while let Some(event) = stream.next().await {
            let event = event.unwrap();
            if event.done {
                break;
            }
            tokio::task::yield_now().await;
            fulls.push(event.full.len());
        }
        assert_eq!(fulls, (1..=50).collect::<Vec<_>>());
    }
}
