//! Frame classification.
//!
//! The stream carries three frame shapes without an explicit type tag, so the
//! kind is recovered by trying each shape in a fixed order:
//!
//! ```text
//! data: true                                          -> Sentinel
//! data: {"code":0,"data":true}                        -> Sentinel
//! data: {"code":500,"message":"internal"}             -> Error
//! data: {"code":0,"data":{"answer":"Hel","id":"..."}} -> Data
//! data: not-json                                      -> Unparseable
//! ```

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::ApiError;
use crate::models::{deserialize_id, string_or_null};

/// Literal payload marking graceful completion.
const SENTINEL: &str = "true";

/// A decoded `data:` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFrame {
    /// The stream completed
    Sentinel,
    /// The service reported a logical failure
    Error(ApiError),
    /// An answer update
    Data(DataFrame),
    /// Bytes matching none of the shapes above
    Unparseable,
}

/// Answer payload carried inside the envelope's `data` field.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DataFrame {
    /// Cumulative answer so far, not a delta
    #[serde(default, deserialize_with = "string_or_null")]
    pub answer: String,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub session_id: String,
    #[serde(default)]
    pub reference: serde_json::Value,
}

#[derive(Deserialize)]
struct Envelope<'a> {
    #[serde(borrow, default)]
    data: Option<&'a RawValue>,
}

#[derive(Deserialize)]
struct ErrorProbe {
    #[serde(default)]
    code: i64,
    #[serde(default, deserialize_with = "string_or_null")]
    message: String,
}

impl RawFrame {
    /// Classify one payload (the text after `data:`).
    pub fn classify(payload: &str) -> RawFrame {
        if payload == SENTINEL {
            return RawFrame::Sentinel;
        }

        let envelope: Envelope<'_> = match serde_json::from_str(payload) {
            Ok(envelope) => envelope,
            Err(_) => return RawFrame::Unparseable,
        };

        if envelope.data.is_some_and(|raw| raw.get() == SENTINEL) {
            return RawFrame::Sentinel;
        }

        if let Ok(probe) = serde_json::from_str::<ErrorProbe>(payload) {
            if probe.code != 0 {
                return RawFrame::Error(ApiError::new(probe.code, probe.message));
            }
        }

        match envelope.data {
            Some(raw) => match serde_json::from_str::<DataFrame>(raw.get()) {
                Ok(frame) => RawFrame::Data(frame),
                Err(_) => RawFrame::Unparseable,
            },
            None => RawFrame::Unparseable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(answer: &str) -> RawFrame {
        RawFrame::Data(DataFrame {
            answer: answer.to_string(),
            ..DataFrame::default()
        })
    }

    #[test]
    fn test_bare_true_is_sentinel() {
        assert_eq!(RawFrame::classify("true"), RawFrame::Sentinel);
    }

    #[test]
    fn test_envelope_true_is_sentinel() {
        assert_eq!(
            RawFrame::classify(r#"{"code":0,"message":"","data":true}"#),
            RawFrame::Sentinel
        );
        assert_eq!(RawFrame::classify(r#"{"data": true}"#), RawFrame::Sentinel);
    }

    #[test]
    fn test_error_frame() {
        assert_eq!(
            RawFrame::classify(r#"{"code":500,"message":"internal"}"#),
            RawFrame::Error(ApiError::new(500, "internal"))
        );
    }

    #[test]
    fn test_error_frame_wins_over_data() {
        let frame = RawFrame::classify(r#"{"code":102,"message":"bad","data":{"answer":"**ERROR**"}}"#);
        assert_eq!(frame, RawFrame::Error(ApiError::new(102, "bad")));
    }

    #[test]
    fn test_error_frame_with_null_message() {
        assert_eq!(
            RawFrame::classify(r#"{"code":500,"message":null}"#),
            RawFrame::Error(ApiError::new(500, ""))
        );
        assert_eq!(
            RawFrame::classify(r#"{"code":102}"#),
            RawFrame::Error(ApiError::new(102, ""))
        );
    }

    #[test]
    fn test_sentinel_wins_over_error_code() {
        let frame = RawFrame::classify(r#"{"code":500,"message":"x","data":true}"#);
        assert_eq!(frame, RawFrame::Sentinel);
    }

    #[test]
    fn test_zero_code_with_data_is_data_frame() {
        assert_eq!(
            RawFrame::classify(r#"{"code":0,"data":{"answer":"Hello"}}"#),
            data("Hello")
        );
    }

    #[test]
    fn test_data_frame_fields() {
        let frame = RawFrame::classify(
            r#"{"data":{"answer":"Hi","id":"m1","session_id":"s1","reference":{"chunks":[{"id":"c1"}]}}}"#,
        );
        match frame {
            RawFrame::Data(d) => {
                assert_eq!(d.answer, "Hi");
                assert_eq!(d.id, "m1");
                assert_eq!(d.session_id, "s1");
                assert_eq!(d.reference["chunks"][0]["id"], "c1");
            }
            other => panic!("expected data frame, got {:?}", other),
        }
    }

    #[test]
    fn test_null_answer_is_empty() {
        assert_eq!(
            RawFrame::classify(r#"{"data":{"answer":null,"id":null}}"#),
            data("")
        );
    }

    #[test]
    fn test_unparseable_frames() {
        assert_eq!(RawFrame::classify("not-json"), RawFrame::Unparseable);
        assert_eq!(RawFrame::classify(r#"{"data":"just text"}"#), RawFrame::Unparseable);
        assert_eq!(RawFrame::classify(r#"{"message":"no data"}"#), RawFrame::Unparseable);
        assert_eq!(RawFrame::classify(r#"{"code":"E1","message":"string code"}"#), RawFrame::Unparseable);
        assert_eq!(RawFrame::classify(""), RawFrame::Unparseable);
    }
}
