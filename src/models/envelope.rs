use serde::{Deserialize, Serialize};

use super::string_or_null;
use crate::error::ApiError;

/// Standard `{code, message, data}` wrapper returned by every endpoint.
///
/// `code == 0` means success; anything else is a logical failure even when
/// the HTTP status is 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default, deserialize_with = "string_or_null")]
    pub message: String,
    pub data: T,
}

/// Envelope for list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default, deserialize_with = "string_or_null")]
    pub message: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Total number of matching records, when the server reports it
    #[serde(default)]
    pub total: Option<u64>,
}

/// Envelope fields without a payload, used to check `code` on any body.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Status {
    #[serde(default)]
    pub code: i64,
    #[serde(default, deserialize_with = "string_or_null")]
    pub message: String,
}

impl Status {
    pub(crate) fn into_result(self) -> Result<(), ApiError> {
        if self.code == 0 {
            Ok(())
        } else {
            Err(ApiError::new(self.code, self.message))
        }
    }
}
