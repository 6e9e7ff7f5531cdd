//! Compact-token payload decoding.
//!
//! Reads the claims segment of a `header.payload.signature` token. The
//! signature is never checked here, so everything returned is client-asserted
//! data. Issuer/audience checks live in `services::verify`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde_json::{Map, Value};

/// Decoded token payload.
pub type Claims = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum TokenDecodeError {
    #[error("malformed token: expected dot-separated header.payload.signature")]
    Malformed,
    #[error("payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Pad a base64 segment with `=` up to the next multiple of 4.
fn pad_segment(segment: &str) -> String {
    let mut padded = String::with_capacity(segment.len() + 3);
    padded.push_str(segment);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    padded
}

/// Decode the payload (second) segment of a compact token into a JSON object.
///
/// # Errors
///
/// Returns [`TokenDecodeError::Malformed`] when the input has no second
/// segment, and another variant carrying the cause when the segment is not
/// base64url, not UTF-8, not JSON, or not a JSON object.
pub fn decode_payload(token: &str) -> Result<Claims, TokenDecodeError> {
    let segment = token.split('.').nth(1).ok_or(TokenDecodeError::Malformed)?;

    let bytes = URL_SAFE.decode(pad_segment(segment))?;
    let text = String::from_utf8(bytes)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(claims) => Ok(claims),
        _ => Err(TokenDecodeError::NotAnObject),
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
