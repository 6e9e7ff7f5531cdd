use super::*;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;

fn segment(raw: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(raw)
}

fn token_with_payload(payload: &Value) -> String {
    let header = segment(br#"{"alg":"RS256","typ":"JWT"}"#);
    let body = segment(payload.to_string().as_bytes());
    format!("{header}.{body}.c2lnbmF0dXJl")
}

// =============================================================================
// decode_payload — success
// =============================================================================

#[test]
fn decode_returns_exact_claims() {
    let payload = json!({
        "email": "a@b.com",
        "name": "A",
        "picture": "https://example.com/a.png",
        "sub": "1234567890",
        "email_verified": true,
        "exp": 1_700_000_000,
    });
    let claims = decode_payload(&token_with_payload(&payload)).unwrap();
    assert_eq!(Value::Object(claims), payload);
}

#[test]
fn decode_handles_url_safe_alphabet() {
    let payload = json!({ "email": "x@y.z", "note": "??>??>??>" });
    let token = token_with_payload(&payload);
    let claims = decode_payload(&token).unwrap();
    assert_eq!(claims.get("note").and_then(Value::as_str), Some("??>??>??>"));
}

#[test]
fn decode_accepts_two_segments_without_signature() {
    let body = segment(br#"{"email":"a@b.com"}"#);
    let claims = decode_payload(&format!("hdr.{body}")).unwrap();
    assert_eq!(claims.get("email").and_then(Value::as_str), Some("a@b.com"));
}

#[test]
fn decode_ignores_segments_after_payload() {
    let body = segment(br#"{"email":"a@b.com"}"#);
    let claims = decode_payload(&format!("hdr.{body}.sig.extra")).unwrap();
    assert_eq!(claims.len(), 1);
}

// =============================================================================
// decode_payload — padding
// =============================================================================

#[test]
fn decode_pads_every_remainder() {
    // Payload lengths chosen so the unpadded segment hits 4k, 4k+2 and 4k+3.
    for name in ["", "a", "ab", "abc", "abcd", "abcde"] {
        let payload = json!({ "name": name });
        let raw = payload.to_string();
        let body = segment(raw.as_bytes());
        let claims = decode_payload(&format!("h.{body}.s"))
            .unwrap_or_else(|e| panic!("segment len {} failed: {e}", body.len()));
        assert_eq!(Value::Object(claims), payload);
    }
}

#[test]
fn pad_segment_reaches_next_multiple_of_four() {
    assert_eq!(pad_segment("abcd"), "abcd");
    assert_eq!(pad_segment("abcdef"), "abcdef==");
    assert_eq!(pad_segment("abcdefg"), "abcdefg=");
    assert_eq!(pad_segment(""), "");
}

#[test]
fn decode_already_aligned_segment_is_not_over_padded() {
    // 9 bytes encode to exactly 12 characters.
    let body = segment(br#"{"abc":1}"#);
    assert_eq!(body.len() % 4, 0);
    let claims = decode_payload(&format!("h.{body}.s")).unwrap();
    assert_eq!(claims.get("abc"), Some(&json!(1)));
}

// =============================================================================
// decode_payload — failures
// =============================================================================

#[test]
fn decode_without_dot_is_malformed() {
    assert!(matches!(decode_payload("no-dots-here"), Err(TokenDecodeError::Malformed)));
    assert!(matches!(decode_payload(""), Err(TokenDecodeError::Malformed)));
}

#[test]
fn decode_empty_payload_segment_is_json_error() {
    assert!(matches!(decode_payload("hdr..sig"), Err(TokenDecodeError::Json(_))));
}

#[test]
fn decode_invalid_base64_reports_cause() {
    let err = decode_payload("hdr.!!!!.sig").unwrap_err();
    assert!(matches!(err, TokenDecodeError::Base64(_)));
    assert!(err.to_string().contains("base64"));
}

#[test]
fn decode_invalid_utf8_reports_cause() {
    let body = segment(&[0xff, 0xfe, 0xfd]);
    let err = decode_payload(&format!("h.{body}.s")).unwrap_err();
    assert!(matches!(err, TokenDecodeError::Utf8(_)));
}

#[test]
fn decode_invalid_json_reports_cause() {
    let body = segment(b"{not json");
    let err = decode_payload(&format!("h.{body}.s")).unwrap_err();
    assert!(matches!(err, TokenDecodeError::Json(_)));
}

#[test]
fn decode_non_object_json_is_rejected() {
    let body = segment(b"[1,2,3]");
    let err = decode_payload(&format!("h.{body}.s")).unwrap_err();
    assert!(matches!(err, TokenDecodeError::NotAnObject));
}

#[test]
fn decode_segment_of_length_4k_plus_1_fails_cleanly() {
    let err = decode_payload("h.abcde.s").unwrap_err();
    assert!(matches!(err, TokenDecodeError::Base64(_)));
}
