//! JSON codec
//!
//! Encoding a [`Value`] cannot fail. Decoding distinguishes an empty body
//! from one that is not JSON so the two can be reported differently.

use dynconnect_domain::constants::{EMPTY_RESPONSE, MALFORMED_RESPONSE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Why a response body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty response")]
    Empty,

    #[error("malformed response")]
    Malformed(String),
}

impl DecodeError {
    /// Fixed description reported to callers.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Empty => EMPTY_RESPONSE,
            Self::Malformed(_) => MALFORMED_RESPONSE,
        }
    }
}

/// Encode a JSON value as compact bytes.
pub fn encode(value: &Value) -> Vec<u8> {
    value.to_string().into_bytes()
}

/// Decode a response body.
///
/// A body containing only whitespace counts as empty.
///
/// # Errors
/// Returns [`DecodeError::Empty`] for an empty body and
/// [`DecodeError::Malformed`] for anything that is not valid JSON.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }

    serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Convert any serializable payload into a JSON value.
///
/// # Errors
/// Fails for payloads JSON cannot represent, such as maps with non-string
/// keys.
pub fn to_value<T: Serialize + ?Sized>(payload: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(payload)
}

/// Convert a decoded value into a caller-defined type.
///
/// # Errors
/// Fails when the value does not match the shape of `T`.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_and_whitespace_bodies_are_empty() {
        assert_eq!(decode(b""), Err(DecodeError::Empty));
        assert_eq!(decode(b"  \r\n\t"), Err(DecodeError::Empty));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = decode(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
        assert_eq!(err.description(), "malformed response");
        assert_ne!(err.description(), DecodeError::Empty.description());
    }

    #[test]
    fn values_survive_encode_then_decode() {
        let values = [
            json!({"test": {"key1": 1, "key2": true, "key3": "This is a test"}}),
            json!([1, "two", 3.5, false, null, {"nested": []}]),
            json!("plain string"),
            json!(-42),
            json!(true),
        ];

        for value in values {
            assert_eq!(decode(&encode(&value)).unwrap(), value);
        }
    }

    #[test]
    fn decode_then_encode_is_stable() {
        let body = br#"{ "result" : "ok", "items": [ 1, 2 ] }"#;
        let decoded = decode(body).unwrap();
        let reencoded = encode(&decoded);
        assert_eq!(decode(&reencoded).unwrap(), decoded);
        assert!(!reencoded.contains(&b'\n'));
    }

    #[test]
    fn unrepresentable_payload_fails_to_convert() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON");
        assert!(to_value(&map).is_err());
    }
}
