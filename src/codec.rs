//! The single place where snapshot payload format lives, per SPEC_FULL.md §4.2.
//! Encoding is total; decoding fails with a message-carrying error. `save`/`load` in
//! `repository` go through this and nowhere else touches the payload grammar.

use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(pub String);

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DecodeError {}

/// JSON is the one serialization story end to end: the wire format is already JSON,
/// so the snapshot payload uses the same codec rather than introducing a second format.
pub struct JsonCodec;

impl JsonCodec {
    pub fn encode<T: Serialize>(value: &T) -> String {
        serde_json::to_string(value).expect("game state must always be serializable")
    }

    pub fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, DecodeError> {
        serde_json::from_str(payload).map_err(|e| DecodeError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        a: i32,
        b: String,
    }

    #[test]
    fn round_trips_arbitrary_state() {
        let value = Sample {
            a: 42,
            b: "hello".to_string(),
        };
        let encoded = JsonCodec::encode(&value);
        let decoded: Sample = JsonCodec::decode(&encoded).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn decode_failure_carries_message() {
        let err = JsonCodec::decode::<Sample>("not json").unwrap_err();
        assert!(!err.0.is_empty());
    }
}
