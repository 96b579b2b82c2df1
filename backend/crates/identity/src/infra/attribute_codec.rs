//! Attribute Column Codec
//!
//! Converts a user's attribute map to and from the single text column it
//! is stored in. The stored form is a JSON object.

use serde_json::{Map, Value};

use crate::domain::value_object::attributes::Attributes;
use crate::error::{IdentityError, IdentityResult};

/// Stored form of an absent or empty map
pub const EMPTY_OBJECT: &str = "{}";

/// Stateless JSON codec for the attributes column
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeCodec;

impl AttributeCodec {
    /// Encode attributes for storage
    ///
    /// `None` and the empty map both encode to `{}`.
    pub fn encode(attributes: Option<&Attributes>) -> IdentityResult<String> {
        let Some(attributes) = attributes.filter(|a| !a.is_empty()) else {
            tracing::debug!("Encoding empty attribute map");
            return Ok(EMPTY_OBJECT.to_string());
        };

        match serde_json::to_string(attributes.as_map()) {
            Ok(text) => {
                tracing::debug!(entries = attributes.len(), json = %text, "Encoded attributes");
                Ok(text)
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not convert attributes to JSON");
                Err(IdentityError::Encoding(e.to_string()))
            }
        }
    }

    /// Decode a stored column value
    ///
    /// `None`, blank text and a JSON `null` all decode to an empty map.
    /// Anything that is not a JSON object is rejected.
    pub fn decode(text: Option<&str>) -> IdentityResult<Attributes> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            tracing::debug!("Decoding empty attribute column");
            return Ok(Attributes::default());
        };

        let value: Value = serde_json::from_str(text).map_err(|e| {
            tracing::error!(error = %e, "Could not convert JSON to attributes");
            IdentityError::Decoding(e.to_string())
        })?;

        match value {
            Value::Object(map) => {
                tracing::debug!(entries = map.len(), "Decoded attributes");
                Ok(Attributes::from(map))
            }
            Value::Null => Ok(Attributes::from(Map::new())),
            _ => {
                tracing::error!(json = %text, "Attribute column is not a JSON object");
                Err(IdentityError::Decoding(
                    "expected a JSON object".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_none_and_empty() {
        assert_eq!(AttributeCodec::encode(None).unwrap(), "{}");
        assert_eq!(
            AttributeCodec::encode(Some(&Attributes::default())).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_encode_decode_provider_claims() {
        let attrs: Attributes = [
            ("sub", json!("g-123")),
            ("email_verified", json!(true)),
        ]
        .into_iter()
        .collect();

        let text = AttributeCodec::encode(Some(&attrs)).unwrap();
        let decoded = AttributeCodec::decode(Some(&text)).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get_str("sub"), Some("g-123"));
        assert_eq!(decoded.get("email_verified"), Some(&json!(true)));
        assert_eq!(decoded, attrs);
    }

    #[test]
    fn test_round_trip_nested_values() {
        let attrs: Attributes = [
            ("profile", json!({ "locale": "en", "age": 42 })),
            ("groups", json!(["a", "b"])),
            ("nothing", Value::Null),
        ]
        .into_iter()
        .collect();

        let text = AttributeCodec::encode(Some(&attrs)).unwrap();
        assert_eq!(AttributeCodec::decode(Some(&text)).unwrap(), attrs);
    }

    #[test]
    fn test_round_trip_preserves_float_bits() {
        // xorshift64 over raw bit patterns, so subnormals and extreme
        // exponents are covered, not just "nice" decimals
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut checked = 0;

        while checked < 50_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;

            let f = f64::from_bits(state);
            if !f.is_finite() {
                continue;
            }
            checked += 1;

            let attrs: Attributes = [("v", json!(f))].into_iter().collect();
            let text = AttributeCodec::encode(Some(&attrs)).unwrap();
            let decoded = AttributeCodec::decode(Some(&text)).unwrap();

            let back = decoded.get("v").and_then(Value::as_f64).unwrap();
            assert_eq!(back.to_bits(), f.to_bits(), "{f:e} came back as {back:e} via {text}");
        }
    }

    #[test]
    fn test_decode_absent_blank_and_null() {
        assert!(AttributeCodec::decode(None).unwrap().is_empty());
        assert!(AttributeCodec::decode(Some("")).unwrap().is_empty());
        assert!(AttributeCodec::decode(Some("   ")).unwrap().is_empty());
        assert!(AttributeCodec::decode(Some("null")).unwrap().is_empty());
        assert!(AttributeCodec::decode(Some("{}")).unwrap().is_empty());
    }

    #[test]
    fn test_decode_malformed() {
        let err = AttributeCodec::decode(Some("{not json")).unwrap_err();
        assert!(matches!(err, IdentityError::Decoding(_)));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        for text in ["[1,2]", "\"text\"", "42", "true"] {
            let err = AttributeCodec::decode(Some(text)).unwrap_err();
            assert!(matches!(err, IdentityError::Decoding(_)), "{text}");
        }
    }
}
