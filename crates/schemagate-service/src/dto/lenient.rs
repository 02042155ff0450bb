//! Lenient decoding of optional request flags.
//!
//! Clients send `cache_enabled` as `true`, `1` or `"true"` and `cache_ttl`
//! as `3600` or `"3600"`; each form means the same thing.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Decodes a boolean from a bool, a number or a textual flag.
pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().is_some_and(|x| x != 0.0))),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" | "" => Ok(Some(false)),
            _ => Err(de::Error::custom(format!("expected a boolean, got '{}'", s))),
        },
        Some(other) => Err(de::Error::custom(format!("expected a boolean, got {}", other))),
    }
}

/// Decodes a whole number of seconds from a number or numeric text.
pub fn seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let invalid = |shown: &dyn std::fmt::Display| -> D::Error {
        de::Error::custom(format!("expected a whole number of seconds, got {}", shown))
    };

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| invalid(&n)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid(&format!("'{}'", s))),
        Some(other) => Err(invalid(&other)),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Options {
        #[serde(default, deserialize_with = "super::flag")]
        enabled: Option<bool>,
        #[serde(default, deserialize_with = "super::seconds")]
        ttl: Option<u64>,
    }

    fn parse(value: serde_json::Value) -> Result<Options, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_flag_forms() {
        assert_eq!(parse(json!({"enabled": true})).unwrap().enabled, Some(true));
        assert_eq!(parse(json!({"enabled": "true"})).unwrap().enabled, Some(true));
        assert_eq!(parse(json!({"enabled": "False"})).unwrap().enabled, Some(false));
        assert_eq!(parse(json!({"enabled": 1})).unwrap().enabled, Some(true));
        assert_eq!(parse(json!({"enabled": 0})).unwrap().enabled, Some(false));
        assert_eq!(parse(json!({"enabled": null})).unwrap().enabled, None);
        assert_eq!(parse(json!({})).unwrap().enabled, None);
    }

    #[test]
    fn test_flag_rejects_unknown_text() {
        let err = parse(json!({"enabled": "sometimes"})).unwrap_err();
        assert!(err.to_string().contains("expected a boolean"));
        assert!(parse(json!({"enabled": [true]})).is_err());
    }

    #[test]
    fn test_seconds_forms() {
        assert_eq!(parse(json!({"ttl": 60})).unwrap().ttl, Some(60));
        assert_eq!(parse(json!({"ttl": " 120 "})).unwrap().ttl, Some(120));
        assert_eq!(parse(json!({})).unwrap().ttl, None);
    }

    #[test]
    fn test_seconds_rejects_non_whole_numbers() {
        assert!(parse(json!({"ttl": -5})).is_err());
        assert!(parse(json!({"ttl": 1.5})).is_err());
        let err = parse(json!({"ttl": "soon"})).unwrap_err();
        assert!(err.to_string().contains("expected a whole number of seconds"));
    }
}
