//! Typing of text-fetched ODBC values.

use odbc_api::DataType;
use serde_json::Value;

/// JSON representation chosen for an ODBC column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl From<DataType> for ColumnKind {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt => {
                Self::Integer
            }
            DataType::Real | DataType::Double | DataType::Float { .. } => Self::Float,
            DataType::Bit => Self::Boolean,
            _ => Self::Text,
        }
    }
}

/// Converts a value fetched as text into JSON.
#[must_use]
pub fn text_to_json(kind: ColumnKind, text: Option<&str>) -> Value {
    let Some(text) = text else {
        return Value::Null;
    };

    match kind {
        ColumnKind::Integer => text
            .trim()
            .parse::<i64>()
            .map_or_else(|_| Value::String(text.to_string()), Value::from),
        ColumnKind::Float => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or_else(|| Value::String(text.to_string()), Value::Number),
        ColumnKind::Boolean => match text.trim() {
            "1" => Value::Bool(true),
            "0" => Value::Bool(false),
            other => Value::String(other.to_string()),
        },
        ColumnKind::Text => Value::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_kind_mapping() {
        assert_eq!(ColumnKind::from(DataType::Integer), ColumnKind::Integer);
        assert_eq!(ColumnKind::from(DataType::BigInt), ColumnKind::Integer);
        assert_eq!(ColumnKind::from(DataType::Double), ColumnKind::Float);
        assert_eq!(ColumnKind::from(DataType::Bit), ColumnKind::Boolean);
        assert_eq!(ColumnKind::from(DataType::Date), ColumnKind::Text);
    }

    #[test]
    fn test_text_to_json() {
        assert_eq!(text_to_json(ColumnKind::Integer, Some("-12")), json!(-12));
        assert_eq!(text_to_json(ColumnKind::Float, Some("2.25")), json!(2.25));
        assert_eq!(text_to_json(ColumnKind::Boolean, Some("1")), json!(true));
        assert_eq!(text_to_json(ColumnKind::Boolean, Some("0")), json!(false));
        assert_eq!(text_to_json(ColumnKind::Text, Some("abc")), json!("abc"));
        assert_eq!(text_to_json(ColumnKind::Integer, None), Value::Null);
    }

    #[test]
    fn test_unparseable_numbers_stay_text() {
        assert_eq!(text_to_json(ColumnKind::Integer, Some("n/a")), json!("n/a"));
    }
}
