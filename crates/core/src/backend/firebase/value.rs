//! Conversion between plain JSON values and Firestore typed values
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...). Integers are
//! transported as strings. Timestamps decode to their RFC 3339 string.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Number, Value};

use crate::backend::Fields;
use crate::{Error, Result};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                json!({ "integerValue": int.to_string() })
            } else {
                json!({ "doubleValue": number.as_f64().unwrap_or_default() })
            }
        }
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn encode_timestamp(at: DateTime<Utc>) -> Value {
    json!({ "timestampValue": at.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

pub fn decode_value(value: &Value) -> Result<Value> {
    let Some((kind, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        return Err(Error::Backend(format!("Malformed Firestore value: {}", value)));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or_default())),
        "integerValue" => {
            let parsed = match inner {
                Value::String(raw) => raw.parse::<i64>().ok(),
                Value::Number(number) => number.as_i64(),
                _ => None,
            };
            parsed
                .map(|int| Value::Number(int.into()))
                .ok_or_else(|| Error::Backend(format!("Invalid integerValue: {}", inner)))
        }
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| Error::Backend(format!("Invalid doubleValue: {}", inner))),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            Ok(Value::String(inner.as_str().unwrap_or_default().to_string()))
        }
        "geoPointValue" => Ok(json!({
            "latitude": inner.get("latitude").cloned().unwrap_or(Value::Null),
            "longitude": inner.get("longitude").cloned().unwrap_or(Value::Null),
        })),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(fields) => decode_fields(fields)?,
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(Error::Backend(format!(
            "Unsupported Firestore value type: {}",
            other
        ))),
    }
}

pub fn decode_fields(fields: &Value) -> Result<Fields> {
    let Some(map) = fields.as_object() else {
        return Err(Error::Backend(format!("Malformed Firestore fields: {}", fields)));
    };
    map.iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}
