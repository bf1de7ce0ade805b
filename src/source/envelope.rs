use serde_json::Value;

use crate::models::RawRecord;

const ENVELOPE_KEYS: &[&str] = &["trades", "results", "data", "items"];

/// Pull the row array out of a response body.
///
/// Accepts a bare array, or an object whose `trades`, `results`, `data` or
/// `items` field is an array, falling back to the first array-valued field.
/// Anything else yields no rows.
pub fn extract_records(body: Value) -> Vec<RawRecord> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Object(mut fields) => {
            let key = ENVELOPE_KEYS
                .iter()
                .map(|k| k.to_string())
                .find(|k| matches!(fields.get(k), Some(Value::Array(_))))
                .or_else(|| {
                    fields
                        .iter()
                        .find(|(_, v)| v.is_array())
                        .map(|(k, _)| k.clone())
                });
            match key.and_then(|k| fields.remove(&k)) {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    };
    rows.into_iter().map(RawRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array() {
        let rows = extract_records(json!([{"profit": 1}, {"profit": 2}]));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn named_envelopes_in_priority_order() {
        let rows = extract_records(json!({
            "count": 3,
            "data": [{"profit": 9}],
            "trades": [{"profit": 1}, {"profit": 2}],
        }));
        assert_eq!(rows.len(), 2);

        let rows = extract_records(json!({"results": [{"profit": 1}], "next": null}));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn falls_back_to_any_array_field() {
        let rows = extract_records(json!({"page": 1, "rows": [{"profit": 1}]}));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn non_array_bodies_yield_nothing() {
        assert!(extract_records(json!({"detail": "not found"})).is_empty());
        assert!(extract_records(json!("oops")).is_empty());
        assert!(extract_records(Value::Null).is_empty());
        assert!(extract_records(json!({"trades": "none"})).is_empty());
    }
}
