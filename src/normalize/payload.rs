//! Shape classification for raw APS payloads

use crate::types::Record;
use serde_json::Value;

/// Transport envelope field carrying the real payload
pub const CONTENT: &str = "content";
/// JSON:API document field
pub const DATA: &str = "data";
/// OSS listing field
pub const ITEMS: &str = "items";

/// The shape of one raw payload, tested in a fixed priority order.
///
/// Wrapped variants keep the whole record so that unsimplified output keeps
/// its original field order.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `null` or missing body
    Empty,
    /// SDK envelope; holds `content`, transport siblings already dropped
    EnvelopeWrapped(Value),
    /// `{ data: [...] }`
    JsonApiCollection(Record),
    /// `{ data: {...} }`
    JsonApiSingle(Record),
    /// `{ items: [...] }`
    ItemsCollection(Record),
    /// A top-level array
    BareArray(Vec<Value>),
    /// Anything else
    PlainEntity(Value),
}

impl Payload {
    /// Classify a raw payload, envelope included
    pub fn classify(raw: Value) -> Self {
        match raw {
            Value::Object(mut map) if map.contains_key(CONTENT) => {
                Payload::EnvelopeWrapped(map.remove(CONTENT).unwrap_or(Value::Null))
            }
            other => Self::classify_body(other),
        }
    }

    /// Classify a payload whose envelope, if any, is already stripped
    pub fn classify_body(value: Value) -> Self {
        match value {
            Value::Null => Payload::Empty,
            Value::Array(items) => Payload::BareArray(items),
            Value::Object(map) => {
                let data = map.get(DATA).filter(|data| !data.is_null());
                let data_is_array = data.is_some_and(Value::is_array);
                let has_data = data.is_some();
                let items_is_array = map.get(ITEMS).is_some_and(Value::is_array);

                if data_is_array {
                    Payload::JsonApiCollection(map)
                } else if has_data {
                    Payload::JsonApiSingle(map)
                } else if items_is_array {
                    Payload::ItemsCollection(map)
                } else {
                    Payload::PlainEntity(Value::Object(map))
                }
            }
            other => Payload::PlainEntity(other),
        }
    }

    /// Short name used in log output
    pub fn name(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::EnvelopeWrapped(_) => "envelope",
            Payload::JsonApiCollection(_) => "json_api_collection",
            Payload::JsonApiSingle(_) => "json_api_single",
            Payload::ItemsCollection(_) => "items_collection",
            Payload::BareArray(_) => "bare_array",
            Payload::PlainEntity(_) => "plain_entity",
        }
    }

    /// Turn the classified payload back into the value it came from
    pub fn into_value(self) -> Value {
        match self {
            Payload::Empty => Value::Null,
            Payload::EnvelopeWrapped(content) => content,
            Payload::JsonApiCollection(map)
            | Payload::JsonApiSingle(map)
            | Payload::ItemsCollection(map) => Value::Object(map),
            Payload::BareArray(items) => Value::Array(items),
            Payload::PlainEntity(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_first() {
        let raw = json!({"content": {"data": []}, "response": {"status": 200}});
        assert_eq!(
            Payload::classify(raw),
            Payload::EnvelopeWrapped(json!({"data": []}))
        );
    }

    #[test]
    fn test_array_is_never_an_envelope() {
        let payload = Payload::classify(json!([{"content": 1}]));
        assert!(matches!(payload, Payload::BareArray(ref v) if v.len() == 1));
    }

    #[test]
    fn test_data_beats_items() {
        let payload = Payload::classify(json!({"data": [1], "items": [2]}));
        assert_eq!(payload.name(), "json_api_collection");

        let payload = Payload::classify(json!({"data": {"id": "1"}, "items": [2]}));
        assert_eq!(payload.name(), "json_api_single");
    }

    #[test]
    fn test_null_data_is_absent() {
        let payload = Payload::classify(json!({"data": null, "items": [1]}));
        assert_eq!(payload.name(), "items_collection");

        let payload = Payload::classify(json!({"data": null}));
        assert_eq!(payload.name(), "plain_entity");
    }

    #[test]
    fn test_items_must_be_array() {
        let payload = Payload::classify(json!({"items": "nope"}));
        assert_eq!(payload.name(), "plain_entity");
    }

    #[test]
    fn test_empty() {
        assert_eq!(Payload::classify(Value::Null), Payload::Empty);
        assert_eq!(Payload::classify_body(Value::Null), Payload::Empty);
    }

    #[test]
    fn test_into_value_keeps_record() {
        let raw = json!({"meta": 1, "data": [{"id": "a"}]});
        assert_eq!(Payload::classify(raw.clone()).into_value(), raw);
    }
}
