use crate::normalize::flatten::flatten;
use crate::normalize::payload::{Payload, DATA, ITEMS};
use crate::types::{success_marker, NormalizeOptions, Normalized, Record};
use serde_json::Value;

/// Turns raw APS responses into flat records the host can consume.
///
/// Stateless apart from its options; one normalizer can serve any number of
/// payloads from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Normalizer { options }
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    /// Normalize one raw payload.
    ///
    /// 1. strip a `{ content, ... }` transport envelope
    /// 2. an empty body becomes `{ "success": true }`
    /// 3. when simplifying, flatten according to the payload shape
    /// 4. a `data[]` or `items[]` collection is always returned as items;
    ///    a bare array only when `split_into_items` is set
    pub fn normalize(&self, raw: Value) -> Normalized {
        let payload = match Payload::classify(raw) {
            Payload::EnvelopeWrapped(content) => Payload::classify_body(content),
            payload => payload,
        };

        tracing::debug!(
            shape = payload.name(),
            simplify = self.options.simplify,
            split_into_items = self.options.split_into_items,
            "normalizing payload"
        );

        match payload {
            Payload::Empty => Normalized::Single(success_marker()),
            payload if !self.options.simplify => self.shape_output(payload),
            payload => self.simplify(payload),
        }
    }

    fn simplify(&self, payload: Payload) -> Normalized {
        match payload {
            Payload::JsonApiCollection(mut map) => {
                Normalized::Items(flatten_all(take_array(&mut map, DATA)))
            }
            Payload::JsonApiSingle(mut map) => {
                let data = map.remove(DATA).unwrap_or(Value::Null);
                // A stray items[] sibling still takes precedence, as it would
                // for an unsimplified document
                match map.remove(ITEMS) {
                    Some(Value::Array(items)) => Normalized::Items(items),
                    _ => Normalized::Single(flatten(data)),
                }
            }
            Payload::ItemsCollection(mut map) => {
                Normalized::Items(flatten_all(take_array(&mut map, ITEMS)))
            }
            Payload::BareArray(items) => self.split_bare_array(flatten_all(items)),
            Payload::PlainEntity(value) | Payload::EnvelopeWrapped(value) => {
                Normalized::Single(flatten(value))
            }
            Payload::Empty => Normalized::Single(success_marker()),
        }
    }

    fn shape_output(&self, payload: Payload) -> Normalized {
        match payload {
            Payload::JsonApiCollection(mut map) => Normalized::Items(take_array(&mut map, DATA)),
            Payload::ItemsCollection(mut map) => Normalized::Items(take_array(&mut map, ITEMS)),
            Payload::JsonApiSingle(mut map) if map.get(ITEMS).is_some_and(Value::is_array) => {
                Normalized::Items(take_array(&mut map, ITEMS))
            }
            Payload::BareArray(items) => self.split_bare_array(items),
            other => Normalized::Single(other.into_value()),
        }
    }

    // Bare arrays are returned whole unless splitting was requested. The host
    // fans out arrays either way, see `Normalized::into_items`.
    fn split_bare_array(&self, items: Vec<Value>) -> Normalized {
        if self.options.split_into_items {
            Normalized::Items(items)
        } else {
            Normalized::Single(Value::Array(items))
        }
    }
}

/// Normalize with explicit flags; see [`Normalizer::normalize`]
pub fn normalize(raw: Value, split_into_items: bool, simplify: bool) -> Normalized {
    Normalizer::new(NormalizeOptions::new(split_into_items, simplify)).normalize(raw)
}

fn flatten_all(items: Vec<Value>) -> Vec<Value> {
    items.into_iter().map(flatten).collect()
}

fn take_array(map: &mut Record, key: &str) -> Vec<Value> {
    match map.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn folder(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "type": "folders",
            "attributes": {"name": name},
            "links": {"self": {"href": format!("https://x/f/{id}")}}
        })
    }

    #[test]
    fn test_envelope_with_single_entity() {
        let raw = json!({"content": {"data": folder("urn:1", "Root")}});
        let out = normalize(raw, false, true);
        assert_eq!(
            out,
            Normalized::Single(json!({
                "id": "urn:1",
                "type": "folders",
                "href": "https://x/f/urn:1",
                "name": "Root"
            }))
        );
    }

    #[test]
    fn test_null_and_empty_envelope_succeed() {
        for raw in [Value::Null, json!({"content": null})] {
            for (split, simplify) in [(false, false), (true, true), (false, true)] {
                assert_eq!(
                    normalize(raw.clone(), split, simplify),
                    Normalized::Single(json!({"success": true}))
                );
            }
        }
    }

    #[test]
    fn test_data_collection_ignores_split_flag() {
        let raw = json!({
            "content": {"jsonapi": {"version": "1.0"}, "data": [folder("a", "A"), folder("b", "B")]},
            "response": {"status": 200}
        });
        let out = normalize(raw, false, true);
        let Normalized::Items(items) = out else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "A");
        assert_eq!(items[1]["href"], "https://x/f/b");
    }

    #[test]
    fn test_items_collection() {
        let raw = json!({"items": [{"objectKey": "a.txt", "size": 3}], "next": "x"});
        for split in [true, false] {
            assert_eq!(
                normalize(raw.clone(), split, true),
                Normalized::Items(vec![json!({"objectKey": "a.txt", "size": 3})])
            );
        }
    }

    #[test]
    fn test_bare_array() {
        let raw = json!([folder("a", "A"), folder("b", "B")]);

        let split = normalize(raw.clone(), true, true);
        assert!(split.is_items());

        let whole = normalize(raw, false, true);
        assert!(!whole.is_items());
        assert_eq!(whole.clone().into_items().len(), 2);
        assert_eq!(whole.into_value()[0]["name"], "A");
    }

    #[test]
    fn test_no_simplify_keeps_raw_entities() {
        let raw = json!({"data": [folder("a", "A")]});
        let out = normalize(raw, false, false);
        assert_eq!(out, Normalized::Items(vec![folder("a", "A")]));

        let raw = json!({"data": folder("a", "A"), "meta": {}});
        let out = normalize(raw.clone(), true, false);
        assert_eq!(out, Normalized::Single(raw));
    }

    #[test]
    fn test_plain_object() {
        let raw = json!({"bucketKey": "b1", "policyKey": "transient"});
        assert_eq!(normalize(raw.clone(), false, true), Normalized::Single(raw));
    }

    #[test]
    fn test_nested_envelope_is_not_unwrapped_twice() {
        let raw = json!({"content": {"content": {"x": 1}}});
        assert_eq!(
            normalize(raw, false, false),
            Normalized::Single(json!({"content": {"x": 1}}))
        );
    }
}
