use crate::types::Record;
use serde_json::Value;

const ID: &str = "id";
const TYPE: &str = "type";
const ATTRIBUTES: &str = "attributes";
const LINKS: &str = "links";
const SELF: &str = "self";
const HREF: &str = "href";

/// Flatten one entity-shaped value.
///
/// `null` stays `null`. Objects go through [`flatten_entity`]; any other
/// value is returned untouched.
pub fn flatten(entity: Value) -> Value {
    match entity {
        Value::Object(map) => Value::Object(flatten_entity(map)),
        other => other,
    }
}

/// Flatten a JSON:API resource into a single record.
///
/// Transforms `{ id, type, attributes: { ... }, links: { self } }` into
/// `{ id, type, href, ...attributes, ...rest }`. Objects that are not
/// JSON:API shaped keep their own fields only; `id`, `type`, `attributes`
/// and `links` are dropped from them.
pub fn flatten_entity(mut entity: Record) -> Record {
    let json_api = is_json_api(&entity);

    let id = entity.remove(ID);
    let kind = entity.remove(TYPE);
    let attributes = entity.remove(ATTRIBUTES);
    let links = entity.remove(LINKS);

    let mut flat = Record::with_capacity(entity.len() + 3);

    if json_api {
        if let Some(id) = id {
            flat.insert(ID.to_string(), id);
        }
        if let Some(kind) = kind {
            flat.insert(TYPE.to_string(), kind);
        }
        if let Some(href) = links.as_ref().and_then(resolve_href) {
            flat.insert(HREF.to_string(), Value::String(href));
        }
        if let Some(Value::Object(attributes)) = attributes {
            for (key, value) in attributes {
                flat.insert(key, value);
            }
        }
    }

    // Pass-through fields land last and win on collision
    for (key, value) in entity {
        flat.insert(key, value);
    }

    flat
}

/// An entity counts as JSON:API when it has `attributes`, or both `id` and `type`
pub fn is_json_api(entity: &Record) -> bool {
    entity.contains_key(ATTRIBUTES) || (entity.contains_key(ID) && entity.contains_key(TYPE))
}

/// Pick the canonical link out of a JSON:API `links` object.
///
/// Order: `links.self.href`, then `links.self` as a string, then `links.href`.
pub fn resolve_href(links: &Value) -> Option<String> {
    let links = links.as_object()?;

    let from_self = links.get(SELF).and_then(|link| match link {
        Value::Object(link) => link.get(HREF).and_then(Value::as_str),
        Value::String(href) => Some(href.as_str()),
        _ => None,
    });

    from_self
        .or_else(|| links.get(HREF).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_noop() {
        assert_eq!(flatten(Value::Null), Value::Null);
    }

    #[test]
    fn test_full_json_api_entity() {
        let input = json!({
            "id": "urn:1",
            "type": "folders",
            "attributes": {"name": "Root", "objectCount": 3},
            "links": {"self": {"href": "https://x/f/1"}},
            "relationships": {"parent": {"data": null}}
        });

        let flat = flatten(input);
        assert_eq!(
            flat,
            json!({
                "id": "urn:1",
                "type": "folders",
                "href": "https://x/f/1",
                "name": "Root",
                "objectCount": 3,
                "relationships": {"parent": {"data": null}}
            })
        );

        let keys: Vec<&str> = flat.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "type", "href", "name", "objectCount", "relationships"]);
    }

    #[test]
    fn test_attributes_only() {
        let flat = flatten(json!({"attributes": {"name": "a.rvt", "size": 10}}));
        assert_eq!(flat, json!({"name": "a.rvt", "size": 10}));
    }

    #[test]
    fn test_id_and_type_without_attributes() {
        let flat = flatten(json!({"id": "h1", "type": "hubs", "meta": {"x": 1}}));
        assert_eq!(flat, json!({"id": "h1", "type": "hubs", "meta": {"x": 1}}));
    }

    #[test]
    fn test_attributes_win_over_derived_fields() {
        let flat = flatten(json!({
            "id": "outer",
            "type": "items",
            "attributes": {"id": "inner"}
        }));
        assert_eq!(flat["id"], "inner");
    }

    #[test]
    fn test_plain_object_passes_through() {
        let bucket = json!({
            "bucketKey": "my-bucket",
            "createdDate": 1700000000000u64,
            "policyKey": "transient"
        });
        assert_eq!(flatten(bucket.clone()), bucket);
    }

    #[test]
    fn test_plain_object_drops_reserved_keys() {
        let flat = flatten(json!({
            "id": "only-id",
            "links": {"self": "https://x"},
            "objectKey": "a.txt"
        }));
        assert_eq!(flat, json!({"objectKey": "a.txt"}));
    }

    #[test]
    fn test_href_from_self_string() {
        let flat = flatten(json!({
            "id": "1",
            "type": "versions",
            "links": {"self": "https://x/v/1"}
        }));
        assert_eq!(flat["href"], "https://x/v/1");
    }

    #[test]
    fn test_href_fallback_to_links_href() {
        let links = json!({"self": {"meta": {}}, "href": "https://x/fallback"});
        assert_eq!(resolve_href(&links).as_deref(), Some("https://x/fallback"));
    }

    #[test]
    fn test_href_omitted_when_unresolvable() {
        let flat = flatten(json!({"id": "1", "type": "hubs", "links": {"related": "x"}}));
        assert!(flat.get("href").is_none());
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(flatten(json!("urn:abc")), json!("urn:abc"));
        assert_eq!(flatten(json!(42)), json!(42));
    }
}
