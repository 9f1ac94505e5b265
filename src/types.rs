use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat key/value record, the unit of output handed back to the host
pub type Record = Map<String, Value>;

/// Field name of the canonical success marker
pub const SUCCESS_KEY: &str = "success";

/// The record returned when an operation succeeds without a response body
pub fn success_marker() -> Value {
    let mut record = Record::new();
    record.insert(SUCCESS_KEY.to_string(), Value::Bool(true));
    Value::Object(record)
}

/// Configuration for the normalization process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizeOptions {
    /// Return a bare top-level array as separate items.
    ///
    /// Wrapped collections (`data[]`, `items[]`) are always split, whatever
    /// this flag says.
    pub split_into_items: bool,

    /// Flatten JSON:API entities into plain records
    pub simplify: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            split_into_items: false,
            simplify: true,
        }
    }
}

impl NormalizeOptions {
    pub fn new(split_into_items: bool, simplify: bool) -> Self {
        NormalizeOptions {
            split_into_items,
            simplify,
        }
    }
}

/// Result of normalizing one raw payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Normalized {
    /// One value, returned as-is
    Single(Value),
    /// An ordered sequence the host should fan out into separate items
    Items(Vec<Value>),
}

impl Normalized {
    pub fn is_items(&self) -> bool {
        matches!(self, Normalized::Items(_))
    }

    /// Fan the result out the way the host runtime does.
    ///
    /// A `Single` that happens to hold an array is split too, so a bare
    /// array ends up as separate items whether or not splitting was asked for.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Normalized::Items(items) => items,
            Normalized::Single(Value::Array(items)) => items,
            Normalized::Single(value) => vec![value],
        }
    }

    /// Collapse back into one JSON value
    pub fn into_value(self) -> Value {
        match self {
            Normalized::Items(items) => Value::Array(items),
            Normalized::Single(value) => value,
        }
    }
}
