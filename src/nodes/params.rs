use crate::error::NodeError;
use crate::types::Record;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Parameters of one input item, already resolved by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeParameters(Record);

impl NodeParameters {
    pub fn new(values: Record) -> Self {
        NodeParameters(values)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    /// A required string parameter; empty strings count as missing
    pub fn string(&self, name: &str) -> Result<String, NodeError> {
        match self.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::String(_)) | None => Err(NodeError::MissingParameter(name.to_string())),
            Some(other) => Err(NodeError::invalid(name, format!("expected a string, got {other}"))),
        }
    }

    pub fn string_or(&self, name: &str, default: &str) -> Result<String, NodeError> {
        match self.get(name) {
            None => Ok(default.to_string()),
            Some(_) => self.string(name),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, NodeError> {
        match self.get(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(NodeError::invalid(name, format!("expected a boolean, got {other}"))),
        }
    }

    pub fn u32_or(&self, name: &str, default: u32) -> Result<u32, NodeError> {
        match self.get(name) {
            None => Ok(default),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| NodeError::invalid(name, format!("expected a positive integer, got {n}"))),
            Some(other) => Err(NodeError::invalid(name, format!("expected a number, got {other}"))),
        }
    }

    /// Parse an option-type parameter through `FromStr`
    pub fn choice_or<T>(&self, name: &str, default: T) -> Result<T, NodeError>
    where
        T: std::str::FromStr<Err = String>,
    {
        match self.get(name) {
            None => Ok(default),
            Some(_) => self
                .string(name)?
                .parse()
                .map_err(|reason| NodeError::invalid(name, reason)),
        }
    }
}

impl From<Value> for NodeParameters {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => NodeParameters(map),
            _ => NodeParameters::default(),
        }
    }
}

/// A binary attachment on an input item; `data` is base64
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl BinaryData {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        BinaryData {
            data: STANDARD.encode(bytes),
            ..Default::default()
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.as_bytes())
    }
}

/// One input item handed over by the host runtime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    #[serde(default)]
    pub json: Record,
    #[serde(default)]
    pub binary: HashMap<String, BinaryData>,
    #[serde(default)]
    pub parameters: NodeParameters,
}

impl InputItem {
    pub fn with_parameters(parameters: Value) -> Self {
        InputItem {
            parameters: parameters.into(),
            ..Default::default()
        }
    }

    pub fn with_binary(mut self, property: impl Into<String>, binary: BinaryData) -> Self {
        self.binary.insert(property.into(), binary);
        self
    }

    /// Decoded bytes of a binary property
    pub fn binary_bytes(&self, property: &str) -> Result<Vec<u8>, NodeError> {
        let binary = self
            .binary
            .get(property)
            .ok_or_else(|| NodeError::MissingBinary(property.to_string()))?;
        binary
            .decode()
            .map_err(|_| NodeError::InvalidBinary(property.to_string()))
    }
}
