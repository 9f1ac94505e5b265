//! Workflow nodes over the APS REST APIs
//!
//! Each node maps a resource/operation selection plus per-item parameters
//! onto a single client call. The clients themselves are supplied by the
//! caller through [`ClientFactory`]; the raw response goes through the
//! normalizer before it reaches the host.

pub mod data_management;
pub mod model_derivative;
pub mod oss;
pub mod params;
pub mod runner;

use crate::credentials::CredentialProfile;
use crate::error::NodeError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use data_management::{DataManagementApi, DataManagementNode, DataManagementRequest};
pub use model_derivative::{ModelDerivativeApi, ModelDerivativeNode, ModelDerivativeRequest};
pub use oss::{OssApi, OssNode, OssRequest};
pub use params::{BinaryData, InputItem, NodeParameters};
pub use runner::{NodeRunner, NodeSettings, OutputItem};

/// One selectable operation of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationDescription {
    pub value: &'static str,
    pub name: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    pub value: &'static str,
    pub name: &'static str,
    pub default_operation: &'static str,
    pub operations: &'static [OperationDescription],
}

/// Static metadata the host uses to list and label a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub credential: CredentialProfile,
    pub default_resource: &'static str,
    pub resources: &'static [ResourceDescription],
}

impl NodeDescription {
    pub fn resource(&self, value: &str) -> Option<&'static ResourceDescription> {
        self.resources.iter().find(|resource| resource.value == value)
    }

    pub fn operation(&self, resource: &str, operation: &str) -> Option<&'static OperationDescription> {
        self.resource(resource)?
            .operations
            .iter()
            .find(|op| op.value == operation)
    }

    /// Every `(resource, operation)` pair this node offers
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.resources.iter().flat_map(|resource| {
            resource
                .operations
                .iter()
                .map(move |op| (resource.value, op.value))
        })
    }
}

/// A node: parameter parsing plus dispatch onto its client
#[async_trait]
pub trait ApsNode: Send + Sync {
    /// The vendor client this node talks to
    type Client: ?Sized + Send + Sync;
    /// A fully parsed, typed operation
    type Request: fmt::Debug + Send;

    fn description(&self) -> &'static NodeDescription;

    /// Build the typed request for one item
    fn parse_request(
        &self,
        resource: &str,
        operation: &str,
        item: &InputItem,
    ) -> Result<Self::Request, NodeError>;

    /// Perform the call and return the raw payload
    async fn dispatch(&self, client: &Self::Client, request: Self::Request) -> Result<Value, NodeError>;
}

/// Builds an authenticated client from a bearer token
pub trait ClientFactory<C: ?Sized>: Send + Sync {
    fn create(&self, access_token: &str) -> Box<C>;
}

impl<C, F> ClientFactory<C> for F
where
    C: ?Sized,
    F: Fn(&str) -> Box<C> + Send + Sync,
{
    fn create(&self, access_token: &str) -> Box<C> {
        self(access_token)
    }
}

/// APS data center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Region {
    #[default]
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "EMEA")]
    Emea,
    #[serde(rename = "APAC")]
    Apac,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Emea => "EMEA",
            Region::Apac => "APAC",
        }
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "US" => Ok(Region::Us),
            "EMEA" => Ok(Region::Emea),
            "APAC" => Ok(Region::Apac),
            other => Err(format!("unknown region {other}")),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parse() {
        assert_eq!("EMEA".parse::<Region>(), Ok(Region::Emea));
        assert!("eu".parse::<Region>().is_err());
        assert_eq!(Region::default().to_string(), "US");
    }

    #[test]
    fn test_description_lookup() {
        let desc = oss::DESCRIPTION;
        assert_eq!(desc.operation("object", "upload").unwrap().name, "Upload");
        assert!(desc.operation("object", "rename").is_none());
        assert!(desc.operations().any(|pair| pair == ("bucket", "delete")));
    }
}
