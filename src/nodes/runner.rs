use crate::credentials::CredentialResolver;
use crate::error::NodeError;
use crate::normalize::Normalizer;
use crate::nodes::params::{InputItem, NodeParameters};
use crate::nodes::{ApsNode, ClientFactory};
use crate::types::NormalizeOptions;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Run-wide switches, read once from the first item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSettings {
    pub simplify: bool,
    pub split_into_items: bool,
    /// Record per-item failures as `{ "error": ... }` instead of aborting
    pub continue_on_fail: bool,
}

impl Default for NodeSettings {
    fn default() -> Self {
        NodeSettings {
            simplify: true,
            split_into_items: false,
            continue_on_fail: false,
        }
    }
}

impl NodeSettings {
    pub fn from_parameters(params: &NodeParameters, continue_on_fail: bool) -> Result<Self, NodeError> {
        Ok(NodeSettings {
            simplify: params.bool_or("simplify", true)?,
            split_into_items: params.bool_or("splitIntoItems", false)?,
            continue_on_fail,
        })
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::new(self.split_into_items, self.simplify)
    }
}

/// One record on the node's output, paired with the input it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Value,
    pub paired_item: usize,
}

/// Executes a node over a batch of input items
pub struct NodeRunner<N: ApsNode> {
    node: N,
    credentials: Arc<dyn CredentialResolver>,
    clients: Box<dyn ClientFactory<N::Client>>,
    continue_on_fail: bool,
}

impl<N: ApsNode> NodeRunner<N> {
    pub fn new(
        node: N,
        credentials: Arc<dyn CredentialResolver>,
        clients: impl ClientFactory<N::Client> + 'static,
    ) -> Self {
        NodeRunner {
            node,
            credentials,
            clients: Box::new(clients),
            continue_on_fail: false,
        }
    }

    pub fn continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }

    /// Run the node over every input item, in order.
    ///
    /// Resource, operation and output settings come from the first item.
    /// The credential is resolved once; the client is built once from it.
    pub async fn run(&self, items: &[InputItem]) -> Result<Vec<OutputItem>, NodeError> {
        let Some(first) = items.first() else {
            return Ok(Vec::new());
        };

        let description = self.node.description();
        let resource = first
            .parameters
            .string_or("resource", description.default_resource)?;
        let default_operation = description
            .resource(&resource)
            .map(|r| r.default_operation)
            .unwrap_or_default();
        let operation = first.parameters.string_or("operation", default_operation)?;
        let settings = NodeSettings::from_parameters(&first.parameters, self.continue_on_fail)?;
        let normalizer = Normalizer::new(settings.normalize_options());

        tracing::info!(
            node = description.name,
            resource = %resource,
            operation = %operation,
            items = items.len(),
            "executing node"
        );

        let client = self
            .credentials
            .access_token(description.credential.name)
            .map(|token| self.clients.create(&token));

        let mut output = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let result = match &client {
                Ok(client) => self.execute_item(client, &resource, &operation, item).await,
                Err(err) => Err(err.clone()),
            };

            match result {
                Ok(raw) => {
                    let records = normalizer.normalize(raw).into_items();
                    output.extend(records.into_iter().map(|json| OutputItem {
                        json,
                        paired_item: index,
                    }));
                }
                Err(err) if settings.continue_on_fail => {
                    tracing::warn!(item = index, error = %err, "item failed, continuing");
                    output.push(OutputItem {
                        json: json!({ "error": err.to_string() }),
                        paired_item: index,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(output)
    }

    async fn execute_item(
        &self,
        client: &N::Client,
        resource: &str,
        operation: &str,
        item: &InputItem,
    ) -> Result<Value, NodeError> {
        let request = self.node.parse_request(resource, operation, item)?;
        tracing::debug!(?request, "dispatching request");
        self.node.dispatch(client, request).await
    }
}
