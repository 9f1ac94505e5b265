//! Model Derivative node: translation jobs, manifests, metadata and thumbnails

use crate::credentials::APS_CLIENT_CREDENTIALS;
use crate::error::{ApiError, NodeError};
use crate::nodes::params::{InputItem, NodeParameters};
use crate::nodes::{ApsNode, NodeDescription, OperationDescription, Region, ResourceDescription};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::str::FromStr;

pub static DESCRIPTION: NodeDescription = NodeDescription {
    name: "apsModelDerivative",
    display_name: "Autodesk APS - Model Derivative",
    description: "Translate designs and read their derivatives",
    credential: APS_CLIENT_CREDENTIALS,
    default_resource: "derivative",
    resources: &[
        ResourceDescription {
            value: "derivative",
            name: "Derivative",
            default_operation: "getDownloadUrl",
            operations: &[OperationDescription {
                value: "getDownloadUrl",
                name: "Get Download URL",
                action: "Get a derivative download URL",
            }],
        },
        ResourceDescription {
            value: "informational",
            name: "Informational",
            default_operation: "getFormats",
            operations: &[OperationDescription {
                value: "getFormats",
                name: "Get Supported Formats",
                action: "List supported translation formats",
            }],
        },
        ResourceDescription {
            value: "job",
            name: "Job",
            default_operation: "startTranslation",
            operations: &[OperationDescription {
                value: "startTranslation",
                name: "Start Translation",
                action: "Start a translation job",
            }],
        },
        ResourceDescription {
            value: "manifest",
            name: "Manifest",
            default_operation: "get",
            operations: &[
                OperationDescription { value: "get", name: "Get", action: "Get a manifest" },
                OperationDescription { value: "delete", name: "Delete", action: "Delete a manifest" },
            ],
        },
        ResourceDescription {
            value: "metadata",
            name: "Metadata",
            default_operation: "getModelViews",
            operations: &[
                OperationDescription {
                    value: "getModelViews",
                    name: "Get Model Views",
                    action: "List model views",
                },
                OperationDescription {
                    value: "getObjectTree",
                    name: "Get Object Tree",
                    action: "Get the object tree of a view",
                },
                OperationDescription {
                    value: "getAllProperties",
                    name: "Get All Properties",
                    action: "Get all properties of a view",
                },
                OperationDescription {
                    value: "fetchSpecificProperties",
                    name: "Fetch Specific Properties",
                    action: "Fetch selected properties of a view",
                },
            ],
        },
        ResourceDescription {
            value: "thumbnail",
            name: "Thumbnail",
            default_operation: "get",
            operations: &[OperationDescription { value: "get", name: "Get", action: "Get a thumbnail" }],
        },
    ],
};

/// Translation target format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Dwg,
    Ifc,
    Iges,
    Obj,
    Step,
    Stl,
    Svf,
    Svf2,
    Thumbnail,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Dwg => "dwg",
            OutputFormat::Ifc => "ifc",
            OutputFormat::Iges => "iges",
            OutputFormat::Obj => "obj",
            OutputFormat::Step => "step",
            OutputFormat::Stl => "stl",
            OutputFormat::Svf => "svf",
            OutputFormat::Svf2 => "svf2",
            OutputFormat::Thumbnail => "thumbnail",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s {
            "dwg" => OutputFormat::Dwg,
            "ifc" => OutputFormat::Ifc,
            "iges" => OutputFormat::Iges,
            "obj" => OutputFormat::Obj,
            "step" => OutputFormat::Step,
            "stl" => OutputFormat::Stl,
            "svf" => OutputFormat::Svf,
            "svf2" => OutputFormat::Svf2,
            "thumbnail" => OutputFormat::Thumbnail,
            other => return Err(format!("unknown output format {other}")),
        };
        Ok(format)
    }
}

/// Thumbnail edge lengths the service renders
pub const THUMBNAIL_SIZES: [u32; 3] = [100, 200, 400];

/// A parsed Model Derivative operation
#[derive(Debug, Clone, PartialEq)]
pub enum ModelDerivativeRequest {
    StartTranslation { region: Region, job: Value },
    GetManifest { urn: String, region: Region },
    DeleteManifest { urn: String, region: Region },
    GetModelViews { urn: String, region: Region },
    GetObjectTree { urn: String, model_guid: String, force_get: bool, region: Region },
    GetAllProperties { urn: String, model_guid: String, force_get: bool, region: Region },
    FetchSpecificProperties { urn: String, model_guid: String, region: Region },
    GetDerivativeUrl { urn: String, derivative_urn: String, region: Region },
    GetThumbnail { urn: String, width: u32, height: u32, region: Region },
    GetFormats,
}

/// The Model Derivative client surface the node depends on
#[async_trait]
pub trait ModelDerivativeApi: Send + Sync {
    /// `job` is the complete translation job payload
    async fn start_job(&self, region: Region, job: Value) -> Result<Value, ApiError>;
    async fn get_manifest(&self, urn: &str, region: Region) -> Result<Value, ApiError>;
    async fn delete_manifest(&self, urn: &str, region: Region) -> Result<Value, ApiError>;
    async fn get_model_views(&self, urn: &str, region: Region) -> Result<Value, ApiError>;
    async fn get_object_tree(
        &self,
        urn: &str,
        model_guid: &str,
        force_get: bool,
        region: Region,
    ) -> Result<Value, ApiError>;
    async fn get_all_properties(
        &self,
        urn: &str,
        model_guid: &str,
        force_get: bool,
        region: Region,
    ) -> Result<Value, ApiError>;
    async fn fetch_specific_properties(&self, urn: &str, model_guid: &str, region: Region) -> Result<Value, ApiError>;
    async fn get_derivative_url(&self, derivative_urn: &str, urn: &str, region: Region) -> Result<Value, ApiError>;
    async fn get_thumbnail(&self, urn: &str, width: u32, height: u32, region: Region) -> Result<Value, ApiError>;
    async fn get_formats(&self) -> Result<Value, ApiError>;
}

/// Translation job for one output format, 2D and 3D views
pub fn translation_job(urn: &str, format: OutputFormat) -> Value {
    json!({
        "input": {"urn": urn},
        "output": {
            "formats": [{"type": format.as_str(), "views": ["2d", "3d"]}]
        }
    })
}

fn region(params: &NodeParameters) -> Result<Region, NodeError> {
    match params.choice_or("region", Region::Us)? {
        Region::Apac => Err(NodeError::invalid(
            "region",
            "Model Derivative is only available in US and EMEA",
        )),
        region => Ok(region),
    }
}

fn thumbnail_size(params: &NodeParameters, name: &str) -> Result<u32, NodeError> {
    let size = params.u32_or(name, 400)?;
    if THUMBNAIL_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(NodeError::invalid(name, format!("{size} is not one of 100, 200, 400")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModelDerivativeNode;

#[async_trait]
impl ApsNode for ModelDerivativeNode {
    type Client = dyn ModelDerivativeApi;
    type Request = ModelDerivativeRequest;

    fn description(&self) -> &'static NodeDescription {
        &DESCRIPTION
    }

    fn parse_request(
        &self,
        resource: &str,
        operation: &str,
        item: &InputItem,
    ) -> Result<ModelDerivativeRequest, NodeError> {
        use ModelDerivativeRequest::*;

        let params = &item.parameters;
        if (resource, operation) == ("informational", "getFormats") {
            return Ok(GetFormats);
        }
        if DESCRIPTION.operation(resource, operation).is_none() {
            return Err(NodeError::unsupported(resource, operation));
        }

        let urn = params.string("urn")?;
        let region = region(params)?;
        let model_guid = || params.string("modelGuid");
        let force_get = || params.bool_or("forceget", false);

        let request = match (resource, operation) {
            ("job", "startTranslation") => {
                let format: OutputFormat = params.choice_or("outputFormat", OutputFormat::Dwg)?;
                StartTranslation {
                    region,
                    job: translation_job(&urn, format),
                }
            }
            ("manifest", "get") => GetManifest { urn, region },
            ("manifest", "delete") => DeleteManifest { urn, region },
            ("metadata", "getModelViews") => GetModelViews { urn, region },
            ("metadata", "getObjectTree") => GetObjectTree {
                urn,
                model_guid: model_guid()?,
                force_get: force_get()?,
                region,
            },
            ("metadata", "getAllProperties") => GetAllProperties {
                urn,
                model_guid: model_guid()?,
                force_get: force_get()?,
                region,
            },
            ("metadata", "fetchSpecificProperties") => FetchSpecificProperties {
                urn,
                model_guid: model_guid()?,
                region,
            },
            ("derivative", "getDownloadUrl") => GetDerivativeUrl {
                urn,
                derivative_urn: params.string("derivativeUrn")?,
                region,
            },
            ("thumbnail", "get") => GetThumbnail {
                urn,
                width: thumbnail_size(params, "width")?,
                height: thumbnail_size(params, "height")?,
                region,
            },
            _ => return Err(NodeError::unsupported(resource, operation)),
        };

        Ok(request)
    }

    async fn dispatch(&self, client: &Self::Client, request: ModelDerivativeRequest) -> Result<Value, NodeError> {
        use ModelDerivativeRequest::*;

        let response = match request {
            StartTranslation { region, job } => client.start_job(region, job).await?,
            GetManifest { urn, region } => client.get_manifest(&urn, region).await?,
            DeleteManifest { urn, region } => client.delete_manifest(&urn, region).await?,
            GetModelViews { urn, region } => client.get_model_views(&urn, region).await?,
            GetObjectTree { urn, model_guid, force_get, region } => {
                client.get_object_tree(&urn, &model_guid, force_get, region).await?
            }
            GetAllProperties { urn, model_guid, force_get, region } => {
                client
                    .get_all_properties(&urn, &model_guid, force_get, region)
                    .await?
            }
            FetchSpecificProperties { urn, model_guid, region } => {
                client.fetch_specific_properties(&urn, &model_guid, region).await?
            }
            GetDerivativeUrl { urn, derivative_urn, region } => {
                client.get_derivative_url(&derivative_urn, &urn, region).await?
            }
            GetThumbnail { urn, width, height, region } => {
                client.get_thumbnail(&urn, width, height, region).await?
            }
            GetFormats => client.get_formats().await?,
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(resource: &str, operation: &str, params: Value) -> Result<ModelDerivativeRequest, NodeError> {
        ModelDerivativeNode.parse_request(resource, operation, &InputItem::with_parameters(params))
    }

    #[test]
    fn test_translation_job_payload() {
        let request = parse(
            "job",
            "startTranslation",
            json!({"urn": "dXJuOmE", "outputFormat": "svf2", "region": "EMEA"}),
        )
        .unwrap();
        assert_eq!(
            request,
            ModelDerivativeRequest::StartTranslation {
                region: Region::Emea,
                job: json!({
                    "input": {"urn": "dXJuOmE"},
                    "output": {"formats": [{"type": "svf2", "views": ["2d", "3d"]}]}
                }),
            }
        );
    }

    #[test]
    fn test_formats_needs_no_urn() {
        assert_eq!(parse("informational", "getFormats", json!({})), Ok(ModelDerivativeRequest::GetFormats));
    }

    #[test]
    fn test_apac_rejected() {
        let err = parse("manifest", "get", json!({"urn": "u", "region": "APAC"})).unwrap_err();
        assert!(matches!(err, NodeError::InvalidParameter { ref name, .. } if name == "region"));
    }

    #[test]
    fn test_thumbnail_sizes() {
        let ok = parse("thumbnail", "get", json!({"urn": "u", "width": 200})).unwrap();
        assert_eq!(
            ok,
            ModelDerivativeRequest::GetThumbnail {
                urn: "u".into(),
                width: 200,
                height: 400,
                region: Region::Us
            }
        );
        assert!(parse("thumbnail", "get", json!({"urn": "u", "width": 800})).is_err());
    }

    #[test]
    fn test_unknown_operation_before_missing_urn() {
        assert_eq!(
            parse("job", "cancel", json!({})),
            Err(NodeError::unsupported("job", "cancel"))
        );
    }

    #[test]
    fn test_every_described_operation_is_handled() {
        let params = json!({"urn": "u", "modelGuid": "g", "derivativeUrn": "urn:d"});
        for (resource, operation) in DESCRIPTION.operations() {
            let result = parse(resource, operation, params.clone());
            assert!(result.is_ok(), "{resource}/{operation}: {result:?}");
        }
    }
}
