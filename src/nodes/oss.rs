//! Object Storage Service node: buckets and objects

use crate::credentials::APS_CLIENT_CREDENTIALS;
use crate::error::{ApiError, NodeError};
use crate::nodes::params::InputItem;
use crate::nodes::{
    ApsNode, NodeDescription, OperationDescription, Region, ResourceDescription,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

static BUCKET_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-_.a-z0-9]{3,128}$").unwrap()
});

pub static DESCRIPTION: NodeDescription = NodeDescription {
    name: "apsOss",
    display_name: "Autodesk APS - OSS",
    description: "Interact with APS Object Storage Service (OSS)",
    credential: APS_CLIENT_CREDENTIALS,
    default_resource: "bucket",
    resources: &[
        ResourceDescription {
            value: "bucket",
            name: "Bucket",
            default_operation: "getAll",
            operations: &[
                OperationDescription { value: "getAll", name: "Get Many", action: "List buckets" },
                OperationDescription { value: "get", name: "Get", action: "Get bucket details" },
                OperationDescription { value: "create", name: "Create", action: "Create a bucket" },
                OperationDescription { value: "delete", name: "Delete", action: "Delete a bucket" },
            ],
        },
        ResourceDescription {
            value: "object",
            name: "Object",
            default_operation: "copy",
            operations: &[
                OperationDescription { value: "copy", name: "Copy", action: "Copy an object" },
                OperationDescription {
                    value: "createSignedUrl",
                    name: "Create Signed URL",
                    action: "Create a signed URL",
                },
                OperationDescription { value: "delete", name: "Delete", action: "Delete an object" },
                OperationDescription { value: "download", name: "Download", action: "Download an object" },
                OperationDescription { value: "getDetails", name: "Get", action: "Get object details" },
                OperationDescription { value: "getAll", name: "Get Many", action: "List objects" },
                OperationDescription { value: "upload", name: "Upload", action: "Upload an object" },
            ],
        },
    ],
};

/// Retention policy of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKey {
    #[default]
    Persistent,
    Temporary,
    Transient,
}

impl PolicyKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKey::Persistent => "persistent",
            PolicyKey::Temporary => "temporary",
            PolicyKey::Transient => "transient",
        }
    }
}

impl FromStr for PolicyKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persistent" => Ok(PolicyKey::Persistent),
            "temporary" => Ok(PolicyKey::Temporary),
            "transient" => Ok(PolicyKey::Transient),
            other => Err(format!("unknown policy key {other}")),
        }
    }
}

/// Access granted by a signed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Read,
    Write,
    ReadWrite,
}

impl Access {
    /// Spelling expected by the OSS API
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Read => "Read",
            Access::Write => "Write",
            Access::ReadWrite => "ReadWrite",
        }
    }
}

impl FromStr for Access {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Access::Read),
            "write" => Ok(Access::Write),
            "readwrite" => Ok(Access::ReadWrite),
            other => Err(format!("unknown access {other}")),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed OSS operation
#[derive(Debug, Clone, PartialEq)]
pub enum OssRequest {
    ListBuckets { region: Region },
    GetBucket { bucket_key: String },
    CreateBucket { bucket_key: String, policy_key: PolicyKey, region: Region },
    DeleteBucket { bucket_key: String },
    ListObjects { bucket_key: String },
    GetObject { bucket_key: String, object_key: String },
    Upload { bucket_key: String, object_key: String, content: Vec<u8> },
    DownloadToFile { bucket_key: String, object_key: String, file_path: PathBuf },
    SignedDownload { bucket_key: String, object_key: String },
    Copy { bucket_key: String, object_key: String, new_object_key: String },
    DeleteObject { bucket_key: String, object_key: String },
    CreateSignedUrl {
        bucket_key: String,
        object_key: String,
        access: Access,
        minutes_expiration: u32,
    },
}

/// The OSS client surface the node depends on
#[async_trait]
pub trait OssApi: Send + Sync {
    async fn get_buckets(&self, region: Region) -> Result<Value, ApiError>;
    async fn get_bucket_details(&self, bucket_key: &str) -> Result<Value, ApiError>;
    async fn create_bucket(
        &self,
        bucket_key: &str,
        policy_key: PolicyKey,
        region: Region,
    ) -> Result<Value, ApiError>;
    async fn delete_bucket(&self, bucket_key: &str) -> Result<Value, ApiError>;
    async fn get_objects(&self, bucket_key: &str) -> Result<Value, ApiError>;
    async fn get_object_details(&self, bucket_key: &str, object_key: &str) -> Result<Value, ApiError>;
    async fn upload(&self, bucket_key: &str, object_key: &str, content: Vec<u8>) -> Result<Value, ApiError>;
    /// Stream an object straight to a local file
    async fn download(&self, bucket_key: &str, object_key: &str, file_path: &std::path::Path) -> Result<(), ApiError>;
    /// A signed S3 download descriptor for the object
    async fn signed_s3_download(&self, bucket_key: &str, object_key: &str) -> Result<Value, ApiError>;
    async fn copy_to(&self, bucket_key: &str, object_key: &str, new_object_key: &str) -> Result<Value, ApiError>;
    async fn delete_object(&self, bucket_key: &str, object_key: &str) -> Result<Value, ApiError>;
    async fn create_signed_resource(
        &self,
        bucket_key: &str,
        object_key: &str,
        access: Access,
        minutes_expiration: u32,
    ) -> Result<Value, ApiError>;
}

/// Check a bucket key against the OSS naming rules
pub fn validate_bucket_key(bucket_key: &str) -> Result<(), NodeError> {
    if BUCKET_KEY_REGEX.is_match(bucket_key) {
        Ok(())
    } else {
        Err(NodeError::invalid(
            "bucketKey",
            format!("{bucket_key:?} must be 3-128 characters of lowercase letters, digits, '-', '_' or '.'"),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OssNode;

impl OssNode {
    fn bucket_key(item: &InputItem) -> Result<String, NodeError> {
        let bucket_key = item.parameters.string("bucketKey")?;
        validate_bucket_key(&bucket_key)?;
        Ok(bucket_key)
    }
}

#[async_trait]
impl ApsNode for OssNode {
    type Client = dyn OssApi;
    type Request = OssRequest;

    fn description(&self) -> &'static NodeDescription {
        &DESCRIPTION
    }

    fn parse_request(&self, resource: &str, operation: &str, item: &InputItem) -> Result<OssRequest, NodeError> {
        let params = &item.parameters;

        let request = match (resource, operation) {
            ("bucket", "getAll") => OssRequest::ListBuckets {
                region: params.choice_or("region", Region::Us)?,
            },
            ("bucket", "get") => OssRequest::GetBucket {
                bucket_key: Self::bucket_key(item)?,
            },
            ("bucket", "create") => OssRequest::CreateBucket {
                bucket_key: Self::bucket_key(item)?,
                policy_key: params.choice_or("policyKey", PolicyKey::Persistent)?,
                region: params.choice_or("region", Region::Us)?,
            },
            ("bucket", "delete") => OssRequest::DeleteBucket {
                bucket_key: Self::bucket_key(item)?,
            },
            ("object", "getAll") => OssRequest::ListObjects {
                bucket_key: Self::bucket_key(item)?,
            },
            ("object", operation) => {
                let bucket_key = Self::bucket_key(item)?;
                let object_key = params.string("objectKey")?;

                match operation {
                    "getDetails" => OssRequest::GetObject { bucket_key, object_key },
                    "upload" => {
                        let property = params.string_or("binaryPropertyName", "data")?;
                        OssRequest::Upload {
                            bucket_key,
                            object_key,
                            content: item.binary_bytes(&property)?,
                        }
                    }
                    "download" => {
                        if params.bool_or("downloadAsFile", false)? {
                            OssRequest::DownloadToFile {
                                bucket_key,
                                object_key,
                                file_path: PathBuf::from(params.string("filePath")?),
                            }
                        } else {
                            OssRequest::SignedDownload { bucket_key, object_key }
                        }
                    }
                    "copy" => OssRequest::Copy {
                        bucket_key,
                        object_key,
                        new_object_key: params.string("newObjectKey")?,
                    },
                    "delete" => OssRequest::DeleteObject { bucket_key, object_key },
                    "createSignedUrl" => OssRequest::CreateSignedUrl {
                        bucket_key,
                        object_key,
                        access: params.choice_or("access", Access::Read)?,
                        minutes_expiration: params.u32_or("minutesExpiration", 60)?,
                    },
                    _ => return Err(NodeError::unsupported(resource, operation)),
                }
            }
            _ => return Err(NodeError::unsupported(resource, operation)),
        };

        Ok(request)
    }

    async fn dispatch(&self, client: &Self::Client, request: OssRequest) -> Result<Value, NodeError> {
        let response = match request {
            OssRequest::ListBuckets { region } => client.get_buckets(region).await?,
            OssRequest::GetBucket { bucket_key } => client.get_bucket_details(&bucket_key).await?,
            OssRequest::CreateBucket { bucket_key, policy_key, region } => {
                client.create_bucket(&bucket_key, policy_key, region).await?
            }
            OssRequest::DeleteBucket { bucket_key } => client.delete_bucket(&bucket_key).await?,
            OssRequest::ListObjects { bucket_key } => client.get_objects(&bucket_key).await?,
            OssRequest::GetObject { bucket_key, object_key } => {
                client.get_object_details(&bucket_key, &object_key).await?
            }
            OssRequest::Upload { bucket_key, object_key, content } => {
                tracing::debug!(bucket_key = %bucket_key, object_key = %object_key, bytes = content.len(), "uploading object");
                client.upload(&bucket_key, &object_key, content).await?
            }
            OssRequest::DownloadToFile { bucket_key, object_key, file_path } => {
                client.download(&bucket_key, &object_key, &file_path).await?;
                json!({"success": true, "filePath": file_path.to_string_lossy()})
            }
            OssRequest::SignedDownload { bucket_key, object_key } => {
                let signed = client.signed_s3_download(&bucket_key, &object_key).await?;
                json!({ "signedUrl": signed })
            }
            OssRequest::Copy { bucket_key, object_key, new_object_key } => {
                client.copy_to(&bucket_key, &object_key, &new_object_key).await?
            }
            OssRequest::DeleteObject { bucket_key, object_key } => {
                client.delete_object(&bucket_key, &object_key).await?
            }
            OssRequest::CreateSignedUrl { bucket_key, object_key, access, minutes_expiration } => {
                client
                    .create_signed_resource(&bucket_key, &object_key, access, minutes_expiration)
                    .await?
            }
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::params::BinaryData;
    use serde_json::json;

    fn item(params: Value) -> InputItem {
        InputItem::with_parameters(params)
    }

    #[test]
    fn test_bucket_key_rules() {
        assert!(validate_bucket_key("my-bucket_01.x").is_ok());
        assert!(validate_bucket_key("ab").is_err());
        assert!(validate_bucket_key("MyBucket").is_err());
    }

    #[test]
    fn test_parse_create_bucket_defaults() {
        let request = OssNode
            .parse_request("bucket", "create", &item(json!({"bucketKey": "bkt-1"})))
            .unwrap();
        assert_eq!(
            request,
            OssRequest::CreateBucket {
                bucket_key: "bkt-1".into(),
                policy_key: PolicyKey::Persistent,
                region: Region::Us,
            }
        );
    }

    #[test]
    fn test_parse_download_modes() {
        let signed = OssNode
            .parse_request(
                "object",
                "download",
                &item(json!({"bucketKey": "bkt", "objectKey": "a.rvt"})),
            )
            .unwrap();
        assert!(matches!(signed, OssRequest::SignedDownload { .. }));

        let to_file = OssNode
            .parse_request(
                "object",
                "download",
                &item(json!({
                    "bucketKey": "bkt",
                    "objectKey": "a.rvt",
                    "downloadAsFile": true,
                    "filePath": "/tmp/a.rvt"
                })),
            )
            .unwrap();
        assert_eq!(
            to_file,
            OssRequest::DownloadToFile {
                bucket_key: "bkt".into(),
                object_key: "a.rvt".into(),
                file_path: PathBuf::from("/tmp/a.rvt"),
            }
        );
    }

    #[test]
    fn test_parse_upload_reads_binary() {
        let input = item(json!({"bucketKey": "bkt", "objectKey": "a.txt", "binaryPropertyName": "file"}))
            .with_binary("file", BinaryData::from_bytes(b"abc"));
        let request = OssNode.parse_request("object", "upload", &input).unwrap();
        assert!(matches!(request, OssRequest::Upload { ref content, .. } if content == b"abc"));

        let missing = item(json!({"bucketKey": "bkt", "objectKey": "a.txt"}));
        assert_eq!(
            OssNode.parse_request("object", "upload", &missing),
            Err(NodeError::MissingBinary("data".into()))
        );
    }

    #[test]
    fn test_parse_signed_url() {
        let request = OssNode
            .parse_request(
                "object",
                "createSignedUrl",
                &item(json!({"bucketKey": "bkt", "objectKey": "a", "access": "readwrite"})),
            )
            .unwrap();
        assert_eq!(
            request,
            OssRequest::CreateSignedUrl {
                bucket_key: "bkt".into(),
                object_key: "a".into(),
                access: Access::ReadWrite,
                minutes_expiration: 60,
            }
        );
    }

    #[test]
    fn test_every_described_operation_is_handled() {
        let input = item(json!({
            "bucketKey": "bkt",
            "objectKey": "a",
            "newObjectKey": "b",
        }))
        .with_binary("data", BinaryData::from_bytes(b"x"));

        for (resource, operation) in DESCRIPTION.operations() {
            let result = OssNode.parse_request(resource, operation, &input);
            assert!(result.is_ok(), "{resource}/{operation}: {result:?}");
        }
    }

    #[test]
    fn test_unknown_operation() {
        assert_eq!(
            OssNode.parse_request("bucket", "rename", &item(json!({}))),
            Err(NodeError::unsupported("bucket", "rename"))
        );
        assert!(matches!(
            OssNode.parse_request(
                "object",
                "rename",
                &item(json!({"bucketKey": "bkt", "objectKey": "a"}))
            ),
            Err(NodeError::UnsupportedOperation { .. })
        ));
    }
}
