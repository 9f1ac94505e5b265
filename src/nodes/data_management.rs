//! Data Management node: hubs, projects, folders, items and versions

use crate::credentials::APS_OAUTH2;
use crate::error::{ApiError, NodeError};
use crate::nodes::params::InputItem;
use crate::nodes::{ApsNode, NodeDescription, OperationDescription, ResourceDescription};
use async_trait::async_trait;
use serde_json::{json, Value};

pub static DESCRIPTION: NodeDescription = NodeDescription {
    name: "apsDataManagement",
    display_name: "Autodesk APS - Data Management",
    description: "Browse hubs, projects, folders, items and versions",
    credential: APS_OAUTH2,
    default_resource: "folder",
    resources: &[
        ResourceDescription {
            value: "folder",
            name: "Folder",
            default_operation: "getContents",
            operations: &[
                OperationDescription { value: "get", name: "Get", action: "Get a folder" },
                OperationDescription {
                    value: "getContents",
                    name: "Get Contents",
                    action: "Get folder contents",
                },
                OperationDescription { value: "search", name: "Search", action: "Search a folder" },
                OperationDescription { value: "create", name: "Create", action: "Create a folder" },
            ],
        },
        ResourceDescription {
            value: "hub",
            name: "Hub",
            default_operation: "getAll",
            operations: &[
                OperationDescription { value: "getAll", name: "Get Many", action: "List hubs" },
                OperationDescription { value: "get", name: "Get", action: "Get a hub" },
            ],
        },
        ResourceDescription {
            value: "item",
            name: "Item",
            default_operation: "get",
            operations: &[
                OperationDescription { value: "get", name: "Get", action: "Get an item" },
                OperationDescription {
                    value: "getVersions",
                    name: "Get Versions",
                    action: "List item versions",
                },
                OperationDescription { value: "getTip", name: "Get Tip", action: "Get the latest version" },
            ],
        },
        ResourceDescription {
            value: "project",
            name: "Project",
            default_operation: "getAll",
            operations: &[
                OperationDescription { value: "getAll", name: "Get Many", action: "List projects" },
                OperationDescription { value: "get", name: "Get", action: "Get a project" },
                OperationDescription {
                    value: "getTopFolders",
                    name: "Get Top Folders",
                    action: "List top-level folders",
                },
            ],
        },
        ResourceDescription {
            value: "version",
            name: "Version",
            default_operation: "get",
            operations: &[OperationDescription { value: "get", name: "Get", action: "Get a version" }],
        },
    ],
};

const FOLDER_EXTENSION: &str = "folders:autodesk.core:Folder";

/// A parsed Data Management operation
#[derive(Debug, Clone, PartialEq)]
pub enum DataManagementRequest {
    ListHubs,
    GetHub { hub_id: String },
    ListProjects { hub_id: String },
    GetProject { hub_id: String, project_id: String },
    GetTopFolders { hub_id: String, project_id: String },
    GetFolder { project_id: String, folder_id: String },
    GetFolderContents { project_id: String, folder_id: String },
    SearchFolder { project_id: String, folder_id: String, filter_field_name: String },
    CreateFolder { project_id: String, body: Value },
    GetItem { project_id: String, item_id: String },
    GetItemVersions { project_id: String, item_id: String },
    GetItemTip { project_id: String, item_id: String },
    GetVersion { project_id: String, version_id: String },
}

/// The Data Management client surface the node depends on
#[async_trait]
pub trait DataManagementApi: Send + Sync {
    async fn get_hubs(&self) -> Result<Value, ApiError>;
    async fn get_hub(&self, hub_id: &str) -> Result<Value, ApiError>;
    async fn get_hub_projects(&self, hub_id: &str) -> Result<Value, ApiError>;
    async fn get_project(&self, hub_id: &str, project_id: &str) -> Result<Value, ApiError>;
    async fn get_project_top_folders(&self, hub_id: &str, project_id: &str) -> Result<Value, ApiError>;
    async fn get_folder(&self, project_id: &str, folder_id: &str) -> Result<Value, ApiError>;
    async fn get_folder_contents(&self, project_id: &str, folder_id: &str) -> Result<Value, ApiError>;
    async fn get_folder_search(
        &self,
        project_id: &str,
        folder_id: &str,
        filter_field_name: &str,
    ) -> Result<Value, ApiError>;
    /// `body` is a complete JSON:API create-folder document
    async fn create_folder(&self, project_id: &str, body: Value) -> Result<Value, ApiError>;
    async fn get_item(&self, project_id: &str, item_id: &str) -> Result<Value, ApiError>;
    async fn get_item_versions(&self, project_id: &str, item_id: &str) -> Result<Value, ApiError>;
    async fn get_item_tip(&self, project_id: &str, item_id: &str) -> Result<Value, ApiError>;
    async fn get_version(&self, project_id: &str, version_id: &str) -> Result<Value, ApiError>;
}

/// JSON:API document creating `folder_name` under `parent_folder_id`
pub fn create_folder_body(folder_name: &str, parent_folder_id: &str) -> Value {
    json!({
        "jsonapi": {"version": "1.0"},
        "data": {
            "type": "folders",
            "attributes": {
                "name": folder_name,
                "extension": {"type": FOLDER_EXTENSION, "version": "1.0"}
            },
            "relationships": {
                "parent": {"data": {"type": "folders", "id": parent_folder_id}}
            }
        }
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataManagementNode;

#[async_trait]
impl ApsNode for DataManagementNode {
    type Client = dyn DataManagementApi;
    type Request = DataManagementRequest;

    fn description(&self) -> &'static NodeDescription {
        &DESCRIPTION
    }

    fn parse_request(
        &self,
        resource: &str,
        operation: &str,
        item: &InputItem,
    ) -> Result<DataManagementRequest, NodeError> {
        use DataManagementRequest::*;

        let params = &item.parameters;
        let hub_id = || params.string("hubId");
        let project_id = || params.string("projectId");
        let folder_id = || params.string("folderId");
        let item_id = || params.string("itemId");

        let request = match (resource, operation) {
            ("hub", "getAll") => ListHubs,
            ("hub", "get") => GetHub { hub_id: hub_id()? },
            ("project", "getAll") => ListProjects { hub_id: hub_id()? },
            ("project", "get") => GetProject { hub_id: hub_id()?, project_id: project_id()? },
            ("project", "getTopFolders") => GetTopFolders { hub_id: hub_id()?, project_id: project_id()? },
            ("folder", "get") => GetFolder { project_id: project_id()?, folder_id: folder_id()? },
            ("folder", "getContents") => GetFolderContents { project_id: project_id()?, folder_id: folder_id()? },
            ("folder", "search") => SearchFolder {
                project_id: project_id()?,
                folder_id: folder_id()?,
                filter_field_name: params.string("filterFieldName")?,
            },
            ("folder", "create") => CreateFolder {
                project_id: project_id()?,
                body: create_folder_body(
                    &params.string("folderName")?,
                    &params.string("parentFolderId")?,
                ),
            },
            ("item", "get") => GetItem { project_id: project_id()?, item_id: item_id()? },
            ("item", "getVersions") => GetItemVersions { project_id: project_id()?, item_id: item_id()? },
            ("item", "getTip") => GetItemTip { project_id: project_id()?, item_id: item_id()? },
            ("version", "get") => GetVersion {
                project_id: project_id()?,
                version_id: params.string("versionId")?,
            },
            _ => return Err(NodeError::unsupported(resource, operation)),
        };

        Ok(request)
    }

    async fn dispatch(&self, client: &Self::Client, request: DataManagementRequest) -> Result<Value, NodeError> {
        use DataManagementRequest::*;

        let response = match request {
            ListHubs => client.get_hubs().await?,
            GetHub { hub_id } => client.get_hub(&hub_id).await?,
            ListProjects { hub_id } => client.get_hub_projects(&hub_id).await?,
            GetProject { hub_id, project_id } => client.get_project(&hub_id, &project_id).await?,
            GetTopFolders { hub_id, project_id } => {
                client.get_project_top_folders(&hub_id, &project_id).await?
            }
            GetFolder { project_id, folder_id } => client.get_folder(&project_id, &folder_id).await?,
            GetFolderContents { project_id, folder_id } => {
                client.get_folder_contents(&project_id, &folder_id).await?
            }
            SearchFolder { project_id, folder_id, filter_field_name } => {
                client
                    .get_folder_search(&project_id, &folder_id, &filter_field_name)
                    .await?
            }
            CreateFolder { project_id, body } => client.create_folder(&project_id, body).await?,
            GetItem { project_id, item_id } => client.get_item(&project_id, &item_id).await?,
            GetItemVersions { project_id, item_id } => {
                client.get_item_versions(&project_id, &item_id).await?
            }
            GetItemTip { project_id, item_id } => client.get_item_tip(&project_id, &item_id).await?,
            GetVersion { project_id, version_id } => client.get_version(&project_id, &version_id).await?,
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(resource: &str, operation: &str, params: Value) -> Result<DataManagementRequest, NodeError> {
        DataManagementNode.parse_request(resource, operation, &InputItem::with_parameters(params))
    }

    #[test]
    fn test_create_folder_body() {
        let body = create_folder_body("Specs", "urn:adsk.wipprod:fs.folder:co.1");
        assert_eq!(body["jsonapi"]["version"], "1.0");
        assert_eq!(body["data"]["type"], "folders");
        assert_eq!(body["data"]["attributes"]["name"], "Specs");
        assert_eq!(
            body["data"]["attributes"]["extension"]["type"],
            "folders:autodesk.core:Folder"
        );
        assert_eq!(
            body["data"]["relationships"]["parent"]["data"]["id"],
            "urn:adsk.wipprod:fs.folder:co.1"
        );
    }

    #[test]
    fn test_parse_requires_ids() {
        assert_eq!(parse("hub", "getAll", json!({})), Ok(DataManagementRequest::ListHubs));
        assert_eq!(
            parse("project", "get", json!({"hubId": "b.1"})),
            Err(NodeError::MissingParameter("projectId".into()))
        );
        assert_eq!(
            parse("item", "getTip", json!({"projectId": "b.p", "itemId": "urn:i"})),
            Ok(DataManagementRequest::GetItemTip {
                project_id: "b.p".into(),
                item_id: "urn:i".into()
            })
        );
    }

    #[test]
    fn test_every_described_operation_is_handled() {
        let params = json!({
            "hubId": "b.1",
            "projectId": "b.p",
            "folderId": "urn:f",
            "itemId": "urn:i",
            "versionId": "urn:v",
            "filterFieldName": "displayName",
            "folderName": "New",
            "parentFolderId": "urn:parent"
        });
        for (resource, operation) in DESCRIPTION.operations() {
            let result = parse(resource, operation, params.clone());
            assert!(result.is_ok(), "{resource}/{operation}: {result:?}");
        }
        assert!(parse("version", "delete", params).is_err());
    }
}
