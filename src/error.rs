use thiserror::Error;

/// Failure reported by an APS client call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, when the request reached the server
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        ApiError {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        ApiError {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// Errors raised while executing a node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The credential exists but carries no usable access token
    #[error("No access token found in credentials: {0}")]
    MissingAccessToken(String),

    #[error("unknown credential profile: {0}")]
    UnknownCredential(String),

    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unsupported operation \"{operation}\" for resource \"{resource}\"")]
    UnsupportedOperation { resource: String, operation: String },

    #[error("No binary data found for property: {0}")]
    MissingBinary(String),

    #[error("binary property {0} is not valid base64")]
    InvalidBinary(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("io error: {0}")]
    Io(String),
}

impl NodeError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        NodeError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        NodeError::UnsupportedOperation {
            resource: resource.into(),
            operation: operation.into(),
        }
    }

    /// Whether the error came from the credential subsystem
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            NodeError::MissingAccessToken(_) | NodeError::UnknownCredential(_)
        )
    }
}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::Io(err.to_string())
    }
}
