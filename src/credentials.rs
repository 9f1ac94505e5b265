//! OAuth2 credential profiles for APS
//!
//! Token acquisition and refresh belong to the host's credential subsystem.
//! This module only describes the two profiles and pulls a bearer token out
//! of an already decrypted credential.

use crate::error::NodeError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

pub const AUTHORIZE_URL: &str = "https://developer.api.autodesk.com/authentication/v2/authorize";
pub const TOKEN_URL: &str = "https://developer.api.autodesk.com/authentication/v2/token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GrantType {
    AuthorizationCode,
    ClientCredentials,
}

/// Static description of an OAuth2 credential type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProfile {
    pub name: &'static str,
    pub display_name: &'static str,
    pub documentation_url: &'static str,
    pub grant_type: GrantType,
    pub auth_url: Option<&'static str>,
    pub access_token_url: &'static str,
    pub scope: &'static str,
    /// Where client credentials go on the token request
    pub authentication: &'static str,
}

const DOCUMENTATION_URL: &str =
    "https://aps.autodesk.com/en/docs/oauth/v2/developers_guide/overview/";

/// Three-legged profile used for Data Management
pub const APS_OAUTH2: CredentialProfile = CredentialProfile {
    name: "apsOAuth2Api",
    display_name: "APS OAuth2 API",
    documentation_url: DOCUMENTATION_URL,
    grant_type: GrantType::AuthorizationCode,
    auth_url: Some(AUTHORIZE_URL),
    access_token_url: TOKEN_URL,
    scope: "data:read data:write data:create account:read",
    authentication: "body",
};

/// Two-legged profile used for OSS and Model Derivative
pub const APS_CLIENT_CREDENTIALS: CredentialProfile = CredentialProfile {
    name: "apsClientCredentialsOAuth2Api",
    display_name: "APS Client Credentials OAuth2 API",
    documentation_url: DOCUMENTATION_URL,
    grant_type: GrantType::ClientCredentials,
    auth_url: None,
    access_token_url: TOKEN_URL,
    scope: "data:read data:write data:create bucket:read bucket:create",
    authentication: "body",
};

impl CredentialProfile {
    pub fn all() -> [CredentialProfile; 2] {
        [APS_OAUTH2, APS_CLIENT_CREDENTIALS]
    }

    pub fn by_name(name: &str) -> Option<CredentialProfile> {
        Self::all().into_iter().find(|profile| profile.name == name)
    }

    pub fn scopes(&self) -> impl Iterator<Item = &'static str> {
        self.scope.split_whitespace()
    }
}

/// Resolves a credential profile name to a bearer access token
pub trait CredentialResolver: Send + Sync {
    fn access_token(&self, credential_name: &str) -> Result<String, NodeError>;
}

/// Credentials already decrypted by the host, keyed by profile name.
///
/// Each entry is the credential JSON; the token lives at
/// `oauthTokenData.access_token`.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    credentials: HashMap<String, Value>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(mut self, name: impl Into<String>, data: Value) -> Self {
        self.credentials.insert(name.into(), data);
        self
    }

    /// Shortcut for a credential holding just an access token
    pub fn with_token(self, name: impl Into<String>, access_token: impl Into<String>) -> Self {
        let token: String = access_token.into();
        self.with_credential(
            name,
            serde_json::json!({"oauthTokenData": {"access_token": token}}),
        )
    }
}

impl CredentialResolver for StaticCredentials {
    fn access_token(&self, credential_name: &str) -> Result<String, NodeError> {
        let data = self
            .credentials
            .get(credential_name)
            .ok_or_else(|| NodeError::UnknownCredential(credential_name.to_string()))?;

        data.get("oauthTokenData")
            .and_then(|oauth| oauth.get("access_token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| NodeError::MissingAccessToken(credential_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profiles_by_name() {
        let profile = CredentialProfile::by_name("apsClientCredentialsOAuth2Api").unwrap();
        assert_eq!(profile.grant_type, GrantType::ClientCredentials);
        assert!(profile.scopes().any(|s| s == "bucket:create"));
        assert!(CredentialProfile::by_name("github").is_none());
    }

    #[test]
    fn test_resolves_token() {
        let creds = StaticCredentials::new().with_token("apsOAuth2Api", "tok-123");
        assert_eq!(creds.access_token("apsOAuth2Api").unwrap(), "tok-123");
    }

    #[test]
    fn test_missing_token() {
        let creds = StaticCredentials::new()
            .with_credential("apsOAuth2Api", json!({"oauthTokenData": {}}))
            .with_token("apsClientCredentialsOAuth2Api", "");

        assert_eq!(
            creds.access_token("apsOAuth2Api"),
            Err(NodeError::MissingAccessToken("apsOAuth2Api".into()))
        );
        assert!(creds.access_token("apsClientCredentialsOAuth2Api").is_err());
        assert_eq!(
            creds.access_token("other"),
            Err(NodeError::UnknownCredential("other".into()))
        );
    }
}
