use crate::service::{ApiKeyAuth, AuthProvider, BearerTokenAuth};
use anyhow::{anyhow, Result};
use std::fmt;

pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

const ENDPOINT_VAR: &str = "AGENTS_ENDPOINT";
const API_KEY_VAR: &str = "AGENTS_API_KEY";
const BEARER_TOKEN_VAR: &str = "AGENTS_BEARER_TOKEN";
const API_VERSION_VAR: &str = "AGENTS_API_VERSION";
const MODEL_VAR: &str = "MODEL_DEPLOYMENT_NAME";

/// How requests to the service are authenticated
#[derive(Clone)]
pub enum Credential {
    ApiKey(String),
    BearerToken(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Credential::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
        }
    }
}

/// Connection settings for the agent session service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub endpoint: String,
    /// Sent as `api-version` query parameter when set
    pub api_version: Option<String>,
    pub credential: Credential,
    /// Model deployment the agents are created with
    pub model: String,
}

impl ServiceConfig {
    /// Load the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| anyhow!("Environment variable {name} must be set"))
        };

        let endpoint = require(ENDPOINT_VAR)?;
        let model = require(MODEL_VAR)?;

        let credential = match (get(API_KEY_VAR), get(BEARER_TOKEN_VAR)) {
            (Some(key), _) => Credential::ApiKey(key),
            (None, Some(token)) => Credential::BearerToken(token),
            (None, None) => {
                return Err(anyhow!(
                    "Either {API_KEY_VAR} or {BEARER_TOKEN_VAR} must be set"
                ))
            }
        };

        let api_version = match lookup(API_VERSION_VAR) {
            // An explicitly empty value disables the query parameter
            Some(version) if version.trim().is_empty() => None,
            Some(version) => Some(version),
            None => Some(DEFAULT_API_VERSION.to_string()),
        };

        Ok(Self {
            endpoint,
            api_version,
            credential,
            model,
        })
    }

    pub fn auth_provider(&self) -> Box<dyn AuthProvider> {
        match &self.credential {
            Credential::ApiKey(key) => Box::new(ApiKeyAuth::new(key.clone())),
            Credential::BearerToken(token) => Box::new(BearerTokenAuth::new(token.clone())),
        }
    }
}
