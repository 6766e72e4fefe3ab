use base64::{engine::general_purpose, Engine as _};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::CredentialsError;

const LIVE_PREFIX: &str = "pk_live_";
const TEST_PREFIX: &str = "pk_test_";

/// Whether the backend instance is a production or a development one.
/// This decides how the token travels on the wire.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Production,
    Development,
}

impl InstanceType {
    pub fn is_production(self) -> bool {
        matches!(self, InstanceType::Production)
    }
}

/// A parsed publishable key: `pk_live_<b64(host$)>` or `pk_test_<b64(host$)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishableKey {
    raw: String,
    instance_type: InstanceType,
    frontend_api: String,
}

impl PublishableKey {
    pub fn parse(raw: &str) -> Result<Self, CredentialsError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CredentialsError::MissingPublishableKey);
        }

        let (instance_type, encoded) = if let Some(rest) = raw.strip_prefix(LIVE_PREFIX) {
            (InstanceType::Production, rest)
        } else if let Some(rest) = raw.strip_prefix(TEST_PREFIX) {
            (InstanceType::Development, rest)
        } else {
            return Err(CredentialsError::MalformedPublishableKey(
                "expected a pk_live_ or pk_test_ prefix".to_string(),
            ));
        };

        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| CredentialsError::MalformedPublishableKey(e.to_string()))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|e| CredentialsError::MalformedPublishableKey(e.to_string()))?;

        let frontend_api = decoded
            .strip_suffix('$')
            .ok_or_else(|| {
                CredentialsError::MalformedPublishableKey("missing `$` terminator".to_string())
            })?
            .to_string();
        if frontend_api.is_empty() {
            return Err(CredentialsError::MalformedPublishableKey(
                "empty frontend api host".to_string(),
            ));
        }

        Ok(PublishableKey {
            raw: raw.to_string(),
            instance_type,
            frontend_api,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn instance_type(&self) -> InstanceType {
        self.instance_type
    }

    /// Host of the frontend API, e.g. `clerk.example.com`.
    pub fn frontend_api(&self) -> &str {
        &self.frontend_api
    }
}
