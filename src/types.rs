use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::RiotError;

/// Token endpoint response. Only `access_token` is consumed by this crate;
/// the remaining OAuth fields are kept for hosts that want them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Riot account returned by `/riot/account/v1/accounts/me`. Fields the API
/// adds later land in `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub puuid: String,
    #[serde(rename = "gameName")]
    pub game_name: String,
    #[serde(rename = "tagLine")]
    pub tag_line: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Authorization code delivered to the redirect URI.
#[derive(Debug, Clone)]
pub struct AuthorizationCallback {
    pub code: String,
}

impl AuthorizationCallback {
    /// Parse a redirect callback URL. A callback carrying `error` instead of
    /// `code` means the provider declined the authorization; that surfaces as
    /// [`RiotError::Provider`] with status 0.
    pub fn from_url(callback_url: &str) -> Result<Self, RiotError> {
        let url = Url::parse(callback_url)?;
        let mut code = None;
        let mut error = None;
        let mut error_description = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.to_string()),
                "error" => error = Some(value.to_string()),
                "error_description" => error_description = Some(value.to_string()),
                _ => {}
            }
        }

        if let Some(code) = code {
            return Ok(Self { code });
        }

        if let Some(error) = error {
            return Err(RiotError::Provider {
                message: error_description.unwrap_or(error),
                status: 0,
            });
        }

        Err(RiotError::MissingAuthorizationCode)
    }
}
