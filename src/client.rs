use std::time::Duration;

use reqwest::{Client, RequestBuilder, header, redirect};
use serde_json::Value;
use url::form_urlencoded;

use crate::{AccountProfile, ConfigSource, NoConfig, RiotError, TokenResponse};
#[cfg(feature = "local-server")]
use crate::{LocalServer, LocalServerConfig};

pub const AUTHORIZATION_BASE_URL: &str = "https://auth.riotgames.com";
pub const API_BASE_URL: &str = "https://europe.api.riotgames.com";
pub const DEFAULT_SCOPES: &[&str] = &["openid", "offline_access", "email"];

const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone)]
pub struct RiotClientConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub timeout: Option<Duration>,
    pub authorization_base_url: String,
    pub api_base_url: String,
}

impl Default for RiotClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RiotClientConfig {
    pub fn new() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            scopes: None,
            timeout: None,
            authorization_base_url: AUTHORIZATION_BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    pub fn with_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::new()
            .with_client_id(client_id)
            .with_client_secret(client_secret)
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Point the client at self-hosted or test endpoints instead of the
    /// Riot defaults.
    pub fn with_base_urls(
        mut self,
        authorization_base_url: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        self.authorization_base_url = authorization_base_url.into();
        self.api_base_url = api_base_url.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct RiotClient {
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    authorization_base_url: String,
    api_base_url: String,
    http: Client,
}

impl RiotClient {
    pub fn new(config: RiotClientConfig) -> Result<Self, RiotError> {
        Self::with_config_source(config, &NoConfig)
    }

    /// Build a client, filling credentials and default scopes the config
    /// leaves unset from `source`.
    pub fn with_config_source(
        config: RiotClientConfig,
        source: &dyn ConfigSource,
    ) -> Result<Self, RiotError> {
        let mut builder = Client::builder().redirect(redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|err| RiotError::Transport {
            message: err.to_string(),
        })?;
        Self::resolve(config, source, http)
    }

    /// Build a client around an existing `reqwest::Client`. Timeout and
    /// redirect policy stay whatever the caller configured on it.
    pub fn with_http_client(config: RiotClientConfig, http: Client) -> Result<Self, RiotError> {
        Self::resolve(config, &NoConfig, http)
    }

    fn resolve(
        config: RiotClientConfig,
        source: &dyn ConfigSource,
        http: Client,
    ) -> Result<Self, RiotError> {
        let client_id = config
            .client_id
            .or_else(|| source.get("client_id"))
            .unwrap_or_default();
        let client_secret = config
            .client_secret
            .or_else(|| source.get("client_secret"))
            .unwrap_or_default();

        if client_id.is_empty() || client_secret.is_empty() {
            return Err(RiotError::Configuration {
                message: "Riot Games client id and client secret are required. Provide them \
                          via RiotClientConfig or a ConfigSource (client_id / client_secret)."
                    .to_string(),
            });
        }

        let scopes = config
            .scopes
            .or_else(|| source.default_scopes())
            .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|scope| scope.to_string()).collect());

        Ok(Self {
            client_id,
            client_secret,
            scopes,
            authorization_base_url: config.authorization_base_url,
            api_base_url: config.api_base_url,
            http,
        })
    }

    /// Authorization URL to redirect the user to, using the client's default
    /// scopes. Pure string construction, no network I/O.
    pub fn authorization_url(&self, redirect_uri: &str) -> String {
        self.build_authorization_url(redirect_uri, &self.scopes.join("+"))
    }

    pub fn authorization_url_with_scopes(&self, redirect_uri: &str, scopes: &[&str]) -> String {
        self.build_authorization_url(redirect_uri, &scopes.join("+"))
    }

    fn build_authorization_url(&self, redirect_uri: &str, scope: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .finish();

        // The scope string goes in with literal `+` separators; the
        // serializer would emit %2B, which the provider does not accept.
        format!(
            "{}/authorize?{}&scope={}",
            self.authorization_base_url, query, scope
        )
    }

    /// Exchange an authorization code for an access token. Returns `None`
    /// when the token response carries no `access_token` field.
    ///
    /// The client secret is sent verbatim as `client_assertion`; this crate
    /// never mints or signs a JWT for that slot. The secret issued by the
    /// developer portal is expected to already be in the shape the provider
    /// accepts there.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<String>, RiotError> {
        let payload = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.client_id.as_str()),
            (
                "client_assertion_type",
                "urn:ietf:params:oauth:client-assertion-type:jwt-bearer",
            ),
            ("client_assertion", self.client_secret.as_str()),
        ];

        let request = self
            .http
            .post(format!("{}/token", self.authorization_base_url))
            .header(header::ACCEPT, "application/json")
            .form(&payload);

        let body = self.execute(request).await?;
        let token: TokenResponse =
            serde_json::from_value(body).map_err(|err| RiotError::ResponseFormat {
                message: err.to_string(),
            })?;
        Ok(token.access_token)
    }

    /// Fetch the Riot account linked to an access token.
    pub async fn account_data(&self, access_token: &str) -> Result<AccountProfile, RiotError> {
        let request = self
            .http
            .get(format!("{}/riot/account/v1/accounts/me", self.api_base_url))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(access_token);

        let body = self.execute(request).await?;
        serde_json::from_value(body).map_err(|err| RiotError::ResponseFormat {
            message: err.to_string(),
        })
    }

    /// Run the whole sign-in round trip against a loopback callback server:
    /// hand the authorization URL to `on_authorize`, wait for the redirect,
    /// and exchange the delivered code.
    #[cfg(feature = "local-server")]
    pub async fn run_local_flow<F>(
        &self,
        server: LocalServerConfig,
        on_authorize: F,
    ) -> Result<Option<String>, RiotError>
    where
        F: FnOnce(&str) -> Result<(), RiotError>,
    {
        let redirect_uri = server.redirect_uri();
        let authorization_url = self.authorization_url(&redirect_uri);

        let server = LocalServer::from_config(server)?;
        let listener = server.bind()?;
        let handle = tokio::task::spawn_blocking(move || server.listen_with(listener));

        on_authorize(&authorization_url)?;

        let callback = handle.await.map_err(|err| RiotError::Transport {
            message: err.to_string(),
        })??;

        self.exchange_code(&callback.code, &redirect_uri).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, RiotError> {
        let response = request.send().await.map_err(|err| RiotError::Transport {
            message: err.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| RiotError::Transport {
            message: err.to_string(),
        })?;

        if status >= 400 {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|body| provider_message(&body))
                .unwrap_or_else(|| format!("HTTP {status} error"));
            return Err(RiotError::Provider { message, status });
        }

        serde_json::from_str(&body).map_err(|err| RiotError::ResponseFormat {
            message: err.to_string(),
        })
    }
}

fn provider_message(body: &Value) -> Option<String> {
    body.get("error_description")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;
    use url::Url;

    use super::{RiotClient, RiotClientConfig, provider_message};
    use crate::{ConfigSource, RiotError};

    struct MapConfig {
        values: HashMap<&'static str, &'static str>,
        scopes: Option<Vec<String>>,
    }

    impl MapConfig {
        fn new(values: &[(&'static str, &'static str)]) -> Self {
            Self {
                values: values.iter().copied().collect(),
                scopes: None,
            }
        }
    }

    impl ConfigSource for MapConfig {
        fn get(&self, key: &str) -> Option<String> {
            self.values.get(key).map(|value| value.to_string())
        }

        fn default_scopes(&self) -> Option<Vec<String>> {
            self.scopes.clone()
        }
    }

    fn client() -> RiotClient {
        RiotClient::new(RiotClientConfig::with_credentials("client-id", "client-secret")).unwrap()
    }

    #[test]
    fn construction_fails_for_every_incomplete_credential_pair() {
        let combos: &[(Option<&str>, Option<&str>)] = &[
            (None, None),
            (Some(""), Some("")),
            (Some("client-id"), None),
            (Some("client-id"), Some("")),
            (None, Some("client-secret")),
            (Some(""), Some("client-secret")),
        ];

        for (client_id, client_secret) in combos {
            let mut config = RiotClientConfig::new();
            config.client_id = client_id.map(str::to_string);
            config.client_secret = client_secret.map(str::to_string);
            assert!(
                matches!(
                    RiotClient::new(config),
                    Err(RiotError::Configuration { .. })
                ),
                "expected configuration error for {client_id:?}/{client_secret:?}"
            );
        }
    }

    #[test]
    fn construction_falls_back_to_config_source() {
        let source = MapConfig::new(&[
            ("client_id", "source-id"),
            ("client_secret", "source-secret"),
        ]);
        let client =
            RiotClient::with_config_source(RiotClientConfig::new(), &source).unwrap();

        let url = Url::parse(&client.authorization_url("https://app.test/cb")).unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("client_id"), Some(&"source-id".to_string()));
    }

    #[test]
    fn explicit_credentials_win_over_config_source() {
        let source = MapConfig::new(&[
            ("client_id", "source-id"),
            ("client_secret", "source-secret"),
        ]);
        let config = RiotClientConfig::new().with_client_id("explicit-id");
        let client = RiotClient::with_config_source(config, &source).unwrap();

        let url = Url::parse(&client.authorization_url("https://app.test/cb")).unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("client_id"), Some(&"explicit-id".to_string()));
    }

    #[test]
    fn authorization_url_joins_scopes_with_literal_plus() {
        let url = client().authorization_url("https://app.test/cb");
        assert!(url.starts_with("https://auth.riotgames.com/authorize?"));
        assert!(url.ends_with("&scope=openid+offline_access+email"));

        let parsed = Url::parse(&url).unwrap();
        let pairs: HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            pairs.get("redirect_uri"),
            Some(&"https://app.test/cb".to_string())
        );
        assert_eq!(pairs.get("client_id"), Some(&"client-id".to_string()));
        assert_eq!(pairs.get("response_type"), Some(&"code".to_string()));
        // `+` decodes back to the space-separated scope list.
        assert_eq!(
            pairs.get("scope"),
            Some(&"openid offline_access email".to_string())
        );
    }

    #[test]
    fn authorization_url_is_deterministic() {
        let client = client();
        assert_eq!(
            client.authorization_url("https://app.test/cb"),
            client.authorization_url("https://app.test/cb")
        );
    }

    #[test]
    fn authorization_url_accepts_custom_scopes() {
        let url = client().authorization_url_with_scopes("https://app.test/cb", &["openid"]);
        assert!(url.ends_with("&scope=openid"));

        let config = RiotClientConfig::with_credentials("client-id", "client-secret")
            .with_scopes(["openid", "email"]);
        let client = RiotClient::new(config).unwrap();
        assert!(
            client
                .authorization_url("https://app.test/cb")
                .ends_with("&scope=openid+email")
        );
    }

    #[test]
    fn config_source_may_supply_default_scopes() {
        let mut source = MapConfig::new(&[
            ("client_id", "source-id"),
            ("client_secret", "source-secret"),
        ]);
        source.scopes = Some(vec!["openid".to_string(), "email".to_string()]);
        let client =
            RiotClient::with_config_source(RiotClientConfig::new(), &source).unwrap();
        assert!(
            client
                .authorization_url("https://app.test/cb")
                .ends_with("&scope=openid+email")
        );
    }

    #[test]
    fn provider_message_prefers_error_description() {
        let body = json!({"error": "invalid_grant", "error_description": "bad code"});
        assert_eq!(provider_message(&body), Some("bad code".to_string()));

        let body = json!({"error": "invalid_grant"});
        assert_eq!(provider_message(&body), Some("invalid_grant".to_string()));

        let body = json!({"status": 400});
        assert_eq!(provider_message(&body), None);
    }
}
