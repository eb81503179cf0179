use url::Url;

use crate::RiotError;

/// Loopback address a callback server binds to. Only plain-http redirect
/// URIs are accepted; the server cannot terminate TLS.
#[derive(Debug, Clone)]
pub(super) struct RedirectTarget {
    pub(super) host: String,
    pub(super) port: u16,
    pub(super) path: String,
}

impl RedirectTarget {
    pub(super) fn parse(redirect_uri: &str) -> Result<Self, RiotError> {
        let url = Url::parse(redirect_uri)?;
        if url.scheme() != "http" {
            return Err(RiotError::InvalidRedirectUri(
                "redirect uri must use http scheme".to_string(),
            ));
        }

        let host = url
            .host_str()
            .ok_or_else(|| RiotError::InvalidRedirectUri("redirect uri is missing host".to_string()))?;
        let port = url.port_or_known_default().ok_or_else(|| {
            RiotError::InvalidRedirectUri("redirect uri is missing port".to_string())
        })?;

        Ok(Self {
            host: host.to_string(),
            port,
            path: url.path().to_string(),
        })
    }

    pub(super) fn callback_url(&self, query: &str) -> Result<String, RiotError> {
        let base = format!("http://{}:{}{}", self.host, self.port, self.path);
        if query.is_empty() {
            return Ok(base);
        }
        let url = Url::parse(&format!("{base}?{query}"))?;
        Ok(url.to_string())
    }
}
