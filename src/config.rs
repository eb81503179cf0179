use std::env;

/// Host-supplied settings, looked up by key at client construction time.
///
/// Implement this for whatever configuration system the host application
/// uses; the client asks for `client_id` and `client_secret` when they were
/// not passed explicitly.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Scope list to request when the client config carries none.
    fn default_scopes(&self) -> Option<Vec<String>> {
        None
    }
}

/// No-op source for standalone use; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConfig;

impl ConfigSource for NoConfig {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Reads `{PREFIX}_{KEY}` environment variables, with the `RIOT_GAMES`
/// prefix by default: `RIOT_GAMES_CLIENT_ID`, `RIOT_GAMES_CLIENT_SECRET`,
/// and `RIOT_GAMES_DEFAULT_SCOPES` (comma or space separated).
#[derive(Debug, Clone)]
pub struct EnvConfig {
    prefix: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::with_prefix("RIOT_GAMES")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}_{}", self.prefix, key.to_uppercase()))
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn default_scopes(&self) -> Option<Vec<String>> {
        let raw = self.get("default_scopes")?;
        let scopes: Vec<String> = raw
            .split([',', ' '])
            .filter(|scope| !scope.is_empty())
            .map(str::to_string)
            .collect();
        if scopes.is_empty() { None } else { Some(scopes) }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigSource, EnvConfig, NoConfig};

    #[test]
    fn no_config_always_misses() {
        assert!(NoConfig.get("client_id").is_none());
        assert!(NoConfig.default_scopes().is_none());
    }

    #[test]
    fn env_config_reads_prefixed_variables() {
        unsafe {
            std::env::set_var("RIOT_CONNECT_TEST_A_CLIENT_ID", "from-env");
            std::env::set_var("RIOT_CONNECT_TEST_A_EMPTY", "");
        }
        let source = EnvConfig::with_prefix("RIOT_CONNECT_TEST_A");
        assert_eq!(source.get("client_id").as_deref(), Some("from-env"));
        assert!(source.get("empty").is_none());
        assert!(source.get("missing").is_none());
    }

    #[test]
    fn env_config_splits_default_scopes() {
        unsafe {
            std::env::set_var("RIOT_CONNECT_TEST_B_DEFAULT_SCOPES", "openid, email");
        }
        let source = EnvConfig::with_prefix("RIOT_CONNECT_TEST_B");
        assert_eq!(
            source.default_scopes(),
            Some(vec!["openid".to_string(), "email".to_string()])
        );
    }
}
