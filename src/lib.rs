//! Riot Games sign-on via the OAuth 2.0 authorization code flow.
//!
//! This crate builds the authorization redirect URL, exchanges the returned
//! code for an access token, and fetches the linked Riot account
//! (`puuid`/`gameName`/`tagLine`) with it. Token storage and refresh are the
//! host application's concern.

mod client;
mod config;
mod error;
#[cfg(feature = "local-server")]
mod local_server;
mod types;

pub use client::{
    API_BASE_URL, AUTHORIZATION_BASE_URL, DEFAULT_SCOPES, RiotClient, RiotClientConfig,
};
pub use config::{ConfigSource, EnvConfig, NoConfig};
pub use error::RiotError;
#[cfg(feature = "local-server")]
pub use local_server::{LocalServer, LocalServerConfig};
pub use types::{AccountProfile, AuthorizationCallback, TokenResponse};
