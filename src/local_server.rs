mod config;
mod http;
mod server;
mod target;

pub use config::LocalServerConfig;
pub use server::LocalServer;
