use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::{Router, routing::get};
use tokio::net::TcpListener as TokioTcpListener;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

use crate::{AuthorizationCallback, RiotError};

use super::config::{DEFAULT_ERROR_HTML, DEFAULT_SUCCESS_HTML, LocalServerConfig};
use super::http::{CallbackState, callback_handler, fallback_handler, resolve, wait_for_callback};
use super::target::RedirectTarget;

/// One-shot loopback server that captures the provider redirect and hands
/// back the authorization code (or the provider's denial).
#[derive(Debug, Clone)]
pub struct LocalServer {
    target: RedirectTarget,
    success_html: String,
    error_html: String,
    timeout: Option<Duration>,
}

impl LocalServer {
    pub fn new(redirect_uri: impl Into<String>) -> Result<Self, RiotError> {
        let redirect_uri = redirect_uri.into();
        Ok(Self {
            target: RedirectTarget::parse(&redirect_uri)?,
            success_html: DEFAULT_SUCCESS_HTML.to_string(),
            error_html: DEFAULT_ERROR_HTML.to_string(),
            timeout: None,
        })
    }

    pub fn from_config(config: LocalServerConfig) -> Result<Self, RiotError> {
        let redirect_uri = config.redirect_uri();
        Ok(Self {
            target: RedirectTarget::parse(&redirect_uri)?,
            success_html: config.success_html,
            error_html: config.error_html,
            timeout: config.timeout,
        })
    }

    pub fn with_success_html(mut self, html: impl Into<String>) -> Self {
        self.success_html = html.into();
        self
    }

    pub fn with_error_html(mut self, html: impl Into<String>) -> Self {
        self.error_html = html.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn bind(&self) -> Result<TcpListener, RiotError> {
        TcpListener::bind((self.target.host.as_str(), self.target.port)).map_err(RiotError::from)
    }

    /// Blocking variant for callers outside an async context; drives the
    /// async listener on a throwaway current-thread runtime.
    pub fn listen_with(&self, listener: TcpListener) -> Result<AuthorizationCallback, RiotError> {
        let server = self.clone();
        let handle = thread::spawn(move || -> Result<AuthorizationCallback, RiotError> {
            let runtime = Builder::new_current_thread().enable_all().build()?;
            runtime.block_on(server.listen_with_async(listener))
        });

        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(RiotError::Transport {
                message: "local server thread panicked".to_string(),
            }),
        }
    }

    pub fn listen_once(&self) -> Result<AuthorizationCallback, RiotError> {
        let listener = self.bind()?;
        self.listen_with(listener)
    }

    pub async fn listen_with_async(
        &self,
        listener: TcpListener,
    ) -> Result<AuthorizationCallback, RiotError> {
        let (callback_tx, callback_rx) =
            oneshot::channel::<Result<AuthorizationCallback, RiotError>>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let callback_tx = Arc::new(Mutex::new(Some(callback_tx)));

        let state = CallbackState {
            target: self.target.clone(),
            success_html: self.success_html.clone(),
            error_html: self.error_html.clone(),
            callback_tx: callback_tx.clone(),
        };

        let app = Router::new()
            .route(&state.target.path, get(callback_handler))
            .fallback(fallback_handler)
            .with_state(state);

        listener.set_nonblocking(true)?;
        let listener = TokioTcpListener::from_std(listener)?;

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        let callback_tx_for_server = callback_tx.clone();
        let server_handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                let error = RiotError::Transport {
                    message: err.to_string(),
                };
                resolve(&callback_tx_for_server, Err(error));
            }
        });

        let callback = wait_for_callback(callback_rx, self.timeout).await;

        let _ = shutdown_tx.send(());
        let _ = server_handle.await;

        callback
    }

    pub async fn listen_once_async(&self) -> Result<AuthorizationCallback, RiotError> {
        let listener = self.bind()?;
        self.listen_with_async(listener).await
    }
}
