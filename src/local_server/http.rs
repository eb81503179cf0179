use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tokio::sync::oneshot;

use crate::{AuthorizationCallback, RiotError};

use super::target::RedirectTarget;

type CallbackResult = Result<AuthorizationCallback, RiotError>;
type CallbackSender = oneshot::Sender<CallbackResult>;
type CallbackReceiver = oneshot::Receiver<CallbackResult>;
type SharedCallbackSender = Arc<Mutex<Option<CallbackSender>>>;

#[derive(Clone)]
pub(super) struct CallbackState {
    pub(super) target: RedirectTarget,
    pub(super) success_html: String,
    pub(super) error_html: String,
    pub(super) callback_tx: SharedCallbackSender,
}

pub(super) fn resolve(callback_tx: &SharedCallbackSender, result: CallbackResult) {
    if let Ok(mut guard) = callback_tx.lock() {
        if let Some(sender) = guard.take() {
            let _ = sender.send(result);
        }
    }
}

pub(super) async fn callback_handler(
    State(state): State<CallbackState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let CallbackState {
        target,
        success_html,
        error_html,
        callback_tx,
    } = state;

    let query = query.unwrap_or_default();
    let callback_url = match target.callback_url(&query) {
        Ok(url) => url,
        Err(error) => {
            resolve(&callback_tx, Err(error));
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(error_html));
        }
    };

    match AuthorizationCallback::from_url(&callback_url) {
        Ok(callback) => {
            resolve(&callback_tx, Ok(callback));
            (StatusCode::OK, Html(success_html))
        }
        // A stray request without code or error; keep waiting for the real
        // redirect.
        Err(RiotError::MissingAuthorizationCode) => (StatusCode::BAD_REQUEST, Html(error_html)),
        // The provider declined the authorization. That redirect is final,
        // so it resolves the wait.
        Err(denial @ RiotError::Provider { .. }) => {
            resolve(&callback_tx, Err(denial));
            (StatusCode::BAD_REQUEST, Html(error_html))
        }
        Err(error) => {
            resolve(&callback_tx, Err(error));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(error_html))
        }
    }
}

pub(super) async fn fallback_handler(State(state): State<CallbackState>) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(state.error_html))
}

pub(super) async fn wait_for_callback(
    callback_rx: CallbackReceiver,
    timeout: Option<Duration>,
) -> Result<AuthorizationCallback, RiotError> {
    let channel_closed = || RiotError::Transport {
        message: "local server callback channel closed".to_string(),
    };

    if let Some(timeout) = timeout {
        tokio::time::timeout(timeout, callback_rx)
            .await
            .map_err(|_| RiotError::LocalServerTimeout { timeout })?
            .map_err(|_| channel_closed())?
    } else {
        callback_rx.await.map_err(|_| channel_closed())?
    }
}
