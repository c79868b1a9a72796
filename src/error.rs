//! Error types shared by the API client, the controller and the wasm entrypoints.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::page::Page;

/// Errors emitted by `ApiClient` and its transports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{endpoint} request failed with status {status}")]
    RequestFailed { endpoint: String, status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors emitted by the page controller and DOM bindings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("unknown page key '{0}'")]
    UnknownPage(String),
    #[error("unknown level '{0}'")]
    UnknownLevel(String),
    #[error("cannot go from {from:?} to {to:?}")]
    InvalidTransition { from: Page, to: Page },
    #[error("no session: start the game before requesting questions")]
    NoSession,
    #[error("missing element #{0}")]
    MissingElement(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
