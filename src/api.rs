//! JSON-over-POST client for `/api/start` and `/api/question`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::session::Action;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub relationship: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub session_id: Option<String>,
    pub level: String,
    pub action: Option<Action>,
    pub history: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub level: String,
    pub question: String,
}

/// Raw HTTP outcome handed back by a transport.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a JSON body with POST and returns whatever came back.
/// Only unreachable servers are errors here; status codes are judged by the client.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpReply, ApiError>;
}

pub struct ApiClient<T> {
    transport: T,
    config: AppConfig,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: AppConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn start(&self, relationship: &str) -> Result<StartResponse, ApiError> {
        let req = StartRequest { relationship: relationship.to_string() };
        self.post(&self.config.start_path, &req).await
    }

    pub async fn question(&self, req: &QuestionRequest) -> Result<QuestionResponse, ApiError> {
        self.post(&self.config.question_path, req).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        let url = self.config.url(path);
        log::debug!("POST {}", url);
        let reply = self.transport.post_json(&url, body).await?;
        if !reply.is_success() {
            log::warn!("POST {} -> {}", url, reply.status);
            return Err(ApiError::RequestFailed { endpoint: path.to_string(), status: reply.status });
        }
        Ok(serde_json::from_str(&reply.body)?)
    }
}
