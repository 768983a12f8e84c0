use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::{AppError, AppResult, ErrorResponse};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Underlying client, shared with the external adapters
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> AppResult<T> {
        let request = with_bearer(self.client.get(url), bearer);
        read_json(send(request, url).await?, url).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> AppResult<T> {
        let request = with_bearer(self.client.post(url).json(body), bearer);
        read_json(send(request, url).await?, url).await
    }
}

fn with_bearer(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn send(request: RequestBuilder, url: &str) -> AppResult<Response> {
    request
        .send()
        .await
        .map_err(|e| AppError::Http(format!("Request to {} failed: {}", url, e)))
}

/// Decodes a success body, or maps the server's `{error, code}` body back onto `AppError`
async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| AppError::Http(format!("Invalid response from {}: {}", url, e)));
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(match status.as_u16() {
        400 => AppError::Validation(message),
        401 | 403 => AppError::Unauthorized(message),
        404 => AppError::NotFound(message),
        409 => AppError::Conflict(message),
        _ => AppError::Http(format!("status={}, body={}", status, message)),
    })
}
