use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{CsrfToken, LoginRequest, UserProfile};
use crate::collaborators::AuthApi;
use crate::config::RestConfig;
use crate::error::ApiError;
use crate::headers::DefaultHeaders;

/// [`AuthApi`] over HTTP. The cookie store keeps the server session between calls.
#[derive(Debug, Clone)]
pub struct RestAuthClient {
    client: reqwest::Client,
    config: RestConfig,
    headers: DefaultHeaders,
}

impl RestAuthClient {
    pub fn new(config: RestConfig, headers: DefaultHeaders) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self::with_client(client, config, headers))
    }

    pub fn with_client(client: reqwest::Client, config: RestConfig, headers: DefaultHeaders) -> Self {
        Self {
            client,
            config,
            headers,
        }
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Request builder with the default headers for `method` already applied.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method.clone(), self.config.url(path));
        self.headers.apply(builder, &method)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        ensure_success(response).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(event = "auth_request_rejected", %status);
    Err(ApiError::Status { status, body })
}

#[async_trait]
impl AuthApi for RestAuthClient {
    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let payload = LoginRequest {
            j_username: username,
            j_password: password,
        };
        let builder = self
            .request(Method::POST, &self.config.login_path)
            .json(&payload);
        self.send(builder).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, &self.config.logout_path))
            .await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.fetch_json(&self.config.current_user_path).await
    }

    async fn csrf_token(&self) -> Result<CsrfToken, ApiError> {
        self.fetch_json(&self.config.csrf_token_path).await
    }
}
