use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{error::ApiError, remote::http_client::ApiClient};

#[derive(Debug, Serialize)]
struct TokenForm<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Session plumbing around the backend's OAuth2 password endpoint.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchanges credentials for a bearer token and stores it in the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let token: TokenResponse = self
            .client
            .post_form("/auth/token", &TokenForm { username, password })
            .await?;

        self.client.session().set_token(token.access_token.clone())?;
        info!("Logged in as {}", username);
        Ok(token)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.session().clear()?;
        Ok(())
    }

    pub async fn health(&self) -> Result<Value, ApiError> {
        self.client.get::<Value, ()>("/health/", None).await
    }
}
