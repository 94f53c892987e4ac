use std::{fmt, sync::Arc, time::Duration};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{error::ApiError, remote::session::Session};

/// Invoked once per 401 response, after the session has been cleared.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
            user_agent: concat!("signal_desk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin JSON client for the trading backend. Attaches the session's bearer
/// token to every request and turns a 401 into a logout. It never retries.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn Session>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.session.token().is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Arc<dyn Session>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            session,
            on_unauthorized: None,
        })
    }

    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub async fn get<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut request = self.request(Method::GET, path)?;
        if let Some(query) = query {
            request = request.query(query);
        }
        self.send(Method::GET, path, request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.send(Method::POST, path, request).await
    }

    /// POST with no request body at all.
    pub async fn post_empty<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?;
        self.send(Method::POST, path, request).await
    }

    pub async fn post_form<F, T>(&self, path: &str, form: &F) -> Result<T, ApiError>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.form(form);
        self.send(Method::POST, path, request).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let request = self.client.request(method, url);

        Ok(match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send<T>(&self, method: Method, path: &str, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        debug!("{} {}", method, path);

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("{} {} returned 401, clearing session", method, path);
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(status, &body);
            debug!("{} {} failed with {}: {}", method, path, status, detail);

            if status == StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound { detail });
            }
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let bytes = response.bytes().await?;
        let data = serde_json::from_slice::<T>(&bytes)?;
        Ok(data)
    }

    fn handle_unauthorized(&self) {
        if let Err(e) = self.session.clear() {
            warn!("Failed to clear session after 401: {}", e);
        }
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }
}

/// Pulls FastAPI's `{"detail": ...}` out of an error body, falling back to the
/// raw text or the status reason.
fn extract_detail(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
