//! API client for communicating with the to-do backend.
//!
//! This module provides the `ApiClient` struct: the single point through
//! which every store reaches the server. It owns the transport policy
//! (cookie session with CSRF header, or bearer token with one-shot refresh).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, Client, Method, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{TokenCache, Tokens};
use crate::models::{
    LoginRequest, LogoutRequest, NewTodo, RefreshRequest, RegisterRequest, Todo, TokenPair,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const CSRF_PATH: &str = "/auth/csrf/";
const LOGIN_PATH: &str = "/auth/login/";
const REGISTER_PATH: &str = "/auth/register/";
const LOGOUT_PATH: &str = "/auth/logout/";
const COOKIE_REFRESH_PATH: &str = "/auth/refresh/";
const BEARER_REFRESH_PATH: &str = "/auth/token/refresh/";
const TODOS_PATH: &str = "/auth/todos/";
const CLEAR_COMPLETED_PATH: &str = "/auth/todos/clear_completed/";

/// Cookie the backend sets from `GET /auth/csrf/`
const CSRF_COOKIE: &str = "csrftoken";

/// Header state-changing requests must echo the CSRF cookie in
const CSRF_HEADER: &str = "X-CSRFToken";

/// How requests prove who the user is. Exactly one is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Browser-style session cookies plus an `X-CSRFToken` header.
    #[default]
    Cookie,
    /// `Authorization: Bearer` access token, renewed once per request on 401.
    Bearer,
}

impl TransportMode {
    pub fn refresh_path(&self) -> &'static str {
        match self {
            TransportMode::Cookie => COOKIE_REFRESH_PATH,
            TransportMode::Bearer => BEARER_REFRESH_PATH,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Cookie => write!(f, "cookie"),
            TransportMode::Bearer => write!(f, "bearer"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cookie" => Ok(TransportMode::Cookie),
            "bearer" => Ok(TransportMode::Bearer),
            other => Err(anyhow::anyhow!(
                "Unknown transport '{}', expected 'cookie' or 'bearer'",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClearCompletedResponse {
    #[serde(default)]
    deleted: Option<u64>,
}

/// API client for the to-do backend.
/// Clone is cheap - reqwest::Client, the cookie jar and the token cache are all shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    origin: Url,
    mode: TransportMode,
    jar: Arc<Jar>,
    tokens: TokenCache,
}

impl ApiClient {
    /// Create a new API client for `base_url`.
    pub fn new(
        base_url: &str,
        mode: TransportMode,
        timeout: Duration,
        tokens: TokenCache,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        let origin = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;

        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder().timeout(timeout);
        if mode == TransportMode::Cookie {
            builder = builder.cookie_provider(jar.clone());
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        debug!(base_url, %mode, "API client created");

        Ok(Self {
            client,
            base_url: Arc::from(base_url),
            origin,
            mode,
            jar,
            tokens,
        })
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Current value of the `csrftoken` cookie, if the server has set one.
    pub fn csrf_token(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.origin)?;
        let cookies = cookies.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == CSRF_COOKIE).then(|| value.to_string())
        })
    }

    /// Drop whatever credentials this client holds locally.
    /// Cookie sessions are torn down by the server, so only bearer tokens are affected.
    pub fn discard_credentials(&self) {
        if self.mode == TransportMode::Bearer {
            self.tokens.clear();
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn is_state_changing(method: &Method) -> bool {
        !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
    }

    /// Endpoints that establish credentials rather than use them. They never
    /// carry `Authorization` and a 401 from them is never retried.
    fn is_credential_path(&self, path: &str) -> bool {
        path == LOGIN_PATH
            || path == REGISTER_PATH
            || path == CSRF_PATH
            || path == self.mode.refresh_path()
    }

    fn retries_on_unauthorized(&self, path: &str) -> bool {
        self.mode == TransportMode::Bearer && !self.is_credential_path(path)
    }

    fn auth_headers(&self, method: &Method, path: &str) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        match self.mode {
            TransportMode::Cookie => {
                if Self::is_state_changing(method) {
                    let token = self.csrf_token().unwrap_or_default();
                    match header::HeaderValue::from_str(&token) {
                        Ok(value) => {
                            headers.insert(CSRF_HEADER, value);
                        }
                        Err(e) => warn!(error = %e, "CSRF cookie is not a valid header value"),
                    }
                }
            }
            TransportMode::Bearer => {
                if self.is_credential_path(path) {
                    return headers;
                }
                if let Some(token) = self.tokens.access() {
                    match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                        Ok(value) => {
                            headers.insert(header::AUTHORIZATION, value);
                        }
                        Err(e) => warn!(error = %e, "Access token is not a valid header value"),
                    }
                }
            }
        }
        headers
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, &body)
    }

    async fn parse_json<T: DeserializeOwned>(
        response: Response,
        path: &str,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .headers(self.auth_headers(method, path));
        if let Some(body) = body {
            request = request.json(body);
        }
        debug!(%method, path, "Sending request");
        Ok(request.send().await?)
    }

    /// Issue a request and classify the outcome.
    ///
    /// In bearer mode a 401 triggers exactly one refresh-token exchange. If it
    /// succeeds the request is replayed once and that outcome is final. If it
    /// fails the cached tokens are discarded and the original 401 is returned.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let response = self.send(&method, path, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.retries_on_unauthorized(path) {
            let original = Self::error_from(response).await;
            return match self.refresh_access_token().await {
                Ok(()) => {
                    debug!(%method, path, "Access token renewed, retrying request");
                    let retried = self.send(&method, path, body).await?;
                    Self::check_response(retried).await
                }
                Err(e) => {
                    warn!(
                        %method, path, error = %e,
                        "Token refresh failed, discarding cached tokens"
                    );
                    self.tokens.clear();
                    Err(original)
                }
            };
        }

        Self::check_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request::<()>(Method::GET, path, None).await?;
        Self::parse_json(response, path).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Exchange the cached refresh token for a new access token.
    async fn refresh_access_token(&self) -> Result<(), ApiError> {
        let refresh = self
            .tokens
            .refresh()
            .ok_or(ApiError::Unauthorized { message: None })?;

        let path = TransportMode::Bearer.refresh_path();
        let body = RefreshRequest { refresh };
        let response = self.send(&Method::POST, path, Some(&body)).await?;
        let response = Self::check_response(response).await?;
        let pair: TokenPair = Self::parse_json(response, path).await?;

        self.tokens.renew(pair.access, pair.refresh);
        debug!("Access token refreshed");
        Ok(())
    }

    // ===== Session Endpoints =====

    /// Prime the CSRF cookie. Only meaningful for the cookie transport.
    pub async fn fetch_csrf(&self) -> Result<(), ApiError> {
        self.request::<()>(Method::GET, CSRF_PATH, None).await?;
        debug!(has_token = self.csrf_token().is_some(), "CSRF cookie fetched");
        Ok(())
    }

    /// Log in. In bearer mode the returned token pair is cached.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<(), ApiError> {
        let response = self.post(LOGIN_PATH, credentials).await?;
        if self.mode == TransportMode::Bearer {
            let pair: TokenPair = Self::parse_json(response, LOGIN_PATH).await?;
            self.tokens.store(Tokens::new(pair.access, pair.refresh));
        }
        Ok(())
    }

    pub async fn register(&self, details: &RegisterRequest) -> Result<(), ApiError> {
        self.post(REGISTER_PATH, details).await?;
        Ok(())
    }

    /// Ask the server to end the session. Local credentials are left alone;
    /// call `discard_credentials` for that.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let body = LogoutRequest {
            refresh: match self.mode {
                TransportMode::Cookie => None,
                TransportMode::Bearer => self.tokens.refresh(),
            },
        };
        self.post(LOGOUT_PATH, &body).await?;
        Ok(())
    }

    /// Silently renew the session: the refresh cookie in cookie mode, the
    /// cached refresh token in bearer mode.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        match self.mode {
            TransportMode::Cookie => {
                self.post(self.mode.refresh_path(), &serde_json::json!({})).await?;
                Ok(())
            }
            TransportMode::Bearer => self.refresh_access_token().await,
        }
    }

    // ===== To-do Endpoints =====

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.get(TODOS_PATH).await
    }

    pub async fn create_todo(&self, text: &str) -> Result<Todo, ApiError> {
        let response = self.post(TODOS_PATH, &NewTodo { text }).await?;
        Self::parse_json(response, TODOS_PATH).await
    }

    pub async fn toggle_todo(&self, id: i64) -> Result<Todo, ApiError> {
        let path = format!("{}{}/toggle/", TODOS_PATH, id);
        let response = self.request::<()>(Method::PATCH, &path, None).await?;
        Self::parse_json(response, &path).await
    }

    /// Delete every completed item. The backend answers 204, sometimes with a count.
    pub async fn clear_completed(&self) -> Result<(), ApiError> {
        let response = self
            .request::<()>(Method::DELETE, CLEAR_COMPLETED_PATH, None)
            .await?;
        let text = response.text().await?;
        if let Ok(parsed) = serde_json::from_str::<ClearCompletedResponse>(&text) {
            debug!(deleted = ?parsed.deleted, "Cleared completed todos");
        }
        Ok(())
    }
}
