//! Dashboard API client.
//!
//! [`ApiClient`] owns request shaping (URL, headers, body) and response
//! normalization. The wire itself is an [`ApiTransport`], so the same client
//! runs over `reqwest` natively and over `fetch` in the browser.

use std::fmt;
use std::num::FpCategory;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::models::{
    AdminDashboard, DashboardSummary, EmployeeDashboard, HealthStatus, ManagerDashboard, NewUser,
    TokenResponse, UserRecord,
};
use crate::session::{SessionContext, SessionStore, SessionStoreError};
use crate::token::Role;

pub const FALLBACK_ERROR_MESSAGE: &str = "API request failed";

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported http method: {other}")),
        }
    }
}

/// A fully shaped request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ApiTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Transport { message: String },
    /// Non-2xx response; `message` is what the backend reported.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("response body could not be decoded (status {status}): {message}")]
    Decode { status: u16, message: String },
    #[error("request body could not be serialized: {message}")]
    Serialize { message: String },
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Serialize { .. } | Self::Session(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        Self::Transport {
            message: error.message,
        }
    }
}

/// Message for a failed response body: `detail` (string, or validation
/// entries joined on their `msg`), then `message`, then the fallback.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number
            .as_f64()
            .is_some_and(|number| number.classify() == FpCategory::Zero),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub fn extract_error_message(body: &str) -> String {
    let Ok(Value::Object(payload)) = serde_json::from_str::<Value>(body) else {
        return FALLBACK_ERROR_MESSAGE.to_string();
    };

    match payload.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        Some(Value::Array(entries)) => {
            let joined = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .filter(|msg| !msg.is_empty())
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return joined;
            }
        }
        _ => {}
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map_or_else(|| FALLBACK_ERROR_MESSAGE.to_string(), str::to_string)
}

/// Turns a raw response into JSON or an [`ApiError`]. Empty success bodies
/// read as `null`.
pub fn decode_json_response(response: ApiResponse) -> Result<Value, ApiError> {
    let ApiResponse { status, body } = response;
    if !(200..=299).contains(&status) {
        return Err(ApiError::Api {
            status,
            message: extract_error_message(&body),
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|error| ApiError::Decode {
        status,
        message: error.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct ApiClient<T, S> {
    config: ClientConfig,
    transport: T,
    session: SessionContext<S>,
}

impl<T: ApiTransport, S: SessionStore> ApiClient<T, S> {
    pub fn new(config: ClientConfig, transport: T, session: SessionContext<S>) -> Self {
        Self {
            config,
            transport,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext<S> {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `endpoint` is appended verbatim; callers pass a leading slash.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.api_base_url)
    }

    /// Shapes a JSON request. Falsy bodies (`null`, `false`, `0`, `""`) are
    /// treated as no body, so nothing is sent for them.
    pub fn build_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> Result<ApiRequest, ApiError> {
        let body = match body {
            None => None,
            Some(value) if is_falsy(value) => None,
            Some(value) => Some(serde_json::to_string(value).map_err(|error| {
                ApiError::Serialize {
                    message: error.to_string(),
                }
            })?),
        };

        let mut headers = vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())];
        if let Some(value) = self
            .config
            .bearer_header_value(self.session.token().as_deref())
        {
            headers.push(("Authorization".to_string(), value));
        }

        Ok(ApiRequest {
            method,
            url: self.endpoint_url(endpoint),
            headers,
            body,
        })
    }

    /// Sends one request and resolves with the parsed JSON response.
    pub async fn request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let outcome = match self.build_request(endpoint, method, body) {
            Ok(request) => self.dispatch(request).await.map(|(_, value)| value),
            Err(error) => Err(error),
        };
        outcome.inspect_err(|error| log_failure(endpoint, method, error))
    }

    /// Like [`ApiClient::request`], with a typed body and a typed response.
    pub async fn request_json<R, B>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&B>,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let outcome = self.request_json_inner(endpoint, method, body).await;
        outcome.inspect_err(|error| log_failure(endpoint, method, error))
    }

    pub async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        self.request_json::<R, Value>(endpoint, HttpMethod::Get, None)
            .await
    }

    pub async fn post<R, B>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(endpoint, HttpMethod::Post, Some(body))
            .await
    }

    pub async fn put<R, B>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(endpoint, HttpMethod::Put, Some(body))
            .await
    }

    /// Deletes return `null` for empty `204` responses.
    pub async fn delete(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Delete, None).await
    }

    /// Password login. The credentials go out as a form body and the issued
    /// token replaces whatever the session held.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let endpoint = "/auth/login";
        let outcome = self.login_inner(endpoint, username, password).await;
        outcome.inspect_err(|error| log_failure(endpoint, HttpMethod::Post, error))
    }

    pub async fn register(&self, user: &NewUser) -> Result<UserRecord, ApiError> {
        self.post("/auth/register", user).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get("/auth/health").await
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ApiError> {
        self.get("/users/dashboard/admin").await
    }

    pub async fn manager_dashboard(&self) -> Result<ManagerDashboard, ApiError> {
        self.get("/users/dashboard/manager").await
    }

    pub async fn employee_dashboard(&self) -> Result<EmployeeDashboard, ApiError> {
        self.get("/users/dashboard/employee").await
    }

    pub async fn dashboard_for(&self, role: Role) -> Result<DashboardSummary, ApiError> {
        Ok(match role {
            Role::Admin => DashboardSummary::Admin(self.admin_dashboard().await?),
            Role::Manager => DashboardSummary::Manager(self.manager_dashboard().await?),
            Role::Employee => DashboardSummary::Employee(self.employee_dashboard().await?),
        })
    }

    async fn request_json_inner<R, B>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&B>,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|error| ApiError::Serialize {
                message: error.to_string(),
            })?;
        let request = self.build_request(endpoint, method, body.as_ref())?;
        let (status, value) = self.dispatch(request).await?;
        serde_json::from_value(value).map_err(|error| ApiError::Decode {
            status,
            message: error.to_string(),
        })
    }

    async fn login_inner(
        &self,
        endpoint: &str,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", username)
            .append_pair("password", password)
            .finish();
        let request = ApiRequest {
            method: HttpMethod::Post,
            url: self.endpoint_url(endpoint),
            headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: Some(form),
        };

        let (status, value) = self.dispatch(request).await?;
        let issued: TokenResponse =
            serde_json::from_value(value).map_err(|error| ApiError::Decode {
                status,
                message: error.to_string(),
            })?;
        self.session.set_token(&issued.access_token)?;
        debug!("stored session token from login");
        Ok(issued)
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<(u16, Value), ApiError> {
        let response = self.transport.send(request).await?;
        let status = response.status;
        decode_json_response(response).map(|value| (status, value))
    }
}

fn log_failure(endpoint: &str, method: HttpMethod, failure: &ApiError) {
    error!(
        endpoint,
        method = method.as_str(),
        status = failure.status(),
        error = %failure,
        "API request failed"
    );
}
