//! HTTP gateway to the Recipe Box API
//!
//! Every call resolves to an [`ApiResponse`]; transport failures, error
//! statuses and undecodable bodies all become an unsuccessful response with
//! a message fit for the user. State-changing calls first fetch a fresh CSRF
//! cookie and echo it in the `X-XSRF-TOKEN` header.

use std::sync::Arc;

use reqwest::{
    Method, StatusCode, Url,
    cookie::{CookieStore, Jar},
    header::AUTHORIZATION,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::models::FieldErrors;
use crate::session::SessionContext;

/// Cookie the server issues the CSRF token in
pub const CSRF_COOKIE: &str = "XSRF-TOKEN";
/// Header the CSRF token is echoed in
pub const CSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Uniform result of an API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// HTTP status, absent when the request never got an answer
    pub status: Option<u16>,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub errors: FieldErrors,
}

impl<T> ApiResponse<T> {
    fn ok(status: u16, data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            status: Some(status),
            data: Some(data),
            message,
            error: None,
            errors: FieldErrors::new(),
        }
    }

    fn failed(status: Option<u16>, error: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            success: false,
            status,
            data: None,
            message: None,
            error: Some(error.into()),
            errors,
        }
    }

    /// First validation message, falling back to the general error
    pub fn first_error(&self) -> Option<&str> {
        self.errors
            .values()
            .flat_map(|messages| messages.first())
            .map(String::as_str)
            .next()
            .or(self.error.as_deref())
    }
}

fn default_error(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "Please log in to continue.".to_string(),
        StatusCode::NOT_FOUND => "The requested resource was not found.".to_string(),
        StatusCode::UNPROCESSABLE_ENTITY => "The given data was invalid.".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "Too many attempts. Please try again later.".to_string(),
        s if s.as_u16() == 419 => "Your session has expired. Please try again.".to_string(),
        s if s.is_server_error() => "Something went wrong. Please try again later.".to_string(),
        s => format!("Request failed with status {}", s.as_u16()),
    }
}

fn text_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Normalise a status and JSON body into an `ApiResponse`
pub(crate) fn normalize<T: DeserializeOwned>(status: StatusCode, body: Value) -> ApiResponse<T> {
    if status.is_success() {
        let message = text_field(&body, "message");
        return match serde_json::from_value::<T>(body) {
            Ok(data) => ApiResponse::ok(status.as_u16(), data, message),
            Err(e) => {
                warn!("Unexpected response body: {}", e);
                ApiResponse::failed(
                    Some(status.as_u16()),
                    "Unexpected response from server.",
                    FieldErrors::new(),
                )
            }
        };
    }

    let errors = body
        .get("errors")
        .cloned()
        .and_then(|errors| serde_json::from_value::<FieldErrors>(errors).ok())
        .unwrap_or_default();
    let error = text_field(&body, "error")
        .or_else(|| text_field(&body, "message"))
        .unwrap_or_else(|| default_error(status));

    ApiResponse::failed(Some(status.as_u16()), error, errors)
}

/// Cookie value from a `Cookie` header line
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Client for the Recipe Box API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    cookies: Arc<Jar>,
    base_url: Url,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionContext) -> ClientResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .build()?;

        Ok(Self {
            http,
            cookies,
            base_url,
            session,
        })
    }

    /// Session the client authenticates with
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResponse<T> {
        self.send(Method::GET, path, query, None::<&()>).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResponse<T> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResponse<T> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResponse<T> {
        self.send(Method::DELETE, path, &[], Some(body)).await
    }

    /// Fetch a fresh CSRF cookie and return its value
    async fn csrf_token(&self) -> Result<String, reqwest::Error> {
        self.http
            .get(self.url("/csrf-cookie"))
            .send()
            .await?
            .error_for_status()?;

        let token = self
            .cookies
            .cookies(&self.base_url)
            .and_then(|header| header.to_str().ok().map(str::to_string))
            .and_then(|header| cookie_value(&header, CSRF_COOKIE))
            .unwrap_or_default();
        Ok(token)
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResponse<T> {
        let mut request = self.http.request(method.clone(), self.url(path));

        if matches!(method, Method::POST | Method::PUT | Method::DELETE) {
            match self.csrf_token().await {
                Ok(token) => request = request.header(CSRF_HEADER, token),
                Err(e) => {
                    warn!("Failed to obtain CSRF cookie: {}", e);
                    return ApiResponse::failed(
                        e.status().map(|s| s.as_u16()),
                        "Unable to reach the server. Please try again.",
                        FieldErrors::new(),
                    );
                }
            }
        }

        if let Some(token) = self.session.token() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("{} {}", method, path);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {}", path, e);
                return ApiResponse::failed(
                    None,
                    "Unable to reach the server. Please try again.",
                    FieldErrors::new(),
                );
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read response from {}: {}", path, e);
                return ApiResponse::failed(Some(status.as_u16()), default_error(status), FieldErrors::new());
            }
        };
        let body = if bytes.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        normalize(status, body)
    }
}
