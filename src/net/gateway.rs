//! Request Gateway: the single path between the client and the REST API.
//!
//! Every call goes through [`Gateway::request`], which attaches the bearer
//! token, executes the HTTP exchange, and maps every possible outcome into
//! one normalized [`ApiResult`]. Response interpretation is kept in pure
//! functions so the status mapping and envelope handling are unit-testable
//! without a browser.
//!
//! The gateway also owns the global session-expiry effect: any `Unauthorized`
//! outcome, from any endpoint, clears the credential store and fires the
//! registered `SessionExpired` callback. The hosting application decides what
//! "expired" means (this app redirects to `/login`).

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::net::error::{ApiError, ApiResult, ErrorKind};
use crate::session::store::CredentialStore;

/// Relative base used when the API is served from the same origin.
pub const DEFAULT_API_BASE: &str = "/api/v1";

/// Longest raw-body snippet kept on a malformed response, in characters.
const BODY_SNIPPET_MAX: usize = 256;

/// HTTP methods the API uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Whether a request carries the stored access token.
///
/// Login, register, and refresh run before (or without) a valid token and
/// must not send a stale one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Auth {
    Bearer,
    Anonymous,
}

/// Outgoing request, already resolved to a full URL and bearer token.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Raw HTTP response before interpretation.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

/// Transport seam under the gateway.
///
/// `Err` means no usable response arrived at all (offline, DNS, CORS); the
/// string is a human-readable detail for logs. Everything that did produce a
/// response, whatever the status, comes back as `Ok`.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, String>;
}

/// Browser transport backed by `gloo-net` / `fetch`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[cfg(feature = "hydrate")]
impl HttpTransport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, String> {
        use gloo_net::http::{Method as GlooMethod, RequestBuilder};

        let method = match request.method {
            Method::Get => GlooMethod::GET,
            Method::Post => GlooMethod::POST,
            Method::Put => GlooMethod::PUT,
            Method::Delete => GlooMethod::DELETE,
        };

        let mut builder = RequestBuilder::new(&request.url).method(method);
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }

        let built = match &request.body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(body.to_string()),
            None => builder.build(),
        }
        .map_err(|e| e.to_string())?;

        let response = built.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let status_text = response.status_text();
        let body = response.text().await.unwrap_or_default();

        Ok(RawResponse { status, status_text, body })
    }
}

/// SSR stub — these endpoints are only meaningful in the browser.
#[cfg(not(feature = "hydrate"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerTransport;

#[cfg(not(feature = "hydrate"))]
impl HttpTransport for ServerTransport {
    async fn send(&self, _request: HttpRequest) -> Result<RawResponse, String> {
        Err("not available on server".to_owned())
    }
}

/// Transport the running binary actually uses.
#[cfg(feature = "hydrate")]
pub type PlatformTransport = BrowserTransport;
#[cfg(not(feature = "hydrate"))]
pub type PlatformTransport = ServerTransport;

/// The API gateway. Shared via `Rc` between the session manager and the app.
pub struct Gateway<T: HttpTransport> {
    base_url: String,
    transport: T,
    store: Rc<dyn CredentialStore>,
    on_session_expired: RefCell<Option<Rc<dyn Fn()>>>,
}

impl Gateway<PlatformTransport> {
    /// Gateway against the same-origin API under [`DEFAULT_API_BASE`].
    pub fn same_origin(store: Rc<dyn CredentialStore>) -> Self {
        Self::new(DEFAULT_API_BASE, PlatformTransport::default(), store)
    }
}

impl<T: HttpTransport> Gateway<T> {
    pub fn new(base_url: impl Into<String>, transport: T, store: Rc<dyn CredentialStore>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            store,
            on_session_expired: RefCell::new(None),
        }
    }

    /// Register the host application's reaction to a dead session.
    ///
    /// The handler must tolerate repeat invocation: two in-flight requests can
    /// both hit 401 and both run the expiry procedure.
    pub fn set_session_expired_handler(&self, handler: impl Fn() + 'static) {
        *self.on_session_expired.borrow_mut() = Some(Rc::new(handler));
    }

    /// Clear persisted credentials and notify the host. Idempotent.
    pub fn expire_session(&self) {
        self.store.clear();
        let handler = self.on_session_expired.borrow().clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    /// Execute one API call and normalize its outcome.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        auth: Auth,
    ) -> ApiResult<serde_json::Value> {
        let request_id = uuid::Uuid::new_v4().simple().to_string();
        let bearer = match auth {
            Auth::Bearer => self.store.get().access_token,
            Auth::Anonymous => None,
        };
        let url = format!("{}{}", self.base_url, path);

        let outcome = self
            .transport
            .send(HttpRequest { method, url, bearer, body })
            .await;

        let result = match outcome {
            Ok(raw) => interpret_response(raw.status, &raw.status_text, &raw.body),
            Err(detail) => Err(ApiError::network(detail)),
        };

        match &result {
            Ok(_) => {
                leptos::logging::log!("[{request_id}] {} {path} ok", method.as_str());
            }
            Err(err) => {
                leptos::logging::warn!(
                    "[{request_id}] {} {path} failed: {err}",
                    method.as_str()
                );
                if err.kind == ErrorKind::Unauthorized {
                    self.expire_session();
                }
            }
        }

        result
    }

    /// [`Gateway::request`] plus a typed decode of the success value.
    pub async fn request_as<R: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        auth: Auth,
    ) -> ApiResult<R> {
        let value = self.request(method, path, body, auth).await?;
        serde_json::from_value(value).map_err(|e| ApiError::malformed(e.to_string()))
    }
}

// =============================================================
// Response interpretation (pure)
// =============================================================

/// The two body shapes the upstream API produces.
///
/// Some endpoints wrap their payload in `{success, data}` /
/// `{success, error}`, others return the payload flat. Classification is an
/// explicit tagged step so a new shape fails loudly instead of leaking
/// malformed data through.
#[derive(Clone, Debug, PartialEq)]
enum ResponseShape {
    Enveloped {
        success: bool,
        data: serde_json::Value,
        error: Option<EnvelopeError>,
    },
    Flat(serde_json::Value),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

impl ResponseShape {
    /// An object with a boolean `success` key is the envelope; anything else
    /// is a flat payload.
    fn classify(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(mut obj)
                if obj.get("success").map_or(false, serde_json::Value::is_boolean) =>
            {
                let success = obj
                    .get("success")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                let data = obj.remove("data").unwrap_or(serde_json::Value::Null);
                let error = obj
                    .remove("error")
                    .and_then(|v| serde_json::from_value(v).ok());
                Self::Enveloped { success, data, error }
            }
            other => Self::Flat(other),
        }
    }

    /// Server-provided message, if the body carried one.
    ///
    /// Flat bodies prefer `message` over `error`, matching what the API
    /// actually emits.
    fn error_message(&self) -> Option<String> {
        match self {
            Self::Enveloped { error, .. } => error.as_ref().and_then(|e| e.message.clone()),
            Self::Flat(value) => value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .or_else(|| value.get("error").and_then(serde_json::Value::as_str))
                .map(ToOwned::to_owned),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Enveloped { error, .. } => error.as_ref().and_then(|e| {
                e.details
                    .clone()
                    .or_else(|| e.code.clone().map(serde_json::Value::String))
            }),
            Self::Flat(value) => value.get("errors").or(value.get("error")).cloned(),
        }
    }
}

/// Map one raw HTTP response into the normalized result.
fn interpret_response(status: u16, status_text: &str, body: &str) -> ApiResult<serde_json::Value> {
    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        // A bodiless success (204-style) decodes as null, not malformed.
        Err(_) if status < 300 && body.trim().is_empty() => serde_json::Value::Null,
        Err(e) => {
            return Err(ApiError::malformed(format!("unparseable response body: {e}"))
                .with_details(serde_json::json!({ "status": status, "body": body_snippet(body) })));
        }
    };

    let shape = ResponseShape::classify(parsed);

    if status >= 300 {
        let kind = ErrorKind::from_status(status);
        let message = shape.error_message().unwrap_or_else(|| {
            if status_text.trim().is_empty() {
                kind.user_message().to_owned()
            } else {
                status_text.to_owned()
            }
        });
        let mut err = ApiError::new(kind, message);
        if let Some(details) = shape.error_details() {
            err = err.with_details(details);
        }
        return Err(err);
    }

    match shape {
        ResponseShape::Flat(value) => Ok(value),
        ResponseShape::Enveloped { success: true, data, .. } => Ok(data),
        ResponseShape::Enveloped { success: false, error, .. } => {
            let message = error
                .as_ref()
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| ErrorKind::Unknown.user_message().to_owned());
            let details = error.and_then(|e| e.details);
            Err(ApiError { kind: ErrorKind::Unknown, message, details })
        }
    }
}

/// Truncated raw body kept for diagnostics on malformed responses.
fn body_snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_SNIPPET_MAX {
        trimmed.to_owned()
    } else {
        let mut snippet: String = trimmed.chars().take(BODY_SNIPPET_MAX).collect();
        snippet.push('…');
        snippet
    }
}
