// AdGuard Home HTTP client
//
// Wraps `reqwest::Client` with basic auth, status classification and
// content-type aware decoding. Endpoint groups (filtering, clients, etc.)
// are inherent methods in `crate::endpoints` so this module stays focused
// on transport mechanics.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in errors and logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// A fixed `/control/*` resource path.
///
/// `gated` marks endpoints that only exist from some server version on;
/// a 404/405 from one of them means "unsupported", not "broken".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub path: &'static str,
    pub gated: bool,
}

impl Endpoint {
    /// An endpoint present on every supported server version.
    pub const fn open(path: &'static str) -> Self {
        Self { path, gated: false }
    }

    /// An endpoint whose availability depends on the server version.
    pub const fn gated(path: &'static str) -> Self {
        Self { path, gated: true }
    }
}

/// A successfully received response body.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// A JSON document.
    Json(Value),
    /// No body, or a plain acknowledgement such as `OK`.
    Empty,
}

impl DecodedBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Decode into `T`, treating an empty body or JSON `null` as
    /// `T::default()`.
    pub fn decode<T: DeserializeOwned + Default>(self) -> Result<T, Error> {
        match self {
            Self::Empty | Self::Json(Value::Null) => Ok(T::default()),
            Self::Json(value) => T::deserialize(&value).map_err(|e| {
                let body = value.to_string();
                Error::Deserialization {
                    message: format!("{e} (body preview: {:?})", preview(&body)),
                    body,
                }
            }),
        }
    }
}

/// HTTP basic-auth credentials.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

/// Raw HTTP client for the AdGuard Home control API.
///
/// Stateless with respect to domain data. Credentials sit behind a lock
/// so they can be replaced after an authentication failure without
/// rebuilding the connection pool.
#[derive(Debug)]
pub struct HomeClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    auth: RwLock<Option<BasicAuth>>,
}

impl HomeClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the web interface root (e.g. `http://192.168.1.2:3000`);
    /// a path prefix for reverse-proxied installs is preserved.
    pub fn new(
        base_url: Url,
        auth: Option<BasicAuth>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, auth, transport.timeout))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        auth: Option<BasicAuth>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            timeout,
            auth: RwLock::new(auth),
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Replace the credentials used for subsequent requests.
    pub fn set_auth(&self, auth: Option<BasicAuth>) {
        debug!("replacing credentials");
        *self.auth.write().unwrap_or_else(PoisonError::into_inner) = auth;
    }

    fn current_auth(&self) -> Option<BasicAuth> {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Issue a request and classify the response.
    ///
    /// With `payload == None` no body is attached and no Content-Type is
    /// set: some server versions answer 415 to a bare Content-Type on an
    /// empty POST.
    pub async fn execute(
        &self,
        method: Method,
        endpoint: Endpoint,
        payload: Option<&Value>,
    ) -> Result<DecodedBody, Error> {
        self.send(method, endpoint, &[], payload).await
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        endpoint: Endpoint,
        query: &[(&str, String)],
        payload: Option<&Value>,
    ) -> Result<DecodedBody, Error> {
        let url = self.url(endpoint.path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(auth) = self.current_auth() {
            builder = builder.basic_auth(auth.username, Some(auth.password.expose_secret()));
        }
        if let Some(body) = payload {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        self.classify(endpoint, resp).await
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Map the status line to an error class, then decode by content type.
    async fn classify(
        &self,
        endpoint: Endpoint,
        resp: reqwest::Response,
    ) -> Result<DecodedBody, Error> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                status: status.as_u16(),
            });
        }

        if endpoint.gated
            && (status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED)
        {
            return Err(Error::Unsupported {
                path: endpoint.path,
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !is_json || body.trim().is_empty() {
            trace!(path = endpoint.path, "non-JSON or empty body, treating as acknowledgement");
            return Ok(DecodedBody::Empty);
        }

        serde_json::from_str(&body)
            .map(DecodedBody::Json)
            .map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body,
            })
    }

    // ── Typed helpers ────────────────────────────────────────────────

    /// GET and decode, substituting defaults for empty bodies.
    pub(crate) async fn get<T: DeserializeOwned + Default>(
        &self,
        endpoint: Endpoint,
    ) -> Result<T, Error> {
        self.send(Method::GET, endpoint, &[], None).await?.decode()
    }

    /// GET with query parameters.
    pub(crate) async fn get_with_query<T: DeserializeOwned + Default>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        self.send(Method::GET, endpoint, query, None).await?.decode()
    }

    /// POST a JSON body.
    pub(crate) async fn post(
        &self,
        endpoint: Endpoint,
        body: &(impl Serialize + Sync),
    ) -> Result<DecodedBody, Error> {
        let value = serde_json::to_value(body).map_err(Error::Encode)?;
        self.send(Method::POST, endpoint, &[], Some(&value)).await
    }

    /// POST with no body at all.
    pub(crate) async fn post_empty(&self, endpoint: Endpoint) -> Result<(), Error> {
        self.send(Method::POST, endpoint, &[], None).await?;
        Ok(())
    }

    /// PUT a JSON body.
    pub(crate) async fn put(
        &self,
        endpoint: Endpoint,
        body: &(impl Serialize + Sync),
    ) -> Result<DecodedBody, Error> {
        let value = serde_json::to_value(body).map_err(Error::Encode)?;
        self.send(Method::PUT, endpoint, &[], Some(&value)).await
    }
}

/// First `BODY_PREVIEW_CHARS` characters of a body, on a char boundary.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_empty_yields_default() {
        let v: Vec<String> = DecodedBody::Empty.decode().expect("empty decodes");
        assert!(v.is_empty());
        let v: Vec<String> = DecodedBody::Json(Value::Null).decode().expect("null decodes");
        assert!(v.is_empty());
    }

    #[test]
    fn decode_shape_mismatch_is_deserialization_error() {
        let result: Result<Vec<String>, _> = DecodedBody::Json(json!({"a": 1})).decode();
        assert!(matches!(result, Err(Error::Deserialization { .. })));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }
}
