pub mod context;
pub mod endpoint;
pub mod error;
pub mod resources;
pub mod upload;

pub use context::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, ErrorKind, Result};
pub use resources::TaskFilter;
pub use upload::Upload;

use endpoint::{Endpoint, Input};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

/// Longest slice of an error body kept in error messages.
const BODY_EXCERPT: usize = 512;

/// Request payload handed to [`ApiClient::execute`].
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Upload),
}

/// Asana API client. Holds no per-call state, so clones can be used from
/// several tasks at once.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for this client");
        }

        let client = Client::builder()
            .user_agent(format!("asana-cli/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .danger_accept_invalid_hostnames(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `segments` below the API root with the non-empty
    /// query pairs appended in order. Each segment is percent-encoded on its
    /// own, so `/`, `?` and `#` inside an id never leave that segment.
    pub fn url_for(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        url.set_query(endpoint::query_string(query).as_deref());
        Ok(url)
    }

    /// Resolve an endpoint descriptor into a request and execute it.
    pub async fn dispatch(
        &self,
        endpoint: &Endpoint,
        id: Option<&str>,
        query: &[(&str, &str)],
        input: Input,
    ) -> Result<Value> {
        let segments = endpoint.path_segments(id)?;
        let url = self.url_for(&segments, query)?;
        let body = endpoint.build_body(input)?;
        self.execute(endpoint.verb.method(), url, body).await
    }

    /// Perform exactly one authenticated round-trip. Nothing is retried.
    pub async fn execute(&self, method: Method, url: Url, body: RequestBody) -> Result<Value> {
        debug!(method = %method, url = %url, "Sending request");

        let mut req = self
            .client
            .request(method, url.clone())
            .basic_auth(&self.config.api_key, None::<&str>);

        req = match body {
            RequestBody::Empty => {
                req.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            RequestBody::Json(value) => req.json(&value),
            RequestBody::Multipart(upload) => req.multipart(upload.into_form()?),
        };

        let response = req.send().await.map_err(|err| {
            if err.is_timeout() {
                ApiError::Timeout {
                    url: url.to_string(),
                }
            } else {
                ApiError::RequestFailed(err)
            }
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %url, "Received response");

        if !status.is_success() {
            return Err(status_error(status, &url, response).await);
        }

        let text = response.text().await.map_err(|err| {
            if err.is_timeout() {
                ApiError::Timeout {
                    url: url.to_string(),
                }
            } else {
                ApiError::RequestFailed(err)
            }
        })?;
        decode_body(status, &text)
    }
}

async fn status_error(status: StatusCode, url: &Url, response: Response) -> ApiError {
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);
    let message = response
        .text()
        .await
        .map(|body| excerpt(&body))
        .unwrap_or_default();
    let message = if message.is_empty() {
        status.to_string()
    } else {
        message
    };

    match status {
        StatusCode::BAD_REQUEST => ApiError::BadRequest { message },
        StatusCode::UNAUTHORIZED => ApiError::AuthenticationFailed { message },
        StatusCode::FORBIDDEN => ApiError::Forbidden { message },
        StatusCode::NOT_FOUND => ApiError::NotFound {
            resource: url.path().to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { retry_after },
        status if status.is_server_error() => ApiError::ServerError {
            status: status.as_u16(),
            message,
        },
        status => ApiError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        },
    }
}

/// An empty success body is a valid `null`; anything else must be JSON.
fn decode_body(status: StatusCode, text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(text).map_err(|e| {
        error!("Failed to parse JSON response: {}", e);
        ApiError::Decode {
            status: status.as_u16(),
            body: excerpt(text),
        }
    })
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
