//! Platform API data source over blocking HTTP.
//!
//! ```text
//! GET {base}/blueprints/{uuid}         by id
//! GET {base}/blueprints?name={name}    by name (object or array answer)
//! ```

use std::time::Duration;

use reqwest::{StatusCode, blocking::Client};
use tracing::{debug, instrument};

use infraplate_core::{
    application::{FetchError, ports::DataSource},
    domain::{Identifier, SourceKind, Value},
    error::{InfraplateError, InfraplateResult},
};

/// Longest server body quoted in an error.
const BODY_EXCERPT_CHARS: usize = 200;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches blueprints and stacks from the platform API with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpDataSource {
    /// Build a client. Requests time out after `timeout` and are never retried.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> InfraplateResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("infraplate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InfraplateError::Configuration {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            client,
        })
    }

    fn request(&self, kind: SourceKind, identifier: &Identifier) -> reqwest::blocking::RequestBuilder {
        let collection = format!("{}/{}", self.base_url, kind.collection());
        let builder = match identifier {
            Identifier::Uuid(id) => self.client.get(format!("{collection}/{id}")),
            Identifier::Name(name) => self.client.get(collection).query(&[("name", name)]),
        };
        builder
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

impl DataSource for HttpDataSource {
    #[instrument(skip(self), fields(kind = %kind, identifier = %identifier))]
    fn fetch(&self, kind: SourceKind, identifier: &Identifier) -> Result<Value, FetchError> {
        let response = self
            .request(kind, identifier)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = status.as_u16(), "API responded");
        let body = response.text().map_err(transport_error)?;

        match status {
            s if s.is_success() => {
                let value: Value =
                    serde_json::from_str(&body).map_err(|e| FetchError::ServerError {
                        status: Some(s.as_u16()),
                        message: format!("invalid JSON in response: {e}"),
                    })?;
                unwrap_listing(value, kind, identifier)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Unauthorized {
                message: format!("the API rejected the key ({})", status.as_u16()),
            }),
            StatusCode::NOT_FOUND => Err(not_found(kind, identifier)),
            s => Err(FetchError::ServerError {
                status: Some(s.as_u16()),
                message: excerpt(&body),
            }),
        }
    }
}

/// A name query may answer with a list; the first match wins.
fn unwrap_listing(value: Value, kind: SourceKind, identifier: &Identifier) -> Result<Value, FetchError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| not_found(kind, identifier)),
        other => Ok(other),
    }
}

fn not_found(kind: SourceKind, identifier: &Identifier) -> FetchError {
    FetchError::NotFound {
        kind,
        identifier: identifier.to_string(),
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("could not connect: {e}")
    } else {
        e.to_string()
    };
    FetchError::NetworkError { message }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "empty response body".into();
    }
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        return body.to_owned();
    }
    let head: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    format!("{head}...")
}
