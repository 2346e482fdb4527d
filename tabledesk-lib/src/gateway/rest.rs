//! HTTP gateway for PostgREST-style endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use url::Url;

use super::Gateway;
use super::TableName;
use crate::error::GatewayError;
use crate::model::Patch;
use crate::model::Row;
use crate::model::RowId;

/// Path under the base URL where tables are exposed.
const REST_PATH: [&str; 2] = ["rest", "v1"];

/// Gateway that talks to a PostgREST-compatible HTTP API.
///
/// - `select` → `GET /rest/v1/{table}?select={projection}`
/// - `update` → `PATCH /rest/v1/{table}?id=eq.{id}` with
///   `Prefer: return=representation`
/// - `delete` → `DELETE /rest/v1/{table}?id=eq.{id}`
///
/// This gateway is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use tabledesk_lib::gateway::RestGateway;
///
/// let gateway = RestGateway::builder()
///     .url("https://project.example.co")
///     .api_key("anon-key")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct RestGateway {
    inner: Arc<RestGatewayInner>,
}

struct RestGatewayInner {
    base_url: Url,
    headers: HeaderMap,
    http_client: Client,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

/// Error body PostgREST sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    code: Option<String>,
    details: Option<String>,
}

impl RestGateway {
    /// Creates a new builder for constructing a gateway.
    pub fn builder() -> RestGatewayBuilder<Missing, Missing> {
        RestGatewayBuilder::new()
    }

    fn table_url(&self, table: &TableName) -> Result<Url, GatewayError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(REST_PATH)
            .push(table.as_str());
        Ok(url)
    }

    fn row_url(&self, table: &TableName, id: &RowId) -> Result<Url, GatewayError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        Ok(url)
    }

    /// Sends one request. Non-2xx responses become [`GatewayError::Http`].
    async fn send(
        &self,
        method: Method,
        url: Url,
        prefer: Option<&'static str>,
        body: Option<String>,
    ) -> Result<reqwest::Response, GatewayError> {
        log::debug!("{} {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .headers(self.inner.headers.clone());

        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorBody>(&body) {
            Ok(error) => GatewayError::Http {
                status: status.as_u16(),
                message: match error.details {
                    Some(details) => format!("{} ({})", error.message, details),
                    None => error.message,
                },
                code: error.code,
            },
            Err(_) => GatewayError::http(status.as_u16(), body),
        })
    }

    fn map_send_error(&self, error: reqwest::Error) -> GatewayError {
        match self.inner.timeout {
            Some(timeout) if error.is_timeout() => GatewayError::Timeout(timeout),
            _ => GatewayError::Network(error),
        }
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Row>, GatewayError> {
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&body).map_err(|e| GatewayError::parse_with_body(e.to_string(), body))
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn select(&self, table: &TableName, projection: &str) -> Result<Vec<Row>, GatewayError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", projection);

        let response = self.send(Method::GET, url, None, None).await?;
        Self::read_rows(response).await
    }

    async fn update(
        &self,
        table: &TableName,
        id: &RowId,
        patch: &Patch,
    ) -> Result<Option<Row>, GatewayError> {
        let url = self.row_url(table, id)?;
        let body = serde_json::to_string(patch).map_err(|e| GatewayError::parse(e.to_string()))?;

        let response = self
            .send(Method::PATCH, url, Some("return=representation"), Some(body))
            .await?;

        // 204 means the store accepted the patch without echoing it.
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let mut rows = Self::read_rows(response).await?;
        if rows.is_empty() {
            // PostgREST answers an update that matched nothing with `[]`.
            return Err(GatewayError::not_found(table.as_str(), id));
        }
        Ok(Some(rows.swap_remove(0)))
    }

    async fn delete(&self, table: &TableName, id: &RowId) -> Result<(), GatewayError> {
        let url = self.row_url(table, id)?;
        self.send(Method::DELETE, url, None, None).await?;
        Ok(())
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`RestGateway`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The project base URL
/// - `api_key` - The API key sent in the `apikey` header
pub struct RestGatewayBuilder<U, K> {
    url: U,
    api_key: K,
    access_token: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl RestGatewayBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            api_key: Missing,
            access_token: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for RestGatewayBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RestGatewayBuilder<Missing, K> {
    /// Sets the project base URL.
    pub fn url(self, url: impl Into<String>) -> RestGatewayBuilder<Set<String>, K> {
        RestGatewayBuilder {
            url: Set(url.into()),
            api_key: self.api_key,
            access_token: self.access_token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U> RestGatewayBuilder<U, Missing> {
    /// Sets the API key.
    pub fn api_key(self, key: impl Into<String>) -> RestGatewayBuilder<U, Set<String>> {
        RestGatewayBuilder {
            url: self.url,
            api_key: Set(key.into()),
            access_token: self.access_token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U, K> RestGatewayBuilder<U, K> {
    /// Sets a signed-in user's access token.
    ///
    /// Defaults to the API key, which acts as the anonymous role.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl RestGatewayBuilder<Set<String>, Set<String>> {
    /// Builds the [`RestGateway`].
    ///
    /// Fails if the URL does not parse or a credential is not a valid header value.
    pub fn build(self) -> Result<RestGateway, GatewayError> {
        let base_url =
            Url::parse(&self.url.0).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", self.url.0, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(self.url.0));
        }

        let api_key = self.api_key.0;
        let token = self.access_token.unwrap_or_else(|| api_key.clone());

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&api_key).map_err(|_| GatewayError::InvalidHeader("apikey"))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| GatewayError::InvalidHeader("Authorization"))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(RestGateway {
            inner: Arc::new(RestGatewayInner {
                base_url,
                headers,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(url: &str) -> RestGateway {
        RestGateway::builder().url(url).api_key("key").build().unwrap()
    }

    #[test]
    fn test_table_url() {
        let events = TableName::new("communityEvents").unwrap();
        let url = gateway("https://db.example.com").table_url(&events).unwrap();
        assert_eq!(url.as_str(), "https://db.example.com/rest/v1/communityEvents");

        let url = gateway("https://db.example.com/base/").table_url(&events).unwrap();
        assert_eq!(url.as_str(), "https://db.example.com/base/rest/v1/communityEvents");
    }

    #[test]
    fn test_row_url() {
        let events = TableName::new("communityEvents").unwrap();
        let url = gateway("https://db.example.com")
            .row_url(&events, &RowId::Int(7))
            .unwrap();
        assert_eq!(url.query(), Some("id=eq.7"));
    }

    #[test]
    fn test_build_rejects_bad_input() {
        let bad_url = RestGateway::builder().url("not a url").api_key("key").build();
        assert!(matches!(bad_url, Err(GatewayError::InvalidUrl(_))));

        let bad_key = RestGateway::builder()
            .url("https://db.example.com")
            .api_key("line\nbreak")
            .build();
        assert!(matches!(bad_key, Err(GatewayError::InvalidHeader("apikey"))));
    }
}
