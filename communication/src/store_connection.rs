use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use thiserror::Error;

use crate::line_protocol::encode_batch;
use crate::point::{has_line_break, Point, Precision, Tags};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("invalid store url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not build http client")]
    Client(#[source] reqwest::Error),

    #[error("request to the store failed")]
    Request(#[from] reqwest::Error),

    #[error("default tag {key:?} cannot be written as line protocol")]
    InvalidDefaultTag { key: String },

    #[error("store answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// How to reach the remote store and how to shape writes for it.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    pub precision: Precision,
    pub retention_policy: Option<String>,
    /// Merged into every written point; a point's own tag wins.
    pub default_tags: Tags,
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            user_agent: format!("batchwriter/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(10),
            precision: Precision::default(),
            retention_policy: None,
            default_tags: Tags::new(),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn with_retention_policy(mut self, retention_policy: impl Into<String>) -> Self {
        self.retention_policy = Some(retention_policy.into());
        self
    }

    #[must_use]
    pub fn with_default_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_tags.insert(key.into(), value.into());
        self
    }
}

/// An http connection to the store. Cheap to share: the inner client pools
/// its connections.
#[derive(Debug, Clone)]
pub struct StoreConnection {
    client: Client,
    base: Url,
    config: ConnectionConfig,
}

impl StoreConnection {
    pub fn new(config: ConnectionConfig) -> Result<StoreConnection, ConnectionError> {
        let base = Url::parse(&config.url).map_err(|e| ConnectionError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConnectionError::InvalidUrl {
                url: config.url.clone(),
                reason: "url cannot be a base".to_string(),
            });
        }

        if let Some((key, _)) = config
            .default_tags
            .iter()
            .find(|(key, value)| key.is_empty() || has_line_break(key) || has_line_break(value))
        {
            return Err(ConnectionError::InvalidDefaultTag { key: key.clone() });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ConnectionError::Client)?;

        log::debug!("store connection for {}", base);
        Ok(StoreConnection {
            client,
            base,
            config,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub async fn ping(&self) -> Result<(), ConnectionError> {
        let request = self.client.get(self.endpoint("ping"));
        self.execute(request).await
    }

    /// `CREATE DATABASE` is idempotent on the store side, so this is safe to
    /// call on every startup.
    pub async fn create_database(&self, database: &str) -> Result<(), ConnectionError> {
        log::info!("ensuring database {database} exists");
        let statement = format!("CREATE DATABASE \"{}\"", database.replace('"', "\\\""));
        let request = self
            .client
            .post(self.endpoint("query"))
            .form(&[("q", statement)]);
        self.execute(request).await
    }

    pub async fn write(&self, batch: &[Point], database: &str) -> Result<(), ConnectionError> {
        let body = encode_batch(batch, self.config.precision, &self.config.default_tags);

        let mut query = vec![
            ("db", database.to_string()),
            ("precision", self.config.precision.to_string()),
        ];
        if let Some(retention_policy) = &self.config.retention_policy {
            query.push(("rp", retention_policy.clone()));
        }

        let request = self
            .client
            .post(self.endpoint("write"))
            .query(&query)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body);
        self.execute(request).await
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), ConnectionError> {
        let request = match &self.config.username {
            Some(username) => request.basic_auth(username, self.config.password.as_ref()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ConnectionError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_onto_base_path() {
        let connection =
            StoreConnection::new(ConnectionConfig::new("http://localhost:8086/proxy/")).unwrap();
        assert_eq!(
            connection.endpoint("write").as_str(),
            "http://localhost:8086/proxy/write"
        );

        let connection =
            StoreConnection::new(ConnectionConfig::new("http://localhost:8086")).unwrap();
        assert_eq!(connection.endpoint("ping").as_str(), "http://localhost:8086/ping");
    }

    #[test]
    fn rejects_default_tag_with_line_break() {
        let config = ConnectionConfig::new("http://localhost:8086").with_default_tag("region", "eu\nx=1");
        assert!(matches!(
            StoreConnection::new(config),
            Err(ConnectionError::InvalidDefaultTag { key }) if key == "region"
        ));
    }

    #[test]
    fn rejects_unparseable_url() {
        let result = StoreConnection::new(ConnectionConfig::new("not a url"));
        assert!(matches!(result, Err(ConnectionError::InvalidUrl { .. })));
    }

    #[test]
    fn config_builder() {
        let config = ConnectionConfig::new("http://localhost:8086")
            .with_credentials("writer", "secret")
            .with_precision(Precision::Seconds)
            .with_retention_policy("autogen")
            .with_default_tag("dc", "x1");
        assert_eq!(config.username.as_deref(), Some("writer"));
        assert_eq!(config.precision, Precision::Seconds);
        assert_eq!(config.retention_policy.as_deref(), Some("autogen"));
        assert_eq!(config.default_tags["dc"], "x1");
    }
}
