use std::sync::Arc;

use serde_json::Value;

use crate::commands::RequestSpec;
use crate::config::ConnectionConfig;
use crate::envelope;
use crate::error::RadError;
use crate::transport::Transport;

/// Remote method that answers `true` when the server and the IDE expert are up.
pub const DEFAULT_CHECK_CONNECTION_METHOD: &str = "CheckConnection";

#[derive(Clone, Debug)]
pub struct RadClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    transport: Transport,
    config: ConnectionConfig,
}

#[derive(Clone, Debug)]
pub struct ClientBuilder {
    config: Option<ConnectionConfig>,
    check_connection_method: Option<String>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            check_connection_method: None,
            user_agent: None,
        }
    }

    /// Use this configuration instead of resolving one from the process arguments.
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Call `method` during `connect` and fail unless it returns `true`.
    pub fn check_connection(mut self, method: impl Into<String>) -> Self {
        self.check_connection_method = Some(method.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub async fn connect(self) -> Result<RadClient, RadError> {
        let config = match self.config {
            Some(config) => config,
            None => ConnectionConfig::from_env_args()?,
        };

        let user_agent = self.user_agent.unwrap_or_else(default_user_agent);
        let transport = Transport::new(&config, &user_agent)?;

        let client = RadClient {
            inner: Arc::new(ClientInner { transport, config }),
        };

        if let Some(method) = self.check_connection_method.as_deref() {
            if !client.check_connection(method).await? {
                return Err(RadError::Config {
                    reason: format!(
                        "failed to connect to the DataSnap server at {}",
                        client.base_url()
                    ),
                });
            }
        }

        Ok(client)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RadClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Resolve the configuration from the process arguments and check the connection.
    pub async fn connect() -> Result<Self, RadError> {
        ClientBuilder::new()
            .check_connection(DEFAULT_CHECK_CONNECTION_METHOD)
            .connect()
            .await
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> String {
        self.inner.config.base_url()
    }

    /// Full URL a request would be sent to, before wire escaping.
    pub fn request_url(&self, spec: &RequestSpec) -> String {
        self.inner.transport.request_url(spec)
    }

    /// Run a remote method and unwrap its reply.
    pub async fn call(&self, spec: impl Into<RequestSpec>) -> Result<Value, RadError> {
        let spec = spec.into();
        let body = self.inner.transport.roundtrip(&spec).await?;
        envelope::decode_response(&body)
    }

    /// Run a remote method that reports success as a boolean.
    ///
    /// Only a JSON `true` counts; `"true"` and `1` do not.
    pub async fn call_bool(&self, spec: impl Into<RequestSpec>) -> Result<bool, RadError> {
        let value = self.call(spec).await?;
        Ok(matches!(value, Value::Bool(true)))
    }

    /// An empty method name skips the check.
    pub async fn check_connection(&self, method: &str) -> Result<bool, RadError> {
        if method.is_empty() {
            return Ok(true);
        }

        tracing::debug!(method, url = %self.base_url(), "checking DataSnap connection");
        self.call_bool(method).await
    }
}

fn default_user_agent() -> String {
    format!("radsnap/{}", env!("CARGO_PKG_VERSION"))
}
