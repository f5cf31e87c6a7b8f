use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Runtime;

use crate::client::{ClientBuilder, RadClient, DEFAULT_CHECK_CONNECTION_METHOD};
use crate::commands::RequestSpec;
use crate::config::ConnectionConfig;
use crate::error::RadError;
use crate::ide::{Package, PackageIter, Packages};

#[derive(Clone, Debug)]
pub struct RadClientBlocking {
    inner: RadClient,
    runtime: Arc<Runtime>,
}

#[derive(Clone, Debug, Default)]
pub struct RadClientBlockingBuilder {
    inner: ClientBuilder,
}

impl RadClientBlockingBuilder {
    pub fn new() -> Self {
        Self {
            inner: ClientBuilder::new(),
        }
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.inner = self.inner.config(config);
        self
    }

    pub fn check_connection(mut self, method: impl Into<String>) -> Self {
        self.inner = self.inner.check_connection(method);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.inner = self.inner.user_agent(user_agent);
        self
    }

    pub fn connect(self) -> Result<RadClientBlocking, RadError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| RadError::RuntimeJoin(err.to_string()))?;
        let inner = runtime.block_on(self.inner.connect())?;
        Ok(RadClientBlocking {
            inner,
            runtime: Arc::new(runtime),
        })
    }
}

impl RadClientBlocking {
    pub fn builder() -> RadClientBlockingBuilder {
        RadClientBlockingBuilder::new()
    }

    /// Resolve the configuration from the process arguments and check the connection.
    pub fn connect() -> Result<Self, RadError> {
        RadClientBlockingBuilder::new()
            .check_connection(DEFAULT_CHECK_CONNECTION_METHOD)
            .connect()
    }

    pub fn inner(&self) -> &RadClient {
        &self.inner
    }

    /// Drive any async operation of this crate to completion, e.g. a proxy call.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn call(&self, spec: impl Into<RequestSpec>) -> Result<Value, RadError> {
        self.block_on(self.inner.call(spec))
    }

    pub fn call_bool(&self, spec: impl Into<RequestSpec>) -> Result<bool, RadError> {
        self.block_on(self.inner.call_bool(spec))
    }

    pub fn check_connection(&self, method: &str) -> Result<bool, RadError> {
        self.block_on(self.inner.check_connection(method))
    }

    pub fn packages_iter(&self) -> BlockingPackageIter {
        BlockingPackageIter {
            runtime: Arc::clone(&self.runtime),
            cursor: Packages::new(&self.inner).iter(),
        }
    }
}

/// [`PackageIter`] as a standard iterator.
#[derive(Debug)]
pub struct BlockingPackageIter {
    runtime: Arc<Runtime>,
    cursor: PackageIter,
}

impl Iterator for BlockingPackageIter {
    type Item = Result<Package, RadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.cursor.next_package())
    }
}
