use crate::{
    Backend, ConnectionDescriptor, ErrorKind, NativeConnection, Result, Transaction, take_param,
    writer::{Dialect, SqlWriter},
};
use std::{
    collections::HashMap,
    sync::{Arc, Condvar, Mutex, MutexGuard},
    time::Duration,
};

/// How a transaction still started when dropped is resolved.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPolicy {
    Commit,
    #[default]
    Rollback,
    /// Must be resolved explicitly, dropping it is reported and rolled back.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub pool_size: usize,
    pub pool_timeout: Duration,
    pub transaction_policy: TransactionPolicy,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            pool_size: 1,
            pool_timeout: Duration::from_secs(30),
            transaction_policy: TransactionPolicy::Rollback,
        }
    }
}

impl ConnectorConfig {
    /// Consume the connector parameters from the url, falling back to the environment.
    pub fn from_params(params: &mut Vec<(String, String)>) -> Result<Self> {
        let mut result = Self::default();
        if let Some(v) = take_param(params, "pool_size", "STOW_POOL_SIZE") {
            result.pool_size = match v.parse::<usize>() {
                Ok(v) if v > 0 => v,
                _ => {
                    return Err(ErrorKind::Configuration
                        .error(format!("Invalid pool size `{}`", v)));
                }
            };
        }
        if let Some(v) = take_param(params, "pool_timeout_ms", "STOW_POOL_TIMEOUT_MS") {
            result.pool_timeout = v.parse::<u64>().map(Duration::from_millis).map_err(|e| {
                ErrorKind::Configuration
                    .wrap(e)
                    .context(format!("Invalid pool timeout `{}`", v))
            })?;
        }
        if let Some(v) = take_param(params, "transaction_policy", "STOW_TRANSACTION_POLICY") {
            result.transaction_policy = match v.to_ascii_lowercase().as_str() {
                "commit" => TransactionPolicy::Commit,
                "rollback" => TransactionPolicy::Rollback,
                "manual" => TransactionPolicy::Manual,
                _ => {
                    return Err(ErrorKind::Configuration
                        .error(format!("Invalid transaction policy `{}`", v)));
                }
            };
        }
        Ok(result)
    }
}

struct Pool {
    size: usize,
    free: Vec<Box<dyn NativeConnection>>,
    used: usize,
    connected: bool,
}

/// Fixed size pool of connections to one database.
pub struct Connector {
    name: String,
    backend: Arc<dyn Backend>,
    descriptor: ConnectionDescriptor,
    config: ConnectorConfig,
    pool: Mutex<Pool>,
    available: Condvar,
}

impl Connector {
    pub fn new(name: impl Into<String>, backend: Arc<dyn Backend>, url: &str) -> Result<Self> {
        let mut descriptor = ConnectionDescriptor::parse(url)?;
        if descriptor.scheme != backend.scheme() {
            return Err(ErrorKind::Configuration.error(format!(
                "Backend `{}` cannot open a `{}` url",
                backend.scheme(),
                descriptor.scheme
            )));
        }
        let config = ConnectorConfig::from_params(&mut descriptor.params)?;
        Ok(Self {
            name: name.into(),
            backend,
            descriptor,
            pool: Mutex::new(Pool {
                size: config.pool_size,
                free: Vec::new(),
                used: 0,
                connected: false,
            }),
            config,
            available: Condvar::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> Dialect {
        self.backend.dialect()
    }

    pub fn sql_writer(&self) -> &'static dyn SqlWriter {
        self.dialect().sql_writer()
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    fn lock(&self) -> Result<MutexGuard<'_, Pool>> {
        self.pool
            .lock()
            .map_err(|_| ErrorKind::Backend.error("The connection pool lock is poisoned"))
    }

    pub fn pool_size(&self) -> Result<usize> {
        Ok(self.lock()?.size)
    }

    /// Change the pool size, only allowed before [`Connector::connect`].
    pub fn set_pool_size(&self, size: usize) -> Result<()> {
        let mut pool = self.lock()?;
        if pool.connected {
            return Err(ErrorKind::Usage.error(format!(
                "Cannot resize the pool of connector `{}` after connecting",
                self.name
            )));
        }
        if size == 0 {
            return Err(ErrorKind::Usage.error("The pool size must be at least 1"));
        }
        pool.size = size;
        Ok(())
    }

    /// Open every pooled connection.
    pub fn connect(&self) -> Result<()> {
        let mut pool = self.lock()?;
        if pool.connected {
            return Err(ErrorKind::Usage
                .error(format!("Connector `{}` is already connected", self.name)));
        }
        let mut connections = Vec::with_capacity(pool.size);
        for _ in 0..pool.size {
            let connection = self.backend.connect(&self.descriptor).map_err(|e| {
                let e = e.context(format!("While connecting `{}`", self.name));
                log::error!("{:#}", e);
                e
            })?;
            connections.push(connection);
        }
        pool.free = connections;
        pool.connected = true;
        log::debug!(
            "Connector `{}` opened {} {} connections",
            self.name,
            pool.size,
            self.backend.scheme()
        );
        Ok(())
    }

    /// Close the idle connections, fails while transactions are still open.
    pub fn disconnect(&self) -> Result<()> {
        let mut pool = self.lock()?;
        if pool.used > 0 {
            return Err(ErrorKind::Usage.error(format!(
                "Connector `{}` still has {} open transactions",
                self.name, pool.used
            )));
        }
        pool.free.clear();
        pool.connected = false;
        Ok(())
    }

    /// Acquire a pooled connection, waiting up to the configured timeout.
    pub fn create_transaction(&self) -> Result<Transaction<'_>> {
        let pool = self.lock()?;
        if !pool.connected {
            return Err(ErrorKind::Usage
                .error(format!("Connector `{}` is not connected", self.name)));
        }
        let (mut pool, _) = self
            .available
            .wait_timeout_while(pool, self.config.pool_timeout, |v| v.free.is_empty())
            .map_err(|_| ErrorKind::Backend.error("The connection pool lock is poisoned"))?;
        let Some(connection) = pool.free.pop() else {
            return Err(ErrorKind::PoolExhausted.error(format!(
                "No connection of `{}` freed up within {:?}",
                self.name, self.config.pool_timeout
            )));
        };
        pool.used += 1;
        Ok(Transaction::new(self, connection))
    }

    /// Give back the connection of a closed transaction and wake one waiter.
    pub(crate) fn close_transaction(&self, connection: Box<dyn NativeConnection>) {
        let mut pool = match self.pool.lock() {
            Ok(v) => v,
            Err(e) => e.into_inner(),
        };
        pool.used = pool.used.saturating_sub(1);
        if pool.connected {
            pool.free.push(connection);
        }
        drop(pool);
        self.available.notify_one();
    }
}

/// Backends by url scheme and the connectors created from them.
#[derive(Default)]
pub struct Registry {
    backends: HashMap<&'static str, Arc<dyn Backend>>,
    connectors: HashMap<String, Arc<Connector>>,
    default: Option<String>,
}

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn register_backend(&mut self, backend: impl Backend + 'static) -> &mut Self {
        self.backends.insert(backend.scheme(), Arc::new(backend));
        self
    }

    /// Create and connect a connector, the first one becomes the default.
    pub fn connect(&mut self, name: &str, url: &str) -> Result<Arc<Connector>> {
        let scheme = url.split(':').next().unwrap_or_default();
        let Some(backend) = self.backends.get(scheme) else {
            return Err(ErrorKind::NotFound
                .error(format!("No backend registered for scheme `{}`", scheme)));
        };
        let connector = Connector::new(name, backend.clone(), url)?;
        connector.connect()?;
        let connector = Arc::new(connector);
        self.connectors.insert(name.to_string(), connector.clone());
        if self.default.is_none() {
            self.default = Some(name.to_string());
        }
        Ok(connector)
    }

    pub fn connector(&self, name: &str) -> Result<Arc<Connector>> {
        self.connectors
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::NotFound.error(format!("No connector named `{}`", name)))
    }

    pub fn default_connector(&self) -> Result<Arc<Connector>> {
        match &self.default {
            Some(name) => self.connector(name),
            None => Err(ErrorKind::NotFound.error("No connector was created yet")),
        }
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        self.connector(name)?;
        self.default = Some(name.to_string());
        Ok(())
    }
}
