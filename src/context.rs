//! Database context: the dependency injection root.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::di::Context;
use crate::error::AppError;
use crate::models::Document;
use crate::repositories::Repository;
use crate::store::backends::memory::MemoryStore;
use crate::store::backends::postgres::PostgresStore;
use crate::store::{AppStore, Collection};

/// Default pool size when connecting without a config.
const DEFAULT_POOL_SIZE: usize = 16;

/// Storage backend selected by a connection string scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Postgres,
}

/// A parsed `scheme://[user[:pass]@]host[:port]/database[?options]` string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub backend: Backend,
    pub host: String,
    pub database: String,
    raw: String,
}

impl ConnectionString {
    /// The original string, credentials included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

// Keeps passwords out of logs.
impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("database", &self.database)
            .finish()
    }
}

impl FromStr for ConnectionString {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| AppError::Connection(format!("{}: {}", reason, redact(s)));

        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| malformed("missing scheme"))?;
        let backend = match scheme.to_ascii_lowercase().as_str() {
            "memory" => Backend::Memory,
            "postgres" | "postgresql" => Backend::Postgres,
            other => {
                return Err(AppError::Connection(format!(
                    "unsupported scheme '{}'",
                    other
                )))
            }
        };

        let location = rest.split('?').next().unwrap_or(rest);
        let authority_start = location.rfind('@').map(|i| i + 1).unwrap_or(0);
        let (authority, path) = match location[authority_start..].find('/') {
            Some(i) => location.split_at(authority_start + i),
            None => return Err(malformed("missing database name")),
        };

        let host = authority[authority_start..].to_string();
        if host.is_empty() {
            return Err(malformed("missing host"));
        }

        let database = path.trim_start_matches('/');
        if database.is_empty() || database.contains('/') {
            return Err(malformed("missing or invalid database name"));
        }

        Ok(Self {
            backend,
            host,
            database: database.to_string(),
            raw: s.to_string(),
        })
    }
}

/// Replaces the password in a connection string with `***`.
fn redact(s: &str) -> String {
    let Some((scheme, rest)) = s.split_once("://") else {
        return s.to_string();
    };
    match rest.rfind('@') {
        Some(at) => {
            let user = rest[..at].split(':').next().unwrap_or("");
            format!("{}://{}:***{}", scheme, user, &rest[at..])
        }
        None => s.to_string(),
    }
}

/// Root context shared by every repository.
///
/// Holds one handle to the store and the database name. Cloning is cheap and
/// every clone refers to the same store. `#[derive(Context)]` makes each field
/// resolvable through `FromRef`, so repositories can derive `FromContext`.
#[derive(Context, Clone)]
pub struct DatabaseContext {
    pub store: AppStore,
    pub database: Arc<str>,
}

impl fmt::Debug for DatabaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseContext")
            .field("backend", &self.store.backend())
            .field("database", &self.database)
            .finish()
    }
}

impl DatabaseContext {
    /// Creates a context around an existing store.
    pub fn new(store: AppStore, database: &str) -> Self {
        Self {
            store,
            database: Arc::from(database),
        }
    }

    /// Connects using a connection string and the default pool size.
    pub async fn connect(connection_string: &str) -> Result<Self, AppError> {
        Self::connect_with_pool(connection_string, DEFAULT_POOL_SIZE).await
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, AppError> {
        Self::connect_with_pool(&config.uri, config.pool_size).await
    }

    async fn connect_with_pool(connection_string: &str, pool_size: usize) -> Result<Self, AppError> {
        let conn: ConnectionString = connection_string.parse()?;
        tracing::debug!(
            backend = ?conn.backend,
            host = %conn.host,
            database = %conn.database,
            "Opening database context"
        );

        let store: AppStore = match conn.backend {
            Backend::Memory => Arc::new(MemoryStore::new()),
            Backend::Postgres => Arc::new(PostgresStore::connect(conn.as_str(), pool_size).await?),
        };

        Ok(Self::new(store, &conn.database))
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Typed handle to a named collection. No round trip.
    pub fn collection<T: Document>(&self, name: &str) -> Collection<T> {
        Collection::new(self.store.clone(), name)
    }

    /// Generic repository bound to `T`'s default collection.
    pub fn repository<T: Document>(&self) -> Repository<T> {
        Repository::new(self)
    }

    /// Checks that the store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}
