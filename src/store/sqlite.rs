//! SQLite credential store
//!
//! Credentials live in the `clients` table of `<path>/storage.db`. A new
//! database is bootstrapped from `<path>/scheme.sql` when that file exists,
//! otherwise from the built-in schema below.

use super::{validate_login, Credential, CredentialStore, PasswordHash, PasswordHasher};
use crate::error::StoreError;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info, warn};

/// Database file name inside the store directory
pub const DATABASE_FILE: &str = "storage.db";

/// Optional schema file inside the store directory
pub const SCHEMA_FILE: &str = "scheme.sql";

const DEFAULT_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS clients (
    login TEXT PRIMARY KEY NOT NULL,
    password TEXT NOT NULL
);";

const MAX_CONNECTIONS: u32 = 4;

/// Credential store persisted in SQLite
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    hasher: PasswordHasher,
}

impl SqliteStore {
    /// Open (or bootstrap) the database in `dir`
    pub async fn open(dir: &Path, hasher: PasswordHasher) -> Result<Self, StoreError> {
        let db_path = dir.join(DATABASE_FILE);
        let fresh = !tokio::fs::try_exists(&db_path)
            .await
            .map_err(|e| StoreError::Backend(format!("Cannot stat {:?}: {}", db_path, e)))?;

        let schema = if fresh {
            Some(load_schema(dir).await?)
        } else {
            None
        };

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        if let Some(schema) = schema {
            if let Err(e) = sqlx::raw_sql(&schema).execute(&pool).await {
                pool.close().await;
                remove_partial_database(&db_path).await;
                return Err(e.into());
            }
            info!("Created credential database at {:?}", db_path);
        } else {
            debug!("Opened credential database at {:?}", db_path);
        }

        Ok(SqliteStore { pool, hasher })
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn load_schema(dir: &Path) -> Result<String, StoreError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| StoreError::Backend(format!("Cannot create {:?}: {}", dir, e)))?;

    let schema_path = dir.join(SCHEMA_FILE);
    match tokio::fs::read_to_string(&schema_path).await {
        Ok(schema) => Ok(schema),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DEFAULT_SCHEMA.to_string()),
        Err(e) => Err(StoreError::Backend(format!(
            "Cannot read {:?}: {}",
            schema_path, e
        ))),
    }
}

async fn remove_partial_database(db_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(db_path).await {
        warn!("Failed to remove partial database {:?}: {}", db_path, e);
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    fn backend(&self) -> &str {
        "sqlite"
    }

    async fn lookup(&self, login: &str, password: &[u8]) -> Result<Credential, StoreError> {
        let verifier = self.hasher.hash(password);

        // One query covers both unknown login and wrong password.
        let row = sqlx::query("SELECT login, password FROM clients WHERE login = ? AND password = ?")
            .bind(login)
            .bind(verifier.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(StoreError::NotFound);
        };

        let login: String = row.try_get("login")?;
        let stored: String = row.try_get("password")?;
        Ok(Credential::new(login, PasswordHash::from_stored(stored)))
    }

    async fn create(&self, login: &str, password: &[u8]) -> Result<Credential, StoreError> {
        validate_login(login)?;
        let verifier = self.hasher.hash(password);

        let result = sqlx::query("INSERT INTO clients (login, password) VALUES (?, ?)")
            .bind(login)
            .bind(verifier.as_str())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                debug!(login = ?login, "Credential created in SQLite store");
                Ok(Credential::new(login.to_string(), verifier))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::AlreadyExists(login.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
