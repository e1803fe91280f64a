use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

use crate::db::schema::IdCounterRecord;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE").unwrap_or_else(|_| "contacts".to_string()),
            database: env::var("SURREALDB_DATABASE").unwrap_or_else(|_| "service".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

/// Define tables, fields and indexes. Safe to run on every start-up.
pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = vec![
        // Accounts
        "DEFINE TABLE IF NOT EXISTS user SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS username ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS password_hash ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS token ON TABLE user TYPE option<string>;
         DEFINE INDEX IF NOT EXISTS user_username ON TABLE user COLUMNS username UNIQUE;",

        // Contacts, always owned by exactly one user
        "DEFINE TABLE IF NOT EXISTS contact SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS user_id ON TABLE contact TYPE int;
         DEFINE FIELD IF NOT EXISTS name ON TABLE contact TYPE string;
         DEFINE FIELD IF NOT EXISTS phone_number ON TABLE contact TYPE string;
         DEFINE FIELD IF NOT EXISTS email ON TABLE contact TYPE option<string>;
         DEFINE FIELD IF NOT EXISTS address ON TABLE contact TYPE option<string>;
         DEFINE INDEX IF NOT EXISTS contact_user_id ON TABLE contact COLUMNS user_id;",

        // Append-only request history
        "DEFINE TABLE IF NOT EXISTS request_history SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS user_id ON TABLE request_history TYPE int;
         DEFINE FIELD IF NOT EXISTS request_url ON TABLE request_history TYPE string;
         DEFINE FIELD IF NOT EXISTS request_time ON TABLE request_history TYPE datetime DEFAULT time::now();
         DEFINE INDEX IF NOT EXISTS request_history_user_id ON TABLE request_history COLUMNS user_id;",

        // Per-table id counters
        "DEFINE TABLE IF NOT EXISTS id_counter SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS last_id ON TABLE id_counter TYPE int DEFAULT 0;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    Ok(())
}

/// Allocate the next integer key for `table`.
///
/// Keys are handed out by an atomic counter row per table, so they are
/// unique and increasing. A key whose insert later fails is simply skipped.
pub async fn next_id(db: &Db, table: &str) -> Result<i64> {
    let mut res = db
        .query("UPSERT ONLY type::thing('id_counter', $table) SET last_id += 1 RETURN AFTER")
        .bind(("table", table.to_string()))
        .await?;

    let row: Option<IdCounterRecord> = res.take(0)?;
    row.map(|r| r.last_id)
        .ok_or_else(|| anyhow!("failed to allocate id for table `{}`", table))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> Db {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let db = setup_test_db().await;
        ensure_schema(&db).await.unwrap();
    }

    #[tokio::test]
    async fn test_next_id_increments_per_table() {
        let db = setup_test_db().await;

        assert_eq!(next_id(&db, "contact").await.unwrap(), 1);
        assert_eq!(next_id(&db, "contact").await.unwrap(), 2);
        assert_eq!(next_id(&db, "user").await.unwrap(), 1);
        assert_eq!(next_id(&db, "contact").await.unwrap(), 3);
    }
}
