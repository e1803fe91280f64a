//! Per-user request history.
//!
//! Each authenticated call to a recorded endpoint appends one row holding the
//! caller's ID, the public route path and a server-assigned timestamp.
//! Entries can only be listed or cleared by their owner.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::Db;
use crate::db::schema::RequestHistoryRecord;
use crate::types::{RequestPath, UserId};

/// A history entry as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub request_url: String,
    pub request_time: DateTime<Utc>,
}

impl TryFrom<RequestHistoryRecord> for HistoryEntry {
    type Error = anyhow::Error;

    fn try_from(row: RequestHistoryRecord) -> Result<Self> {
        let request_time = DateTime::parse_from_rfc3339(&row.request_time)
            .with_context(|| format!("invalid request_time `{}`", row.request_time))?
            .with_timezone(&Utc);

        Ok(Self {
            request_url: row.request_url,
            request_time,
        })
    }
}

/// Append-only request log backed by the `request_history` table.
#[derive(Clone)]
pub struct HistoryRecorder {
    db: Db,
}

impl HistoryRecorder {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Append one entry for `owner`.
    ///
    /// Key allocation and the insert run in a single transaction. Any failure
    /// cancels both and is returned.
    pub async fn record(&self, owner: UserId, path: &RequestPath) -> Result<()> {
        let query = r#"
            BEGIN TRANSACTION;
            LET $row = (UPSERT ONLY type::thing('id_counter', 'request_history') SET last_id += 1 RETURN AFTER);
            CREATE type::thing('request_history', $row.last_id) CONTENT {
                user_id: $user_id,
                request_url: $request_url
            };
            COMMIT TRANSACTION;
        "#;

        self.db
            .query(query)
            .bind(("user_id", owner.get()))
            .bind(("request_url", path.to_string()))
            .await?
            .check()?;

        debug!(user_id = %owner, path = %path, "Request recorded");
        Ok(())
    }

    /// All of the caller's entries in insertion order.
    pub async fn get_all(&self, owner: UserId) -> Result<Vec<HistoryEntry>> {
        let query = r#"
            SELECT record::id(id) AS id, request_url, <string> request_time AS request_time
            FROM request_history
            WHERE user_id = $user_id
            ORDER BY id
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("user_id", owner.get()))
            .await?;

        let rows: Vec<RequestHistoryRecord> = res.take(0)?;
        rows.into_iter().map(HistoryEntry::try_from).collect()
    }

    /// Remove every entry belonging to the caller.
    pub async fn delete_all(&self, owner: UserId) -> Result<()> {
        self.db
            .query("DELETE request_history WHERE user_id = $user_id")
            .bind(("user_id", owner.get()))
            .await?
            .check()?;

        debug!(user_id = %owner, "Request history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DatabaseConfig, create_connection, ensure_schema};

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    async fn setup() -> HistoryRecorder {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        HistoryRecorder::new(db)
    }

    fn urls(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.request_url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_record_and_get_in_order() {
        let history = setup().await;
        let before = Utc::now() - chrono::Duration::seconds(5);

        history.record(ALICE, &"/contacts".into()).await.unwrap();
        history.record(ALICE, &"/contacts/1".into()).await.unwrap();
        history.record(ALICE, &"/contacts/search".into()).await.unwrap();

        let entries = history.get_all(ALICE).await.unwrap();
        assert_eq!(
            urls(&entries),
            vec!["/contacts", "/contacts/1", "/contacts/search"]
        );
        assert!(entries.iter().all(|e| e.request_time >= before));
        assert!(entries.windows(2).all(|w| w[0].request_time <= w[1].request_time));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let history = setup().await;
        assert!(history.get_all(ALICE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_owner_scoped() {
        let history = setup().await;
        history.record(ALICE, &"/contacts".into()).await.unwrap();
        history.record(BOB, &"/contacts/9".into()).await.unwrap();

        assert_eq!(urls(&history.get_all(ALICE).await.unwrap()), vec!["/contacts"]);
        assert_eq!(urls(&history.get_all(BOB).await.unwrap()), vec!["/contacts/9"]);
    }

    #[tokio::test]
    async fn test_delete_all_only_removes_own_entries() {
        let history = setup().await;
        history.record(ALICE, &"/contacts".into()).await.unwrap();
        history.record(ALICE, &"/users/password".into()).await.unwrap();
        history.record(BOB, &"/contacts".into()).await.unwrap();

        history.delete_all(ALICE).await.unwrap();

        assert!(history.get_all(ALICE).await.unwrap().is_empty());
        assert_eq!(history.get_all(BOB).await.unwrap().len(), 1);

        // Recording continues after a clear
        history.record(ALICE, &"/contacts".into()).await.unwrap();
        assert_eq!(history.get_all(ALICE).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_record_is_returned_and_leaves_no_row() {
        let history = setup().await;
        history
            .db
            .query(
                "REMOVE FIELD request_url ON TABLE request_history;
                 DEFINE FIELD request_url ON TABLE request_history TYPE int;",
            )
            .await
            .unwrap()
            .check()
            .unwrap();

        assert!(history.record(ALICE, &"/contacts".into()).await.is_err());

        let mut res = history
            .db
            .query("SELECT VALUE record::id(id) FROM request_history")
            .await
            .unwrap();
        let keys: Vec<i64> = res.take(0).unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = HistoryEntry {
            request_url: "/contacts".to_string(),
            request_time: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["requestUrl"], "/contacts");
        assert_eq!(json["requestTime"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn test_invalid_record_time_is_an_error() {
        let row = RequestHistoryRecord {
            id: 1,
            request_url: "/contacts".to_string(),
            request_time: "yesterday".to_string(),
        };
        assert!(HistoryEntry::try_from(row).is_err());
    }
}
