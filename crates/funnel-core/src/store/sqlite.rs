//! [`SqliteStore`]: the SQLite-backed record store.

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
    domain::UserId,
    store::{
        schema::{SCHEMA, SELECT_COLUMNS},
        NewUser, UserRecord,
    },
    Result,
};

/// Record store backed by a single SQLite file.
///
/// All statements run on the connection's dedicated thread, one at a time. Cloning is
/// cheap: clones share that connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
    /// Open (or create) a store at `path` and run schema initialisation.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = tokio_rusqlite::Connection::open(path).await?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open an in-memory store, used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = tokio_rusqlite::Connection::open_in_memory().await?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn find_by_user_id(&self, user_id: UserId) -> Result<Option<UserRecord>> {
        let record = self
            .conn
            .call(move |conn| {
                let rec = conn
                    .query_row(
                        &format!("{SELECT_COLUMNS} WHERE user_id = ?1"),
                        rusqlite::params![user_id.0],
                        row_to_record,
                    )
                    .optional()?;
                Ok(rec)
            })
            .await?;
        Ok(record)
    }

    /// Create a record with `subscribed = false`.
    ///
    /// The caller must have checked that no record exists; a duplicate `user_id` is a
    /// store error.
    pub async fn insert(&self, user: NewUser) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO user (user_id, username, first_name, subscribe)
                     VALUES (?1, ?2, ?3, 0)",
                    rusqlite::params![user.user_id.0, user.username, user.first_name],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Find the record for `user.user_id`, creating it if absent.
    ///
    /// Returns the record and whether it was created by this call. Lookup and insert run
    /// in one transaction on the connection thread.
    pub async fn get_or_create(&self, user: NewUser) -> Result<(UserRecord, bool)> {
        let out = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                let existing = tx
                    .query_row(
                        &format!("{SELECT_COLUMNS} WHERE user_id = ?1"),
                        rusqlite::params![user.user_id.0],
                        row_to_record,
                    )
                    .optional()?;
                if let Some(rec) = existing {
                    tx.commit()?;
                    return Ok((rec, false));
                }

                tx.execute(
                    "INSERT INTO user (user_id, username, first_name, subscribe)
                     VALUES (?1, ?2, ?3, 0)",
                    rusqlite::params![user.user_id.0, user.username, user.first_name],
                )?;
                let id = tx.last_insert_rowid();
                tx.commit()?;

                Ok((
                    UserRecord {
                        id,
                        user_id: user.user_id,
                        username: user.username,
                        first_name: user.first_name,
                        subscribed: false,
                    },
                    true,
                ))
            })
            .await?;
        Ok(out)
    }

    /// Mark the user as subscribed. Idempotent; a missing record is a no-op.
    pub async fn set_subscribed(&self, user_id: UserId) -> Result<()> {
        let changed = self
            .conn
            .call(move |conn| {
                let n = conn.execute(
                    "UPDATE user SET subscribe = 1 WHERE user_id = ?1",
                    rusqlite::params![user_id.0],
                )?;
                Ok(n)
            })
            .await?;
        if changed == 0 {
            debug!(user_id = user_id.0, "set_subscribed: no record");
        }
        Ok(())
    }

    /// Every record, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<UserRecord>> {
        self.list(format!("{SELECT_COLUMNS} ORDER BY id")).await
    }

    /// Records with `subscribe = 1`, in insertion order.
    pub async fn list_subscribed(&self) -> Result<Vec<UserRecord>> {
        self.list(format!("{SELECT_COLUMNS} WHERE subscribe = 1 ORDER BY id"))
            .await
    }

    async fn list(&self, sql: String) -> Result<Vec<UserRecord>> {
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], row_to_record)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    let subscribe: Option<i64> = row.get(4)?;
    Ok(UserRecord {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        username: row.get(2)?,
        first_name: row.get(3)?,
        subscribed: subscribe.unwrap_or(0) != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::open_in_memory()
            .await
            .expect("in-memory store")
    }

    fn new_user(id: i64, username: Option<&str>) -> NewUser {
        NewUser {
            user_id: UserId(id),
            username: username.map(str::to_string),
            first_name: Some("Alice".to_string()),
        }
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let s = store().await;
        assert!(s.find_by_user_id(UserId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_creates_unsubscribed_record() {
        let s = store().await;
        s.insert(new_user(100, Some("alice"))).await.unwrap();

        let rec = s.find_by_user_id(UserId(100)).await.unwrap().unwrap();
        assert_eq!(rec.user_id, UserId(100));
        assert_eq!(rec.username.as_deref(), Some("alice"));
        assert_eq!(rec.first_name.as_deref(), Some("Alice"));
        assert!(!rec.subscribed);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let s = store().await;
        s.insert(new_user(100, None)).await.unwrap();
        let err = s.insert(new_user(100, None)).await.unwrap_err();
        assert!(matches!(err, crate::Error::Store(_)));
        assert_eq!(s.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_or_create_creates_once() {
        let s = store().await;

        let (first, created) = s.get_or_create(new_user(5, Some("bob"))).await.unwrap();
        assert!(created);
        assert!(!first.subscribed);

        // Profile changes are not written back.
        let (second, created) = s.get_or_create(new_user(5, Some("robert"))).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.username.as_deref(), Some("bob"));

        assert_eq!(s.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_subscribed_is_idempotent() {
        let s = store().await;
        s.insert(new_user(9, None)).await.unwrap();

        s.set_subscribed(UserId(9)).await.unwrap();
        let once = s.find_by_user_id(UserId(9)).await.unwrap().unwrap();
        s.set_subscribed(UserId(9)).await.unwrap();
        let twice = s.find_by_user_id(UserId(9)).await.unwrap().unwrap();

        assert!(once.subscribed);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn set_subscribed_without_record_is_noop() {
        let s = store().await;
        s.set_subscribed(UserId(404)).await.unwrap();
        assert!(s.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_subscribed_filters() {
        let s = store().await;
        for id in 1..=4 {
            s.insert(new_user(id, None)).await.unwrap();
        }
        s.set_subscribed(UserId(2)).await.unwrap();
        s.set_subscribed(UserId(4)).await.unwrap();

        let all = s.list_all().await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let subs: Vec<i64> = s
            .list_subscribed()
            .await
            .unwrap()
            .iter()
            .map(|r| r.user_id.0)
            .collect();
        assert_eq!(subs, vec![2, 4]);
    }
}
