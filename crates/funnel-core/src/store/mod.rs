//! Record store: one row per Telegram user who ever wrote to the bot.

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::domain::UserId;

/// A stored user.
///
/// `username` and `first_name` are a snapshot taken at first contact; they are not
/// refreshed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    /// Store-assigned sequential id.
    pub id: i64,
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    /// Set once channel membership is confirmed; never cleared.
    pub subscribed: bool,
}

/// Parameters for creating a record.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
}
