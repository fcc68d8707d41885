//! SQL schema for the user table.
//!
//! Column layout matches databases written by earlier deployments of the bot, so an
//! existing `database.db` opens as-is.

/// Idempotent DDL run on every open.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS user (
    id         INTEGER PRIMARY KEY,
    user_id    INTEGER NOT NULL,
    username   TEXT DEFAULT NULL,
    first_name TEXT DEFAULT NULL,
    subscribe  INTEGER DEFAULT 0
);

-- One row per Telegram user.
CREATE UNIQUE INDEX IF NOT EXISTS user_user_id_idx ON user(user_id);
";

pub(crate) const SELECT_COLUMNS: &str = "SELECT id, user_id, username, first_name, subscribe FROM user";
