use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::debug;

use crate::{
    domain::{ChatId, UserId},
    errors::Error,
    Result,
};

/// Typed configuration, sourced from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub bot_token: String,
    pub base_chat_id: ChatId,
    pub base_chat_link: Option<String>,

    // Operator
    pub admin_id: Option<UserId>,
    pub report_chat_id: Option<ChatId>,

    // Files
    pub database_path: PathBuf,
    pub welcome_photo_path: PathBuf,
    pub export_dir: PathBuf,

    // Polling
    pub polling_timeout: Duration,
    pub restart_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let base_chat_id = get("BASE_CHAT_ID").ok_or_else(|| {
            Error::Config("BASE_CHAT_ID environment variable is required".to_string())
        })?;
        let base_chat_id = ChatId(parse_i64("BASE_CHAT_ID", &base_chat_id)?);

        let bot_token = get("BOT_TOKEN").ok_or_else(|| {
            Error::Config("BOT_TOKEN environment variable is required".to_string())
        })?;

        // Optional
        let base_chat_link = get("BASE_CHAT_LINK").map(|s| s.trim().to_string());
        let admin_id = get("ADMIN_ID")
            .map(|s| parse_i64("ADMIN_ID", &s))
            .transpose()?
            .map(UserId);
        // 0 historically meant "no report channel".
        let report_chat_id = get("REPORT_CHAT_ID")
            .map(|s| parse_i64("REPORT_CHAT_ID", &s))
            .transpose()?
            .filter(|id| *id != 0)
            .map(ChatId);

        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("database.db"));
        let welcome_photo_path = get("WELCOME_PHOTO_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("first_photo.JPG"));
        let export_dir = get("EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        let polling_timeout = Duration::from_secs(
            get("POLLING_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(300),
        );
        let restart_delay = Duration::from_secs(
            get("RESTART_DELAY_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(3),
        );

        Ok(Self {
            bot_token,
            base_chat_id,
            base_chat_link,
            admin_id,
            report_chat_id,
            database_path,
            welcome_photo_path,
            export_dir,
            polling_timeout,
            restart_delay,
        })
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_id == Some(user_id)
    }
}

fn parse_i64(key: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| Error::Config(format!("{key} must be an integer, got {raw:?}: {e}")))
}

/// Export `.env` entries that the real environment does not already define.
///
/// Only key names are logged; values may hold the bot token.
fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(key).is_some() {
            debug!(key, "env already set, .env entry ignored");
            continue;
        }
        debug!(key, "loaded from .env");
        env::set_var(key, val);
    }
}

/// `KEY=value` pairs, skipping blanks, `#` comments and lines without `=`.
/// One layer of matching quotes is stripped from the value.
fn parse_dotenv(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), unquote(v.trim())))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

fn unquote(v: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = v.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)) {
            return inner;
        }
    }
    v
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
