//! Environment-backed configuration for the remote Notion collections.
//!
//! All settings arrive out-of-band: the integration token, one database id
//! per collection, and an optional comma-separated access password list.
//! A missing token or books database id does not fail startup; it switches
//! the gateway into degraded mode (empty reads, failing writes, no network).
use std::env;

use crate::notion::NOTION_VERSION;

pub const ENV_TOKEN: &str = "NOTION_TOKEN";
pub const ENV_BOOKS_DB: &str = "NOTION_DATABASE_ID";
pub const ENV_LOGS_DB: &str = "NOTION_LOG_ID";
pub const ENV_TODOS_DB: &str = "NOTION_TODO_ID";
pub const ENV_PASSWORDS: &str = "ACCESS_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub token: Option<String>,
    pub books_db: Option<String>,
    pub logs_db: Option<String>,
    pub todos_db: Option<String>,
    /// Accepted access passwords. Empty means nobody can unlock a session.
    pub passwords: Vec<String>,
    pub version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            books_db: None,
            logs_db: None,
            todos_db: None,
            passwords: Vec::new(),
            version: NOTION_VERSION.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            token: non_empty_var(ENV_TOKEN),
            books_db: non_empty_var(ENV_BOOKS_DB),
            logs_db: non_empty_var(ENV_LOGS_DB),
            todos_db: non_empty_var(ENV_TODOS_DB),
            passwords: non_empty_var(ENV_PASSWORDS)
                .map(|raw| parse_password_list(&raw))
                .unwrap_or_default(),
            version: NOTION_VERSION.to_string(),
        }
    }

    /// Degraded mode: the token or the books database id is absent.
    pub fn is_degraded(&self) -> bool {
        self.token.is_none() || self.books_db.is_none()
    }

    pub fn accepts_password(&self, input: &str) -> bool {
        self.passwords.iter().any(|p| p == input)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_password_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
