// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::state::AppState;

pub const STATE_KEY: &str = "mastery_hub_v1_state";
pub const IDENTITY_KEY: &str = "mastery_hub_identity_pref_v1";
pub const SIDEBAR_COLLAPSED_KEY: &str = "mastery_hub_sidebar_collapsed_v1";
pub const COACH_MEMORY_KEY: &str = "mastery_coach_longterm_memory_v3";
pub const GITHUB_KEY: &str = "mastery_hub_github_v1";

pub const COACH_MEMORY_LIMIT: usize = 30;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "MasteryHub", "masteryhub"));

/// Minimal key/value surface the hub persists through.
pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: StoragePort + ?Sized> StoragePort for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: StoragePort + ?Sized> StoragePort for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("masteryhub.sqlite"))
}

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open_default() -> Result<Self> {
        Self::open(&db_path()?)
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn =
            Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(SqliteStorage {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("storage connection poisoned"))
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS storage(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

impl StoragePort for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let v = conn
            .query_row("SELECT value FROM storage WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO storage(key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
            params![key, value],
        )
        .with_context(|| format!("Write storage key {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM storage WHERE key=?1", params![key])?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("storage poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("storage poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("storage poisoned"))?;
        map.remove(key);
        Ok(())
    }
}

/// Loads the persisted state. Never fails: an absent or unreadable blob yields the
/// seeded defaults, and each field that is missing or malformed falls back alone.
pub fn load_state(store: &dyn StoragePort) -> AppState {
    let raw = match store.get(STATE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return AppState::default(),
        Err(e) => {
            tracing::warn!(error = %e, "state read failed, using defaults");
            return AppState::default();
        }
    };
    state_from_json(&raw)
}

/// Parses a state blob field by field against the defaults.
pub fn state_from_json(raw: &str) -> AppState {
    match serde_json::from_str::<Value>(raw) {
        Ok(v) => state_from_value(v),
        Err(e) => {
            tracing::debug!(error = %e, "state blob is not JSON, using defaults");
            AppState::default()
        }
    }
}

pub fn state_from_value(v: Value) -> AppState {
    let mut state = AppState::default();
    let Value::Object(mut obj) = v else {
        tracing::debug!("state blob is not an object, using defaults");
        return state;
    };

    macro_rules! field {
        ($name:ident, $key:literal) => {
            if let Some(val) = obj.remove($key) {
                match serde_json::from_value(val) {
                    Ok(parsed) => state.$name = parsed,
                    Err(e) => tracing::debug!(field = $key, error = %e, "falling back to default"),
                }
            }
        };
    }

    field!(wins, "wins");
    field!(mastery_habits, "masteryHabits");
    field!(trades, "trades");
    field!(strategies, "strategies");
    field!(accounts, "accounts");
    field!(envelopes, "envelopes");
    field!(tasks, "tasks");
    field!(letters, "letters");
    field!(currency, "currency");
    field!(buckets, "buckets");
    field!(expenses, "expenses");
    field!(income_records, "incomeRecords");
    field!(skills, "skills");
    field!(projects, "projects");
    field!(hearted_scriptures, "heartedScriptures");
    field!(budget_mantra, "budgetMantra");

    state
}

pub fn save_state(store: &dyn StoragePort, state: &AppState) -> Result<()> {
    let blob = serde_json::to_string(state).context("Serialize state")?;
    store.set(STATE_KEY, &blob)
}

pub fn preferred_name(store: &dyn StoragePort) -> Result<Option<String>> {
    Ok(store.get(IDENTITY_KEY)?.filter(|n| !n.trim().is_empty()))
}

pub fn set_preferred_name(store: &dyn StoragePort, name: Option<&str>) -> Result<()> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => store.set(IDENTITY_KEY, n),
        None => store.remove(IDENTITY_KEY),
    }
}

pub fn compact_output(store: &dyn StoragePort) -> bool {
    matches!(store.get(SIDEBAR_COLLAPSED_KEY), Ok(Some(v)) if v == "true")
}

pub fn set_compact_output(store: &dyn StoragePort, on: bool) -> Result<()> {
    store.set(SIDEBAR_COLLAPSED_KEY, if on { "true" } else { "false" })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Coach,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub text: String,
    pub sender: Speaker,
    pub date: DateTime<Utc>,
}

/// Rolling conversation memory shared by the live coach sessions.
pub struct CoachMemory<'a> {
    store: &'a dyn StoragePort,
}

impl<'a> CoachMemory<'a> {
    pub fn new(store: &'a dyn StoragePort) -> Self {
        CoachMemory { store }
    }

    pub fn entries(&self) -> Vec<MemoryEntry> {
        match self.store.get(COACH_MEMORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "coach memory unreadable, starting fresh");
                Vec::new()
            }),
            _ => Vec::new(),
        }
    }

    pub fn record(&self, text: &str, sender: Speaker) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let mut all = self.entries();
        all.push(MemoryEntry {
            text: text.to_string(),
            sender,
            date: Utc::now(),
        });
        let skip = all.len().saturating_sub(COACH_MEMORY_LIMIT);
        let kept: Vec<_> = all.into_iter().skip(skip).collect();
        self.store
            .set(COACH_MEMORY_KEY, &serde_json::to_string(&kept)?)
    }

    /// History block handed to the live coach as context.
    pub fn transcript(&self) -> String {
        let all = self.entries();
        if all.is_empty() {
            return "This is our very first session. Begin by introducing yourself warmly."
                .to_string();
        }
        all.iter()
            .map(|m| {
                let who = match m.sender {
                    Speaker::User => "User",
                    Speaker::Coach => "Coach",
                };
                format!(
                    "[{}] {}: {}",
                    m.date.with_timezone(&Local).format("%H:%M:%S"),
                    who,
                    m.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(COACH_MEMORY_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_round_trips_values_and_overwrites() {
        let s = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(s.get("k").unwrap(), None);
        s.set("k", "one").unwrap();
        s.set("k", "two").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("two"));
        s.remove("k").unwrap();
        assert_eq!(s.get("k").unwrap(), None);
    }

    #[test]
    fn coach_memory_keeps_last_thirty() {
        let s = MemoryStorage::new();
        let mem = CoachMemory::new(&s);
        for i in 0..35 {
            mem.record(&format!("note {i}"), Speaker::User).unwrap();
        }
        mem.record("   ", Speaker::Coach).unwrap();
        let all = mem.entries();
        assert_eq!(all.len(), COACH_MEMORY_LIMIT);
        assert_eq!(all[0].text, "note 5");
        assert_eq!(all.last().unwrap().text, "note 34");
    }
}
