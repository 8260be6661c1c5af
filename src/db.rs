// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::SqliteStore;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Banko", "banko"));

/// Environment variable overriding the default database location.
pub const DB_ENV: &str = "BANKO_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("banko.sqlite"))
}

pub fn open_or_init(explicit: Option<&Path>) -> Result<SqliteStore> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    SqliteStore::open(&path).with_context(|| format!("Open DB at {}", path.display()))
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS file_imports(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        at TEXT NOT NULL,
        file_name TEXT NOT NULL,
        imported INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        at TEXT NOT NULL,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        amount TEXT NOT NULL, -- normalized decimal, negative = expense
        import_id INTEGER,
        FOREIGN KEY(import_id) REFERENCES file_imports(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_at ON transactions(at);
    CREATE INDEX IF NOT EXISTS idx_transactions_identity
        ON transactions(at, name, category, amount);
    "#,
    )
}
