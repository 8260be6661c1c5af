// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

/// Display currency. Amounts are never converted; this only labels them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub currency_label: String,
    pub currency_symbol: String,
    pub currency_code: String,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            currency_label: "euro".into(),
            currency_symbol: "€".into(),
            currency_code: "EUR".into(),
        }
    }
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_currency(conn: &Connection) -> Result<Currency> {
    let default = Currency::default();
    Ok(Currency {
        currency_label: get_setting(conn, "currency_label")?.unwrap_or(default.currency_label),
        currency_symbol: get_setting(conn, "currency_symbol")?
            .unwrap_or(default.currency_symbol),
        currency_code: get_setting(conn, "currency_code")?.unwrap_or(default.currency_code),
    })
}

pub fn set_currency(conn: &Connection, currency: &Currency) -> Result<()> {
    set_setting(conn, "currency_label", &currency.currency_label)?;
    set_setting(conn, "currency_symbol", &currency.currency_symbol)?;
    set_setting(conn, "currency_code", &currency.currency_code.to_uppercase())?;
    Ok(())
}
