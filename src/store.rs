// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::init_schema;
use crate::error::StoreError;
use crate::models::{DateRange, ImportRecord, Transaction};
use chrono::NaiveDate;
use log::{debug, warn};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Append-only transaction collection plus the import log.
pub trait TransactionStore {
    /// Structural existence check over all four transaction fields.
    fn exists(&self, tx: &Transaction) -> Result<bool, StoreError>;

    /// Transactions dated inside `range` (both bounds inclusive), newest first.
    fn query(&self, range: DateRange) -> Result<Vec<Transaction>, StoreError>;

    /// Persists `txs` together with `record`, or neither.
    fn append_batch(
        &mut self,
        txs: &[Transaction],
        record: &ImportRecord,
    ) -> Result<(), StoreError>;

    /// Import log, newest first.
    fn list_import_history(&self) -> Result<Vec<ImportRecord>, StoreError>;

    /// Runs `f` with writes from other handles held off, so a duplicate check
    /// followed by an append cannot interleave with another import.
    fn serialized<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        E: From<StoreError>,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        f(self)
    }
}

/// Text form used for amounts in SQLite. Normalizing keeps `-3.50` and `-3.5`
/// equal under SQL `=`.
fn amount_text(amount: Decimal) -> String {
    amount.normalize().to_string()
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get(0))?;
        debug!("opened {} (journal_mode={})", path.display(), mode);
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TransactionStore for SqliteStore {
    fn exists(&self, tx: &Transaction) -> Result<bool, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT EXISTS(SELECT 1 FROM transactions
             WHERE at=?1 AND name=?2 AND category=?3 AND amount=?4)",
        )?;
        let found: bool = stmt.query_row(
            params![tx.at, tx.name, tx.category, amount_text(tx.amount)],
            |r| r.get(0),
        )?;
        Ok(found)
    }

    fn query(&self, range: DateRange) -> Result<Vec<Transaction>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, at, name, category, amount FROM transactions
             WHERE at >= ?1 AND at <= ?2
             ORDER BY at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![range.start, range.end], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, at, name, category, amount) = row?;
            let at = NaiveDate::parse_from_str(&at, "%Y-%m-%d").map_err(|_| StoreError::Corrupt {
                id,
                reason: format!("invalid date '{}'", at),
            })?;
            let amount = Decimal::from_str(&amount).map_err(|_| StoreError::Corrupt {
                id,
                reason: format!("invalid amount '{}'", amount),
            })?;
            out.push(Transaction {
                at,
                name,
                category,
                amount,
            });
        }
        Ok(out)
    }

    fn append_batch(
        &mut self,
        txs: &[Transaction],
        record: &ImportRecord,
    ) -> Result<(), StoreError> {
        let sp = self.conn.savepoint()?;
        sp.execute(
            "INSERT INTO file_imports(at, file_name, imported) VALUES (?1, ?2, ?3)",
            params![record.at, record.file_name, record.imported as i64],
        )?;
        let import_id = sp.last_insert_rowid();
        {
            let mut stmt = sp.prepare_cached(
                "INSERT INTO transactions(at, name, category, amount, import_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for tx in txs {
                stmt.execute(params![
                    tx.at,
                    tx.name,
                    tx.category,
                    amount_text(tx.amount),
                    import_id
                ])?;
            }
        }
        sp.commit()?;
        debug!(
            "appended {} transactions under import #{}",
            txs.len(),
            import_id
        );
        Ok(())
    }

    fn list_import_history(&self) -> Result<Vec<ImportRecord>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, at, file_name, imported FROM file_imports ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, i64>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, at, file_name, imported) = row?;
            let at = NaiveDate::parse_from_str(&at, "%Y-%m-%d").map_err(|_| StoreError::Corrupt {
                id,
                reason: format!("invalid import date '{}'", at),
            })?;
            out.push(ImportRecord {
                at,
                file_name,
                imported: usize::try_from(imported).unwrap_or(0),
            });
        }
        Ok(out)
    }

    fn serialized<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        // Already inside a caller's transaction: that one holds the lock.
        if !self.conn.is_autocommit() {
            return f(self);
        }
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(StoreError::from)?;
        match f(self) {
            Ok(value) => match self.conn.execute_batch("COMMIT") {
                Ok(()) => Ok(value),
                Err(commit) => {
                    if !self.conn.is_autocommit() {
                        if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                            warn!("rollback after failed commit failed: {}", rollback);
                        }
                    }
                    Err(StoreError::from(commit).into())
                }
            },
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    warn!("rollback after failed write failed: {}", rollback);
                }
                Err(err)
            }
        }
    }
}

/// Store kept entirely in memory. Writers are serialized by the `&mut`
/// borrow alone.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    transactions: Vec<Transaction>,
    history: Vec<ImportRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            history: Vec::new(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

impl TransactionStore for MemoryStore {
    fn exists(&self, tx: &Transaction) -> Result<bool, StoreError> {
        Ok(self.transactions.contains(tx))
    }

    fn query(&self, range: DateRange) -> Result<Vec<Transaction>, StoreError> {
        let mut out: Vec<Transaction> = self
            .transactions
            .iter()
            .rev()
            .filter(|tx| range.contains(tx.at))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.at.cmp(&a.at));
        Ok(out)
    }

    fn append_batch(
        &mut self,
        txs: &[Transaction],
        record: &ImportRecord,
    ) -> Result<(), StoreError> {
        self.transactions.extend_from_slice(txs);
        self.history.push(record.clone());
        Ok(())
    }

    fn list_import_history(&self) -> Result<Vec<ImportRecord>, StoreError> {
        Ok(self.history.iter().rev().cloned().collect())
    }
}
