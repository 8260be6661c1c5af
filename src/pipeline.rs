// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ImportError;
use crate::extract::{CsvRecordExtractor, HeaderMapping};
use crate::models::{ImportRecord, Transaction};
use crate::store::TransactionStore;
use chrono::NaiveDate;
use log::{debug, info};

/// Turns one CSV payload into new transactions plus one import-log entry.
pub struct ImportPipeline<'s, S: TransactionStore> {
    store: &'s mut S,
    today: NaiveDate,
}

impl<'s, S: TransactionStore> ImportPipeline<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self {
            store,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Date stamped on the import record.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Imports `bytes` and returns how many rows were appended. Rows already in
    /// the store are skipped. Any extraction error aborts before the store is
    /// touched.
    pub fn run(
        &mut self,
        bytes: &[u8],
        mapping: &HeaderMapping,
        file_name: &str,
    ) -> Result<usize, ImportError> {
        let extractor = CsvRecordExtractor::new(bytes)?;
        let candidates: Vec<Transaction> = extractor
            .records(mapping)
            .map(|row| row.map(Transaction::from))
            .collect::<Result<_, _>>()?;
        let total = candidates.len();
        let today = self.today;

        let imported = self.store.serialized(|store: &mut S| -> Result<usize, ImportError> {
            let mut batch = Vec::with_capacity(candidates.len());
            for tx in candidates {
                if store.exists(&tx)? {
                    debug!("skipping duplicate {} '{}' {}", tx.at, tx.name, tx.amount);
                    continue;
                }
                batch.push(tx);
            }
            let record = ImportRecord {
                at: today,
                file_name: file_name.to_string(),
                imported: batch.len(),
            };
            store.append_batch(&batch, &record)?;
            Ok(batch.len())
        })?;

        info!(
            "imported {} of {} rows from '{}' ({} duplicates)",
            imported,
            total,
            file_name,
            total - imported
        );
        Ok(imported)
    }
}
