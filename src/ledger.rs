// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{AggregationEngine, category_shares};
use crate::error::{ImportError, StoreError};
use crate::extract::{CsvPreview, HeaderMapping, inspect_csv};
use crate::models::{
    CategoryShare, DateRange, FinanceAggregate, ImportRecord, Transaction, TransactionKind,
};
use crate::period::{Granularity, Period};
use crate::pipeline::ImportPipeline;
use crate::store::TransactionStore;
use std::collections::BTreeMap;

/// Everything the client side may ask of the core, over an injected store.
pub struct Ledger<S: TransactionStore> {
    store: S,
}

impl<S: TransactionStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn import_transactions(
        &mut self,
        bytes: &[u8],
        mapping: &HeaderMapping,
        file_name: &str,
    ) -> Result<usize, ImportError> {
        ImportPipeline::new(&mut self.store).run(bytes, mapping, file_name)
    }

    pub fn inspect_csv(&self, bytes: &[u8]) -> Result<CsvPreview, ImportError> {
        inspect_csv(bytes)
    }

    pub fn query_transactions(
        &self,
        range: DateRange,
        kind: TransactionKind,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut txs = self.store.query(range)?;
        txs.retain(|tx| kind.matches(tx));
        Ok(txs)
    }

    pub fn aggregate(&self, range: DateRange) -> Result<FinanceAggregate, StoreError> {
        AggregationEngine::new(&self.store).aggregate(range)
    }

    pub fn aggregate_by_period(
        &self,
        range: DateRange,
        granularity: Granularity,
    ) -> Result<BTreeMap<Period, FinanceAggregate>, StoreError> {
        AggregationEngine::new(&self.store).aggregate_by_period(range, granularity)
    }

    pub fn aggregate_by_category(
        &self,
        range: DateRange,
    ) -> Result<BTreeMap<String, FinanceAggregate>, StoreError> {
        AggregationEngine::new(&self.store).aggregate_by_category(range)
    }

    pub fn category_shares(
        &self,
        range: DateRange,
    ) -> Result<BTreeMap<String, CategoryShare>, StoreError> {
        Ok(category_shares(&self.aggregate_by_category(range)?))
    }

    pub fn list_import_history(&self) -> Result<Vec<ImportRecord>, StoreError> {
        self.store.list_import_history()
    }
}
