// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::StoreError;
use crate::models::{CategoryShare, DateRange, FinanceAggregate, Transaction};
use crate::period::{Granularity, Period};
use crate::store::TransactionStore;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Income/expense summaries over one store. Every entry point reads the range
/// once and folds it with [`FinanceAggregate::add`].
pub struct AggregationEngine<'s, S: TransactionStore> {
    store: &'s S,
}

impl<'s, S: TransactionStore> AggregationEngine<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn aggregate(&self, range: DateRange) -> Result<FinanceAggregate, StoreError> {
        let txs = self.store.query(range)?;
        Ok(partition(&txs, |_| ()).remove(&()).unwrap_or_default())
    }

    pub fn aggregate_by_period(
        &self,
        range: DateRange,
        granularity: Granularity,
    ) -> Result<BTreeMap<Period, FinanceAggregate>, StoreError> {
        let txs = self.store.query(range)?;
        Ok(partition(&txs, |tx| Period::of(tx.at, granularity)))
    }

    pub fn aggregate_by_category(
        &self,
        range: DateRange,
    ) -> Result<BTreeMap<String, FinanceAggregate>, StoreError> {
        let txs = self.store.query(range)?;
        Ok(partition(&txs, |tx| tx.category.clone()))
    }
}

fn partition<K: Ord>(
    txs: &[Transaction],
    key: impl Fn(&Transaction) -> K,
) -> BTreeMap<K, FinanceAggregate> {
    let mut out: BTreeMap<K, FinanceAggregate> = BTreeMap::new();
    for tx in txs {
        out.entry(key(tx)).or_default().add(tx.amount);
    }
    out
}

/// Adds each category's fraction of the income and expense totals. A zero
/// total yields a zero fraction.
pub fn category_shares(
    by_category: &BTreeMap<String, FinanceAggregate>,
) -> BTreeMap<String, CategoryShare> {
    let total_income: Decimal = by_category.values().map(|f| f.income).sum();
    let total_expense: Decimal = by_category.values().map(|f| f.expense).sum();
    by_category
        .iter()
        .map(|(category, finance)| {
            let share = CategoryShare {
                income: finance.income,
                expense: finance.expense,
                balance: finance.balance(),
                percentage_of_total_income: fraction(finance.income, total_income),
                percentage_of_total_expense: fraction(finance.expense, total_expense),
            };
            (category.clone(), share)
        })
        .collect()
}

fn fraction(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        part / total
    }
}
