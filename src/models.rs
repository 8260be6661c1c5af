// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single bank movement. Two transactions are the same transaction when all
/// four fields are equal; the store's surrogate key is not part of the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub at: NaiveDate,
    pub name: String,
    pub category: String,
    pub amount: Decimal,
}

impl Transaction {
    pub fn new(
        at: NaiveDate,
        name: impl Into<String>,
        category: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            at,
            name: name.into(),
            category: category.into(),
            amount,
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub at: NaiveDate,
    pub file_name: String,
    pub imported: usize,
}

/// Income and expense totals over some scope. Both sides are kept non-negative;
/// the balance is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceAggregate {
    pub income: Decimal,
    pub expense: Decimal,
}

impl FinanceAggregate {
    pub fn new(income: Decimal, expense: Decimal) -> Self {
        Self { income, expense }
    }

    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }

    /// Folds one signed amount in. Zero touches neither side.
    pub fn add(&mut self, amount: Decimal) {
        if amount > Decimal::ZERO {
            self.income += amount;
        } else if amount < Decimal::ZERO {
            self.expense += -amount;
        }
    }
}

/// A category bucket together with its share of the range totals, as fractions
/// in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub percentage_of_total_income: Decimal,
    pub percentage_of_total_expense: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionKind {
    Income,
    Expense,
    #[default]
    All,
}

impl TransactionKind {
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            TransactionKind::Income => tx.is_income(),
            TransactionKind::Expense => tx.is_expense(),
            TransactionKind::All => true,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "all" => Ok(TransactionKind::All),
            other => Err(format!(
                "Unknown transaction kind '{}', expected income|expense|all",
                other
            )),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::All => "all",
        };
        f.write_str(s)
    }
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
