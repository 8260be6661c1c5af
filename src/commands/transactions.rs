// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::TransactionKind;
use crate::store::TransactionStore;
use crate::utils::{maybe_print_json, pretty_table, range_from_args};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::Serialize;

pub fn handle<S: TransactionStore>(ledger: &Ledger<S>, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        list(ledger, sub)?;
    }
    Ok(())
}

fn list<S: TransactionStore>(ledger: &Ledger<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = chrono::Local::now().date_naive();
    let data = query_rows(ledger, sub, today)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.at.to_string(),
                    r.name.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Name", "Category", "Amount"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub at: NaiveDate,
    pub name: String,
    pub category: String,
    pub amount: String,
}

pub fn query_rows<S: TransactionStore>(
    ledger: &Ledger<S>,
    sub: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<Vec<TransactionRow>> {
    let range = range_from_args(sub, today)?;
    let kind: TransactionKind = sub
        .get_one::<String>("kind")
        .map(|s| s.parse::<TransactionKind>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or_default();

    let mut txs = ledger.query_transactions(range, kind)?;
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txs.truncate(*limit);
    }

    Ok(txs
        .into_iter()
        .map(|tx| TransactionRow {
            at: tx.at,
            name: tx.name,
            category: tx.category,
            amount: format!("{:.2}", tx.amount),
        })
        .collect())
}
