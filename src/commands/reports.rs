// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{CategoryShare, DateRange};
use crate::period::Granularity;
use crate::settings::get_currency;
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, pretty_table, range_from_args};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(ledger: &Ledger<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    let symbol = get_currency(ledger.store().connection())?.currency_symbol;
    let today = chrono::Local::now().date_naive();
    match m.subcommand() {
        Some(("summary", sub)) => summary(ledger, sub, today, &symbol)?,
        Some(("chart", sub)) => chart(ledger, sub, today, &symbol)?,
        Some(("categories", sub)) => categories(ledger, sub, today, &symbol)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SummaryRow {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRow {
    pub period: String,
    pub period_start: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

pub fn summary_data<S: TransactionStore>(
    ledger: &Ledger<S>,
    range: DateRange,
) -> Result<SummaryRow> {
    let finance = ledger.aggregate(range)?;
    Ok(SummaryRow {
        income: finance.income,
        expense: finance.expense,
        balance: finance.balance(),
    })
}

/// Per-period rows in chronological order.
pub fn chart_data<S: TransactionStore>(
    ledger: &Ledger<S>,
    range: DateRange,
    granularity: Granularity,
) -> Result<Vec<PeriodRow>> {
    let by_period = ledger.aggregate_by_period(range, granularity)?;
    Ok(by_period
        .into_iter()
        .map(|(period, finance)| PeriodRow {
            balance: finance.balance(),
            period: period.key,
            period_start: period.start,
            income: finance.income,
            expense: finance.expense,
        })
        .collect())
}

pub fn categories_data<S: TransactionStore>(
    ledger: &Ledger<S>,
    range: DateRange,
) -> Result<BTreeMap<String, CategoryShare>> {
    Ok(ledger.category_shares(range)?)
}

fn summary<S: TransactionStore>(
    ledger: &Ledger<S>,
    sub: &clap::ArgMatches,
    today: NaiveDate,
    symbol: &str,
) -> Result<()> {
    let range = range_from_args(sub, today)?;
    let row = summary_data(ledger, range)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &row)? {
        println!("{} to {}", range.start, range.end);
        println!(
            "{}",
            pretty_table(
                &["Income", "Expense", "Balance"],
                vec![vec![
                    fmt_money(&row.income, symbol),
                    fmt_money(&row.expense, symbol),
                    fmt_money(&row.balance, symbol),
                ]],
            )
        );
    }
    Ok(())
}

fn chart<S: TransactionStore>(
    ledger: &Ledger<S>,
    sub: &clap::ArgMatches,
    today: NaiveDate,
    symbol: &str,
) -> Result<()> {
    let range = range_from_args(sub, today)?;
    let granularity: Granularity = sub
        .get_one::<String>("group-by")
        .map(|s| s.parse::<Granularity>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or(Granularity::Month);
    let data = chart_data(ledger, range, granularity)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.period.clone(),
                    fmt_money(&r.income, symbol),
                    fmt_money(&r.expense, symbol),
                    fmt_money(&r.balance, symbol),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Period", "Income", "Expense", "Balance"], rows)
        );
    }
    Ok(())
}

fn categories<S: TransactionStore>(
    ledger: &Ledger<S>,
    sub: &clap::ArgMatches,
    today: NaiveDate,
    symbol: &str,
) -> Result<()> {
    let range = range_from_args(sub, today)?;
    let data = categories_data(ledger, range)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let mut items: Vec<_> = data.into_iter().collect();
        // Biggest spenders first, then biggest earners.
        items.sort_by(|a, b| {
            b.1.expense
                .cmp(&a.1.expense)
                .then_with(|| b.1.income.cmp(&a.1.income))
        });
        let rows = items
            .into_iter()
            .map(|(cat, share)| {
                vec![
                    cat,
                    fmt_money(&share.income, symbol),
                    fmt_percent(&share.percentage_of_total_income),
                    fmt_money(&share.expense, symbol),
                    fmt_percent(&share.percentage_of_total_expense),
                    fmt_money(&share.balance, symbol),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Category", "Income", "% Income", "Expense", "% Expense", "Balance"],
                rows
            )
        );
    }
    Ok(())
}
