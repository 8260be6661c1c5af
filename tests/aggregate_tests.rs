// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use banko::aggregate::{AggregationEngine, category_shares};
use banko::commands::reports::{chart_data, summary_data};
use banko::ledger::Ledger;
use banko::models::{DateRange, FinanceAggregate, Transaction};
use banko::period::{Granularity, derive, period_start};
use banko::store::{MemoryStore, SqliteStore, TransactionStore};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

fn scenario() -> MemoryStore {
    MemoryStore::with_transactions(vec![
        Transaction::new(d(2024, 1, 5), "Salary", "Income", dec(2000)),
        Transaction::new(d(2024, 1, 20), "Rent", "Housing", dec(-1200)),
        Transaction::new(d(2024, 2, 1), "Groceries", "Food", dec(-150)),
    ])
}

fn mixed() -> MemoryStore {
    MemoryStore::with_transactions(vec![
        Transaction::new(d(2023, 12, 31), "Before", "Misc", dec(-999)),
        Transaction::new(d(2024, 1, 1), "Gift", "Income", dec(50)),
        Transaction::new(d(2024, 1, 7), "Market", "Food", Decimal::new(-2345, 2)),
        Transaction::new(d(2024, 1, 8), "Market", "food", Decimal::new(-1055, 2)),
        Transaction::new(d(2024, 1, 8), "Transfer", "Savings", dec(0)),
        Transaction::new(d(2024, 3, 31), "Refund", "Food", dec(10)),
        Transaction::new(d(2024, 12, 30), "Salary", "Income", dec(2500)),
        Transaction::new(d(2024, 12, 31), "Rent", "Housing", dec(-1200)),
        Transaction::new(d(2025, 1, 1), "After", "Misc", dec(999)),
    ])
}

fn year_2024() -> DateRange {
    DateRange::new(d(2024, 1, 1), d(2024, 12, 31))
}

#[test]
fn monthly_scenario() {
    let store = scenario();
    let engine = AggregationEngine::new(&store);
    let by_month = engine
        .aggregate_by_period(DateRange::new(d(2024, 1, 1), d(2024, 2, 29)), Granularity::Month)
        .unwrap();

    let by_key: BTreeMap<String, FinanceAggregate> =
        by_month.into_iter().map(|(p, f)| (p.key, f)).collect();
    let mut expected = BTreeMap::new();
    expected.insert("2024-M01".to_string(), FinanceAggregate::new(dec(2000), dec(1200)));
    expected.insert("2024-M02".to_string(), FinanceAggregate::new(dec(0), dec(150)));
    assert_eq!(by_key, expected);
}

#[test]
fn totals_respect_inclusive_bounds() {
    let store = mixed();
    let total = AggregationEngine::new(&store).aggregate(year_2024()).unwrap();
    assert_eq!(total.income, dec(2560));
    assert_eq!(total.expense, Decimal::new(123400, 2));
    assert_eq!(total.balance(), total.income - total.expense);
}

#[test]
fn balance_is_income_minus_expense_for_any_range() {
    let store = mixed();
    let engine = AggregationEngine::new(&store);
    for (start, end) in [
        (d(2023, 1, 1), d(2025, 12, 31)),
        (d(2024, 1, 8), d(2024, 1, 8)),
        (d(2024, 6, 1), d(2024, 6, 30)),
        (d(2024, 12, 31), d(2024, 1, 1)),
    ] {
        let f = engine.aggregate(DateRange::new(start, end)).unwrap();
        assert_eq!(f.balance(), f.income - f.expense);
        assert!(f.income >= Decimal::ZERO);
        assert!(f.expense >= Decimal::ZERO);
    }
}

#[test]
fn periods_partition_the_range_for_every_granularity() {
    let store = mixed();
    let engine = AggregationEngine::new(&store);
    let total = engine.aggregate(year_2024()).unwrap();

    for granularity in Granularity::ALL {
        let by_period = engine.aggregate_by_period(year_2024(), granularity).unwrap();
        let income: Decimal = by_period.values().map(|f| f.income).sum();
        let expense: Decimal = by_period.values().map(|f| f.expense).sum();
        assert_eq!(income, total.income, "income for {granularity}");
        assert_eq!(expense, total.expense, "expense for {granularity}");
    }

    let by_total = engine
        .aggregate_by_period(year_2024(), Granularity::Total)
        .unwrap();
    assert_eq!(by_total.len(), 1);
    assert_eq!(by_total.keys().next().unwrap().key, "Total");
}

#[test]
fn zero_amounts_count_nowhere() {
    let store = MemoryStore::with_transactions(vec![Transaction::new(
        d(2024, 1, 8),
        "Transfer",
        "Savings",
        dec(0),
    )]);
    let engine = AggregationEngine::new(&store);
    let range = DateRange::new(d(2024, 1, 8), d(2024, 1, 8));
    assert_eq!(engine.aggregate(range).unwrap(), FinanceAggregate::default());

    let by_category = engine.aggregate_by_category(range).unwrap();
    assert_eq!(by_category["Savings"], FinanceAggregate::default());
}

#[test]
fn empty_range_is_all_zero() {
    let store = SqliteStore::open_in_memory().unwrap();
    let engine = AggregationEngine::new(&store);
    assert_eq!(
        engine.aggregate(year_2024()).unwrap(),
        FinanceAggregate::default()
    );
    assert!(
        engine
            .aggregate_by_period(year_2024(), Granularity::Week)
            .unwrap()
            .is_empty()
    );
    assert!(engine.aggregate_by_category(year_2024()).unwrap().is_empty());
}

#[test]
fn categories_are_case_sensitive() {
    let store = mixed();
    let by_category = AggregationEngine::new(&store)
        .aggregate_by_category(year_2024())
        .unwrap();
    assert_eq!(
        by_category["Food"],
        FinanceAggregate::new(dec(10), Decimal::new(2345, 2))
    );
    assert_eq!(
        by_category["food"],
        FinanceAggregate::new(dec(0), Decimal::new(1055, 2))
    );
    assert!(!by_category.contains_key("Misc"));
}

#[test]
fn category_shares_are_fractions_of_totals() {
    let mut by_category = BTreeMap::new();
    by_category.insert("Housing".to_string(), FinanceAggregate::new(dec(0), dec(300)));
    by_category.insert("Food".to_string(), FinanceAggregate::new(dec(0), dec(100)));

    let shares = category_shares(&by_category);
    assert_eq!(shares["Housing"].percentage_of_total_expense, Decimal::new(75, 2));
    assert_eq!(shares["Food"].percentage_of_total_expense, Decimal::new(25, 2));
    // No income at all: every income share is zero rather than a division error.
    assert_eq!(shares["Food"].percentage_of_total_income, Decimal::ZERO);
    assert_eq!(shares["Food"].expense, dec(100));
    assert_eq!(shares["Food"].balance, dec(-100));
}

#[test]
fn ledger_shares_over_the_store() {
    let ledger = Ledger::new(scenario());
    let shares = ledger
        .category_shares(DateRange::new(d(2024, 1, 1), d(2024, 2, 29)))
        .unwrap();
    assert_eq!(shares["Income"].percentage_of_total_income, Decimal::ONE);
    assert_eq!(shares["Income"].percentage_of_total_expense, Decimal::ZERO);
    assert_eq!(shares["Income"].balance, dec(2000));
    assert_eq!(
        shares["Housing"].percentage_of_total_expense,
        dec(1200) / dec(1350)
    );
}

#[test]
fn group_keys() {
    let date = d(2024, 1, 5);
    assert_eq!(derive(date, Granularity::Day), "2024-01-05");
    assert_eq!(derive(date, Granularity::Week), "2024-W01");
    assert_eq!(derive(date, Granularity::Month), "2024-M01");
    assert_eq!(derive(date, Granularity::Year), "2024");
    assert_eq!(derive(date, Granularity::Total), "Total");
    assert_eq!(derive(d(2024, 3, 9), Granularity::Month), "2024-M03");
}

#[test]
fn iso_weeks_cross_year_boundaries() {
    // 2024-12-30 is a Monday in the week holding 2025-01-02.
    assert_eq!(derive(d(2024, 12, 30), Granularity::Week), "2025-W01");
    assert_eq!(derive(d(2025, 1, 1), Granularity::Week), "2025-W01");
    // 2021-01-03 is a Sunday still belonging to the last ISO week of 2020.
    assert_eq!(derive(d(2021, 1, 3), Granularity::Week), "2020-W53");
    assert_eq!(period_start(d(2024, 1, 10), Granularity::Week), d(2024, 1, 8));
    assert_eq!(period_start(d(2021, 1, 3), Granularity::Week), d(2020, 12, 28));
}

#[test]
fn period_starts() {
    let date = d(2024, 7, 17);
    assert_eq!(period_start(date, Granularity::Day), date);
    assert_eq!(period_start(date, Granularity::Month), d(2024, 7, 1));
    assert_eq!(period_start(date, Granularity::Year), d(2024, 1, 1));
    assert_eq!(period_start(date, Granularity::Total), NaiveDate::MIN);
}

#[test]
fn granularity_parsing() {
    assert_eq!("Week".parse::<Granularity>().unwrap(), Granularity::Week);
    assert_eq!("total".parse::<Granularity>().unwrap(), Granularity::Total);
    assert!("fortnight".parse::<Granularity>().is_err());
}

#[test]
fn chart_rows_are_chronological() {
    let ledger = Ledger::new(mixed());
    let rows = chart_data(&ledger, year_2024(), Granularity::Week).unwrap();
    let keys: Vec<&str> = rows.iter().map(|r| r.period.as_str()).collect();
    assert_eq!(
        keys,
        vec!["2024-W01", "2024-W02", "2024-W13", "2025-W01"]
    );
    let starts: Vec<NaiveDate> = rows.iter().map(|r| r.period_start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);

    let last = rows.last().unwrap();
    assert_eq!(last.income, dec(2500));
    assert_eq!(last.expense, dec(1200));
    assert_eq!(last.balance, dec(1300));
}

#[test]
fn summary_row_matches_engine() {
    let ledger = Ledger::new(scenario());
    let range = DateRange::new(d(2024, 1, 1), d(2024, 2, 29));
    let row = summary_data(&ledger, range).unwrap();
    assert_eq!(row.income, dec(2000));
    assert_eq!(row.expense, dec(1350));
    assert_eq!(row.balance, dec(650));
    assert_eq!(ledger.store().query(range).unwrap().len(), 3);
}
