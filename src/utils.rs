// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::DateRange;
use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Months, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn fmt_money(d: &Decimal, symbol: &str) -> String {
    format!("{} {}", d.round_dp(2), symbol)
}

/// Fraction in `[0, 1]` rendered as a percentage.
pub fn fmt_percent(d: &Decimal) -> String {
    format!("{:.1}%", (*d * Decimal::ONE_HUNDRED).round_dp(1))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn month_end(d: NaiveDate) -> Result<NaiveDate> {
    let last_day = match d.month() {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if NaiveDate::from_ymd_opt(d.year(), 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        m => return Err(anyhow!("Invalid month number {}", m)),
    };
    NaiveDate::from_ymd_opt(d.year(), d.month(), last_day)
        .ok_or_else(|| anyhow!("Invalid month in {}", d))
}

/// Named ranges relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    CurrentMonth,
    LastMonth,
    LastTwoMonths,
    LastYear,
}

impl RangePreset {
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        let months_back = |n: u32| {
            today
                .checked_sub_months(Months::new(n))
                .ok_or_else(|| anyhow!("Date out of range: {} minus {} months", today, n))
        };
        let range = match self {
            RangePreset::CurrentMonth => DateRange::new(month_start(today), month_end(today)?),
            RangePreset::LastMonth => {
                let last = months_back(1)?;
                DateRange::new(month_start(last), month_end(last)?)
            }
            RangePreset::LastTwoMonths => {
                DateRange::new(month_start(months_back(2)?), month_end(today)?)
            }
            RangePreset::LastYear => {
                let start = months_back(12)?;
                DateRange::new(
                    NaiveDate::from_ymd_opt(start.year(), 1, 1)
                        .ok_or_else(|| anyhow!("Invalid year {}", start.year()))?,
                    NaiveDate::from_ymd_opt(today.year(), 12, 31)
                        .ok_or_else(|| anyhow!("Invalid year {}", today.year()))?,
                )
            }
        };
        Ok(range)
    }
}

impl FromStr for RangePreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "current-month" => Ok(RangePreset::CurrentMonth),
            "last-month" => Ok(RangePreset::LastMonth),
            "last-2-months" => Ok(RangePreset::LastTwoMonths),
            "last-year" => Ok(RangePreset::LastYear),
            other => Err(anyhow!(
                "Unknown range '{}', expected current-month|last-month|last-2-months|last-year",
                other
            )),
        }
    }
}

/// Date range from `--from/--to`, falling back to `--range` (default: the
/// current month).
pub fn range_from_args(sub: &clap::ArgMatches, today: NaiveDate) -> Result<DateRange> {
    let from = sub.get_one::<String>("from");
    let to = sub.get_one::<String>("to");
    match (from, to) {
        (Some(f), Some(t)) => Ok(DateRange::new(parse_date(f)?, parse_date(t)?)),
        (None, None) => {
            let preset: RangePreset = sub
                .get_one::<String>("range")
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or(RangePreset::CurrentMonth);
            preset.resolve(today)
        }
        _ => Err(anyhow!("--from and --to must be given together")),
    }
}
