// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::settings::{Currency, get_currency, set_currency};
use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(ledger: &Ledger<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    let conn = ledger.store().connection();
    match m.subcommand() {
        Some(("show", sub)) => {
            let currency = get_currency(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &currency)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Code", "Symbol", "Label"],
                        vec![vec![
                            currency.currency_code,
                            currency.currency_symbol,
                            currency.currency_label,
                        ]],
                    )
                );
            }
        }
        Some(("set", sub)) => {
            let arg = |name: &str| -> Result<String> {
                Ok(sub
                    .get_one::<String>(name)
                    .with_context(|| format!("--{} is required", name))?
                    .trim()
                    .to_string())
            };
            let currency = Currency {
                currency_code: arg("code")?,
                currency_symbol: arg("symbol")?,
                currency_label: arg("label")?,
            };
            set_currency(conn, &currency)?;
            println!(
                "Display currency set to {}",
                currency.currency_code.to_uppercase()
            );
        }
        _ => {}
    }
    Ok(())
}
