// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::extract::{CsvPreview, HeaderMapping, SAMPLE_VALUES};
use crate::ledger::Ledger;
use crate::store::TransactionStore;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle<S: TransactionStore>(ledger: &mut Ledger<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let imported = import_transactions(ledger, sub)?;
            println!("Imported {} new transactions", imported);
            Ok(())
        }
        Some(("inspect", sub)) => inspect(ledger, sub),
        Some(("history", sub)) => history(ledger, sub),
        _ => Ok(()),
    }
}

fn cli_path(sub: &clap::ArgMatches) -> Result<&str> {
    let path = sub
        .get_one::<String>("path")
        .context("--path is required")?
        .trim();
    Ok(path)
}

/// Mapping from `--mapping` (or the built-in bank layout), then `--map` overrides.
pub fn mapping_from_args(sub: &clap::ArgMatches) -> Result<HeaderMapping> {
    let mut mapping = match sub.get_one::<String>("mapping") {
        Some(p) => {
            let raw = std::fs::read_to_string(p.trim())
                .with_context(|| format!("Read mapping {}", p))?;
            HeaderMapping::from_json(&raw).with_context(|| format!("Parse mapping {}", p))?
        }
        None => HeaderMapping::bank_export(),
    };
    if let Some(assignments) = sub.get_many::<String>("map") {
        for a in assignments {
            mapping.assign(a)?;
        }
    }
    Ok(mapping)
}

pub fn import_transactions<S: TransactionStore>(
    ledger: &mut Ledger<S>,
    sub: &clap::ArgMatches,
) -> Result<usize> {
    let path = cli_path(sub)?;
    let mapping = mapping_from_args(sub)?;
    let bytes = std::fs::read(path).with_context(|| format!("Open CSV {}", path))?;
    let file_name = match sub.get_one::<String>("file-name") {
        Some(n) => n.trim().to_string(),
        None => Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string()),
    };
    let imported = ledger
        .import_transactions(&bytes, &mapping, &file_name)
        .with_context(|| format!("Import {}", path))?;
    Ok(imported)
}

pub fn preview<S: TransactionStore>(
    ledger: &Ledger<S>,
    sub: &clap::ArgMatches,
) -> Result<CsvPreview> {
    let path = cli_path(sub)?;
    let bytes = std::fs::read(path).with_context(|| format!("Open CSV {}", path))?;
    let preview = ledger
        .inspect_csv(&bytes)
        .with_context(|| format!("Inspect {}", path))?;
    Ok(preview)
}

fn inspect<S: TransactionStore>(ledger: &Ledger<S>, sub: &clap::ArgMatches) -> Result<()> {
    let preview = preview(ledger, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &preview)? {
        return Ok(());
    }
    println!("Delimiter: {:?}", preview.delimiter);
    let rows: Vec<Vec<String>> = (0..SAMPLE_VALUES)
        .map(|i| {
            preview
                .headers
                .iter()
                .map(|h| {
                    preview
                        .first_values_by_header
                        .get(h)
                        .and_then(|v| v.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect::<Vec<String>>()
        })
        .filter(|row| row.iter().any(|v| !v.is_empty()))
        .collect();
    let headers: Vec<&str> = preview.headers.iter().map(String::as_str).collect();
    println!("{}", pretty_table(&headers, rows));
    Ok(())
}

fn history<S: TransactionStore>(ledger: &Ledger<S>, sub: &clap::ArgMatches) -> Result<()> {
    let records = ledger.list_import_history()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &records)? {
        let rows = records
            .iter()
            .map(|r| vec![r.at.to_string(), r.file_name.clone(), r.imported.to_string()])
            .collect();
        println!("{}", pretty_table(&["Date", "File", "Imported"], rows));
    }
    Ok(())
}
