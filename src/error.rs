// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Transaction store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    #[error("Stored row {id} is corrupt: {reason}")]
    Corrupt { id: i64, reason: String },
}

/// Everything that can abort an import. All variants except `Store` are raised
/// while extracting, before the store is written to.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Empty CSV file")]
    EmptyInput,

    #[error("Could not detect the CSV delimiter from header line '{header}'")]
    DialectDetection { header: String },

    #[error("Line {line}: no value found for key '{key}' within headers [{}]", .aliases.join(", "))]
    MissingField {
        line: u64,
        key: &'static str,
        aliases: Vec<String>,
    },

    #[error("Line {line}: invalid date '{value}', expected DD/MM/YYYY")]
    DateFormat { line: u64, value: String },

    #[error("Line {line}: invalid amount '{value}'")]
    AmountFormat { line: u64, value: String },

    #[error("Line {line}: malformed CSV record: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Unknown mapping key '{0}', expected one of at, name, category, amount")]
    UnknownKey(String),

    #[error("Invalid mapping assignment '{0}', expected key=Header1|Header2")]
    Assignment(String),

    #[error("Invalid mapping JSON: {0}")]
    Json(#[from] serde_json::Error),
}
