// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reading bank CSV exports whose delimiter and column names are not known in
//! advance. Columns are resolved through a [`HeaderMapping`] from each canonical
//! key to the header aliases a given bank uses for it.

use crate::error::{ImportError, MappingError};
use crate::models::Transaction;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Values kept per header by [`CsvRecordExtractor::inspect`].
pub const SAMPLE_VALUES: usize = 5;

const DATE_FORMAT: &str = "%d/%m/%Y";
const DELIMITER_CANDIDATES: &[u8] = &[b'\t', b';', b',', b'|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalKey {
    At,
    Name,
    Category,
    Amount,
}

impl CanonicalKey {
    pub const ALL: [CanonicalKey; 4] = [
        CanonicalKey::At,
        CanonicalKey::Name,
        CanonicalKey::Category,
        CanonicalKey::Amount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalKey::At => "at",
            CanonicalKey::Name => "name",
            CanonicalKey::Category => "category",
            CanonicalKey::Amount => "amount",
        }
    }
}

impl FromStr for CanonicalKey {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "at" => Ok(CanonicalKey::At),
            "name" => Ok(CanonicalKey::Name),
            "category" => Ok(CanonicalKey::Category),
            "amount" => Ok(CanonicalKey::Amount),
            other => Err(MappingError::UnknownKey(other.to_string())),
        }
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header aliases for each canonical key. The first alias holding a
/// non-empty value in a row wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderMapping {
    #[serde(default)]
    pub at: Vec<String>,
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub amount: Vec<String>,
}

impl HeaderMapping {
    /// Column layout of the French bank export the tool was first written for.
    pub fn bank_export() -> Self {
        Self {
            at: vec!["Date de comptabilisation".into()],
            name: vec!["Libelle simplifie".into()],
            category: vec!["Categorie".into()],
            amount: vec!["Debit".into(), "Credit".into()],
        }
    }

    pub fn from_json(s: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn aliases(&self, key: CanonicalKey) -> &[String] {
        match key {
            CanonicalKey::At => &self.at,
            CanonicalKey::Name => &self.name,
            CanonicalKey::Category => &self.category,
            CanonicalKey::Amount => &self.amount,
        }
    }

    fn aliases_mut(&mut self, key: CanonicalKey) -> &mut Vec<String> {
        match key {
            CanonicalKey::At => &mut self.at,
            CanonicalKey::Name => &mut self.name,
            CanonicalKey::Category => &mut self.category,
            CanonicalKey::Amount => &mut self.amount,
        }
    }

    /// Applies `key=Alias1|Alias2`, replacing the aliases of `key`.
    pub fn assign(&mut self, assignment: &str) -> Result<(), MappingError> {
        let (key, aliases) = assignment
            .split_once('=')
            .ok_or_else(|| MappingError::Assignment(assignment.to_string()))?;
        let key: CanonicalKey = key.parse()?;
        let aliases: Vec<String> = aliases
            .split('|')
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();
        if aliases.is_empty() {
            return Err(MappingError::Assignment(assignment.to_string()));
        }
        *self.aliases_mut(key) = aliases;
        Ok(())
    }
}

/// One data row with every canonical field resolved and parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRow {
    pub line: u64,
    pub at: NaiveDate,
    pub name: String,
    pub category: String,
    pub amount: Decimal,
}

impl From<ExtractedRow> for Transaction {
    fn from(row: ExtractedRow) -> Self {
        Transaction {
            at: row.at,
            name: row.name,
            category: row.category,
            amount: row.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvPreview {
    pub delimiter: char,
    pub headers: Vec<String>,
    pub first_values_by_header: BTreeMap<String, Vec<String>>,
}

#[derive(Debug)]
pub struct CsvRecordExtractor {
    content: String,
    delimiter: u8,
    headers: Vec<String>,
}

impl CsvRecordExtractor {
    /// Decodes `bytes` as Latin-1 and sniffs the dialect from the header line.
    pub fn new(bytes: &[u8]) -> Result<Self, ImportError> {
        let content = encoding_rs::mem::decode_latin1(bytes).into_owned();
        let header_line = content.lines().next().ok_or(ImportError::EmptyInput)?;
        let delimiter =
            sniff_delimiter(header_line).ok_or_else(|| ImportError::DialectDetection {
                header: header_line.to_string(),
            })?;
        let headers: Vec<String> = split_record(header_line, delimiter)
            .map(|r| r.iter().map(|h| h.trim().to_string()).collect())
            .unwrap_or_default();
        debug!(
            "sniffed delimiter {:?} with {} headers",
            delimiter as char,
            headers.len()
        );
        Ok(Self {
            content,
            delimiter,
            headers,
        })
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn reader(&self) -> csv::Reader<&[u8]> {
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(self.content.as_bytes())
    }

    /// Lazily extracts the data rows. Each item fails on its own, so callers
    /// decide whether to stop at the first error.
    pub fn records<'a>(&'a self, mapping: &'a HeaderMapping) -> Records<'a> {
        let mut index = HashMap::new();
        for (i, header) in self.headers.iter().enumerate() {
            index.entry(header.as_str()).or_insert(i);
        }
        Records {
            rows: self.reader().into_records(),
            index,
            mapping,
        }
    }

    /// Headers plus up to [`SAMPLE_VALUES`] raw values for each of them.
    pub fn inspect(&self) -> Result<CsvPreview, ImportError> {
        let mut first_values_by_header: BTreeMap<String, Vec<String>> = self
            .headers
            .iter()
            .map(|h| (h.clone(), Vec::new()))
            .collect();
        for result in self.reader().into_records().take(SAMPLE_VALUES) {
            let record = result.map_err(csv_error)?;
            for (i, header) in self.headers.iter().enumerate() {
                let values = first_values_by_header.entry(header.clone()).or_default();
                if values.len() < SAMPLE_VALUES {
                    values.push(record.get(i).unwrap_or("").to_string());
                }
            }
        }
        Ok(CsvPreview {
            delimiter: self.delimiter as char,
            headers: self.headers.clone(),
            first_values_by_header,
        })
    }
}

pub fn inspect_csv(bytes: &[u8]) -> Result<CsvPreview, ImportError> {
    CsvRecordExtractor::new(bytes)?.inspect()
}

pub struct Records<'a> {
    rows: StringRecordsIntoIter<&'a [u8]>,
    index: HashMap<&'a str, usize>,
    mapping: &'a HeaderMapping,
}

impl Records<'_> {
    fn resolve<'r>(&self, record: &'r StringRecord, key: CanonicalKey) -> Option<&'r str> {
        self.mapping
            .aliases(key)
            .iter()
            .filter_map(|alias| self.index.get(alias.as_str()))
            .filter_map(|&i| record.get(i))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }

    fn has_column(&self, key: CanonicalKey) -> bool {
        self.mapping
            .aliases(key)
            .iter()
            .any(|alias| self.index.contains_key(alias.as_str()))
    }

    fn require<'r>(
        &self,
        record: &'r StringRecord,
        key: CanonicalKey,
        line: u64,
    ) -> Result<&'r str, ImportError> {
        self.resolve(record, key)
            .ok_or_else(|| ImportError::MissingField {
                line,
                key: key.as_str(),
                aliases: self.mapping.aliases(key).to_vec(),
            })
    }

    fn extract(&self, record: StringRecord) -> Result<ExtractedRow, ImportError> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let at_raw = self.require(&record, CanonicalKey::At, line)?;
        let at = NaiveDate::parse_from_str(at_raw, DATE_FORMAT).map_err(|_| {
            ImportError::DateFormat {
                line,
                value: at_raw.to_string(),
            }
        })?;
        let name = self.require(&record, CanonicalKey::Name, line)?.to_string();
        let category = self
            .require(&record, CanonicalKey::Category, line)?
            .to_string();
        // A mapped amount column left blank in every alias counts as zero.
        let amount_raw = match self.resolve(&record, CanonicalKey::Amount) {
            Some(raw) => raw,
            None if self.has_column(CanonicalKey::Amount) => "",
            None => self.require(&record, CanonicalKey::Amount, line)?,
        };
        let amount = parse_amount(amount_raw).ok_or_else(|| ImportError::AmountFormat {
            line,
            value: amount_raw.to_string(),
        })?;

        Ok(ExtractedRow {
            line,
            at,
            name,
            category,
            amount,
        })
    }
}

impl Iterator for Records<'_> {
    type Item = Result<ExtractedRow, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.rows.next()?;
        Some(result.map_err(csv_error).and_then(|r| self.extract(r)))
    }
}

fn csv_error(err: csv::Error) -> ImportError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    ImportError::Csv { line, source: err }
}

/// Parses a comma-decimal amount such as `-1 234,56`. Blank input is zero.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.contains(',') {
        cleaned = cleaned.replace('.', "").replace(',', ".");
    }
    let unsigned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if unsigned.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(unsigned).ok()
}

/// Picks the candidate that splits the header line into the most fields.
/// Candidates producing a single field are not considered at all.
fn sniff_delimiter(header_line: &str) -> Option<u8> {
    let mut best: Option<(u8, usize)> = None;
    for &delim in DELIMITER_CANDIDATES {
        let fields = split_record(header_line, delim)
            .map(|r| r.len())
            .unwrap_or(0);
        if fields <= 1 {
            continue;
        }
        if best.is_none_or(|(_, n)| fields > n) {
            best = Some((delim, fields));
        }
    }
    best.map(|(delim, _)| delim)
}

fn split_record(line: &str, delimiter: u8) -> Option<StringRecord> {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
}
