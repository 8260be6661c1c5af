// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use banko::error::ImportError;
use banko::extract::{
    CanonicalKey, CsvRecordExtractor, ExtractedRow, HeaderMapping, inspect_csv, parse_amount,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn simple_mapping() -> HeaderMapping {
    HeaderMapping::from_json(
        r#"{"at":["Date"],"name":["Name"],"category":["Category"],"amount":["Amount"]}"#,
    )
    .unwrap()
}

fn extract(bytes: &[u8], mapping: &HeaderMapping) -> Result<Vec<ExtractedRow>, ImportError> {
    let extractor = CsvRecordExtractor::new(bytes)?;
    extractor.records(mapping).collect()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn semicolon_export_with_comma_decimals() {
    let csv = b"Date;Name;Category;Amount\n01/03/2024;Coffee;Food;-3,50\n";
    let rows = extract(csv, &simple_mapping()).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.line, 2);
    assert_eq!(row.at, d(2024, 3, 1));
    assert_eq!(row.name, "Coffee");
    assert_eq!(row.category, "Food");
    assert_eq!(row.amount, Decimal::new(-35, 1));
}

#[test]
fn sniffs_comma_tab_and_pipe() {
    let extractor = CsvRecordExtractor::new(b"Date,Name,Category,Amount\n").unwrap();
    assert_eq!(extractor.delimiter(), b',');
    let extractor = CsvRecordExtractor::new(b"Date\tName\tCategory\tAmount\n").unwrap();
    assert_eq!(extractor.delimiter(), b'\t');
    let extractor = CsvRecordExtractor::new(b"Date|Name|Category|Amount\n").unwrap();
    assert_eq!(extractor.delimiter(), b'|');
    assert_eq!(extractor.headers(), ["Date", "Name", "Category", "Amount"]);
}

#[test]
fn quoted_comma_decimal_in_comma_separated_file() {
    let csv = b"Date,Name,Category,Amount\n05/01/2024,Salary,Income,\"2000,00\"\n";
    let rows = extract(csv, &simple_mapping()).unwrap();
    assert_eq!(rows[0].amount, Decimal::new(2000, 0));
}

#[test]
fn semicolon_header_with_commas_inside_quotes() {
    let csv = b"\"Date, booked\";Name;Category;Amount\n02/01/2024;Shop;Food;-1\n";
    let extractor = CsvRecordExtractor::new(csv).unwrap();
    assert_eq!(extractor.delimiter(), b';');
    assert_eq!(extractor.headers()[0], "Date, booked");
}

#[test]
fn empty_payload_is_rejected() {
    let err = CsvRecordExtractor::new(b"").unwrap_err();
    assert!(matches!(err, ImportError::EmptyInput));
}

#[test]
fn single_column_header_has_no_dialect() {
    let err = CsvRecordExtractor::new(b"JustOneColumn\nvalue\n").unwrap_err();
    match err {
        ImportError::DialectDetection { header } => assert_eq!(header, "JustOneColumn"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn aliases_are_tried_in_order() {
    let csv = b"Date;Libelle;Categorie;Debit;Credit\n\
        02/01/2024;Rent;Housing;-10,00;\n\
        03/01/2024;Refund;Misc;;25,00\n";
    let mut mapping = HeaderMapping::default();
    mapping.assign("at=Date").unwrap();
    mapping.assign("name=Label|Libelle").unwrap();
    mapping.assign("category=Categorie").unwrap();
    mapping.assign("amount=Debit|Credit").unwrap();

    let rows = extract(csv, &mapping).unwrap();
    assert_eq!(rows[0].name, "Rent");
    assert_eq!(rows[0].amount, Decimal::new(-10, 0));
    assert_eq!(rows[1].amount, Decimal::new(25, 0));
}

#[test]
fn missing_field_names_key_aliases_and_line() {
    let csv = b"Date;Name;Category;Amount\n01/03/2024;Coffee;Food;-1\n01/03/2024;;Food;-2\n";
    let err = extract(csv, &simple_mapping()).unwrap_err();
    match err {
        ImportError::MissingField { line, key, aliases } => {
            assert_eq!(line, 3);
            assert_eq!(key, "name");
            assert_eq!(aliases, vec!["Name".to_string()]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn blank_amount_is_zero() {
    let csv = b"Date;Name;Category;Amount\n01/03/2024;Nothing;Misc;\n";
    let rows = extract(csv, &simple_mapping()).unwrap();
    assert_eq!(rows[0].amount, Decimal::ZERO);
}

#[test]
fn unmapped_amount_column_is_missing_not_zero() {
    let csv = b"Date;Name;Category;Montant\n01/03/2024;Coffee;Food;-3,50\n";
    let err = extract(csv, &simple_mapping()).unwrap_err();
    match err {
        ImportError::MissingField { line, key, aliases } => {
            assert_eq!(line, 2);
            assert_eq!(key, "amount");
            assert_eq!(aliases, vec!["Amount"]);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let mut no_amount = simple_mapping();
    no_amount.amount.clear();
    let csv = b"Date;Name;Category;Amount\n01/03/2024;Coffee;Food;-3,50\n";
    let err = extract(csv, &no_amount).unwrap_err();
    assert!(matches!(err, ImportError::MissingField { key: "amount", .. }));
}

#[test]
fn blank_debit_with_absent_credit_column_is_zero() {
    let csv = b"Date;Name;Category;Debit\n01/03/2024;Transfer;Misc;\n02/03/2024;Coffee;Food;-3,50\n";
    let mut mapping = simple_mapping();
    mapping.assign("amount=Debit|Credit").unwrap();
    let rows = extract(csv, &mapping).unwrap();
    assert_eq!(rows[0].amount, Decimal::ZERO);
    assert_eq!(rows[1].amount, Decimal::new(-35, 1));
}

#[test]
fn every_key_reports_its_own_missing_column() {
    let csv = b"Date;Name;Category;Amount\n01/03/2024;Coffee;Food;-3,50\n";
    for key in CanonicalKey::ALL {
        let mut mapping = simple_mapping();
        mapping.assign(&format!("{key}=Nope")).unwrap();
        match extract(csv, &mapping).unwrap_err() {
            ImportError::MissingField { key: missing, .. } => assert_eq!(missing, key.as_str()),
            other => panic!("unexpected error for {key}: {other:?}"),
        }
    }
}

#[test]
fn iso_dates_are_rejected() {
    let csv = b"Date;Name;Category;Amount\n2024-03-01;Coffee;Food;-3,50\n";
    let err = extract(csv, &simple_mapping()).unwrap_err();
    match err {
        ImportError::DateFormat { line, value } => {
            assert_eq!(line, 2);
            assert_eq!(value, "2024-03-01");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn malformed_amount_is_rejected() {
    let csv = b"Date;Name;Category;Amount\n01/03/2024;Coffee;Food;abc\n";
    let err = extract(csv, &simple_mapping()).unwrap_err();
    assert!(err.to_string().contains("invalid amount 'abc'"));
}

#[test]
fn rows_are_produced_lazily() {
    let csv = b"Date;Name;Category;Amount\n01/03/2024;Coffee;Food;-1\nnot-a-date;X;Y;1\n";
    let extractor = CsvRecordExtractor::new(csv).unwrap();
    let mapping = simple_mapping();
    let mut rows = extractor.records(&mapping);
    assert!(rows.next().unwrap().is_ok());
    assert!(rows.next().unwrap().is_err());
    assert!(rows.next().is_none());
}

#[test]
fn latin1_bytes_are_decoded() {
    let csv = b"Date;Libell\xe9;Cat\xe9gorie;Montant\n01/03/2024;Caf\xe9;Food;-3,50\n";
    let mut mapping = HeaderMapping::default();
    mapping.assign("at=Date").unwrap();
    mapping.assign("name=Libellé").unwrap();
    mapping.assign("category=Catégorie").unwrap();
    mapping.assign("amount=Montant").unwrap();
    let rows = extract(csv, &mapping).unwrap();
    assert_eq!(rows[0].name, "Café");
}

#[test]
fn inspect_keeps_at_most_five_values_per_header() {
    let mut csv = String::from("Date;Name;Category;Amount\n");
    for i in 0..10 {
        csv.push_str(&format!("0{}/01/2024;Row {};Cat;-{}\n", i % 9 + 1, i, i));
    }
    let preview = inspect_csv(csv.as_bytes()).unwrap();
    assert_eq!(preview.delimiter, ';');
    assert_eq!(preview.headers, vec!["Date", "Name", "Category", "Amount"]);
    for header in &preview.headers {
        assert_eq!(preview.first_values_by_header[header].len(), 5);
    }
    assert_eq!(preview.first_values_by_header["Name"][0], "Row 0");
    assert_eq!(preview.first_values_by_header["Name"][4], "Row 4");
}

#[test]
fn inspect_short_file_keeps_what_is_there() {
    let preview = inspect_csv(b"A,B\n1,2\n3\n").unwrap();
    assert_eq!(preview.first_values_by_header["A"], vec!["1", "3"]);
    assert_eq!(preview.first_values_by_header["B"], vec!["2", ""]);
}

#[test]
fn amount_normalization() {
    assert_eq!(parse_amount("1 234,56"), Some(Decimal::new(123456, 2)));
    assert_eq!(parse_amount("1.234,56"), Some(Decimal::new(123456, 2)));
    assert_eq!(parse_amount("+12,5"), Some(Decimal::new(125, 1)));
    assert_eq!(parse_amount("-0,99"), Some(Decimal::new(-99, 2)));
    assert_eq!(parse_amount("12.5"), Some(Decimal::new(125, 1)));
    assert_eq!(parse_amount("  "), Some(Decimal::ZERO));
    assert_eq!(parse_amount("1,2,3"), None);
    assert_eq!(parse_amount("-"), None);
}

#[test]
fn mapping_configuration_errors() {
    let mut mapping = HeaderMapping::bank_export();
    assert!(mapping.assign("amount").is_err());
    assert!(mapping.assign("payee=Name").is_err());
    assert!(mapping.assign("name=").is_err());
    assert!(HeaderMapping::from_json(r#"{"at":["Date"],"payee":["Name"]}"#).is_err());

    mapping.assign("name=Libelle operation|Libelle simplifie").unwrap();
    assert_eq!(mapping.name, vec!["Libelle operation", "Libelle simplifie"]);
    assert_eq!(mapping.amount, vec!["Debit", "Credit"]);
}
