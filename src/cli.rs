// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("from")
            .long("from")
            .value_name("YYYY-MM-DD")
            .requires("to")
            .help("First day of the range (inclusive)"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .value_name("YYYY-MM-DD")
            .requires("from")
            .help("Last day of the range (inclusive)"),
    )
    .arg(
        Arg::new("range")
            .long("range")
            .value_name("PRESET")
            .conflicts_with_all(["from", "to"])
            .value_parser(["current-month", "last-month", "last-2-months", "last-year"])
            .help("Predefined range relative to today [default: current-month]"),
    )
}

pub fn build_cli() -> Command {
    Command::new("banko")
        .about("Import bank CSV exports and report income and expenses")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("SQLite database to use (default: platform data dir, or $BANKO_DB)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("import")
                .about("Import CSV files and review past imports")
                .subcommand(
                    Command::new("transactions")
                        .about("Import transactions from a bank CSV export")
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(
                            Arg::new("file-name")
                                .long("file-name")
                                .help("Name recorded in the import history [default: file name of --path]"),
                        )
                        .arg(
                            Arg::new("mapping")
                                .long("mapping")
                                .value_name("JSON")
                                .help("JSON file mapping at/name/category/amount to header aliases"),
                        )
                        .arg(
                            Arg::new("map")
                                .long("map")
                                .value_name("KEY=HEADER|HEADER")
                                .action(ArgAction::Append)
                                .help("Override the header aliases of one key"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("inspect")
                        .about("Show detected headers and the first values of each column")
                        .arg(Arg::new("path").long("path").required(true)),
                ))
                .subcommand(json_args(
                    Command::new("history").about("List past imports, newest first"),
                )),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(json_args(range_args(
                    Command::new("list")
                        .about("List transactions in a date range, newest first")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense", "all"])
                                .default_value("all"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))),
        )
        .subcommand(
            Command::new("report")
                .about("Income and expense reports")
                .subcommand(json_args(range_args(
                    Command::new("summary").about("Income, expense and balance over a range"),
                )))
                .subcommand(json_args(range_args(
                    Command::new("chart")
                        .about("Income and expense per period")
                        .arg(
                            Arg::new("group-by")
                                .long("group-by")
                                .value_parser(["day", "week", "month", "year", "total"])
                                .default_value("month"),
                        ),
                )))
                .subcommand(json_args(range_args(
                    Command::new("categories")
                        .about("Income and expense per category with shares of the totals"),
                ))),
        )
        .subcommand(
            Command::new("currency")
                .about("Display currency")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("code").long("code").required(true))
                        .arg(Arg::new("symbol").long("symbol").required(true))
                        .arg(Arg::new("label").long("label").required(true)),
                ),
        )
}
