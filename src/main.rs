// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;

use banko::{cli, commands, db, ledger::Ledger};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_arg = matches.get_one::<String>("db").map(Path::new);
    let mut ledger = Ledger::new(db::open_or_init(db_arg)?);

    match matches.subcommand() {
        Some(("init", _)) => match db_arg {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("import", sub)) => commands::importer::handle(&mut ledger, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&ledger, sub)?,
        Some(("report", sub)) => commands::reports::handle(&ledger, sub)?,
        Some(("currency", sub)) => commands::currency::handle(&ledger, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
