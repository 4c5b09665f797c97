// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use pocketledger::{cli, commands, config::Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let level = if matches.get_flag("quiet") {
        "warn"
    } else if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::from_env()?;
    let ledger = config.open_ledger()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Transactions stored at {}", config.db_path.display());
            println!("Settings stored at {}", config.kv_path.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&ledger, &config.owner()?, sub).await?,
        Some(("summary", sub)) => {
            commands::reports::summary(&ledger, &config.owner()?, sub)?;
        }
        Some(("pending", sub)) => {
            commands::backup::pending(&ledger, &config.owner()?, sub)?;
        }
        Some(("sync", sub)) => {
            commands::backup::sync(&ledger, &config.owner()?, sub).await?;
        }
        Some(("restore", sub)) => {
            commands::backup::restore(&ledger, &config.owner()?, sub).await?;
        }
        Some(("profile", sub)) => commands::profile::handle(&ledger, &config.owner()?, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
