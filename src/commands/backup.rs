// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{PendingSummary, RestoreReport, SyncReport};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn pending(ledger: &Ledger, owner_id: &str, m: &clap::ArgMatches) -> Result<PendingSummary> {
    let summary = ledger.pending_summary(owner_id)?;
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &summary)? {
        match summary.message() {
            Some(msg) => println!("{}", msg),
            None => println!("All changes are backed up."),
        }
    }
    Ok(summary)
}

pub async fn sync(ledger: &Ledger, owner_id: &str, m: &clap::ArgMatches) -> Result<SyncReport> {
    let report = ledger.sync(owner_id).await.context("Sync failed")?;
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &report)? {
        if report.total == 0 {
            println!("Everything is already backed up.");
        } else {
            println!(
                "{}",
                pretty_table(
                    &["Total", "Synced", "Deleted"],
                    vec![vec![
                        report.total.to_string(),
                        report.synced.to_string(),
                        report.deleted.to_string(),
                    ]],
                )
            );
        }
    }
    Ok(report)
}

pub async fn restore(ledger: &Ledger, owner_id: &str, m: &clap::ArgMatches) -> Result<RestoreReport> {
    let report = ledger
        .pull_from_cloud(owner_id)
        .await
        .context("Restore failed")?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &report)? {
        return Ok(report);
    }
    println!(
        "Restored {} transaction(s) and {}.",
        report.transactions,
        if report.profile {
            "profile data"
        } else {
            "no profile data"
        }
    );
    let still_pending = ledger.list_dirty(owner_id)?.len();
    if still_pending > 0 {
        println!(
            "Your {} local transaction(s) are still pending backup.",
            still_pending
        );
    }
    Ok(report)
}
