// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{
    category_name, default_category, format_timestamp, SyncStatus, Transaction, TxFilter,
    TxKind,
};
use crate::utils::{check_category, fmt_money, maybe_print_json, parse_amount, parse_when, pretty_table};
use anyhow::{Context, Result};

pub async fn handle(ledger: &Ledger, owner_id: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(ledger, owner_id, sub)?;
        }
        Some(("list", sub)) => list(ledger, owner_id, sub)?,
        Some(("show", sub)) => show(ledger, owner_id, sub)?,
        Some(("edit", sub)) => {
            edit(ledger, owner_id, sub)?;
        }
        Some(("rm", sub)) => rm(ledger, owner_id, sub).await?,
        _ => {}
    }
    Ok(())
}

fn arg<'a>(sub: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    sub.get_one::<String>(name).map(|s| s.as_str())
}

fn parse_kind(sub: &clap::ArgMatches) -> Result<Option<TxKind>> {
    Ok(arg(sub, "type").map(str::parse::<TxKind>).transpose()?)
}

pub fn add(ledger: &Ledger, owner_id: &str, sub: &clap::ArgMatches) -> Result<Transaction> {
    let kind = parse_kind(sub)?.context("--type is required")?;
    let amount = parse_amount(arg(sub, "amount").context("--amount is required")?)?;
    let category = arg(sub, "category")
        .map(str::trim)
        .unwrap_or(default_category(kind));
    check_category(kind, category)?;
    let note = arg(sub, "note").map(|n| n.trim().to_string());
    let occurred_at = arg(sub, "date").map(parse_when).transpose()?;

    let tx = Transaction::new(owner_id, kind, amount, category, note, occurred_at)?;
    ledger.add_transaction(&tx)?;
    println!(
        "Recorded {} {} in {} ({})",
        kind,
        amount,
        category_name(category),
        tx.id
    );
    Ok(tx)
}

pub fn query_rows(ledger: &Ledger, owner_id: &str, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let filter = TxFilter {
        kind: parse_kind(sub)?,
        category: arg(sub, "category").map(|c| c.trim().to_string()),
        search: arg(sub, "search").map(str::to_string),
    };
    Ok(filter.apply(ledger.list_transactions(owner_id)?))
}

fn list(ledger: &Ledger, owner_id: &str, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(ledger, owner_id, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let ccy = ledger.profile(owner_id)?.display_currency;
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|t| {
            vec![
                t.occurred_at.format("%Y-%m-%d").to_string(),
                t.kind.to_string(),
                fmt_money(t.signed_amount(), &ccy),
                category_name(&t.category_id).to_string(),
                t.note.clone().unwrap_or_default(),
                t.sync_status.to_string(),
                t.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Type", "Amount", "Category", "Note", "Sync", "Id"],
            rows
        )
    );
    Ok(())
}

// Only live rows belonging to the signed-in owner are visible.
fn owned(ledger: &Ledger, owner_id: &str, id: &str) -> Result<Transaction> {
    let tx = ledger.get_transaction(id)?;
    if tx.owner_id != owner_id || tx.sync_status == SyncStatus::Deleted {
        return Err(crate::error::Error::NotFound(id.to_string()).into());
    }
    Ok(tx)
}

fn show(ledger: &Ledger, owner_id: &str, sub: &clap::ArgMatches) -> Result<()> {
    let tx = owned(ledger, owner_id, arg(sub, "id").context("id is required")?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tx)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Id".into(), tx.id.clone()],
        vec!["Type".into(), tx.kind.to_string()],
        vec!["Amount".into(), format!("{:.2}", tx.amount)],
        vec!["Category".into(), category_name(&tx.category_id).to_string()],
        vec!["Note".into(), tx.note.clone().unwrap_or_default()],
        vec!["Date".into(), format_timestamp(&tx.occurred_at)],
        vec!["Created".into(), format_timestamp(&tx.created_at)],
        vec!["Updated".into(), format_timestamp(&tx.updated_at)],
        vec!["Sync".into(), tx.sync_status.to_string()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

pub fn edit(ledger: &Ledger, owner_id: &str, sub: &clap::ArgMatches) -> Result<Transaction> {
    let mut tx = owned(ledger, owner_id, arg(sub, "id").context("id is required")?)?;
    if let Some(kind) = parse_kind(sub)? {
        if kind != tx.kind && arg(sub, "category").is_none() {
            tx.category_id = default_category(kind).to_string();
        }
        tx.kind = kind;
    }
    if let Some(a) = arg(sub, "amount") {
        tx.amount = parse_amount(a)?;
    }
    if let Some(c) = arg(sub, "category") {
        tx.category_id = c.trim().to_string();
    }
    if arg(sub, "type").is_some() || arg(sub, "category").is_some() {
        check_category(tx.kind, &tx.category_id)?;
    }
    if let Some(n) = arg(sub, "note") {
        tx.note = Some(n.trim().to_string()).filter(|n| !n.is_empty());
    }
    if let Some(d) = arg(sub, "date") {
        tx.occurred_at = parse_when(d)?;
    }
    ledger.update_transaction(&tx)?;
    println!("Updated transaction {}", tx.id);
    ledger.get_transaction(&tx.id).map_err(Into::into)
}

async fn rm(ledger: &Ledger, owner_id: &str, sub: &clap::ArgMatches) -> Result<()> {
    let tx = owned(ledger, owner_id, arg(sub, "id").context("id is required")?)?;
    ledger.delete_transaction(&tx.id).await?;
    println!("Deleted transaction {} (removed from backup on next sync)", tx.id);
    Ok(())
}
