// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use pocketledger::commands::{backup, profile, reports, transactions};
use pocketledger::error::Error;
use pocketledger::kv::SqliteKv;
use pocketledger::ledger::{Ledger, Session};
use pocketledger::models::{SyncStatus, TxKind};
use pocketledger::remote::memory::MemoryDocumentStore;
use pocketledger::remote::DocumentStore;
use pocketledger::store::TransactionStore;
use pocketledger::cli;

fn setup() -> Ledger {
    let remote: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    Ledger::new(
        TransactionStore::open_in_memory().unwrap(),
        Box::new(SqliteKv::open_in_memory().unwrap()),
        Some(remote),
        Some(Session {
            user_id: "u1".into(),
        }),
    )
}

fn tx_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["pocketledger", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => tx_m.clone(),
        _ => panic!("no tx subcommand"),
    }
}

fn sub<'a>(m: &'a clap::ArgMatches, name: &str) -> &'a clap::ArgMatches {
    match m.subcommand() {
        Some((n, s)) if n == name => s,
        _ => panic!("no {} subcommand", name),
    }
}

#[test]
fn add_uses_default_category_and_pending_status() {
    let ledger = setup();
    let m = tx_matches(&["add", "--type", "income", "--amount", "2500", "--date", "2025-01-31"]);
    let t = transactions::add(&ledger, "u1", sub(&m, "add")).unwrap();
    assert_eq!(t.kind, TxKind::Income);
    assert_eq!(t.category_id, "salary");
    assert_eq!(t.sync_status, SyncStatus::Pending);
    assert_eq!(
        pocketledger::models::format_timestamp(&t.occurred_at),
        "2025-01-31T00:00:00.000Z"
    );
}

#[test]
fn add_rejects_bad_amount_and_category() {
    let ledger = setup();
    let m = tx_matches(&["add", "--type", "expense", "--amount", "0"]);
    let err = transactions::add(&ledger, "u1", sub(&m, "add")).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));

    let m = tx_matches(&["add", "--type", "expense", "--amount", "5", "--category", "salary"]);
    let err = transactions::add(&ledger, "u1", sub(&m, "add")).unwrap_err();
    assert!(err.to_string().contains("Unknown expense category"));
    assert!(ledger.list_transactions("u1").unwrap().is_empty());
}

#[test]
fn list_filters_by_type_category_and_search() {
    let ledger = setup();
    for args in [
        vec!["add", "--type", "expense", "--amount", "12", "--category", "food", "--note", "Pizza night"],
        vec!["add", "--type", "expense", "--amount", "60", "--category", "bills"],
        vec!["add", "--type", "income", "--amount", "900", "--category", "business"],
    ] {
        let m = tx_matches(&args);
        transactions::add(&ledger, "u1", sub(&m, "add")).unwrap();
    }

    let m = tx_matches(&["list", "--type", "expense"]);
    assert_eq!(transactions::query_rows(&ledger, "u1", sub(&m, "list")).unwrap().len(), 2);

    let m = tx_matches(&["list", "--search", "PIZZA"]);
    let rows = transactions::query_rows(&ledger, "u1", sub(&m, "list")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category_id, "food");

    let m = tx_matches(&["list", "--category", "business"]);
    let rows = transactions::query_rows(&ledger, "u1", sub(&m, "list")).unwrap();
    assert_eq!(rows[0].amount, 900.0);
}

#[test]
fn edit_switching_type_resets_category() {
    let ledger = setup();
    let m = tx_matches(&["add", "--type", "expense", "--amount", "10", "--category", "gift"]);
    assert!(transactions::add(&ledger, "u1", sub(&m, "add")).is_err());

    let m = tx_matches(&["add", "--type", "expense", "--amount", "10"]);
    let t = transactions::add(&ledger, "u1", sub(&m, "add")).unwrap();
    ledger.store().set_status(&t.id, SyncStatus::Synced).unwrap();

    let m = tx_matches(&["edit", t.id.as_str(), "--type", "income", "--note", "refund"]);
    let edited = transactions::edit(&ledger, "u1", sub(&m, "edit")).unwrap();
    assert_eq!(edited.kind, TxKind::Income);
    assert_eq!(edited.category_id, "salary");
    assert_eq!(edited.note.as_deref(), Some("refund"));
    assert_eq!(edited.sync_status, SyncStatus::Pending);
}

#[test]
fn edit_of_someone_elses_row_is_not_found() {
    let ledger = setup();
    let m = tx_matches(&["add", "--type", "expense", "--amount", "10"]);
    let t = transactions::add(&ledger, "u1", sub(&m, "add")).unwrap();
    let m = tx_matches(&["edit", t.id.as_str(), "--amount", "11"]);
    let err = transactions::edit(&ledger, "u2", sub(&m, "edit")).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
}

#[tokio::test]
async fn rm_then_sync_reports_the_tombstone() {
    let ledger = setup();
    let m = tx_matches(&["add", "--type", "expense", "--amount", "10"]);
    let t = transactions::add(&ledger, "u1", sub(&m, "add")).unwrap();

    let m = tx_matches(&["rm", t.id.as_str()]);
    transactions::handle(&ledger, "u1", &m).await.unwrap();
    assert!(ledger.list_transactions("u1").unwrap().is_empty());

    let top = cli::build_cli().get_matches_from(["pocketledger", "pending", "--json"]);
    let summary = backup::pending(&ledger, "u1", sub(&top, "pending")).unwrap();
    assert_eq!(summary.transaction_count, 1);

    let top = cli::build_cli().get_matches_from(["pocketledger", "sync", "--json"]);
    let report = backup::sync(&ledger, "u1", sub(&top, "sync")).await.unwrap();
    assert_eq!((report.total, report.synced, report.deleted), (1, 0, 1));
}

#[test]
fn summary_and_profile_commands() {
    let ledger = setup();
    for args in [
        vec!["add", "--type", "income", "--amount", "100"],
        vec!["add", "--type", "expense", "--amount", "40"],
    ] {
        let m = tx_matches(&args);
        transactions::add(&ledger, "u1", sub(&m, "add")).unwrap();
    }
    let top = cli::build_cli().get_matches_from(["pocketledger", "summary", "--json"]);
    let totals = reports::summary(&ledger, "u1", sub(&top, "summary")).unwrap();
    assert_eq!(totals.balance, 60.0);

    let top = cli::build_cli().get_matches_from(["pocketledger", "profile", "set-currency", "usd"]);
    profile::handle(&ledger, "u1", sub(&top, "profile")).unwrap();
    assert_eq!(ledger.profile("u1").unwrap().display_currency, "USD");

    let top = cli::build_cli().get_matches_from(["pocketledger", "profile", "set-currency", "dollars"]);
    assert!(profile::handle(&ledger, "u1", sub(&top, "profile")).is_err());
    assert_eq!(ledger.pending_summary("u1").unwrap().profile_field_count, 1);
}

#[tokio::test]
async fn handle_dispatches_add_and_edit() {
    let ledger = setup();
    let m = tx_matches(&["add", "--type", "expense", "--amount", "25", "--category", "health"]);
    transactions::handle(&ledger, "u1", &m).await.unwrap();

    let rows = ledger.list_transactions("u1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category_id, "health");

    let m = tx_matches(&["edit", rows[0].id.as_str(), "--amount", "30", "--note", "pharmacy"]);
    transactions::handle(&ledger, "u1", &m).await.unwrap();

    let edited = ledger.get_transaction(&rows[0].id).unwrap();
    assert_eq!(edited.amount, 30.0);
    assert_eq!(edited.note.as_deref(), Some("pharmacy"));
    assert_eq!(edited.category_id, "health");
}
