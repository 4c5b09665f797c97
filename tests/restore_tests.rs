// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde_json::json;
use std::sync::Arc;

use pocketledger::error::Error;
use pocketledger::kv::{KeyValueStore, SqliteKv};
use pocketledger::ledger::{Ledger, Session};
use pocketledger::models::{RestoreReport, SyncStatus, Transaction, TxKind};
use pocketledger::profile::ProfileField;
use pocketledger::remote::memory::MemoryDocumentStore;
use pocketledger::remote::{transaction_doc, user_doc, Document, DocumentStore};
use pocketledger::store::TransactionStore;

fn setup(session: Option<&str>) -> (Ledger, Arc<MemoryDocumentStore>) {
    let remote = Arc::new(MemoryDocumentStore::new());
    let shared: Arc<dyn DocumentStore> = remote.clone();
    let ledger = Ledger::new(
        TransactionStore::open_in_memory().unwrap(),
        Box::new(SqliteKv::open_in_memory().unwrap()),
        Some(shared),
        session.map(|id| Session {
            user_id: id.to_string(),
        }),
    );
    (ledger, remote)
}

fn doc(v: serde_json::Value) -> Document {
    v.as_object().cloned().unwrap()
}

fn cloud_tx(id: &str, amount: f64) -> Document {
    doc(json!({
        "id": id,
        "userId": "u1",
        "type": "income",
        "amount": amount,
        "categoryId": "salary",
        "note": "payday",
        "date": "2025-02-01T09:00:00.000Z",
        "createdAt": "2025-02-01T09:00:00.000Z",
        "updatedAt": "2025-02-01T09:00:00.000Z",
        "syncStatus": "pending"
    }))
}

#[tokio::test]
async fn requires_a_signed_in_owner() {
    let (ledger, remote) = setup(None);
    assert!(matches!(
        ledger.pull_from_cloud("u1").await,
        Err(Error::Unauthenticated)
    ));

    let (ledger, _) = setup(Some("someone-else"));
    assert!(matches!(
        ledger.pull_from_cloud("u1").await,
        Err(Error::Unauthenticated)
    ));
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn cloud_rows_are_upserted_as_synced() {
    let (ledger, remote) = setup(Some("u1"));
    remote
        .seed(&transaction_doc("u1", "r1"), cloud_tx("r1", 1500.0))
        .unwrap();
    remote
        .seed(&transaction_doc("u1", "r2"), cloud_tx("r2", 250.0))
        .unwrap();

    // A stale local copy of r1 is replaced.
    let mut stale = Transaction::new("u1", TxKind::Income, 1.0, "salary", None, None).unwrap();
    stale.id = "r1".into();
    ledger.add_transaction(&stale).unwrap();

    let report = ledger.pull_from_cloud("u1").await.unwrap();
    assert_eq!(
        report,
        RestoreReport {
            profile: false,
            transactions: 2
        }
    );
    let r1 = ledger.get_transaction("r1").unwrap();
    assert_eq!(r1.amount, 1500.0);
    assert_eq!(r1.note.as_deref(), Some("payday"));
    assert_eq!(r1.sync_status, SyncStatus::Synced);
    assert!(ledger.list_dirty("u1").unwrap().is_empty());
}

#[tokio::test]
async fn unsynced_local_work_survives() {
    let (ledger, remote) = setup(Some("u1"));
    remote
        .seed(&transaction_doc("u1", "r1"), cloud_tx("r1", 10.0))
        .unwrap();
    let local = Transaction::new("u1", TxKind::Expense, 42.0, "food", None, None).unwrap();
    ledger.add_transaction(&local).unwrap();

    ledger.pull_from_cloud("u1").await.unwrap();

    assert_eq!(ledger.get_transaction(&local.id).unwrap(), local);
    assert_eq!(ledger.list_transactions("u1").unwrap().len(), 2);
    assert_eq!(ledger.pending_summary("u1").unwrap().transaction_count, 1);
}

#[tokio::test]
async fn remotely_deleted_rows_are_not_removed() {
    let (ledger, remote) = setup(Some("u1"));
    let t = Transaction::new("u1", TxKind::Expense, 3.0, "bills", None, None).unwrap();
    ledger.add_transaction(&t).unwrap();
    ledger.sync("u1").await.unwrap();
    remote.delete(&transaction_doc("u1", &t.id)).await.unwrap();

    let report = ledger.pull_from_cloud("u1").await.unwrap();
    assert_eq!(report.transactions, 0);
    assert!(ledger.store().get(&t.id).unwrap().is_some());
}

#[tokio::test]
async fn profile_document_overrides_local_edits() {
    let (ledger, remote) = setup(Some("u1"));
    remote
        .seed(
            &user_doc("u1"),
            doc(json!({
                "name": "Legacy Name",
                "displayName": "Ana",
                "profileImageUrl": "data:image/png;base64,AAAA",
                "currency": "EUR"
            })),
        )
        .unwrap();
    ledger
        .set_profile_field("u1", ProfileField::DisplayName, "Local edit")
        .unwrap();
    ledger
        .set_profile_field("u1", ProfileField::DisplayCurrency, "USD")
        .unwrap();

    let report = ledger.pull_from_cloud("u1").await.unwrap();
    assert!(report.profile);

    let profile = ledger.profile("u1").unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Ana"));
    assert_eq!(
        profile.avatar_image.as_deref(),
        Some("data:image/png;base64,AAAA")
    );
    assert_eq!(profile.display_currency, "EUR");
    assert!(ledger.pending_summary("u1").unwrap().is_empty());
}

#[tokio::test]
async fn legacy_name_is_used_when_display_name_missing() {
    let (ledger, remote) = setup(Some("u1"));
    remote
        .seed(&user_doc("u1"), doc(json!({"name": "Old Ana"})))
        .unwrap();
    ledger
        .set_profile_field("u1", ProfileField::AvatarImage, "file:///tmp/me.png")
        .unwrap();

    ledger.pull_from_cloud("u1").await.unwrap();

    assert_eq!(
        ledger.kv().get("user_name_u1").unwrap().as_deref(),
        Some("Old Ana")
    );
    // Absent in the cloud: local value kept, flag still cleared.
    assert_eq!(
        ledger.kv().get("user_image_u1").unwrap().as_deref(),
        Some("file:///tmp/me.png")
    );
    assert_eq!(ledger.kv().get("user_image_pending_sync_u1").unwrap(), None);
    assert_eq!(ledger.profile("u1").unwrap().display_currency, "IQD");
}

#[tokio::test]
async fn malformed_and_foreign_documents_are_skipped() {
    let (ledger, remote) = setup(Some("u1"));
    remote
        .seed(&transaction_doc("u1", "ok"), cloud_tx("ok", 1.0))
        .unwrap();
    remote
        .seed(&transaction_doc("u1", "bad"), doc(json!({"id": "bad"})))
        .unwrap();
    let mut foreign = cloud_tx("foreign", 2.0);
    foreign.insert("userId".into(), json!("u2"));
    remote
        .seed(&transaction_doc("u1", "foreign"), foreign)
        .unwrap();

    let report = ledger.pull_from_cloud("u1").await.unwrap();
    assert_eq!(report.transactions, 1);
    assert!(ledger.store().get("foreign").unwrap().is_none());
}

#[tokio::test]
async fn remote_failure_propagates() {
    let (ledger, remote) = setup(Some("u1"));
    remote.go_offline();
    assert!(matches!(
        ledger.pull_from_cloud("u1").await,
        Err(Error::RemoteUnavailable(_))
    ));
}
