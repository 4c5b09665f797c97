// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Push: drain the local pending set to the cloud.

use log::{debug, info};

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::models::{SyncReport, SyncStatus, Transaction};
use crate::profile;
use crate::remote::{transaction_doc, Document, DocumentStore};
use crate::store::TransactionStore;

/// Pushes profile fields, then every dirty transaction, one at a time.
///
/// The first remote failure aborts the run. Rows already handled keep their
/// new state; the rest stay dirty for the next call.
pub async fn push(
    store: &TransactionStore,
    kv: &dyn KeyValueStore,
    remote: &dyn DocumentStore,
    owner_id: &str,
) -> Result<SyncReport> {
    profile::push(kv, remote, owner_id).await;

    let pending = store.list_dirty(owner_id)?;
    debug!("Pending local transactions for {}: {}", owner_id, pending.len());
    if pending.is_empty() {
        return Ok(SyncReport::default());
    }

    let mut report = SyncReport {
        total: pending.len(),
        ..Default::default()
    };
    for tx in pending {
        let path = transaction_doc(owner_id, &tx.id);
        debug!("Syncing tx {} (status: {})", tx.id, tx.sync_status);
        if tx.sync_status == SyncStatus::Deleted {
            remote.delete(&path).await?;
            store.remove_local(&tx.id)?;
            report.deleted += 1;
        } else {
            let synced = Transaction {
                sync_status: SyncStatus::Synced,
                ..tx
            };
            remote.set(&path, to_document(&synced)?).await?;
            store.set_status(&synced.id, SyncStatus::Synced)?;
            report.synced += 1;
        }
    }

    info!(
        "Sync finished for {}: {} synced, {} deleted",
        owner_id, report.synced, report.deleted
    );
    Ok(report)
}

pub(crate) fn to_document(tx: &Transaction) -> Result<Document> {
    match serde_json::to_value(tx)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::remote("transaction did not serialize to a document")),
    }
}
