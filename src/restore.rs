// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pull: merge the cloud copy into the local stores.
//!
//! Additive only. Local rows missing from the cloud are left alone, so
//! unpushed work survives and remotely deleted rows are not removed here.

use log::{debug, info, warn};

use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::models::{RestoreReport, SyncStatus, Transaction};
use crate::profile;
use crate::remote::{transactions_collection, user_doc, DocumentStore};
use crate::store::TransactionStore;

pub async fn pull(
    store: &TransactionStore,
    kv: &dyn KeyValueStore,
    remote: &dyn DocumentStore,
    owner_id: &str,
) -> Result<RestoreReport> {
    let mut report = RestoreReport::default();

    if let Some(doc) = remote.get(&user_doc(owner_id)).await? {
        profile::apply_remote(kv, owner_id, &doc)?;
        report.profile = true;
        debug!("Profile loaded from cloud for {}", owner_id);
    }

    let docs = remote
        .list_collection(&transactions_collection(owner_id))
        .await?;
    for doc in docs {
        let mut tx: Transaction = match serde_json::from_value(doc.into()) {
            Ok(tx) => tx,
            Err(e) => {
                warn!("Skipping malformed cloud transaction for {}: {}", owner_id, e);
                continue;
            }
        };
        if tx.owner_id != owner_id {
            warn!(
                "Skipping cloud transaction {} owned by {} under {}",
                tx.id, tx.owner_id, owner_id
            );
            continue;
        }
        tx.sync_status = SyncStatus::Synced;
        store.upsert(&tx)?;
        report.transactions += 1;
    }

    info!(
        "Restore finished for {}: profile={}, {} transaction(s)",
        owner_id, report.profile, report.transactions
    );
    Ok(report)
}
