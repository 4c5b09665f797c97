// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The core contract the presentation layer talks to.
//!
//! A `Ledger` is built once at startup and owns the local stores, the remote
//! handle and the signed-in session. `sync` and `pull_from_cloud` for the same
//! owner never overlap: a second call while one runs is rejected.

use log::info;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::models::{
    PendingSummary, RestoreReport, SyncReport, SyncStatus, Totals, Transaction, summarize,
};
use crate::pending;
use crate::profile::{self, Profile, ProfileField};
use crate::remote::DocumentStore;
use crate::restore;
use crate::store::TransactionStore;
use crate::sync;

/// The authenticated account, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

pub struct Ledger {
    store: TransactionStore,
    kv: Box<dyn KeyValueStore>,
    remote: Option<Arc<dyn DocumentStore>>,
    session: Option<Session>,
    in_flight: Mutex<HashSet<String>>,
}

impl Ledger {
    pub fn new(
        store: TransactionStore,
        kv: Box<dyn KeyValueStore>,
        remote: Option<Arc<dyn DocumentStore>>,
        session: Option<Session>,
    ) -> Self {
        Self {
            store,
            kv,
            remote,
            session,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn sign_in(&mut self, user_id: &str) {
        self.session = Some(Session {
            user_id: user_id.to_string(),
        });
    }

    pub fn sign_out(&mut self) {
        self.session = None;
    }

    /// Fails with `StorageConstraint` on a duplicate id.
    pub fn add_transaction(&self, tx: &Transaction) -> Result<()> {
        self.store.add(tx)
    }

    pub fn list_transactions(&self, owner_id: &str) -> Result<Vec<Transaction>> {
        self.store.list(owner_id)
    }

    pub fn get_transaction(&self, id: &str) -> Result<Transaction> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Stores an edited row and flags it for the next push.
    pub fn update_transaction(&self, tx: &Transaction) -> Result<()> {
        let mut edited = tx.clone();
        edited.touch();
        self.store.update(&edited)
    }

    /// Soft delete. The row is hidden from `list_transactions` and removed
    /// for good once the next `sync` has deleted the cloud copy.
    pub async fn delete_transaction(&self, id: &str) -> Result<()> {
        let mut tx = self.get_transaction(id)?;
        tx.touch();
        tx.sync_status = SyncStatus::Deleted;
        self.store.update(&tx)
    }

    /// Unconditional local hard delete; nothing is sent to the cloud.
    pub fn remove_local(&self, id: &str) -> Result<()> {
        self.store.remove_local(id)
    }

    pub fn list_dirty(&self, owner_id: &str) -> Result<Vec<Transaction>> {
        self.store.list_dirty(owner_id)
    }

    pub fn pending_summary(&self, owner_id: &str) -> Result<PendingSummary> {
        pending::compute_pending_summary(&self.store, self.kv.as_ref(), owner_id)
    }

    pub fn totals(&self, owner_id: &str) -> Result<Totals> {
        Ok(summarize(&self.store.list(owner_id)?))
    }

    pub fn profile(&self, owner_id: &str) -> Result<Profile> {
        profile::load(self.kv.as_ref(), owner_id)
    }

    pub fn set_profile_field(&self, owner_id: &str, field: ProfileField, value: &str) -> Result<()> {
        profile::set_local(self.kv.as_ref(), owner_id, field, value)
    }

    pub async fn sync(&self, owner_id: &str) -> Result<SyncReport> {
        let remote = self.remote()?;
        let _guard = self.begin(owner_id)?;
        info!("Sync started for {}", owner_id);
        sync::push(&self.store, self.kv.as_ref(), remote.as_ref(), owner_id).await
    }

    /// Requires a signed-in session for `owner_id`; checked before any write.
    pub async fn pull_from_cloud(&self, owner_id: &str) -> Result<RestoreReport> {
        match &self.session {
            Some(s) if s.user_id == owner_id => {}
            _ => return Err(Error::Unauthenticated),
        }
        let remote = self.remote()?;
        let _guard = self.begin(owner_id)?;
        info!("Restore started for {}", owner_id);
        restore::pull(&self.store, self.kv.as_ref(), remote.as_ref(), owner_id).await
    }

    fn remote(&self) -> Result<Arc<dyn DocumentStore>> {
        self.remote
            .clone()
            .ok_or_else(|| Error::remote("no remote document store configured"))
    }

    fn begin(&self, owner_id: &str) -> Result<InFlight<'_>> {
        let mut owners = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !owners.insert(owner_id.to_string()) {
            return Err(Error::SyncInProgress(owner_id.to_string()));
        }
        Ok(InFlight {
            owners: &self.in_flight,
            owner_id: owner_id.to_string(),
        })
    }
}

// Releases the owner's slot on drop, including on error paths.
struct InFlight<'a> {
    owners: &'a Mutex<HashSet<String>>,
    owner_id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut owners = self
            .owners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        owners.remove(&self.owner_id);
    }
}
