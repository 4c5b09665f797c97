// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-process document store with the same merge semantics as the cloud.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{Document, DocumentStore};
use crate::error::{Error, Result};

#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<BTreeMap<String, Document>>,
    offline: AtomicBool,
    // Remaining successful writes before every write fails; `None` is unlimited.
    write_budget: Mutex<Option<usize>>,
    calls: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `RemoteUnavailable` until `go_online`.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    /// Lets `n` more writes or deletes succeed, then fails the rest.
    pub fn fail_after_writes(&self, n: usize) -> Result<()> {
        *self.budget()? = Some(n);
        Ok(())
    }

    pub fn clear_failures(&self) -> Result<()> {
        *self.budget()? = None;
        self.go_online();
        Ok(())
    }

    /// Number of remote calls made so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn document(&self, path: &str) -> Result<Option<Document>> {
        Ok(self.docs()?.get(path).cloned())
    }

    /// Writes a document as-is, bypassing failure injection and call counting.
    pub fn seed(&self, path: &str, doc: Document) -> Result<()> {
        self.docs()?.insert(path.to_string(), doc);
        Ok(())
    }

    fn docs(&self) -> Result<MutexGuard<'_, BTreeMap<String, Document>>> {
        self.docs
            .lock()
            .map_err(|_| Error::remote("memory store lock poisoned"))
    }

    fn budget(&self) -> Result<MutexGuard<'_, Option<usize>>> {
        self.write_budget
            .lock()
            .map_err(|_| Error::remote("memory store lock poisoned"))
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::remote("network request failed"));
        }
        Ok(())
    }

    fn spend_write(&self) -> Result<()> {
        let mut budget = self.budget()?;
        match budget.as_mut() {
            Some(0) => Err(Error::remote("write rejected")),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Document>> {
        self.enter()?;
        self.document(path)
    }

    async fn set(&self, path: &str, fields: Document) -> Result<()> {
        self.enter()?;
        self.spend_write()?;
        let mut docs = self.docs()?;
        let doc = docs.entry(path.to_string()).or_default();
        for (k, v) in fields {
            doc.insert(k, v);
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.enter()?;
        self.spend_write()?;
        self.docs()?.remove(path);
        Ok(())
    }

    async fn list_collection(&self, path: &str) -> Result<Vec<Document>> {
        self.enter()?;
        let prefix = format!("{}/", path);
        let docs = self.docs()?;
        Ok(docs
            .iter()
            .filter(|(k, _)| {
                k.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
            })
            .map(|(_, v)| v.clone())
            .collect())
    }
}
