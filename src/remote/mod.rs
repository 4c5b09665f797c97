// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cloud document store seam.
//!
//! Layout:
//! - `users/{owner}` holds profile fields (`name`, `displayName`,
//!   `profileImageUrl`, `currency`).
//! - `users/{owner}/transactions/{id}` mirrors a transaction row.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

/// A document body: top-level field name to JSON value.
pub type Document = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `None` when the document does not exist.
    async fn get(&self, path: &str) -> Result<Option<Document>>;

    /// Merge-write: fields in `fields` overwrite, everything else is kept.
    /// Creates the document if missing.
    async fn set(&self, path: &str, fields: Document) -> Result<()>;

    /// Deleting a missing document succeeds.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Every document directly under the collection, in no particular order.
    async fn list_collection(&self, path: &str) -> Result<Vec<Document>>;
}

pub fn user_doc(owner_id: &str) -> String {
    format!("users/{}", owner_id)
}

pub fn transactions_collection(owner_id: &str) -> String {
    format!("users/{}/transactions", owner_id)
}

pub fn transaction_doc(owner_id: &str, tx_id: &str) -> String {
    format!("users/{}/transactions/{}", owner_id, tx_id)
}
