// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::kv::SqliteKv;
use crate::ledger::{Ledger, Session};
use crate::remote::firestore::{FirestoreClient, DEFAULT_API_BASE};
use crate::remote::DocumentStore;
use crate::store::TransactionStore;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketledger", "pocketledger"));

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub kv_path: PathBuf,
    pub project_id: Option<String>,
    pub api_base: String,
    pub user_id: Option<String>,
    pub id_token: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = match get("POCKETLEDGER_DB") {
            Some(p) => PathBuf::from(p),
            None => data_dir()?.join("pocketledger.db"),
        };
        let kv_path = match get("POCKETLEDGER_KV") {
            Some(p) => PathBuf::from(p),
            None => data_dir()?.join("pocketledger-kv.db"),
        };
        let timeout = match get("POCKETLEDGER_TIMEOUT_SECS") {
            Some(s) => Duration::from_secs(
                s.parse()
                    .with_context(|| format!("Invalid POCKETLEDGER_TIMEOUT_SECS '{}'", s))?,
            ),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            db_path,
            kv_path,
            project_id: get("POCKETLEDGER_PROJECT_ID"),
            api_base: get("POCKETLEDGER_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            user_id: get("POCKETLEDGER_USER_ID"),
            id_token: get("POCKETLEDGER_ID_TOKEN"),
            timeout,
        })
    }

    /// Signed-in owner, or an `Unauthenticated` error.
    pub fn owner(&self) -> Result<String> {
        self.user_id
            .clone()
            .ok_or(crate::error::Error::Unauthenticated)
            .context("Set POCKETLEDGER_USER_ID to sign in")
    }

    pub fn remote(&self) -> Result<Option<Arc<dyn DocumentStore>>> {
        let Some(project_id) = &self.project_id else {
            return Ok(None);
        };
        let client = FirestoreClient::new(
            &self.api_base,
            project_id,
            self.id_token.clone(),
            self.timeout,
        )
        .context("Failed to build Firestore client")?;
        Ok(Some(Arc::new(client)))
    }

    /// Opens both local stores and wires the remote and session.
    pub fn open_ledger(&self) -> Result<Ledger> {
        let store = TransactionStore::open(&self.db_path)
            .with_context(|| format!("Open DB at {}", self.db_path.display()))?;
        let kv = SqliteKv::open(&self.kv_path)
            .with_context(|| format!("Open settings store at {}", self.kv_path.display()))?;
        let session = self.user_id.as_ref().map(|id| Session {
            user_id: id.clone(),
        });
        Ok(Ledger::new(store, Box::new(kv), self.remote()?, session))
    }
}

fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}
