// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the ledger core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Insert hit an existing primary key. Never retried.
    #[error("transaction '{0}' already exists")]
    StorageConstraint(String),

    #[error("transaction '{0}' not found")]
    NotFound(String),

    /// Network or service failure while talking to the cloud store.
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("not signed in")]
    Unauthenticated,

    #[error("invalid input: {0}")]
    Validation(String),

    /// Another sync or restore is already running for this owner.
    #[error("a sync is already in progress for '{0}'")]
    SyncInProgress(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::RemoteUnavailable(err.to_string())
    }
}

/// True when the error is a SQLite primary key / unique violation.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
