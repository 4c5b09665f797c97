// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local transaction store.
//!
//! One row per transaction id. The set of rows whose `syncStatus` is not
//! `synced` is the pending-change set; there is no separate change log.

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::db;
use crate::error::{is_constraint_violation, Error, Result};
use crate::models::{format_timestamp, parse_timestamp, SyncStatus, Transaction};

const COLUMNS: &str =
    "id, userId, type, amount, categoryId, note, date, createdAt, updatedAt, syncStatus";

pub struct TransactionStore {
    conn: Connection,
}

impl TransactionStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self { conn: db::open_or_init(path)? })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self { conn: db::open_in_memory()? })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Inserts a new row; an existing id is a `StorageConstraint` error.
    pub fn add(&self, tx: &Transaction) -> Result<()> {
        let sql = format!(
            "INSERT INTO transactions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            COLUMNS
        );
        self.conn
            .execute(&sql, row_params(tx))
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    Error::StorageConstraint(tx.id.clone())
                } else {
                    Error::from(e)
                }
            })?;
        Ok(())
    }

    /// Visible transactions for the owner, most recent first.
    pub fn list(&self, owner_id: &str) -> Result<Vec<Transaction>> {
        self.query(
            "WHERE userId = ?1 AND syncStatus != 'deleted' ORDER BY date DESC",
            owner_id,
        )
    }

    /// Rows not yet confirmed on the server: `pending` and `deleted`.
    pub fn list_dirty(&self, owner_id: &str) -> Result<Vec<Transaction>> {
        self.query("WHERE userId = ?1 AND syncStatus != 'synced'", owner_id)
    }

    pub fn get(&self, id: &str) -> Result<Option<Transaction>> {
        let sql = format!("SELECT {} FROM transactions WHERE id = ?1", COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, params![id], RawRow::read)
            .optional()?;
        raw.map(RawRow::into_transaction).transpose()
    }

    /// Full-row replace by id. Last write wins.
    pub fn update(&self, tx: &Transaction) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE transactions
             SET userId = ?2, type = ?3, amount = ?4, categoryId = ?5, note = ?6,
                 date = ?7, createdAt = ?8, updatedAt = ?9, syncStatus = ?10
             WHERE id = ?1",
            row_params(tx),
        )?;
        if changed == 0 {
            return Err(Error::NotFound(tx.id.clone()));
        }
        Ok(())
    }

    /// Insert-or-replace by id.
    pub fn upsert(&self, tx: &Transaction) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO transactions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            COLUMNS
        );
        self.conn.execute(&sql, row_params(tx))?;
        Ok(())
    }

    /// Changes only the status column.
    pub fn set_status(&self, id: &str, status: SyncStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE transactions SET syncStatus = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        Ok(())
    }

    /// Unconditional hard delete, whatever the row's status.
    pub fn remove_local(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn query(&self, clause: &str, owner_id: &str) -> Result<Vec<Transaction>> {
        let sql = format!("SELECT {} FROM transactions {}", COLUMNS, clause);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner_id], RawRow::read)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?.into_transaction()?);
        }
        Ok(data)
    }
}

fn row_params(tx: &Transaction) -> impl rusqlite::Params + '_ {
    (
        tx.id.as_str(),
        tx.owner_id.as_str(),
        tx.kind.as_str(),
        tx.amount,
        tx.category_id.as_str(),
        tx.note.as_deref().unwrap_or(""),
        format_timestamp(&tx.occurred_at),
        format_timestamp(&tx.created_at),
        format_timestamp(&tx.updated_at),
        tx.sync_status.as_str(),
    )
}

// Column values as SQLite hands them back, before parsing.
struct RawRow {
    id: String,
    owner_id: String,
    kind: String,
    amount: f64,
    category_id: String,
    note: Option<String>,
    date: String,
    created_at: String,
    updated_at: String,
    sync_status: String,
}

impl RawRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            kind: r.get(2)?,
            amount: r.get(3)?,
            category_id: r.get(4)?,
            note: r.get(5)?,
            date: r.get(6)?,
            created_at: r.get(7)?,
            updated_at: r.get(8)?,
            sync_status: r.get(9)?,
        })
    }

    fn into_transaction(self) -> Result<Transaction> {
        Ok(Transaction {
            kind: self.kind.parse()?,
            occurred_at: parse_timestamp(&self.date)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            sync_status: self.sync_status.parse()?,
            note: self.note.filter(|n| !n.is_empty()),
            id: self.id,
            owner_id: self.owner_id,
            amount: self.amount,
            category_id: self.category_id,
        })
    }
}
