// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(Error::validation(format!(
                "unknown transaction type '{}' (use income|expense)",
                other
            ))),
        }
    }
}

/// Per-row sync state: `pending -> synced`, `pending|synced -> deleted`,
/// and a `deleted` row disappears once its tombstone is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Synced,
    Deleted,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(SyncStatus::Pending),
            "synced" => Ok(SyncStatus::Synced),
            "deleted" => Ok(SyncStatus::Deleted),
            other => Err(Error::validation(format!("unknown sync status '{}'", other))),
        }
    }
}

/// A single income or expense entry.
///
/// Serializes to the exact shape of a `transactions` row, which is also the
/// shape of the remote document under `users/{userId}/transactions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: f64,
    pub category_id: String,
    #[serde(default, with = "note_text")]
    pub note: Option<String>,
    #[serde(rename = "date", with = "iso8601")]
    pub occurred_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    pub sync_status: SyncStatus,
}

impl Transaction {
    /// Builds a fresh `pending` transaction with a client-generated id.
    pub fn new(
        owner_id: &str,
        kind: TxKind,
        amount: f64,
        category_id: &str,
        note: Option<String>,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        if owner_id.trim().is_empty() {
            return Err(Error::validation("owner id must not be empty"));
        }
        validate_amount(amount)?;
        let now = now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            amount,
            category_id: category_id.to_string(),
            note: note.filter(|n| !n.is_empty()),
            occurred_at: occurred_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
            sync_status: SyncStatus::Pending,
        })
    }

    /// Marks a local edit: bumps `updated_at` and flags the row for push.
    pub fn touch(&mut self) {
        self.updated_at = now();
        self.sync_status = SyncStatus::Pending;
    }

    /// Signed contribution to the balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TxKind::Income => self.amount,
            TxKind::Expense => -self.amount,
        }
    }
}

pub fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::validation(format!(
            "amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}

/// Current time truncated to the millisecond precision we persist.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    parse_timestamp(&format_timestamp(&now)).unwrap_or(now)
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::validation(format!("invalid timestamp '{}': {}", s, e)))
}

mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

// Rows store an absent note as "".
mod note_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(note: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(note.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|n| !n.is_empty()))
    }
}

/// Outcome of a push pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub total: usize,
    pub synced: usize,
    pub deleted: usize,
}

/// Outcome of a pull pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub profile: bool,
    pub transactions: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSummary {
    pub transaction_count: usize,
    pub profile_field_count: usize,
}

impl PendingSummary {
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0 && self.profile_field_count == 0
    }

    pub fn message(&self) -> Option<String> {
        match (self.transaction_count, self.profile_field_count) {
            (0, 0) => None,
            (t, 0) => Some(format!("{} transaction(s) pending sync.", t)),
            (0, p) => Some(format!("{} profile change(s) pending sync.", p)),
            (t, p) => Some(format!(
                "{} transaction(s) and {} profile change(s) pending sync.",
                t, p
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

pub fn summarize(txs: &[Transaction]) -> Totals {
    let mut totals = Totals::default();
    for tx in txs.iter().filter(|t| t.sync_status != SyncStatus::Deleted) {
        match tx.kind {
            TxKind::Income => totals.income += tx.amount,
            TxKind::Expense => totals.expenses += tx.amount,
        }
    }
    totals.balance = totals.income - totals.expenses;
    totals
}

/// Screen-level narrowing of a transaction list.
#[derive(Debug, Clone, Default)]
pub struct TxFilter {
    pub kind: Option<TxKind>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl TxFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.kind.is_some_and(|k| k != tx.kind) {
            return false;
        }
        if self.category.as_deref().is_some_and(|c| c != tx.category_id) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                let q = q.to_lowercase();
                tx.note
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&q))
                    || tx.amount.to_string().contains(&q)
            }
        }
    }

    pub fn apply(&self, txs: Vec<Transaction>) -> Vec<Transaction> {
        txs.into_iter().filter(|t| self.matches(t)).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: TxKind,
}

pub const CATEGORIES: &[Category] = &[
    Category { id: "food", name: "Food & Dining", kind: TxKind::Expense },
    Category { id: "transport", name: "Transportation", kind: TxKind::Expense },
    Category { id: "shopping", name: "Shopping", kind: TxKind::Expense },
    Category { id: "entertainment", name: "Entertainment", kind: TxKind::Expense },
    Category { id: "bills", name: "Bills & Utilities", kind: TxKind::Expense },
    Category { id: "health", name: "Health", kind: TxKind::Expense },
    Category { id: "education", name: "Education", kind: TxKind::Expense },
    Category { id: "general", name: "General", kind: TxKind::Expense },
    Category { id: "salary", name: "Salary", kind: TxKind::Income },
    Category { id: "business", name: "Business", kind: TxKind::Income },
    Category { id: "investment", name: "Investment", kind: TxKind::Income },
    Category { id: "gift", name: "Gift", kind: TxKind::Income },
    Category { id: "other", name: "Other", kind: TxKind::Income },
];

pub fn default_category(kind: TxKind) -> &'static str {
    match kind {
        TxKind::Expense => "general",
        TxKind::Income => "salary",
    }
}

/// Display name for a category id; unknown ids are shown verbatim.
pub fn category_name(id: &str) -> &str {
    CATEGORIES
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name)
        .unwrap_or(id)
}

pub fn is_known_category(kind: TxKind, id: &str) -> bool {
    CATEGORIES.iter().any(|c| c.kind == kind && c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Transaction {
        let at = parse_timestamp("2025-03-01T10:00:00.000Z").unwrap();
        Transaction {
            id: "t1".into(),
            owner_id: "u1".into(),
            kind: TxKind::Expense,
            amount: 500.0,
            category_id: "food".into(),
            note: None,
            occurred_at: at,
            created_at: at,
            updated_at: at,
            sync_status: SyncStatus::Pending,
        }
    }

    #[test]
    fn serializes_to_row_shape() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            v,
            json!({
                "id": "t1",
                "userId": "u1",
                "type": "expense",
                "amount": 500.0,
                "categoryId": "food",
                "note": "",
                "date": "2025-03-01T10:00:00.000Z",
                "createdAt": "2025-03-01T10:00:00.000Z",
                "updatedAt": "2025-03-01T10:00:00.000Z",
                "syncStatus": "pending"
            })
        );
    }

    #[test]
    fn accepts_documents_without_note() {
        let doc = json!({
            "id": "t2",
            "userId": "u1",
            "type": "income",
            "amount": 12,
            "categoryId": "salary",
            "date": "2025-03-01T10:00:00Z",
            "createdAt": "2025-03-01T10:00:00Z",
            "updatedAt": "2025-03-01T10:00:00Z",
            "syncStatus": "synced"
        });
        let tx: Transaction = serde_json::from_value(doc).unwrap();
        assert_eq!(tx.note, None);
        assert_eq!(tx.kind, TxKind::Income);
        assert_eq!(tx.amount, 12.0);
    }

    #[test]
    fn new_rejects_bad_input() {
        assert!(matches!(
            Transaction::new("", TxKind::Expense, 1.0, "food", None, None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            Transaction::new("u1", TxKind::Expense, -1.0, "food", None, None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            Transaction::new("u1", TxKind::Expense, f64::NAN, "food", None, None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn summary_messages() {
        let s = PendingSummary { transaction_count: 2, profile_field_count: 1 };
        assert_eq!(
            s.message().as_deref(),
            Some("2 transaction(s) and 1 profile change(s) pending sync.")
        );
        assert_eq!(PendingSummary::default().message(), None);
        assert!(PendingSummary::default().is_empty());
    }

    #[test]
    fn totals_and_filters() {
        let mut income = sample();
        income.kind = TxKind::Income;
        income.amount = 1200.0;
        income.category_id = "salary".into();
        let mut lunch = sample();
        lunch.note = Some("Lunch with Sam".into());
        let txs = vec![income, lunch];

        let t = summarize(&txs);
        assert_eq!(t.income, 1200.0);
        assert_eq!(t.expenses, 500.0);
        assert_eq!(t.balance, 700.0);

        let f = TxFilter { search: Some("lunch".into()), ..Default::default() };
        assert_eq!(f.apply(txs.clone()).len(), 1);
        let f = TxFilter { kind: Some(TxKind::Income), ..Default::default() };
        assert_eq!(f.apply(txs.clone())[0].category_id, "salary");
        let f = TxFilter { search: Some("1200".into()), ..Default::default() };
        assert_eq!(f.apply(txs).len(), 1);
    }
}
