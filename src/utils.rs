// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};

use crate::error::Error;
use crate::models::{is_known_category, parse_timestamp, TxKind};

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_when(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = parse_timestamp(s) {
        return Ok(ts);
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid date '{}', expected YYYY-MM-DD or ISO-8601", s)))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid date '{}'", s))?;
    Ok(midnight.and_utc())
}

/// User-entered amounts must be positive.
pub fn parse_amount(s: &str) -> Result<f64> {
    let amount: f64 = s
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("Invalid amount '{}'", s)))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation("Please enter a valid amount").into());
    }
    Ok(amount)
}

pub fn check_category(kind: TxKind, id: &str) -> Result<()> {
    if !is_known_category(kind, id) {
        return Err(Error::validation(format!(
            "Unknown {} category '{}'",
            kind, id
        ))
        .into());
    }
    Ok(())
}

pub fn fmt_money(amount: f64, ccy: &str) -> String {
    format!("{} {:.2}", ccy, amount)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
