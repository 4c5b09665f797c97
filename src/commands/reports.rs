// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::Totals;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn summary(ledger: &Ledger, owner_id: &str, m: &clap::ArgMatches) -> Result<Totals> {
    let totals = ledger.totals(owner_id)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &totals)? {
        return Ok(totals);
    }
    let ccy = ledger.profile(owner_id)?.display_currency;
    let rows = vec![
        vec!["Income".into(), fmt_money(totals.income, &ccy)],
        vec!["Expenses".into(), fmt_money(totals.expenses, &ccy)],
        vec!["Balance".into(), fmt_money(totals.balance, &ccy)],
    ];
    println!("{}", pretty_table(&["", "Amount"], rows));
    if let Some(msg) = ledger.pending_summary(owner_id)?.message() {
        println!("{}", msg);
    }
    Ok(totals)
}
