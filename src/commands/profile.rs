// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Error;
use crate::ledger::Ledger;
use crate::profile::ProfileField;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(ledger: &Ledger, owner_id: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(ledger, owner_id, sub)?,
        Some(("set-name", sub)) => {
            let name = value(sub, "name")?;
            ledger.set_profile_field(owner_id, ProfileField::DisplayName, &name)?;
            println!("Display name set to '{}'", name);
        }
        Some(("set-image", sub)) => {
            let path = value(sub, "path")?;
            if !Path::new(&path).is_file() {
                return Err(Error::validation(format!("Image '{}' not found", path)).into());
            }
            let abs = std::fs::canonicalize(&path)
                .with_context(|| format!("Resolve image path {}", path))?;
            let reference = format!("file://{}", abs.display());
            ledger.set_profile_field(owner_id, ProfileField::AvatarImage, &reference)?;
            println!("Profile image set to {}", abs.display());
        }
        Some(("set-currency", sub)) => {
            let ccy = value(sub, "currency")?.to_uppercase();
            if ccy.len() != 3 || !ccy.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::validation(format!("Invalid currency code '{}'", ccy)).into());
            }
            ledger.set_profile_field(owner_id, ProfileField::DisplayCurrency, &ccy)?;
            println!("Display currency set to {}", ccy);
        }
        _ => {}
    }
    Ok(())
}

fn value(sub: &clap::ArgMatches, name: &str) -> Result<String> {
    let v = sub
        .get_one::<String>(name)
        .map(|s| s.trim().to_string())
        .with_context(|| format!("{} is required", name))?;
    if v.is_empty() {
        return Err(Error::validation(format!("{} must not be empty", name)).into());
    }
    Ok(v)
}

fn show(ledger: &Ledger, owner_id: &str, sub: &clap::ArgMatches) -> Result<()> {
    let profile = ledger.profile(owner_id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &profile)? {
        return Ok(());
    }
    let avatar = match profile.avatar_image.as_deref() {
        Some(s) if s.starts_with("data:") => "(inline image)".to_string(),
        Some(s) => s.to_string(),
        None => String::new(),
    };
    let rows = vec![
        vec!["Name".into(), profile.display_name.clone().unwrap_or_default()],
        vec!["Image".into(), avatar],
        vec!["Currency".into(), profile.display_currency.clone()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}
