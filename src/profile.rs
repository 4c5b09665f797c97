// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Profile fields and their per-field pending-sync flags.
//!
//! Each field lives at `{prefix}_{owner}` with a companion
//! `{prefix}_pending_sync_{owner}` flag set to `"true"` while unpushed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::remote::{user_doc, Document, DocumentStore};

pub const DEFAULT_CURRENCY: &str = "IQD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    DisplayName,
    AvatarImage,
    DisplayCurrency,
}

impl ProfileField {
    pub const ALL: [ProfileField; 3] = [
        ProfileField::DisplayName,
        ProfileField::AvatarImage,
        ProfileField::DisplayCurrency,
    ];

    fn prefix(&self) -> &'static str {
        match self {
            ProfileField::DisplayName => "user_name",
            ProfileField::AvatarImage => "user_image",
            ProfileField::DisplayCurrency => "user_currency",
        }
    }

    pub fn value_key(&self, owner_id: &str) -> String {
        format!("{}_{}", self.prefix(), owner_id)
    }

    pub fn flag_key(&self, owner_id: &str) -> String {
        format!("{}_pending_sync_{}", self.prefix(), owner_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: Option<String>,
    pub avatar_image: Option<String>,
    pub display_currency: String,
}

pub fn load(kv: &dyn KeyValueStore, owner_id: &str) -> Result<Profile> {
    Ok(Profile {
        display_name: kv.get(&ProfileField::DisplayName.value_key(owner_id))?,
        avatar_image: kv.get(&ProfileField::AvatarImage.value_key(owner_id))?,
        display_currency: kv
            .get(&ProfileField::DisplayCurrency.value_key(owner_id))?
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    })
}

/// Records a local edit and marks the field for the next push.
pub fn set_local(
    kv: &dyn KeyValueStore,
    owner_id: &str,
    field: ProfileField,
    value: &str,
) -> Result<()> {
    kv.set(&field.value_key(owner_id), value)?;
    kv.set(&field.flag_key(owner_id), "true")
}

pub fn is_pending(kv: &dyn KeyValueStore, owner_id: &str, field: ProfileField) -> Result<bool> {
    Ok(kv.get(&field.flag_key(owner_id))?.as_deref() == Some("true"))
}

pub fn clear_pending(kv: &dyn KeyValueStore, owner_id: &str, field: ProfileField) -> Result<()> {
    kv.remove(&field.flag_key(owner_id))
}

/// Pushes every flagged field in one merge-write on `users/{owner}`.
///
/// Never fails: errors are logged so transaction sync can go ahead.
/// Returns the number of fields written.
pub async fn push(kv: &dyn KeyValueStore, remote: &dyn DocumentStore, owner_id: &str) -> usize {
    match try_push(kv, remote, owner_id).await {
        Ok(n) => n,
        Err(e) => {
            error!("Error syncing user profile for {}: {}", owner_id, e);
            0
        }
    }
}

async fn try_push(
    kv: &dyn KeyValueStore,
    remote: &dyn DocumentStore,
    owner_id: &str,
) -> Result<usize> {
    let mut payload = Document::new();
    let mut staged = Vec::new();

    for field in ProfileField::ALL {
        if !is_pending(kv, owner_id, field)? {
            continue;
        }
        let Some(value) = kv.get(&field.value_key(owner_id))? else {
            continue;
        };
        match field {
            ProfileField::DisplayName => {
                // `name` is the legacy key; readers of either must agree.
                payload.insert("name".into(), Value::String(value.clone()));
                payload.insert("displayName".into(), Value::String(value));
            }
            ProfileField::AvatarImage => match inline_image(&value).await {
                Ok(encoded) => {
                    payload.insert("profileImageUrl".into(), Value::String(encoded));
                }
                Err(e) => {
                    warn!("Profile image not synced for {}: {}", owner_id, e);
                    continue;
                }
            },
            ProfileField::DisplayCurrency => {
                payload.insert("currency".into(), Value::String(value));
            }
        }
        staged.push(field);
    }

    if payload.is_empty() {
        return Ok(0);
    }
    remote.set(&user_doc(owner_id), payload).await?;
    for field in &staged {
        clear_pending(kv, owner_id, *field)?;
    }
    info!("Profile synced for {} ({} field(s))", owner_id, staged.len());
    Ok(staged.len())
}

/// Applies the remote profile document and drops local pending flags.
pub fn apply_remote(kv: &dyn KeyValueStore, owner_id: &str, doc: &Document) -> Result<()> {
    let text = |key: &str| {
        doc.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let values = [
        (
            ProfileField::DisplayName,
            text("displayName").or_else(|| text("name")),
        ),
        (ProfileField::AvatarImage, text("profileImageUrl")),
        (ProfileField::DisplayCurrency, text("currency")),
    ];
    for (field, value) in values {
        if let Some(v) = value {
            kv.set(&field.value_key(owner_id), &v)?;
        }
        clear_pending(kv, owner_id, field)?;
    }
    Ok(())
}

/// Turns an image reference into something the document can carry inline.
///
/// `data:` URIs and web URLs pass through; local files become base64 data URIs.
pub async fn inline_image(reference: &str) -> Result<String> {
    if reference.starts_with("data:")
        || reference.starts_with("http://")
        || reference.starts_with("https://")
    {
        return Ok(reference.to_string());
    }
    let path = reference.strip_prefix("file://").unwrap_or(reference);
    if path.is_empty() {
        return Err(Error::validation("empty image reference"));
    }
    let bytes = tokio::fs::read(path).await?;
    Ok(format!(
        "data:{};base64,{}",
        mime_for(Path::new(path)),
        STANDARD.encode(bytes)
    ))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
