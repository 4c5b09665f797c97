// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::models::PendingSummary;
use crate::profile::{self, ProfileField};
use crate::store::TransactionStore;

/// Counts what still needs pushing. Advisory: the reads are independent and
/// not atomic across fields.
pub fn compute_pending_summary(
    store: &TransactionStore,
    kv: &dyn KeyValueStore,
    owner_id: &str,
) -> Result<PendingSummary> {
    let transaction_count = store.list_dirty(owner_id)?.len();
    let mut profile_field_count = 0;
    for field in ProfileField::ALL {
        if profile::is_pending(kv, owner_id, field)? {
            profile_field_count += 1;
        }
    }
    Ok(PendingSummary {
        transaction_count,
        profile_field_count,
    })
}
