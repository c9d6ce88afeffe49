//! Presence checks on the mandatory fields.
//!
//! Invalid items are dropped silently. Whether an empty result is
//! acceptable is decided by the caller.

use okdp_core::fields::MANDATORY_FIELDS;
use okdp_core::FieldPresence;
use tracing::debug;

pub fn is_valid<T: FieldPresence>(item: &T) -> bool {
    MANDATORY_FIELDS.iter().all(|field| item.has_value(field))
}

pub fn ignore_invalid<T: FieldPresence>(items: Vec<T>) -> Vec<T> {
    let before = items.len();
    let kept: Vec<T> = items.into_iter().filter(is_valid).collect();
    if kept.len() != before {
        debug!(dropped = before - kept.len(), kept = kept.len(), "dropped incomplete items");
    }
    kept
}
