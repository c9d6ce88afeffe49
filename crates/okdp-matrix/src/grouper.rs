//! Grouping of compatibility groups by Python/Java/Hadoop versions.
//!
//! Groups are stably sorted by their key and re-flattened, which fixes the
//! order of every downstream row. The batch view keeps the groups sharing a
//! key together so they can be merged.

use crate::intersect::merge;
use itertools::Itertools;
use okdp_core::fields::GROUP_KEY_FIELDS;
use okdp_core::CompatibilityGroup;

/// Groups sharing the same key, in sorted order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBatch {
    pub key: String,
    pub groups: Vec<CompatibilityGroup>,
}

impl GroupBatch {
    /// Field-wise union of every group of the batch
    pub fn merged(&self) -> CompatibilityGroup {
        merge(&self.groups)
    }
}

/// Default grouping key: rendered Python, Java and Hadoop value lists.
///
/// A missing field renders as `[]`, so the key never fails.
pub fn group_key(group: &CompatibilityGroup) -> String {
    GROUP_KEY_FIELDS
        .iter()
        .map(|field| render_list(group.get(field).unwrap_or_default()))
        .collect()
}

/// `['17', '21']`: a list sorts before any of its own prefixes
/// (`,` < `]`), so `['17', '21']` comes before `['17']`.
fn render_list(values: &[String]) -> String {
    format!("[{}]", values.iter().map(|v| format!("'{}'", v)).join(", "))
}

/// Sort groups by key and batch consecutive groups sharing a key
pub fn group_batches<F>(groups: &[CompatibilityGroup], key_fn: F) -> Vec<GroupBatch>
where
    F: Fn(&CompatibilityGroup) -> String,
{
    let mut keyed: Vec<(String, &CompatibilityGroup)> =
        groups.iter().map(|g| (key_fn(g), g)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let grouped = keyed.into_iter().group_by(|(key, _)| key.clone());
    let mut batches = Vec::new();
    for (key, members) in &grouped {
        batches.push(GroupBatch {
            key,
            groups: members.map(|(_, g)| g.clone()).collect(),
        });
    }
    batches
}

/// Sort and re-flatten: the deterministic order of all downstream output
pub fn group_versions_by<F>(groups: &[CompatibilityGroup], key_fn: F) -> Vec<CompatibilityGroup>
where
    F: Fn(&CompatibilityGroup) -> String,
{
    group_batches(groups, key_fn)
        .into_iter()
        .flat_map(|batch| batch.groups)
        .collect()
}
