//! Intersection of compatibility groups with the build filter, and the
//! field-wise union used to merge groups.
//!
//! Per-key decision table of [`intersect`]:
//!
//! | in group | in filter | result                                  |
//! |----------|-----------|-----------------------------------------|
//! | yes      | yes       | group values also present in the filter |
//! | yes      | no        | group values, unchanged                 |
//! | no       | yes       | filter values, unchanged                |

use okdp_core::{BuildFilter, CompatibilityGroup};

/// Narrow a group with the filter, field by field
pub fn intersect(group: &CompatibilityGroup, filter: &BuildFilter) -> CompatibilityGroup {
    let mut result = CompatibilityGroup::new();

    for (field, values) in group.iter() {
        let resolved = match filter.get(field) {
            Some(allowed) => values
                .iter()
                .filter(|value| allowed.contains(value))
                .cloned()
                .collect(),
            None => values.clone(),
        };
        result.insert(field, resolved);
    }

    for (field, values) in filter.iter() {
        if !group.contains_key(field) {
            result.insert(field, values.clone());
        }
    }

    result
}

/// Intersect every group with the same filter, keeping group order
pub fn join_versions(groups: &[CompatibilityGroup], filter: &BuildFilter) -> Vec<CompatibilityGroup> {
    groups.iter().map(|group| intersect(group, filter)).collect()
}

/// Field-wise union of several groups, values in first-seen order
pub fn merge(groups: &[CompatibilityGroup]) -> CompatibilityGroup {
    let mut result = CompatibilityGroup::new();

    for group in groups {
        for (field, values) in group.iter() {
            let mut merged = result.get(field).map(<[String]>::to_vec).unwrap_or_default();
            for value in values {
                if !merged.contains(value) {
                    merged.push(value.clone());
                }
            }
            result.insert(field, merged);
        }
    }

    result
}
