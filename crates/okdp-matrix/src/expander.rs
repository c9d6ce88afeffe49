//! Cartesian expansion of compatibility groups into flat matrix rows
//! (the strategy matrix input format of the CI).

use itertools::Itertools;
use okdp_core::{CompatibilityGroup, MatrixRow};

/// Every combination of one group, in field order (last field varies fastest)
pub fn expand_group(group: &CompatibilityGroup) -> Vec<MatrixRow> {
    let keys: Vec<&String> = group.iter().map(|(field, _)| field).collect();

    group
        .iter()
        .map(|(_, values)| values.iter())
        .multi_cartesian_product()
        .map(|combination| {
            keys.iter()
                .zip(combination)
                .map(|(field, value)| ((*field).clone(), value.clone()))
                .collect::<MatrixRow>()
        })
        .collect()
}

/// Concatenated expansion of all groups, no deduplication
pub fn expand(groups: &[CompatibilityGroup]) -> Vec<MatrixRow> {
    groups.iter().flat_map(expand_group).collect()
}
