//! Matrix stages for the pipeline runner.
//!
//! ```text
//! groups → group → intersect → validate → expand → validate rows → tag → variant → rows
//! ```

use crate::expander::expand;
use crate::grouper::{group_key, group_versions_by};
use crate::intersect::join_versions;
use crate::tags::TagDeriver;
use crate::validator::ignore_invalid;
use crate::variant::VariantPolicy;
use okdp_core::{BuildFilter, OkdpError, ResolveContext, Stage, StageData, StageError};

fn expect_groups(input: StageData) -> Result<Vec<okdp_core::CompatibilityGroup>, StageError> {
    match input {
        StageData::Groups(groups) => Ok(groups),
        other => Err(StageError::mismatch("groups", &other)),
    }
}

fn expect_rows(input: StageData) -> Result<Vec<okdp_core::MatrixRow>, StageError> {
    match input {
        StageData::Rows(rows) => Ok(rows),
        other => Err(StageError::mismatch("rows", &other)),
    }
}

#[derive(Default)]
pub struct GroupStage;

impl Stage for GroupStage {
    fn id(&self) -> &'static str {
        "group.python-java-hadoop.v1"
    }

    fn run(&self, input: StageData, _ctx: &ResolveContext) -> Result<StageData, StageError> {
        let groups = expect_groups(input)?;
        Ok(StageData::Groups(group_versions_by(&groups, group_key)))
    }
}

pub struct IntersectStage {
    filter: BuildFilter,
}

impl IntersectStage {
    pub fn new(filter: BuildFilter) -> Self {
        Self { filter }
    }
}

impl Stage for IntersectStage {
    fn id(&self) -> &'static str {
        "intersect.build-filter.v1"
    }

    fn run(&self, input: StageData, _ctx: &ResolveContext) -> Result<StageData, StageError> {
        let groups = expect_groups(input)?;
        Ok(StageData::Groups(join_versions(&groups, &self.filter)))
    }
}

#[derive(Default)]
pub struct ValidateStage;

impl Stage for ValidateStage {
    fn id(&self) -> &'static str {
        "validate.mandatory.v1"
    }

    fn run(&self, input: StageData, _ctx: &ResolveContext) -> Result<StageData, StageError> {
        let groups = expect_groups(input)?;
        Ok(StageData::Groups(ignore_invalid(groups)))
    }
}

/// Drops expanded rows carrying a blank mandatory value, e.g. `spark_version: ""`
#[derive(Default)]
pub struct ValidateRowsStage;

impl Stage for ValidateRowsStage {
    fn id(&self) -> &'static str {
        "validate-rows.mandatory.v1"
    }

    fn run(&self, input: StageData, _ctx: &ResolveContext) -> Result<StageData, StageError> {
        let rows = expect_rows(input)?;
        Ok(StageData::Rows(ignore_invalid(rows)))
    }
}

#[derive(Default)]
pub struct ExpandStage;

impl Stage for ExpandStage {
    fn id(&self) -> &'static str {
        "expand.cartesian.v1"
    }

    fn run(&self, input: StageData, _ctx: &ResolveContext) -> Result<StageData, StageError> {
        let groups = expect_groups(input)?;
        Ok(StageData::Rows(expand(&groups)))
    }
}

/// Derives the dev tags from the branch of the resolve context
#[derive(Default)]
pub struct TagStage;

impl Stage for TagStage {
    fn id(&self) -> &'static str {
        "tag.dev-latest.v1"
    }

    fn run(&self, input: StageData, ctx: &ResolveContext) -> Result<StageData, StageError> {
        let rows = expect_rows(input)?;
        let deriver = TagDeriver::new(ctx.branch.clone());
        Ok(StageData::Rows(deriver.add_latest_dev_tags(rows)))
    }
}

#[derive(Default)]
pub struct VariantStage {
    policy: VariantPolicy,
}

impl VariantStage {
    pub fn new(policy: VariantPolicy) -> Self {
        Self { policy }
    }
}

impl Stage for VariantStage {
    fn id(&self) -> &'static str {
        "variant.scala.v1"
    }

    fn run(&self, input: StageData, _ctx: &ResolveContext) -> Result<StageData, StageError> {
        let rows = expect_rows(input)?;
        self.policy
            .apply(rows)
            .map(StageData::Rows)
            .map_err(|e| match e {
                OkdpError::InvalidVersion { field, value, reason } => {
                    StageError::InvalidVersion { field, value, reason }
                }
                other => StageError::ValidationFailed(other.to_string()),
            })
    }
}

/// Stages in resolution order.
///
/// Tags are derived before the scala variant is cleared so that they stay
/// unique per scala version.
pub fn matrix_stages(filter: BuildFilter, policy: VariantPolicy) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(GroupStage),
        Box::new(IntersectStage::new(filter)),
        Box::new(ValidateStage),
        Box::new(ExpandStage),
        Box::new(ValidateRowsStage),
        Box::new(TagStage),
        Box::new(VariantStage::new(policy)),
    ]
}
