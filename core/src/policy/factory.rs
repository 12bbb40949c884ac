//! Policy names and construction.
//!
//! RULE: the policy set is closed. Adding a policy means adding a
//! PolicyKind variant, its name, and its arm in build_policy().

use super::{
    AutoIncrementPolicy, LinearMappingPolicy, PerEventPolicy, PredefinedOffsetPolicy,
    PredefinedSeedPolicy, RandomPolicy, SeedPolicy,
};
use crate::{
    config::ParamTable,
    error::{SeedError, SeedResult},
};
use std::fmt;

pub const POLICY: &str = "policy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    AutoIncrement,
    LinearMapping,
    PredefinedOffset,
    PredefinedSeed,
    Random,
    PerEvent,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::AutoIncrement,
        PolicyKind::LinearMapping,
        PolicyKind::PredefinedOffset,
        PolicyKind::PredefinedSeed,
        PolicyKind::Random,
        PolicyKind::PerEvent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AutoIncrement    => "autoIncrement",
            Self::LinearMapping    => "linearMapping",
            Self::PredefinedOffset => "preDefinedOffset",
            Self::PredefinedSeed   => "preDefinedSeed",
            Self::Random           => "random",
            Self::PerEvent         => "perEvent",
        }
    }

    pub fn known_names() -> Vec<&'static str> {
        Self::ALL.iter().map(PolicyKind::name).collect()
    }

    pub fn from_name(name: &str) -> SeedResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| SeedError::UnknownPolicy {
                name:  name.to_string(),
                known: Self::known_names()
                    .iter()
                    .map(|n| format!("'{n}'"))
                    .collect::<Vec<_>>()
                    .join(" "),
            })
    }

    /// Whether the policy computes seeds per unit of work.
    pub fn has_unit_seeds(&self) -> bool {
        matches!(self, Self::PerEvent)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read the `policy` key and build the matching policy.
pub fn create_policy(params: &ParamTable) -> SeedResult<Box<dyn SeedPolicy>> {
    let name = params
        .get_str(POLICY)?
        .ok_or_else(|| SeedError::config(POLICY, "required parameter missing"))?;
    build_policy(PolicyKind::from_name(name)?, params)
}

pub fn build_policy(kind: PolicyKind, params: &ParamTable) -> SeedResult<Box<dyn SeedPolicy>> {
    log::debug!("configuring seed policy '{kind}'");
    let policy: Box<dyn SeedPolicy> = match kind {
        PolicyKind::AutoIncrement    => Box::new(AutoIncrementPolicy::configure(params)?),
        PolicyKind::LinearMapping    => Box::new(LinearMappingPolicy::configure(params)?),
        PolicyKind::PredefinedOffset => Box::new(PredefinedOffsetPolicy::configure(params)?),
        PolicyKind::PredefinedSeed   => Box::new(PredefinedSeedPolicy::configure(params)?),
        PolicyKind::Random           => Box::new(RandomPolicy::configure(params)?),
        PolicyKind::PerEvent         => Box::new(PerEventPolicy::configure(params)?),
    };
    Ok(policy)
}
