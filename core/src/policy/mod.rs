//! Seed policies: the pluggable algorithms that turn an engine
//! identity into a seed.
//!
//! RULE: every policy implements SeedPolicy.
//! The set of policies is closed (see PolicyKind); the registry
//! picks one through the factory and owns it for the whole job.
//!
//! A policy computes a per-job seed for each identity, and may
//! compute a different seed for each unit of work. A policy that
//! does not depend on the unit of work keeps the default
//! `get_unit_seed`, which declines with INVALID_SEED.

pub mod auto_increment;
pub mod factory;
pub mod linear_mapping;
pub mod per_event;
pub mod predefined;
pub mod random;
pub mod range_check;
pub mod valid;

pub use auto_increment::AutoIncrementPolicy;
pub use factory::{build_policy, create_policy, PolicyKind};
pub use linear_mapping::LinearMappingPolicy;
pub use per_event::{PerEventPolicy, SeedAlgorithm};
pub use predefined::{PredefinedOffsetPolicy, PredefinedSeedPolicy};
pub use random::RandomPolicy;
pub use range_check::RangeCheck;

use crate::{
    config::ParamTable,
    error::SeedResult,
    types::{EngineId, Seed, INVALID_SEED},
    unit::UnitContext,
};

/// Configuration keys shared by several policies.
pub const BASE_SEED: &str = "baseSeed";
pub const MAX_UNIQUE_ENGINES: &str = "maxUniqueEngines";
pub const CHECK_RANGE: &str = "checkRange";

/// The contract every seed policy must fulfill.
pub trait SeedPolicy: Send {
    /// Which of the known policies this is.
    fn kind(&self) -> PolicyKind;

    /// Stable configuration name of this policy.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Build the policy from its configuration table.
    fn configure(params: &ParamTable) -> SeedResult<Self>
    where
        Self: Sized;

    /// The per-job seed for `id`.
    fn get_seed(&mut self, id: &EngineId) -> SeedResult<Seed>;

    /// The seed for `id` specific to the current unit of work.
    fn get_unit_seed(&mut self, _id: &EngineId, _ctx: &UnitContext) -> SeedResult<Seed> {
        Ok(INVALID_SEED)
    }

    /// Whether the registry must reject two identities sharing a seed.
    fn yields_unique_seeds(&self) -> bool {
        true
    }

    /// Human-readable description of the configuration.
    fn describe(&self) -> String {
        format!("Random policy: '{}'", self.name())
    }
}
