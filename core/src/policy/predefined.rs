//! Policies reading a value per engine instance from the configuration:
//! `preDefinedOffset` (seed = baseSeed + offset) and `preDefinedSeed`
//! (seed taken verbatim).
//!
//!   policy       : "preDefinedOffset"
//!   baseSeed     : 0          // required (offset policy only)
//!   module1      : 3          // nameless engine of module1
//!   module2      : {          // named engines of module2
//!     inst1      : 4
//!     inst2      : 5
//!   }
//!   globalEngine : 6          // global engines sit at the top level
//!
//! Nameless and named engines of the same module can't coexist.

use super::{PolicyKind, RangeCheck, SeedPolicy, BASE_SEED};
use crate::{
    config::ParamTable,
    error::{SeedError, SeedResult},
    types::{EngineId, Seed},
};

/// Look up the per-instance value configured for `id`.
pub fn instance_parameter(params: &ParamTable, id: &EngineId) -> SeedResult<u64> {
    let missing = || SeedError::MissingMapping { engine: id.clone() };

    if id.is_global() {
        if params.is_table(&id.instance_name) {
            return Err(SeedError::config(
                id.instance_name.as_str(),
                "a seed for a global engine was requested, but the configuration sets named instances",
            ));
        }
        return params.get_u64(&id.instance_name)?.ok_or_else(missing);
    }

    if !params.contains(&id.module_label) {
        return Err(missing());
    }

    if !id.has_instance_name() {
        if params.is_table(&id.module_label) {
            return Err(SeedError::config(
                id.module_label.as_str(),
                "a seed for the nameless engine was requested, but the configuration sets \
                 named instances; nameless and named engine instances can't coexist",
            ));
        }
        return params.get_u64(&id.module_label)?.ok_or_else(missing);
    }

    if params.is_atom(&id.module_label) {
        return Err(SeedError::config(
            id.module_label.as_str(),
            format!(
                "a seed for '{id}' was requested, but the configuration sets a nameless instance; \
                 nameless and named engine instances can't coexist"
            ),
        ));
    }
    let instances = params.get_table(&id.module_label)?.ok_or_else(missing)?;
    instances.get_u64(&id.instance_name)?.ok_or_else(missing)
}

pub struct PredefinedOffsetPolicy {
    base_seed: Seed,
    range:     RangeCheck,
    params:    ParamTable,
}

impl SeedPolicy for PredefinedOffsetPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::PredefinedOffset
    }

    fn configure(params: &ParamTable) -> SeedResult<Self> {
        let base_seed = params.require_u64(BASE_SEED)?;
        Ok(Self {
            base_seed,
            range: RangeCheck::from_params(params, base_seed)?,
            params: params.clone(),
        })
    }

    fn get_seed(&mut self, id: &EngineId) -> SeedResult<Seed> {
        let offset = instance_parameter(&self.params, id)?;
        let seed = self.base_seed.checked_add(offset).ok_or_else(|| {
            SeedError::config(id.to_string(), format!("offset {offset} overflows the seed type"))
        })?;
        self.range.ensure(self.name(), id, seed)?;
        Ok(seed)
    }

    fn describe(&self) -> String {
        format!(
            "Random policy: '{}'\n  {}\n  base seed: {}",
            self.name(),
            self.range.describe(),
            self.base_seed,
        )
    }
}

/// Seeds are used exactly as configured; uniqueness is up to the user.
pub struct PredefinedSeedPolicy {
    params: ParamTable,
}

impl SeedPolicy for PredefinedSeedPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::PredefinedSeed
    }

    fn configure(params: &ParamTable) -> SeedResult<Self> {
        Ok(Self { params: params.clone() })
    }

    fn get_seed(&mut self, id: &EngineId) -> SeedResult<Seed> {
        instance_parameter(&self.params, id)
    }

    fn yields_unique_seeds(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        format!("Random policy: '{}'\n  seeds directly from the configuration", self.name())
    }
}
