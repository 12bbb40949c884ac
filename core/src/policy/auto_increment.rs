//! `autoIncrement`: seeds are `baseSeed + n`, where n counts distinct
//! identities in the order they are first asked for.
//!
//!   policy           : "autoIncrement"
//!   baseSeed         : 0      // required
//!   maxUniqueEngines : 20     // optional, enables the range check
//!   checkRange       : true   // optional

use super::{PolicyKind, RangeCheck, SeedPolicy, BASE_SEED};
use crate::{
    config::ParamTable,
    error::SeedResult,
    types::{EngineId, Seed},
};
use std::collections::BTreeMap;

pub struct AutoIncrementPolicy {
    first_seed: Seed,
    range:      RangeCheck,
    /// Seeds already handed out, so repeated queries are stable.
    assigned:   BTreeMap<EngineId, Seed>,
}

impl SeedPolicy for AutoIncrementPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::AutoIncrement
    }

    fn configure(params: &ParamTable) -> SeedResult<Self> {
        let first_seed = params.require_u64(BASE_SEED)?;
        Ok(Self {
            first_seed,
            range: RangeCheck::from_params(params, first_seed)?,
            assigned: BTreeMap::new(),
        })
    }

    fn get_seed(&mut self, id: &EngineId) -> SeedResult<Seed> {
        if let Some(&seed) = self.assigned.get(id) {
            return Ok(seed);
        }
        let seed = self.first_seed.wrapping_add(self.assigned.len() as Seed);
        self.range.ensure(self.name(), id, seed)?;
        self.assigned.insert(id.clone(), seed);
        Ok(seed)
    }

    fn describe(&self) -> String {
        format!(
            "Random policy: '{}'\n  {}\n  first seed: {}",
            self.name(),
            self.range.describe(),
            self.first_seed,
        )
    }
}
