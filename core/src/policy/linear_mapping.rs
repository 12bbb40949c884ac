//! `linearMapping`: each job owns the seed window
//! `[maxUniqueEngines * nJob + 1, maxUniqueEngines * (nJob + 1)]`,
//! filled in first-seen order. Jobs partitioned by `nJob` never overlap.
//!
//!   policy           : "linearMapping"
//!   nJob             : 0      // required
//!   maxUniqueEngines : 20     // required
//!   checkRange       : true   // optional

use super::{PolicyKind, RangeCheck, SeedPolicy, BASE_SEED, CHECK_RANGE, MAX_UNIQUE_ENGINES};
use crate::{
    config::ParamTable,
    error::{SeedError, SeedResult},
    types::{EngineId, Seed},
};
use std::collections::BTreeMap;

pub const N_JOB: &str = "nJob";

pub struct LinearMappingPolicy {
    n_job:         u64,
    seeds_per_job: Seed,
    first_seed:    Seed,
    range:         RangeCheck,
    assigned:      BTreeMap<EngineId, Seed>,
}

impl LinearMappingPolicy {
    fn read_job_number(params: &ParamTable) -> SeedResult<u64> {
        if let Some(n_job) = params.get_u64(N_JOB)? {
            return Ok(n_job);
        }
        match params.get_u64(BASE_SEED)? {
            Some(n_job) => {
                log::warn!(
                    "DEPRECATION WARNING: '{BASE_SEED}' parameter has been deprecated \
                     for linearMapping policy, in favour of '{N_JOB}'. \
                     Please update your configuration accordingly."
                );
                Ok(n_job)
            }
            None => Err(SeedError::config(N_JOB, "required parameter missing")),
        }
    }
}

impl SeedPolicy for LinearMappingPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::LinearMapping
    }

    fn configure(params: &ParamTable) -> SeedResult<Self> {
        let n_job = Self::read_job_number(params)?;
        let seeds_per_job = params.require_u64(MAX_UNIQUE_ENGINES)?;
        if seeds_per_job == 0 {
            return Err(SeedError::config(MAX_UNIQUE_ENGINES, "must be at least 1"));
        }
        // Seed 0 is the invalid seed, so every window starts one higher.
        let first_seed = n_job
            .checked_mul(seeds_per_job)
            .and_then(|s| s.checked_add(1))
            .ok_or_else(|| SeedError::config(N_JOB, "seed window overflows the seed type"))?;
        let check = params.get_bool(CHECK_RANGE)?.unwrap_or(true);
        Ok(Self {
            n_job,
            seeds_per_job,
            first_seed,
            range: RangeCheck::new(first_seed, seeds_per_job, check),
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
            "Random policy: '{}'\n  {}\n  job number:    {}\n  first seed:    {}\n  seeds per job: {}",
            self.name(),
            self.range.describe(),
            self.n_job,
            self.first_seed,
            self.seeds_per_job,
        )
    }
}
