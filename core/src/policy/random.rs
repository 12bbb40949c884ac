//! `random`: seeds are drawn from a local generator.
//!
//!   policy     : "random"
//!   masterSeed : 12345   // optional; taken from the clock otherwise
//!
//! Reproducible only when masterSeed is fixed. Meant for quick
//! disentangling of code from the seed policy, not for production.

use super::{
    valid::{make_valid, MAX_SEED, MIN_SEED},
    PolicyKind, SeedPolicy,
};
use crate::{
    config::ParamTable,
    error::SeedResult,
    types::{EngineId, Seed},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub const MASTER_SEED: &str = "masterSeed";

pub struct RandomPolicy {
    master_seed: Seed,
    generator:   Pcg64Mcg,
}

impl RandomPolicy {
    pub fn with_master_seed(master_seed: Seed) -> Self {
        Self {
            master_seed,
            generator: Pcg64Mcg::seed_from_u64(master_seed),
        }
    }

    /// A master seed in the valid range, from the wall clock.
    fn clock_seed() -> Seed {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .unsigned_abs();
        make_valid(nanos)
    }
}

impl SeedPolicy for RandomPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Random
    }

    fn configure(params: &ParamTable) -> SeedResult<Self> {
        let master_seed = match params.get_u64(MASTER_SEED)? {
            Some(seed) => seed,
            None => {
                let seed = Self::clock_seed();
                log::debug!("random policy: master seed {seed} taken from the clock");
                seed
            }
        };
        Ok(Self::with_master_seed(master_seed))
    }

    fn get_seed(&mut self, _id: &EngineId) -> SeedResult<Seed> {
        Ok(self.generator.gen_range(MIN_SEED..=MAX_SEED))
    }

    fn describe(&self) -> String {
        format!(
            "Random policy: '{}'\n  master seed: {}\n  seed within: [ {MIN_SEED} ; {MAX_SEED} ]",
            self.name(),
            self.master_seed,
        )
    }
}
