//! Range checking for policies that hand out seeds from a window
//! `[base, base + maxUniqueEngines)`.

use super::{CHECK_RANGE, MAX_UNIQUE_ENGINES};
use crate::{
    config::ParamTable,
    error::{SeedError, SeedResult},
    types::{EngineId, Seed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCheck {
    base:      Seed,
    max_seeds: Seed,
    enabled:   bool,
}

impl RangeCheck {
    pub fn new(base: Seed, max_seeds: Seed, enabled: bool) -> Self {
        Self { base, max_seeds, enabled }
    }

    /// Read `maxUniqueEngines` and `checkRange`.
    ///
    /// Without `checkRange` the check is on iff a limit is given;
    /// `checkRange: true` requires the limit.
    pub fn from_params(params: &ParamTable, base: Seed) -> SeedResult<Self> {
        let max_seeds = params.get_u64(MAX_UNIQUE_ENGINES)?;
        let enabled = match params.get_bool(CHECK_RANGE)? {
            Some(false) => false,
            Some(true) if max_seeds.is_none() => {
                return Err(SeedError::config(
                    MAX_UNIQUE_ENGINES,
                    "required when checkRange is true",
                ));
            }
            Some(true) => true,
            None => max_seeds.is_some(),
        };
        if enabled && max_seeds == Some(0) {
            return Err(SeedError::config(MAX_UNIQUE_ENGINES, "must be at least 1"));
        }
        Ok(Self::new(base, max_seeds.unwrap_or(0), enabled))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn contains(&self, seed: Seed) -> bool {
        !self.enabled || (seed >= self.base && seed - self.base < self.max_seeds)
    }

    pub fn ensure(&self, policy: &'static str, id: &EngineId, seed: Seed) -> SeedResult<()> {
        if self.contains(seed) {
            return Ok(());
        }
        Err(SeedError::OutOfRange {
            policy,
            engine: id.clone(),
            seed,
            offset: seed as i128 - self.base as i128,
            max: self.max_seeds,
        })
    }

    pub fn describe(&self) -> String {
        if self.enabled {
            format!("maximum number of seeds: {}", self.max_seeds)
        } else {
            "no limit on number of seeds.".to_string()
        }
    }
}
