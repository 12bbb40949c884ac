//! The no-collision check run before a new seed is cached.

use crate::{
    error::{SeedError, SeedResult},
    types::{EngineId, Seed},
};

/// Fail if any identity other than `id` already holds `seed`.
pub fn ensure_unique<'a, I>(id: &EngineId, seed: Seed, entries: I) -> SeedResult<()>
where
    I: IntoIterator<Item = (&'a EngineId, &'a Seed)>,
{
    for (other, &other_seed) in entries {
        if other == id {
            continue;
        }
        if other_seed == seed {
            return Err(SeedError::DuplicateSeed {
                seed,
                existing:  other.clone(),
                requested: id.clone(),
            });
        }
    }
    Ok(())
}
