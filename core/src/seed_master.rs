//! The seed registry: one per job.
//!
//! Owns the configured policy, the seed caches and the table of known
//! engines. Engines themselves are never owned; each identity may carry
//! a seeder callback that is told its new seed.
//!
//! RULES:
//!   - A cached seed is returned unchanged for the registry's life
//!     (configured seeds) or until the next unit (per-unit seeds).
//!   - Two identities never share a valid seed when the policy
//!     promises unique seeds. Frozen seeds count as taken; they are
//!     stored as given and never checked against each other.
//!   - A frozen identity keeps its seed and is never reseeded.
//!   - Seeders are called with the registry unlocked.

use crate::{
    config::SeedServiceConfig,
    error::{SeedError, SeedResult},
    policy::{create_policy, PolicyKind, SeedPolicy},
    report::{SeedOrigin, SeedReport, SeedReportRow, SeedStatus},
    types::{is_valid_seed, EngineId, Seed, INVALID_SEED},
    uniqueness::ensure_unique,
    unit::UnitContext,
};
use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

/// Callback applying a new seed to an engine.
pub type Seeder = Arc<dyn Fn(&EngineId, Seed) + Send + Sync>;

/// Wrap a closure as a Seeder.
pub fn seeder<F>(f: F) -> Seeder
where
    F: Fn(&EngineId, Seed) + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Default)]
struct EngineRecord {
    seeder: Option<Seeder>,
    frozen: bool,
}

struct SeedTables {
    policy:     Box<dyn SeedPolicy>,
    configured: BTreeMap<EngineId, Seed>,
    per_unit:   BTreeMap<EngineId, Seed>,
    current:    BTreeMap<EngineId, (Seed, SeedOrigin)>,
    engines:    BTreeMap<EngineId, EngineRecord>,
}

impl SeedTables {
    fn is_frozen(&self, id: &EngineId) -> bool {
        self.engines.get(id).map_or(false, |record| record.frozen)
    }

    fn frozen_seed(&self, id: &EngineId) -> Option<Seed> {
        if self.is_frozen(id) {
            self.configured.get(id).copied()
        } else {
            None
        }
    }

    fn check_unique(&self, id: &EngineId, seed: Seed, cache: &BTreeMap<EngineId, Seed>) -> SeedResult<()> {
        if !is_valid_seed(seed) || !self.policy.yields_unique_seeds() {
            return Ok(());
        }
        // Frozen seeds stay in the scan: a live engine may not share them.
        ensure_unique(id, seed, cache)
    }

    fn seed_for(&mut self, id: &EngineId) -> SeedResult<Seed> {
        if let Some(seed) = self.frozen_seed(id) {
            return Ok(seed);
        }
        if let Some(&seed) = self.configured.get(id) {
            return Ok(seed);
        }

        let seed = self.policy.get_seed(id)?;
        self.check_unique(id, seed, &self.configured)?;

        self.configured.insert(id.clone(), seed);
        if is_valid_seed(seed) {
            self.current.insert(id.clone(), (seed, SeedOrigin::Configured));
        }
        log::debug!("seed for '{id}': {seed}");
        Ok(seed)
    }

    fn unit_seed_for(&mut self, id: &EngineId, ctx: &UnitContext) -> SeedResult<Seed> {
        if let Some(seed) = self.frozen_seed(id) {
            return Ok(seed);
        }
        if let Some(&seed) = self.per_unit.get(id) {
            return Ok(seed);
        }

        let seed = self.policy.get_unit_seed(id, ctx)?;
        self.check_unique(id, seed, &self.per_unit)?;

        self.per_unit.insert(id.clone(), seed);
        if is_valid_seed(seed) {
            self.current.insert(id.clone(), (seed, SeedOrigin::Unit));
        }
        log::debug!("seed for '{id}' in {}: {seed}", ctx.unit_id_string());
        Ok(seed)
    }

    /// Seeder of a registered identity that may still be reseeded.
    fn reseedable(&self, id: &EngineId) -> Option<Option<Seeder>> {
        match self.engines.get(id) {
            Some(record) if !record.frozen => Some(record.seeder.clone()),
            _ => None,
        }
    }
}

pub struct SeedMaster {
    verbosity:   i64,
    policy_kind: PolicyKind,
    tables:      Mutex<SeedTables>,
}

impl SeedMaster {
    /// Build the registry and its policy from the service configuration.
    pub fn new(config: &SeedServiceConfig) -> SeedResult<Self> {
        let policy = create_policy(&config.params)?;
        let master = Self::with_policy(policy, config.verbosity);
        if master.verbosity > 0 {
            log::info!("{}", master.policy_description());
        }
        Ok(master)
    }

    pub fn with_policy(policy: Box<dyn SeedPolicy>, verbosity: i64) -> Self {
        Self {
            verbosity,
            policy_kind: policy.kind(),
            tables: Mutex::new(SeedTables {
                policy,
                configured: BTreeMap::new(),
                per_unit:   BTreeMap::new(),
                current:    BTreeMap::new(),
                engines:    BTreeMap::new(),
            }),
        }
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy_kind
    }

    pub fn policy_description(&self) -> String {
        self.tables.lock().policy.describe()
    }

    // ── Engine table ──────────────────────────────────────────────

    /// Attach (or replace) the seeder of `id`, registering it if new.
    pub fn register_seeder(&self, id: &EngineId, seeder: Option<Seeder>) {
        let mut tables = self.tables.lock();
        tables.engines.entry(id.clone()).or_default().seeder = seeder;
        log::debug!("registered seeder for '{id}'");
    }

    /// Register `id`, which must not be known yet.
    pub fn register_new_seeder(&self, id: &EngineId, seeder: Option<Seeder>) -> SeedResult<()> {
        let mut tables = self.tables.lock();
        if tables.engines.contains_key(id) {
            return Err(SeedError::AlreadyRegistered { engine: id.clone() });
        }
        tables.engines.insert(id.clone(), EngineRecord { seeder, frozen: false });
        log::debug!("registered new engine '{id}'");
        Ok(())
    }

    /// Pin `id` to `seed` for the rest of the job.
    pub fn freeze_seed(&self, id: &EngineId, seed: Seed) -> SeedResult<()> {
        let mut tables = self.tables.lock();
        let record = tables
            .engines
            .get_mut(id)
            .ok_or_else(|| SeedError::NotRegistered { engine: id.clone() })?;
        record.frozen = true;
        tables.configured.insert(id.clone(), seed);
        tables.current.insert(id.clone(), (seed, SeedOrigin::Frozen));
        log::debug!("seed of '{id}' frozen at {seed}");
        Ok(())
    }

    pub fn has_engine(&self, id: &EngineId) -> bool {
        self.tables.lock().engines.contains_key(id)
    }

    pub fn has_seeder(&self, id: &EngineId) -> bool {
        self.tables
            .lock()
            .engines
            .get(id)
            .map_or(false, |record| record.seeder.is_some())
    }

    pub fn is_frozen(&self, id: &EngineId) -> bool {
        self.tables.lock().is_frozen(id)
    }

    pub fn engine_ids(&self) -> Vec<EngineId> {
        self.tables.lock().engines.keys().cloned().collect()
    }

    // ── Seeds ─────────────────────────────────────────────────────

    /// The per-job seed of `id`, computed on first request.
    pub fn get_seed(&self, id: &EngineId) -> SeedResult<Seed> {
        self.tables.lock().seed_for(id)
    }

    /// The seed of `id` for the current unit, computed on first request.
    pub fn get_unit_seed(&self, id: &EngineId, ctx: &UnitContext) -> SeedResult<Seed> {
        self.tables.lock().unit_seed_for(id, ctx)
    }

    /// The last seed handed out for `id`, or INVALID_SEED.
    pub fn get_current_seed(&self, id: &EngineId) -> Seed {
        self.tables
            .lock()
            .current
            .get(id)
            .map_or(INVALID_SEED, |&(seed, _)| seed)
    }

    /// Seed `id` from its per-job seed. Returns INVALID_SEED for
    /// unknown and frozen identities.
    pub fn reseed(&self, id: &EngineId) -> SeedResult<Seed> {
        let (seed, seeder) = {
            let mut tables = self.tables.lock();
            let Some(seeder) = tables.reseedable(id) else {
                return Ok(INVALID_SEED);
            };
            (tables.seed_for(id)?, seeder)
        };
        Self::apply(id, seed, seeder);
        Ok(seed)
    }

    /// Seed `id` from its seed for the unit `ctx`.
    pub fn reseed_for_unit(&self, id: &EngineId, ctx: &UnitContext) -> SeedResult<Seed> {
        let (seed, seeder) = {
            let mut tables = self.tables.lock();
            let Some(seeder) = tables.reseedable(id) else {
                return Ok(INVALID_SEED);
            };
            (tables.unit_seed_for(id, ctx)?, seeder)
        };
        Self::apply(id, seed, seeder);
        Ok(seed)
    }

    fn apply(id: &EngineId, seed: Seed, seeder: Option<Seeder>) {
        if !is_valid_seed(seed) {
            return;
        }
        if let Some(seeder) = seeder {
            seeder(id, seed);
        }
    }

    /// Forget the seeds of the previous unit.
    pub fn on_new_unit(&self) {
        self.tables.lock().per_unit.clear();
    }

    // ── Reporting ─────────────────────────────────────────────────

    pub fn report(&self) -> SeedReport {
        let tables = self.tables.lock();
        let ids: BTreeSet<&EngineId> = tables
            .engines
            .keys()
            .chain(tables.configured.keys())
            .chain(tables.current.keys())
            .collect();

        let rows = ids
            .into_iter()
            .map(|id| {
                let configured = tables.configured.get(id).copied();
                let current = tables.current.get(id).copied();
                let status = if configured.is_none() && current.is_none() {
                    SeedStatus::Unseeded
                } else {
                    SeedStatus::classify(configured, current)
                };
                SeedReportRow {
                    engine:     id.clone(),
                    configured: configured.unwrap_or(INVALID_SEED),
                    current:    current.map_or(INVALID_SEED, |(seed, _)| seed),
                    global:     id.is_global(),
                    frozen:     tables.is_frozen(id),
                    status,
                }
            })
            .collect();

        SeedReport {
            policy:             tables.policy.name().to_string(),
            policy_description: tables.policy.describe(),
            rows,
        }
    }

    pub fn write_report<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{}", self.report())
    }

    pub fn summary(&self) -> String {
        self.report().to_string()
    }
}
