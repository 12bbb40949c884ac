//! The host-facing seed service.
//!
//! Wraps the registry with the lifecycle of a job as the host
//! framework drives it:
//!
//!   new()                          service construction: global engines
//!   begin_module_construction()    module construction: module engines
//!   end_module_construction()
//!   begin_unit()                   new unit: reseed global engines
//!   begin_module()                 module runs: reseed its engines
//!   end_module() / end_unit()
//!   end_job()                      summary
//!
//! RULES:
//!   - Global engines are registered only during service construction,
//!     module engines only during their module's construction.
//!   - An engine given a valid override seed is seeded with it once and
//!     then frozen.
//!   - Queries never register anything; declare_and_get_seed() does.

use crate::{
    config::{ParamTable, SeedServiceConfig},
    error::{SeedError, SeedResult},
    phase::LifecyclePhase,
    policy::PolicyKind,
    report::SeedReport,
    seed_master::{SeedMaster, Seeder},
    types::{is_valid_seed, EngineId, Seed},
    unit::UnitContext,
};
use parking_lot::Mutex;

pub struct SeedService {
    master:             SeedMaster,
    phase:              Mutex<LifecyclePhase>,
    verbosity:          i64,
    end_of_job_summary: bool,
}

impl SeedService {
    pub fn new(config: &SeedServiceConfig) -> SeedResult<Self> {
        Ok(Self {
            master:             SeedMaster::new(config)?,
            phase:              Mutex::new(LifecyclePhase::ServiceConstruction),
            verbosity:          config.verbosity,
            end_of_job_summary: config.end_of_job_summary,
        })
    }

    pub fn from_json_str(json: &str) -> SeedResult<Self> {
        Self::new(&SeedServiceConfig::from_json_str(json)?)
    }

    pub fn master(&self) -> &SeedMaster {
        &self.master
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.master.policy_kind()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase.lock().clone()
    }

    pub fn report(&self) -> SeedReport {
        self.master.report()
    }

    // ── Lifecycle hooks ───────────────────────────────────────────

    pub fn begin_module_construction(&self, module_label: impl Into<String>) {
        self.phase.lock().transit_to(LifecyclePhase::ModuleConstruction {
            module_label: module_label.into(),
        });
    }

    pub fn end_module_construction(&self) {
        self.phase.lock().transit_to(LifecyclePhase::Idle);
    }

    /// A new unit of work starts: per-unit seeds are forgotten and the
    /// global engines reseeded for `ctx`.
    pub fn begin_unit(&self, ctx: &UnitContext) -> SeedResult<()> {
        self.phase
            .lock()
            .transit_to(LifecyclePhase::Processing { module_label: None });
        self.master.on_new_unit();

        log::debug!("begin_unit(): will reseed global engines");
        for id in self.master.engine_ids().into_iter().filter(EngineId::is_global) {
            self.reseed_instance(&id, ctx)?;
        }
        Ok(())
    }

    /// Module `module_label` is about to process the current unit.
    pub fn begin_module(&self, module_label: &str, ctx: &UnitContext) -> SeedResult<()> {
        self.phase.lock().transit_to(LifecyclePhase::Processing {
            module_label: Some(module_label.to_string()),
        });

        log::debug!("begin_module(): will reseed engines for module '{module_label}'");
        for id in self
            .master
            .engine_ids()
            .into_iter()
            .filter(|id| !id.is_global() && id.module_label == module_label)
        {
            self.reseed_instance(&id, ctx)?;
        }
        Ok(())
    }

    pub fn end_module(&self) {
        self.phase
            .lock()
            .transit_to(LifecyclePhase::Processing { module_label: None });
    }

    pub fn end_unit(&self) {
        self.phase.lock().transit_to(LifecyclePhase::Idle);
    }

    /// Close the job. Returns the summary when it was asked for.
    pub fn end_job(&self) -> Option<String> {
        self.phase.lock().transit_to(LifecyclePhase::EndJob);
        if self.verbosity > 0 || self.end_of_job_summary {
            let summary = self.master.summary();
            log::info!("{summary}");
            Some(summary)
        } else {
            None
        }
    }

    fn reseed_instance(&self, id: &EngineId, ctx: &UnitContext) -> SeedResult<Seed> {
        let seed = self.master.reseed_for_unit(id, ctx)?;
        if is_valid_seed(seed) {
            log::info!("Random seed for this unit, engine '{id}': {seed}");
        } else {
            log::debug!("No random seed specific to this unit for engine '{id}'");
        }
        Ok(seed)
    }

    // ── Registration ──────────────────────────────────────────────

    /// Identity of `instance` within the module currently running or
    /// being constructed.
    pub fn module_engine_id(&self, instance: &str) -> EngineId {
        let phase = self.phase.lock();
        EngineId::new(phase.module_label().unwrap_or_default(), instance)
    }

    fn ensure_valid_state(&self, id: &EngineId) -> SeedResult<()> {
        let phase = self.phase.lock();
        if phase.allows_registration(id.is_global()) {
            Ok(())
        } else {
            Err(SeedError::InvalidLifecyclePhase {
                operation: format!("register engine '{}'", id.art_name()),
                phase:     phase.to_string(),
            })
        }
    }

    fn register_engine_id(
        &self,
        id: &EngineId,
        seeder: Option<Seeder>,
        override_seed: Option<Seed>,
    ) -> SeedResult<Seed> {
        self.ensure_valid_state(id)?;
        self.master.register_new_seeder(id, seeder.clone())?;

        match override_seed.filter(|&seed| is_valid_seed(seed)) {
            Some(seed) => {
                if let Some(seeder) = seeder {
                    seeder(id, seed);
                }
                self.master.freeze_seed(id, seed)?;
                log::info!("Seeding engine '{id}' with overridden seed {seed}");
                Ok(seed)
            }
            None => self.master.reseed(id),
        }
    }

    /// Register an engine of the module being constructed and seed it.
    /// A valid `override_seed` is used instead of the policy and frozen.
    pub fn register_engine(
        &self,
        seeder: Seeder,
        instance: &str,
        override_seed: Option<Seed>,
    ) -> SeedResult<Seed> {
        let id = self.module_engine_id(instance);
        self.register_engine_id(&id, Some(seeder), override_seed)
    }

    /// Register a global engine; only while the service is constructed.
    pub fn register_global_engine(
        &self,
        seeder: Seeder,
        instance: &str,
        override_seed: Option<Seed>,
    ) -> SeedResult<Seed> {
        self.register_engine_id(&EngineId::global(instance), Some(seeder), override_seed)
    }

    /// Announce an engine of the current module before it exists.
    pub fn declare_engine(&self, instance: &str, override_seed: Option<Seed>) -> SeedResult<Seed> {
        let id = self.module_engine_id(instance);
        self.register_engine_id(&id, None, override_seed)
    }

    pub fn declare_global_engine(&self, instance: &str, override_seed: Option<Seed>) -> SeedResult<Seed> {
        self.register_engine_id(&EngineId::global(instance), None, override_seed)
    }

    /// Attach the seeder to an engine declared earlier and seed it.
    pub fn define_engine(&self, seeder: Seeder, instance: &str) -> SeedResult<Seed> {
        let id = self.module_engine_id(instance);
        self.define_engine_id(&id, seeder)
    }

    pub fn define_global_engine(&self, seeder: Seeder, instance: &str) -> SeedResult<Seed> {
        self.define_engine_id(&EngineId::global(instance), seeder)
    }

    fn define_engine_id(&self, id: &EngineId, seeder: Seeder) -> SeedResult<Seed> {
        if !self.master.has_engine(id) {
            return Err(SeedError::NotRegistered { engine: id.clone() });
        }
        if self.master.has_seeder(id) {
            return Err(SeedError::AlreadyRegistered { engine: id.clone() });
        }
        self.ensure_valid_state(id)?;

        self.master.register_seeder(id, Some(seeder));
        if self.master.is_frozen(id) {
            return self.master.get_seed(id);
        }
        self.master.reseed(id)
    }

    // ── Queries ───────────────────────────────────────────────────

    /// Configured seed of a registered engine.
    pub fn get_seed_for(&self, id: &EngineId) -> SeedResult<Seed> {
        if !self.master.has_engine(id) {
            return Err(SeedError::NotRegistered { engine: id.clone() });
        }
        self.master.get_seed(id)
    }

    /// Configured seed of `instance` in the current module.
    pub fn get_seed(&self, instance: &str) -> SeedResult<Seed> {
        self.get_seed_for(&self.module_engine_id(instance))
    }

    pub fn get_global_seed(&self, instance: &str) -> SeedResult<Seed> {
        self.get_seed_for(&EngineId::global(instance))
    }

    /// Seed of `id`, declaring the engine first if it is unknown.
    pub fn declare_and_get_seed(&self, id: &EngineId) -> SeedResult<Seed> {
        if self.master.has_engine(id) {
            return self.master.get_seed(id);
        }
        log::debug!("declaring engine '{id}' on first use");
        self.register_engine_id(id, None, None)
    }

    /// Last seed handed to `id`, or INVALID_SEED.
    pub fn current_seed(&self, id: &EngineId) -> Seed {
        self.master.get_current_seed(id)
    }

    /// The first of `keys` present in `table`, as an override seed.
    pub fn read_seed_parameter(table: &ParamTable, keys: &[&str]) -> SeedResult<Option<Seed>> {
        for key in keys {
            if table.contains(key) {
                return table.get_u64(key);
            }
        }
        Ok(None)
    }
}
