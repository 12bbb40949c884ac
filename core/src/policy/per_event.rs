//! `perEvent`: seeds depend on the unit of work being processed.
//!
//! What enters the seed is the unit identity (run, subrun, event),
//! its timestamp, the process name and the engine identity.
//!
//! The policy only acts while a unit is being processed. Before the
//! first unit, engines can be seeded by a fallback policy configured
//! in full under `initSeedPolicy`:
//!
//!   policy    : "perEvent"
//!   algorithm : "default"           // or "EventTimestamp_v1"
//!   offset    : 0                   // optional, added to every unit seed
//!   initSeedPolicy : {
//!     policy   : "preDefinedSeed"
//!     Module1  : { a : 3  b : 5 }
//!   }
//!
//! The offset is not checked; the result may even be the invalid seed.

use super::{factory::create_policy, valid::seed_from_text, PolicyKind, SeedPolicy};
use crate::{
    config::ParamTable,
    error::{SeedError, SeedResult},
    types::{EngineId, Seed, INVALID_SEED},
    unit::UnitContext,
};

pub const ALGORITHM: &str = "algorithm";
pub const OFFSET: &str = "offset";
pub const INIT_SEED_POLICY: &str = "initSeedPolicy";

/// Algorithms combining unit information into a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedAlgorithm {
    /// Hash of unit ID, timestamp, process name and engine ID.
    EventTimestampV1,
}

impl SeedAlgorithm {
    pub const ALL: [SeedAlgorithm; 1] = [SeedAlgorithm::EventTimestampV1];
    pub const DEFAULT: SeedAlgorithm = SeedAlgorithm::EventTimestampV1;

    pub fn name(&self) -> &'static str {
        match self {
            Self::EventTimestampV1 => "EventTimestamp_v1",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        if name == "default" {
            return Some(Self::DEFAULT);
        }
        Self::ALL.into_iter().find(|algo| algo.name() == name)
    }
}

pub struct PerEventPolicy {
    algorithm:   SeedAlgorithm,
    offset:      i64,
    init_policy: Option<Box<dyn SeedPolicy>>,
}

impl PerEventPolicy {
    /// The text hashed by EventTimestamp_v1 for `id` in `ctx`.
    pub fn event_timestamp_text(id: &EngineId, ctx: &UnitContext) -> String {
        let mut text = format!(
            "{} Process: {} Module: {}",
            ctx.unit_string(),
            ctx.process_name,
            id.module_label,
        );
        if id.has_instance_name() {
            text.push_str(" Instance: ");
            text.push_str(&id.instance_name);
        }
        text
    }

    fn event_timestamp_v1(id: &EngineId, ctx: &UnitContext) -> SeedResult<Seed> {
        if !ctx.is_time_valid() {
            return Err(SeedError::InvalidContext {
                engine: id.clone(),
                reason: "the unit has an invalid timestamp, \
                         per-unit seed algorithm EventTimestamp_v1 can't be used"
                    .to_string(),
            });
        }
        let text = Self::event_timestamp_text(id, ctx);
        let seed = seed_from_text(&text);
        log::debug!("Seed from: '{text}': {seed}");
        Ok(seed)
    }
}

impl SeedPolicy for PerEventPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::PerEvent
    }

    fn configure(params: &ParamTable) -> SeedResult<Self> {
        let algorithm_name = params.get_str(ALGORITHM)?.unwrap_or("default");
        let algorithm = SeedAlgorithm::from_name(algorithm_name).ok_or_else(|| {
            let known: Vec<&str> = SeedAlgorithm::ALL.iter().map(|a| a.name()).collect();
            SeedError::config(
                ALGORITHM,
                format!("no valid unit seed algorithm '{algorithm_name}'; known: {}", known.join(", ")),
            )
        })?;

        let offset = params.get_i64(OFFSET)?.unwrap_or(0);

        let init_policy = match params.get_table(INIT_SEED_POLICY)? {
            Some(init) if !init.is_empty() => Some(create_policy(&init).map_err(|e| {
                SeedError::config(
                    INIT_SEED_POLICY,
                    format!(
                        "error creating the pre-unit policy of `perEvent` from {}: {e}",
                        init.to_compact_string()
                    ),
                )
            })?),
            _ => None,
        };

        Ok(Self { algorithm, offset, init_policy })
    }

    /// Per-job seeds come from the fallback policy, if any.
    fn get_seed(&mut self, id: &EngineId) -> SeedResult<Seed> {
        match self.init_policy.as_mut() {
            Some(policy) => policy.get_seed(id),
            None => Ok(INVALID_SEED),
        }
    }

    fn get_unit_seed(&mut self, id: &EngineId, ctx: &UnitContext) -> SeedResult<Seed> {
        let seed = match self.algorithm {
            SeedAlgorithm::EventTimestampV1 => Self::event_timestamp_v1(id, ctx)?,
        };
        Ok(seed.wrapping_add_signed(self.offset))
    }

    fn yields_unique_seeds(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        let mut out = format!(
            "Random policy: '{}'\n  algorithm version: {}",
            self.name(),
            self.algorithm.name(),
        );
        if self.offset != 0 {
            out.push_str(&format!("\n  constant offset:   {}", self.offset));
        }
        if let Some(init) = &self.init_policy {
            let rule = "-".repeat(60);
            out.push_str(&format!(
                "\n  special policy for random seeds before the first unit: '{}'\n{rule}\n{}\n{rule}",
                init.name(),
                init.describe(),
            ));
        }
        out
    }
}
