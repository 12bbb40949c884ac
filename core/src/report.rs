//! Human-readable summary of every engine and its seeds.
//!
//! One row per known engine, in engine order:
//!
//!    Configured value    Last value   ModuleLabel.InstanceName
//!                 101        (same)   B
//!          (per event)     48213764   gen.noise (global)
//!                  17            17   sim [overridden]
//!
//! A configured seed that differs from the last one for any reason
//! other than per-unit reseeding is marked `[[ERROR!!!]]`. It is
//! reported, never raised.

use crate::types::{is_valid_seed, EngineId, Seed};
use serde::Serialize;
use std::fmt;

const CONF_SEED_WIDTH: usize = 18;
const SEP_WIDTH_1: usize = 2;
const LAST_SEED_WIDTH: usize = 18;
const SEP_WIDTH_2: usize = SEP_WIDTH_1 + 1;

/// Which path produced the last seed of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOrigin {
    Configured,
    Unit,
    Frozen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStatus {
    /// Known engine, never asked for a seed.
    Unseeded,
    /// Asked, but the policy had no seed to give.
    Invalid,
    /// Last seed is the configured one.
    Same,
    /// Last seed came from per-unit reseeding.
    PerUnit,
    /// Last seed differs from the configured one without a reason.
    Diverged,
}

impl SeedStatus {
    pub fn classify(configured: Option<Seed>, current: Option<(Seed, SeedOrigin)>) -> Self {
        let configured = configured.filter(|&s| is_valid_seed(s));
        let current = current.filter(|&(s, _)| is_valid_seed(s));
        match (configured, current) {
            (None, None) => Self::Invalid,
            (None, Some(_)) => Self::PerUnit,
            (Some(conf), Some((last, _))) if conf == last => Self::Same,
            (Some(_), Some((_, SeedOrigin::Unit))) => Self::PerUnit,
            (Some(_), _) => Self::Diverged,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, Self::Diverged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReportRow {
    pub engine:     EngineId,
    pub configured: Seed,
    pub current:    Seed,
    pub global:     bool,
    pub frozen:     bool,
    pub status:     SeedStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub policy:             String,
    pub policy_description: String,
    pub rows:               Vec<SeedReportRow>,
}

impl SeedReport {
    pub fn row(&self, engine: &EngineId) -> Option<&SeedReportRow> {
        self.rows.iter().find(|row| &row.engine == engine)
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &SeedReportRow> {
        self.rows.iter().filter(|row| row.status.is_anomaly())
    }

    fn write_row(f: &mut fmt::Formatter<'_>, row: &SeedReportRow) -> fmt::Result {
        let (conf, last) = match row.status {
            SeedStatus::Unseeded => ("(not seeded)".to_string(), String::new()),
            SeedStatus::Invalid => ("INVALID!!!".to_string(), String::new()),
            SeedStatus::Same => (row.configured.to_string(), "(same)".to_string()),
            SeedStatus::PerUnit if !is_valid_seed(row.configured) => {
                ("(per event)".to_string(), row.current.to_string())
            }
            SeedStatus::PerUnit | SeedStatus::Diverged => {
                (row.configured.to_string(), row.current.to_string())
            }
        };
        write!(
            f,
            "\n {conf:>cw$}{:sw1$}{last:>lw$}{:sw2$}{}",
            "",
            "",
            row.engine,
            cw = CONF_SEED_WIDTH,
            sw1 = SEP_WIDTH_1,
            lw = LAST_SEED_WIDTH,
            sw2 = SEP_WIDTH_2,
        )?;
        if row.status.is_anomaly() {
            f.write_str("  [[ERROR!!!]]")?;
        }
        if row.global {
            f.write_str(" (global)")?;
        }
        if row.frozen {
            f.write_str(" [overridden]")?;
        }
        Ok(())
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\nSummary of seeds computed by the seed service")?;
        if !self.policy_description.is_empty() {
            write!(f, "\n{}", self.policy_description)?;
        }
        if !self.rows.is_empty() {
            write!(
                f,
                "\n {:>cw$}{:sw1$}{:>lw$}{:sw2$}ModuleLabel.InstanceName",
                "Configured value",
                "",
                "Last value",
                "",
                cw = CONF_SEED_WIDTH,
                sw1 = SEP_WIDTH_1,
                lw = LAST_SEED_WIDTH,
                sw2 = SEP_WIDTH_2,
            )?;
            for row in &self.rows {
                Self::write_row(f, row)?;
            }
        }
        f.write_str("\n")
    }
}
