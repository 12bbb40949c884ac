//! Shared primitive types used across the entire seed service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A random engine seed.
pub type Seed = u64;

/// The reserved "no seed" value.
/// A policy returns it to decline seeding (e.g. per-unit policies
/// between units); the registry never hands it to a seeder.
pub const INVALID_SEED: Seed = 0;

/// Returns whether `seed` is an actual seed rather than the sentinel.
pub fn is_valid_seed(seed: Seed) -> bool {
    seed != INVALID_SEED
}

/// Identity of one logical random stream.
///
/// RULE: ordering is module label first, then instance name.
/// Every report and every iteration over engines follows this order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EngineId {
    pub module_label:  String,
    pub instance_name: String,
    pub global:        bool,
}

impl EngineId {
    /// Engine owned by a module, with an optional instance name
    /// (pass `""` for the nameless engine of that module).
    pub fn new(module_label: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Self {
            module_label:  module_label.into(),
            instance_name: instance_name.into(),
            global:        false,
        }
    }

    /// The nameless engine of a module.
    pub fn module(module_label: impl Into<String>) -> Self {
        Self::new(module_label, "")
    }

    /// Engine not bound to any module (created before any unit of work).
    pub fn global(instance_name: impl Into<String>) -> Self {
        Self {
            module_label:  String::new(),
            instance_name: instance_name.into(),
            global:        true,
        }
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn has_instance_name(&self) -> bool {
        !self.instance_name.is_empty()
    }

    /// `module:instance`, the form host frameworks use for engine labels.
    pub fn art_name(&self) -> String {
        format!("{}:{}", self.module_label, self.instance_name)
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global {
            return f.write_str(&self.instance_name);
        }
        f.write_str(&self.module_label)?;
        if self.has_instance_name() {
            write!(f, ".{}", self.instance_name)?;
        }
        Ok(())
    }
}
