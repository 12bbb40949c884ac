//! Context of one unit of work (one event), as seen by per-unit policies.
//!
//! RULE: the registry never builds this itself. The host fills it in
//! at the start of each unit and passes it to every per-unit call.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitContext {
    pub run:          u32,
    pub sub_run:      u32,
    pub event:        u32,
    /// Wall-clock timestamp of the unit; `None` when the source has no
    /// valid time for it.
    pub timestamp:    Option<u64>,
    pub is_data:      bool,
    pub process_name: String,
    pub module_type:  String,
    pub module_label: String,
}

impl UnitContext {
    pub fn new(run: u32, sub_run: u32, event: u32) -> Self {
        Self { run, sub_run, event, ..Self::default() }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_process_name(mut self, process_name: impl Into<String>) -> Self {
        self.process_name = process_name.into();
        self
    }

    pub fn with_module(mut self, module_type: impl Into<String>, module_label: impl Into<String>) -> Self {
        self.module_type = module_type.into();
        self.module_label = module_label.into();
        self
    }

    pub fn is_time_valid(&self) -> bool {
        self.timestamp.is_some()
    }

    /// `Run: R Subrun: S Event: E`
    pub fn unit_id_string(&self) -> String {
        format!("Run: {} Subrun: {} Event: {}", self.run, self.sub_run, self.event)
    }

    /// Unit identity plus its timestamp (0 when not valid).
    pub fn unit_string(&self) -> String {
        format!("{} Timestamp: {}", self.unit_id_string(), self.timestamp.unwrap_or(0))
    }
}
