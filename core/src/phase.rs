//! Where the job is in its lifecycle.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    ServiceConstruction,
    ModuleConstruction { module_label: String },
    Idle,
    /// Inside a unit of work; `module_label` is the module last entered.
    Processing { module_label: Option<String> },
    EndJob,
}

impl LifecyclePhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceConstruction     => "service construction",
            Self::ModuleConstruction { .. } => "module construction",
            Self::Idle                    => "idle",
            Self::Processing { .. }       => "unit processing",
            Self::EndJob                  => "end of job",
        }
    }

    /// Global engines are registered while the service is built, module
    /// engines while their module is.
    pub fn allows_registration(&self, global: bool) -> bool {
        if global {
            *self == Self::ServiceConstruction
        } else {
            matches!(self, Self::ModuleConstruction { .. })
        }
    }

    pub fn module_label(&self) -> Option<&str> {
        match self {
            Self::ModuleConstruction { module_label } => Some(module_label),
            Self::Processing { module_label } => module_label.as_deref(),
            _ => None,
        }
    }

    pub fn transit_to(&mut self, next: LifecyclePhase) {
        log::debug!("seed service: {self} -> {next}");
        *self = next;
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.module_label() {
            Some(label) => write!(f, "{} ('{label}')", self.name()),
            None => f.write_str(self.name()),
        }
    }
}
