//! seedmaster-core: reproducible seeds for named random engines.
//!
//! A job registers its random engines by identity (module label plus
//! instance name, or a global instance name). A configured policy
//! assigns each identity a seed, the registry caches it, enforces that
//! no two identities collide, and reseeds engines through their
//! seeders when a new unit of work begins.

pub mod config;
pub mod error;
pub mod phase;
pub mod policy;
pub mod report;
pub mod seed_master;
pub mod service;
pub mod types;
pub mod uniqueness;
pub mod unit;

pub use config::{ParamTable, SeedServiceConfig};
pub use error::{SeedError, SeedResult};
pub use policy::{PolicyKind, SeedPolicy};
pub use report::{SeedReport, SeedReportRow, SeedStatus};
pub use seed_master::{seeder, SeedMaster, Seeder};
pub use service::SeedService;
pub use types::{EngineId, Seed, INVALID_SEED};
pub use unit::UnitContext;
