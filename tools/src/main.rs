//! seed-runner: headless driver for the seed service.
//!
//! Usage:
//!   seed-runner --config job.json --units 5
//!   seed-runner --config job.json --units 5 --json
//!
//! The job file names the service configuration and the engines to
//! create:
//!
//!   {
//!     "service":   { "policy": "perEvent", "initSeedPolicy": { ... } },
//!     "globals":   [ "noise" ],
//!     "modules":   { "gen": [ "", "smear" ], "sim": [ "" ] },
//!     "overrides": { "gen.smear": 17 },
//!     "process":   "Runner",
//!     "timeBase":  1700000000
//!   }
//!
//! Every engine is a real Pcg64Mcg generator. For each unit the runner
//! walks the lifecycle hooks and prints one draw per engine, then the
//! seed summary.

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use seedmaster_core::{seeder, EngineId, Seed, SeedService, SeedServiceConfig, Seeder, UnitContext};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, fs, sync::Arc};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobConfig {
    service:   serde_json::Value,
    #[serde(default)]
    globals:   Vec<String>,
    #[serde(default)]
    modules:   BTreeMap<String, Vec<String>>,
    #[serde(default)]
    overrides: BTreeMap<String, Seed>,
    #[serde(default = "default_process")]
    process:   String,
    time_base: Option<u64>,
}

fn default_process() -> String {
    "SeedRunner".to_string()
}

#[derive(Serialize)]
struct Draw {
    engine: String,
    seed:   Seed,
    value:  u32,
}

#[derive(Serialize)]
struct UnitDraws {
    event: u32,
    draws: Vec<Draw>,
}

type Engine = Arc<Mutex<Pcg64Mcg>>;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let units = parse_arg(&args, "--units", 3u32);
    let json = args.iter().any(|a| a == "--json");
    let Some(config_path) = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str())
    else {
        bail!("usage: seed-runner --config FILE [--units N] [--json]");
    };

    let text = fs::read_to_string(config_path)
        .with_context(|| format!("reading job file '{config_path}'"))?;
    let job: JobConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing job file '{config_path}'"))?;

    let run_id = format!("run-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S"));
    let time_base = job.time_base.unwrap_or_else(|| {
        log::warn!("no timeBase given, per-unit seeds will not be reproducible");
        chrono::Utc::now().timestamp().unsigned_abs()
    });

    if !json {
        println!("seed-runner");
        println!("  run:     {run_id}");
        println!("  config:  {config_path}");
        println!("  units:   {units}");
        println!();
    }

    let service_config = SeedServiceConfig::from_value(job.service.clone())?;
    let service = SeedService::new(&service_config)?;
    let engines = build_engines(&service, &job)?;

    let mut history = Vec::new();
    for n in 0..units {
        let ctx = UnitContext::new(1, 0, n + 1)
            .with_timestamp(time_base + u64::from(n))
            .with_process_name(job.process.clone());
        service.begin_unit(&ctx)?;
        for label in job.modules.keys() {
            service.begin_module(label, &ctx.clone().with_module("Runner", label.clone()))?;
            service.end_module();
        }

        let draws: Vec<Draw> = engines
            .iter()
            .map(|(id, engine)| Draw {
                engine: id.to_string(),
                seed:   service.current_seed(id),
                value:  engine.lock().gen(),
            })
            .collect();
        service.end_unit();

        if !json {
            println!("{}", ctx.unit_id_string());
            for draw in &draws {
                println!("  {:<24} seed {:>10}  draw {:>10}", draw.engine, draw.seed, draw.value);
            }
        }
        history.push(UnitDraws { event: ctx.event, draws });
    }

    let summary = service.end_job();
    if json {
        let out = serde_json::json!({
            "run_id": run_id,
            "units":  history,
            "report": service.report(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", summary.unwrap_or_else(|| service.master().summary()));
    }

    Ok(())
}

/// Create and register every engine the job names.
fn build_engines(service: &SeedService, job: &JobConfig) -> Result<BTreeMap<EngineId, Engine>> {
    let mut engines = BTreeMap::new();

    for instance in &job.globals {
        let id = EngineId::global(instance.clone());
        let (engine, seeder) = new_engine();
        let override_seed = job.overrides.get(&id.to_string()).copied();
        service
            .register_global_engine(seeder, instance, override_seed)
            .with_context(|| format!("registering global engine '{id}'"))?;
        engines.insert(id, engine);
    }

    for (label, instances) in &job.modules {
        service.begin_module_construction(label.clone());
        for instance in instances {
            let id = EngineId::new(label.clone(), instance.clone());
            let (engine, seeder) = new_engine();
            let override_seed = job.overrides.get(&id.to_string()).copied();
            service
                .register_engine(seeder, instance, override_seed)
                .with_context(|| format!("registering engine '{id}'"))?;
            engines.insert(id, engine);
        }
        service.end_module_construction();
    }

    Ok(engines)
}

fn new_engine() -> (Engine, Seeder) {
    let engine: Engine = Arc::new(Mutex::new(Pcg64Mcg::seed_from_u64(0)));
    let target = Arc::clone(&engine);
    let seeder = seeder(move |id, seed| {
        log::debug!("seeding engine '{id}' with {seed}");
        *target.lock() = Pcg64Mcg::seed_from_u64(seed);
    });
    (engine, seeder)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
