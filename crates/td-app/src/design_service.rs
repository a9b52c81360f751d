//! Design execution and caching service.

use std::path::{Path, PathBuf};
use std::time::Instant;
use td_geometry::{GeometryPlanOutcome, GeometryRequestPlan};
use td_project::DesignConfig;
use td_results::{DesignReport, RunManifest, RunStore};
use td_solver::Turbomachinery;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::project_service;

#[derive(Debug, Clone)]
pub struct DesignOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub struct DesignRequest<'a> {
    pub design_path: &'a Path,
    pub options: DesignOptions,
}

#[derive(Debug, Clone, Default)]
pub struct DesignTiming {
    /// Sequencing plus geometry planning.
    pub design_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct DesignResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub report: DesignReport,
    pub plan: Option<GeometryRequestPlan>,
    pub run_dir: PathBuf,
    pub loaded_from_cache: bool,
    pub timing: DesignTiming,
}

/// Sequences the stage chain and, when the design has a geometry section,
/// plans the solids for the stages that solved.
pub fn run_design(
    config: &DesignConfig,
) -> AppResult<(Turbomachinery, Option<GeometryPlanOutcome>)> {
    let machine = config.sequencer()?.run(config.inlet, &config.stages)?;
    for warning in machine.warnings() {
        warn!(design = %config.name, %warning, "closure warning");
    }

    let outcome = match config.geometry {
        Some(geometry) => {
            let outcome = geometry
                .planner
                .plan(&machine, &geometry.shaft, &geometry.casing)?;
            for err in &outcome.infeasible {
                warn!(design = %config.name, error = %err, "stage left out of geometry");
            }
            Some(outcome)
        }
        None => None,
    };
    Ok((machine, outcome))
}

/// Geometry plan for a design file, without touching the run cache.
pub fn plan_geometry(design_path: &Path) -> AppResult<GeometryPlanOutcome> {
    let spec = project_service::load_design(design_path)?;
    let config = project_service::validate(&spec)?;
    if config.geometry.is_none() {
        return Err(AppError::NoGeometry {
            design: config.name,
        });
    }
    let (_, outcome) = run_design(&config)?;
    outcome.ok_or(AppError::NoGeometry {
        design: config.name,
    })
}

/// Runs a design or loads it from the run cache next to the design file.
pub fn ensure_design(request: &DesignRequest) -> AppResult<DesignResponse> {
    let started = Instant::now();
    let mut timing = DesignTiming::default();

    let spec = project_service::load_design(request.design_path)?;
    let config = project_service::validate(&spec)?;

    let run_id = td_results::compute_run_id(&spec, &request.options.solver_version);
    let store = RunStore::for_design(request.design_path)?;
    let run_dir = store.root_dir().join(&run_id);

    if request.options.use_cache && store.has_run(&run_id) {
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        let report = store.load_report(&run_id)?;
        let plan = store.load_geometry_plan(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();
        debug!(run_id = %run_id, "loaded cached design run");

        return Ok(DesignResponse {
            run_id,
            manifest,
            report,
            plan,
            run_dir,
            loaded_from_cache: true,
            timing,
        });
    }

    let design_started = Instant::now();
    let (machine, outcome) = run_design(&config)?;
    timing.design_time_s = design_started.elapsed().as_secs_f64();

    let report = DesignReport::new(&config.name, &machine, outcome.as_ref());
    let manifest = RunManifest::new(run_id.clone(), &request.options.solver_version, &report);
    let plan = outcome.map(|o| o.plan);

    let save_started = Instant::now();
    store.save_run(&manifest, &report, plan.as_ref())?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        design = %config.name,
        run_id = %run_id,
        stages = report.solved_stages(),
        pressure_ratio = report.pressure_ratio,
        warnings = report.warnings.len(),
        "design run saved"
    );

    Ok(DesignResponse {
        run_id,
        manifest,
        report,
        plan,
        run_dir,
        loaded_from_cache: false,
        timing,
    })
}

/// Stored runs for a design file, most recent first.
pub fn list_runs(design_path: &Path, design_name: Option<&str>) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_design(design_path)?;

    let mut runs = store.list_runs(design_name)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

pub fn load_run(design_path: &Path, run_id: &str) -> AppResult<(RunManifest, DesignReport)> {
    let store = RunStore::for_design(design_path)?;

    let manifest = store.load_manifest(run_id)?;
    let report = store.load_report(run_id)?;

    Ok((manifest, report))
}
