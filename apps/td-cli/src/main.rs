use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use td_app::{AppResult, DesignOptions, DesignRequest, design_service, project_service};
use td_results::{DesignReport, StageStatus};
use tracing::debug;

#[derive(Parser)]
#[command(name = "td-cli")]
#[command(
    about = "TurboDesign CLI - Axial compressor mean-line and blade design",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a design file
    Validate {
        /// Path to the design YAML or JSON file
        design_path: PathBuf,
    },
    /// List the planned stages of a design
    Stages {
        /// Path to the design YAML or JSON file
        design_path: PathBuf,
    },
    /// Run the stage chain and blade design
    Design {
        /// Path to the design YAML or JSON file
        design_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Also write the report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Write the geometry request plan as JSON
    Plan {
        /// Path to the design YAML or JSON file
        design_path: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List cached runs for a design
    Runs {
        /// Path to the design YAML or JSON file
        design_path: PathBuf,
        /// Include runs of other designs in the same directory
        #[arg(long)]
        all: bool,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the design YAML or JSON file
        design_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { design_path } => cmd_validate(&design_path),
        Commands::Stages { design_path } => cmd_stages(&design_path),
        Commands::Design {
            design_path,
            no_cache,
            report,
        } => cmd_design(&design_path, !no_cache, report.as_deref()),
        Commands::Plan {
            design_path,
            output,
        } => cmd_plan(&design_path, output.as_deref()),
        Commands::Runs { design_path, all } => cmd_runs(&design_path, all),
        Commands::ShowRun {
            design_path,
            run_id,
        } => cmd_show_run(&design_path, &run_id),
    }
}

fn cmd_validate(design_path: &Path) -> AppResult<()> {
    println!("Validating design: {}", design_path.display());
    let spec = project_service::load_design(design_path)?;
    let config = project_service::validate(&spec)?;
    println!(
        "✓ Design '{}' is valid ({} stages)",
        config.name,
        config.stages.len()
    );
    Ok(())
}

fn cmd_stages(design_path: &Path) -> AppResult<()> {
    let spec = project_service::load_design(design_path)?;
    let config = project_service::validate(&spec)?;

    println!("Stages of '{}':", config.name);
    println!(
        "  {:>5}  {:<18} {:>8} {:>8} {:>10} {:>10}",
        "stage", "loading", "R", "phi", "sigma_r", "sigma_s"
    );
    for stage in project_service::list_stages(&config) {
        let phi = stage
            .flow_coefficient
            .map(|phi| format!("{phi:.3}"))
            .unwrap_or_else(|| "auto".to_string());
        println!(
            "  {:>5}  {:<18} {:>8.3} {:>8} {:>10.3} {:>10.3}",
            stage.index,
            stage.loading,
            stage.reaction,
            phi,
            stage.rotor_solidity,
            stage.stator_solidity
        );
    }
    Ok(())
}

fn cmd_design(design_path: &Path, use_cache: bool, report_path: Option<&Path>) -> AppResult<()> {
    let request = DesignRequest {
        design_path,
        options: DesignOptions {
            use_cache,
            ..DesignOptions::default()
        },
    };
    let response = design_service::ensure_design(&request)?;

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Design completed: {}", response.run_id);
    }
    debug!(total_time_s = response.timing.total_time_s, "design command finished");

    print_report(&response.report);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&response.report)
            .map_err(|e| td_app::AppError::Results(e.to_string()))?;
        std::fs::write(path, json)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_report(report: &DesignReport) {
    println!();
    println!("Design: {}", report.design_name);
    println!(
        "  Mean radius: {:.4} m, blade speed: {:.2} m/s",
        report.mean_radius_m, report.blade_speed_m_s
    );
    println!(
        "  {:>5}  {:>8} {:>8} {:>8} {:>9} {:>8} {:>6} {:>6}",
        "stage", "PR", "dT0 [K]", "psi", "phi", "DF rot", "Z rot", "Z sta"
    );
    for stage in &report.stages {
        match &stage.status {
            StageStatus::Solved(solved) => {
                let df = solved
                    .rotor
                    .diffusion_factor
                    .iter()
                    .copied()
                    .fold(f64::NAN, f64::max);
                println!(
                    "  {:>5}  {:>8.4} {:>8.3} {:>8.4} {:>9.4} {:>8.3} {:>6} {:>6}",
                    stage.index,
                    solved.pressure_ratio,
                    solved.temperature_rise_k,
                    solved.work_coefficient,
                    solved.flow_coefficient,
                    df,
                    solved.rotor.blade_count,
                    solved.stator.blade_count
                );
                for rejected in solved.rotor.rejected.iter().chain(&solved.stator.rejected) {
                    println!(
                        "         rejected station at span {:.2}: {}",
                        rejected.span_fraction, rejected.reason
                    );
                }
            }
            StageStatus::Failed { reason } => {
                println!("  {:>5}  failed: {}", stage.index, reason);
            }
        }
    }
    println!("  Overall pressure ratio: {:.4}", report.pressure_ratio);
    if let Some(index) = report.halted_at {
        println!(
            "  ✗ Chain halted at stage {} of {}",
            index, report.planned_stages
        );
    }
    for warning in &report.warnings {
        println!("  ⚠ {}", warning);
    }
    if let Some(geometry) = &report.geometry {
        println!(
            "  Geometry: {} requests for stages {:?}",
            geometry.requests, geometry.stages
        );
        for stage in &geometry.infeasible {
            println!("  ✗ {}", stage.reason);
        }
    }
}

fn cmd_plan(design_path: &Path, output: Option<&Path>) -> AppResult<()> {
    let outcome = design_service::plan_geometry(design_path)?;
    for err in &outcome.infeasible {
        eprintln!("✗ {}", err);
    }

    let json = serde_json::to_string_pretty(&outcome.plan)
        .map_err(|e| td_app::AppError::Geometry(e.to_string()))?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!(
                "✓ Wrote {} requests to {}",
                outcome.plan.requests.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_runs(design_path: &Path, all: bool) -> AppResult<()> {
    let name = if all {
        None
    } else {
        let spec = project_service::load_design(design_path)?;
        Some(spec.name)
    };
    let runs = design_service::list_runs(design_path, name.as_deref())?;

    if runs.is_empty() {
        println!("No cached runs found");
    } else {
        println!("Cached runs:");
        for run in runs {
            println!(
                "  {} - {} ({}/{} stages, PR {:.4}, {} warnings) [{}]",
                run.run_id,
                run.design_name,
                run.solved_stages,
                run.planned_stages,
                run.pressure_ratio,
                run.warnings,
                run.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_show_run(design_path: &Path, run_id: &str) -> AppResult<()> {
    let (manifest, report) = design_service::load_run(design_path, run_id)?;

    println!("Run: {}", manifest.run_id);
    println!("  Timestamp: {}", manifest.timestamp);
    println!("  Solver version: {}", manifest.solver_version);
    print_report(&report);
    Ok(())
}
