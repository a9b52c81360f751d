use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use td_app::{AppError, DesignOptions, DesignRequest, design_service, project_service};

fn designs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root")
        .join("designs")
}

/// Copies a shipped design into a fresh directory so runs land outside the repo.
fn staged_design(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("td_app_{}_{}", name.replace('.', "_"), nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let path = dir.join(name);
    fs::copy(designs_dir().join(name), &path).expect("failed to copy design");
    path
}

#[test]
fn design_run_is_cached() {
    let path = staged_design("base_design.yaml");

    let first = design_service::ensure_design(&DesignRequest {
        design_path: &path,
        options: DesignOptions::default(),
    })
    .expect("design run failed");
    assert!(!first.loaded_from_cache);
    assert_eq!(first.report.solved_stages(), 3);
    assert!(first.plan.as_ref().is_some_and(|p| !p.is_empty()));
    assert!(first.run_dir.join("manifest.json").exists());
    assert!(first.run_dir.join("geometry_plan.json").exists());

    let second = design_service::ensure_design(&DesignRequest {
        design_path: &path,
        options: DesignOptions::default(),
    })
    .expect("cached run failed");
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(second.report, first.report);
    assert_eq!(second.plan, first.plan);

    let fresh = design_service::ensure_design(&DesignRequest {
        design_path: &path,
        options: DesignOptions {
            use_cache: false,
            ..DesignOptions::default()
        },
    })
    .expect("uncached run failed");
    assert!(!fresh.loaded_from_cache);
    assert_eq!(fresh.report.stages, first.report.stages);

    let runs = design_service::list_runs(&path, Some("base-design")).expect("list failed");
    assert_eq!(runs.len(), 1);
    let (manifest, report) = design_service::load_run(&path, &first.run_id).expect("load failed");
    assert_eq!(manifest.run_id, first.run_id);
    assert_eq!(report.planned_stages, 3);
}

#[test]
fn missed_target_is_reported_not_fatal() {
    let path = staged_design("mark1.yaml");
    let response = design_service::ensure_design(&DesignRequest {
        design_path: &path,
        options: DesignOptions::default(),
    })
    .expect("design run failed");

    assert!(
        response
            .report
            .warnings
            .iter()
            .any(|w| w.contains("misses target"))
    );
    assert_eq!(response.manifest.warnings, response.report.warnings.len());
}

#[test]
fn geometry_plan_requires_geometry_section() {
    let plan = design_service::plan_geometry(&staged_design("base_design.yaml"))
        .expect("planning failed");
    assert_eq!(plan.plan.stages(), vec![0, 1, 2]);

    let err = design_service::plan_geometry(&staged_design("legacy_v1.json")).unwrap_err();
    assert!(matches!(err, AppError::NoGeometry { .. }));
}

#[test]
fn invalid_design_is_a_validation_error() {
    let path = staged_design("base_design.yaml");
    let mut spec = project_service::load_design(&path).unwrap();
    spec.machine.hub_to_tip_ratio = 1.2;

    assert!(matches!(
        project_service::validate(&spec),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        project_service::save_design(&path, &spec),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn stage_summaries_follow_the_design() {
    let spec = project_service::load_design(&designs_dir().join("base_design.yaml")).unwrap();
    let config = project_service::validate(&spec).unwrap();
    let stages = project_service::list_stages(&config);

    assert_eq!(stages.len(), 3);
    assert!(stages[0].loading.starts_with("dT0"));
    assert!((stages[0].rotor_solidity - 1.25).abs() < 1e-12);
    assert_eq!(stages[2].index, 2);
}
