use std::path::PathBuf;
use td_project::{IncidenceModel, LATEST_VERSION, load, validate_design};
use td_solver::StageLoading;

fn designs_dir() -> PathBuf {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join("designs")
}

#[test]
fn shipped_designs_load_and_validate() {
    for name in ["base_design.yaml", "mark1.yaml", "legacy_v1.json"] {
        let path = designs_dir().join(name);
        let spec = load(&path).unwrap_or_else(|e| panic!("failed to load {name}: {e}"));
        assert_eq!(spec.version, LATEST_VERSION);
        validate_design(&spec).unwrap_or_else(|e| panic!("failed to validate {name}: {e}"));
    }
}

#[test]
fn equal_loading_splits_temperature_rise() {
    let spec = load(&designs_dir().join("base_design.yaml")).unwrap();
    let config = validate_design(&spec).unwrap();

    assert_eq!(config.stages.len(), 3);
    for target in &config.stages {
        match target.loading {
            StageLoading::TemperatureRise(dt) => assert!((dt - 13.647_657).abs() < 1e-5),
            other => panic!("expected a temperature rise, got {other:?}"),
        }
    }
    assert_eq!(config.incidence, IncidenceModel::Zero);
    assert!(config.geometry.is_some());
}

#[test]
fn per_stage_lists_and_isentropic_efficiency() {
    let spec = load(&designs_dir().join("mark1.yaml")).unwrap();
    let config = validate_design(&spec).unwrap();

    assert!((config.machine.polytropic_efficiency - 0.886_136).abs() < 1e-5);
    assert_eq!(config.stages[1].loading, StageLoading::PressureRatio(1.13));
    assert_eq!(config.stages[2].reaction, 0.5);
    assert_eq!(config.stages[0].stator.aspect_ratio, 2.8);
    assert_eq!(config.stages[2].stage_gap_to_chord, 0.6);
    assert_eq!(config.stages[0].span_stations, 9);
    assert_eq!(
        config.incidence,
        IncidenceModel::JohnsenBullock { shape_factor: 0.7 }
    );
}

#[test]
fn legacy_blockage_percent_is_migrated() {
    let spec = load(&designs_dir().join("legacy_v1.json")).unwrap();
    assert!((spec.machine.blockage - 0.02).abs() < 1e-15);
    // omitted fields take their defaults
    assert_eq!(spec.stages.span_stations, 7);
    assert!(spec.geometry.is_none());
}
