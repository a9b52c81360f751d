//! Run storage API.
//!
//! One directory per run id holding `manifest.json`, `report.json` and, when
//! the design has geometry, `geometry_plan.json`.

use crate::types::{DesignReport, RunManifest};
use crate::{ResultsError, ResultsResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use td_geometry::GeometryRequestPlan;

const MANIFEST: &str = "manifest.json";
const REPORT: &str = "report.json";
const GEOMETRY_PLAN: &str = "geometry_plan.json";

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to a design file, under `.turbodesign/runs`.
    pub fn for_design(design_path: &Path) -> ResultsResult<Self> {
        let design_dir = design_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "design path has no parent directory".to_string(),
            })?;
        let runs_dir = design_dir.join(".turbodesign").join("runs");
        Self::new(runs_dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> ResultsResult<PathBuf> {
        let plain = !run_id.is_empty()
            && run_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !plain {
            return Err(ResultsError::InvalidRunId(run_id.to_string()));
        }
        Ok(self.root_dir.join(run_id))
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id)
            .map(|dir| dir.join(MANIFEST).exists())
            .unwrap_or(false)
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        report: &DesignReport,
        plan: Option<&GeometryRequestPlan>,
    ) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id)?;
        fs::create_dir_all(&run_dir)?;

        fs::write(run_dir.join(REPORT), serde_json::to_string_pretty(report)?)?;
        let plan_path = run_dir.join(GEOMETRY_PLAN);
        match plan {
            Some(plan) => fs::write(plan_path, serde_json::to_string_pretty(plan)?)?,
            None if plan_path.exists() => fs::remove_file(plan_path)?,
            None => {}
        }
        // Manifest last: its presence marks a complete run.
        fs::write(run_dir.join(MANIFEST), serde_json::to_string_pretty(manifest)?)?;

        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, run_id: &str, file: &str) -> ResultsResult<T> {
        let path = self.run_dir(run_id)?.join(file);

        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        self.load(run_id, MANIFEST)
    }

    pub fn load_report(&self, run_id: &str) -> ResultsResult<DesignReport> {
        self.load(run_id, REPORT)
    }

    /// `Ok(None)` for a stored run without geometry.
    pub fn load_geometry_plan(&self, run_id: &str) -> ResultsResult<Option<GeometryRequestPlan>> {
        if !self.has_run(run_id) {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        if !self.run_dir(run_id)?.join(GEOMETRY_PLAN).exists() {
            return Ok(None);
        }
        self.load(run_id, GEOMETRY_PLAN).map(Some)
    }

    /// Manifests of stored runs, oldest first. `design_name` filters by design.
    pub fn list_runs(&self, design_name: Option<&str>) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            if let Ok(manifest) = self.load_manifest(&run_id) {
                if design_name.is_none_or(|name| manifest.design_name == name) {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id)?;
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
