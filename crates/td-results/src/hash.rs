use sha2::{Digest, Sha256};
use td_project::DesignSpec;

/// Content hash of a design spec and the solver version that ran it.
pub fn compute_run_id(spec: &DesignSpec, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let spec_json = serde_json::to_string(spec).unwrap_or_default();
    hasher.update(spec_json.as_bytes());
    hasher.update(solver_version.as_bytes());

    format!("{:x}", hasher.finalize())
}
