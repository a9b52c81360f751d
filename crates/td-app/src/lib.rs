//! Application service layer for turbodesign.
//!
//! Frontends go through this crate: loading and validating design files,
//! running the stage chain, planning geometry and caching runs.

pub mod design_service;
pub mod error;
pub mod project_service;

pub use design_service::{
    DesignOptions, DesignRequest, DesignResponse, DesignTiming, ensure_design, list_runs,
    load_run, plan_geometry, run_design,
};
pub use error::{AppError, AppResult};
pub use project_service::{StageSummary, list_stages, load_design, save_design, validate};
