//! td-geometry: geometry request planning for a sequenced compressor.
//!
//! - `GeometryAssemblyPlanner` lays out the solved stages along the axis,
//!   validates each stage and emits a `GeometryRequestPlan` for the stages
//!   that pass: lofted blades with extruded fir-tree roots, patterned around
//!   the axis, plus a revolved shaft and casing with the root slots cut out.
//! - `dispatch` issues a plan to a `GeometryKernel` unit by unit, in
//!   parallel, honoring a shared `CancelToken`.
//!
//! This crate never builds solids itself.

pub mod dispatch;
pub mod error;
pub mod planner;
pub mod request;

pub use dispatch::{CancelToken, DispatchReport, GeometryKernel, UnitOutcome, dispatch};
pub use error::{GeometryError, GeometryResult, KernelError};
pub use planner::{
    CasingSpec, GeometryAssemblyPlanner, GeometryPlanOutcome, PlannerConfig, ShaftSpec,
};
pub use request::{
    GeometryOp, GeometryRequest, GeometryRequestPlan, LoftSection, RowPlacement, RowSide, UnitKey,
};
