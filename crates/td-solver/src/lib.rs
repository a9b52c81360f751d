//! td-solver: mean-line and radial-equilibrium design of axial compressor stages.
//!
//! The pipeline for one machine:
//! 1. `Sequencer` sizes the mean radius at the machine inlet
//! 2. each `StageTarget` is resolved into a `StageDesign` and solved by
//!    `StageSolver` (velocity triangles, states, radial stations)
//! 3. `BladeRowGenerator` turns the radial stations into rotor and stator
//!    `BladeRow`s, each with a fir-tree root sized from its pitch
//! 4. `Turbomachinery` holds the chain and its closure warnings
//!
//! Failures are recorded per stage; the chain continues as long as the
//! outlet total conditions of a failed stage can still be derived.

pub mod blade;
pub mod design;
pub mod error;
pub mod incidence;
pub mod radial;
pub mod sequencer;
pub mod stage;
pub mod triangle;

pub use blade::{BladeRow, BladeRowGenerator, BladeSection, RejectedStation, RowSummary};
pub use design::{
    Annulus, MeanRadiusRule, RowKind, RowParameters, StageDesign, StageLoading, StageTarget,
};
pub use error::{SequenceError, SequenceResult, StageError, StageResult};
pub use incidence::{Cascade, IncidenceDeviation, JohnsenBullock, MetalAngles, ZeroIncidence};
pub use radial::{FreeVortex, RadialLaw};
pub use sequencer::{
    ClosureWarning, DEFAULT_CLOSURE_TOLERANCE, MachineSpec, Sequencer, SolvedStage, StageOutcome,
    StageRecord, Turbomachinery,
};
pub use stage::{MeanLine, StageSolution, StageSolver};
pub use triangle::{RadialStation, VelocityTriangle};
