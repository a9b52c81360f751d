//! td-airfoil: blade section profiles for turbodesign.
//!
//! - `AirfoilProfile`: double-circular-arc section (closed outline + camber line)
//! - `AirfoilFamily`: capability trait mapping a span fraction and section
//!   shape to a profile; `DoubleCircularArc` is the provided family.
//! - `FirTree`: blade root outline and its toleranced slot (`Attachment`)
//!
//! Coordinates are in the section plane, in meters, with the camber
//! mid-point at the origin and the chord rotated by the stagger angle.

pub mod attachment;
pub mod error;
pub mod family;
pub mod profile;

pub use attachment::{Attachment, FirTree};
pub use error::{AirfoilError, AirfoilResult};
pub use family::{AirfoilFamily, DoubleCircularArc, SectionShape};
pub use profile::{AirfoilProfile, CurveResolution};

/// 2D point type used for section outlines.
pub type Point = nalgebra::Point2<f64>;
