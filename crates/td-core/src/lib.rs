//! td-core: stable foundation for turbodesign.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - iterate (bounded fixed-point iteration with a tagged outcome)
//! - ids (compact request identifiers)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod iterate;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::TdError;
pub use ids::*;
pub use iterate::{FixedPoint, FixedPointConfig, fixed_point};
pub use numeric::*;
pub use units::*;
