//! td-gas: ideal-gas thermodynamic states for turbodesign.
//!
//! Provides:
//! - `GasProperties`: specific gas constant and ratio of specific heats
//! - `ThermoState`: immutable total/static state at a flow station
//!
//! Every transition (adding velocity, changing frame, changing total
//! conditions) produces a new `ThermoState`; states are never mutated.
//!
//! # Example
//!
//! ```
//! use td_gas::{GasProperties, ThermoState};
//! use td_core::units::{k, kgps, mps, pa};
//!
//! let inlet = ThermoState::from_total_conditions(
//!     pa(101_325.0),
//!     k(288.0),
//!     kgps(5.0),
//!     GasProperties::air(),
//! )
//! .unwrap();
//!
//! let moving = inlet.derive_static(mps(150.0)).unwrap();
//! assert!(moving.static_pressure() < moving.total_pressure());
//! ```

pub mod error;
pub mod gas;
pub mod state;

pub use error::{GasError, GasResult};
pub use gas::GasProperties;
pub use state::ThermoState;
