//! Velocity triangles and per-radius flow stations.

use td_gas::ThermoState;

/// Velocity triangle at one radius. Speeds in m/s, angles in radians
/// measured from the axial direction, positive in the direction of rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityTriangle {
    /// Radius [m].
    pub radius: f64,
    /// Blade speed U.
    pub blade_speed: f64,
    /// Axial velocity cx.
    pub axial: f64,
    /// Absolute tangential velocity cθ.
    pub tangential: f64,
}

impl VelocityTriangle {
    /// Triangle from the absolute flow angle α.
    pub fn from_flow_angle(radius: f64, blade_speed: f64, axial: f64, alpha: f64) -> Self {
        Self {
            radius,
            blade_speed,
            axial,
            tangential: axial * alpha.tan(),
        }
    }

    /// Relative tangential velocity wθ = cθ − U.
    pub fn relative_tangential(&self) -> f64 {
        self.tangential - self.blade_speed
    }

    /// Absolute flow angle α.
    pub fn alpha(&self) -> f64 {
        (self.tangential / self.axial).atan()
    }

    /// Relative flow angle β.
    pub fn beta(&self) -> f64 {
        (self.relative_tangential() / self.axial).atan()
    }

    /// Absolute velocity magnitude c.
    pub fn absolute(&self) -> f64 {
        self.axial.hypot(self.tangential)
    }

    /// Relative velocity magnitude w.
    pub fn relative(&self) -> f64 {
        self.axial.hypot(self.relative_tangential())
    }

    /// Angular momentum per unit mass, r·cθ.
    pub fn swirl(&self) -> f64 {
        self.radius * self.tangential
    }
}

/// Flow through one blade row at a single radius: inlet and outlet
/// triangles plus the static states derived from them.
///
/// States carry the absolute velocity and the velocity relative to the row
/// (relative for rotors, absolute for stators).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialStation {
    pub span_fraction: f64,
    pub radius: f64,
    pub inlet: VelocityTriangle,
    pub outlet: VelocityTriangle,
    pub inlet_state: ThermoState,
    pub outlet_state: ThermoState,
}
