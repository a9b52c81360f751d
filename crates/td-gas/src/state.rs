//! Thermodynamic state at a flow station.

use crate::error::{GasError, GasResult};
use crate::gas::GasProperties;
use td_core::units::{
    Density, MassRate, Pressure, Temperature, Velocity, k, kg_m3, mps, pa,
};

/// Immutable ideal-gas state: total and static conditions, mass flow and the
/// absolute and relative velocities they were derived with.
///
/// Static conditions follow from the totals by the isentropic relation
/// `T = T0 - c²/(2 cp)`, `P = P0 (T/T0)^(γ/(γ-1))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoState {
    gas: GasProperties,
    p0: Pressure,
    t0: Temperature,
    p: Pressure,
    t: Temperature,
    mdot: MassRate,
    c: Velocity,
    w: Velocity,
}

fn check_positive(value: f64, what: &'static str) -> GasResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GasError::InvalidGasState { what })
    }
}

fn check_speed(value: f64) -> GasResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GasError::InvalidGasState {
            what: "velocity magnitude must be non-negative and finite",
        })
    }
}

impl ThermoState {
    /// State at rest: static conditions equal total conditions.
    pub fn from_total_conditions(
        p0: Pressure,
        t0: Temperature,
        mdot: MassRate,
        gas: GasProperties,
    ) -> GasResult<Self> {
        check_positive(p0.value, "total pressure must be positive and finite")?;
        check_positive(t0.value, "total temperature must be positive and finite")?;
        if !mdot.value.is_finite() || mdot.value < 0.0 {
            return Err(GasError::InvalidGasState {
                what: "mass flow must be non-negative and finite",
            });
        }

        Ok(Self {
            gas,
            p0,
            t0,
            p: p0,
            t: t0,
            mdot,
            c: mps(0.0),
            w: mps(0.0),
        })
    }

    /// Reconstruct total conditions from a static state moving at `velocity`.
    pub fn from_static_conditions(
        p: Pressure,
        t: Temperature,
        velocity: Velocity,
        mdot: MassRate,
        gas: GasProperties,
    ) -> GasResult<Self> {
        check_positive(p.value, "static pressure must be positive and finite")?;
        check_positive(t.value, "static temperature must be positive and finite")?;
        check_speed(velocity.value)?;

        let t0 = t.value + velocity.value * velocity.value / (2.0 * gas.cp());
        let p0 = p.value * (t0 / t.value).powf(gas.isentropic_exponent());

        let at_rest = Self::from_total_conditions(pa(p0), k(t0), mdot, gas)?;
        Ok(Self {
            p,
            t,
            c: velocity,
            w: velocity,
            ..at_rest
        })
    }

    /// Same total conditions, static conditions for an absolute velocity
    /// magnitude `velocity`. The relative velocity is reset to the absolute one.
    pub fn derive_static(&self, velocity: Velocity) -> GasResult<Self> {
        check_speed(velocity.value)?;

        let cp = self.gas.cp();
        let t = self.t0.value - velocity.value * velocity.value / (2.0 * cp);
        if !t.is_finite() || t <= 0.0 {
            return Err(GasError::InvalidGasState {
                what: "velocity exceeds the total enthalpy (non-positive static temperature)",
            });
        }
        let p = self.p0.value * (t / self.t0.value).powf(self.gas.isentropic_exponent());
        let rho = p / (self.gas.gas_constant() * t);
        if !rho.is_finite() || rho <= 0.0 {
            return Err(GasError::InvalidGasState {
                what: "isentropic relation yields a non-positive density",
            });
        }

        Ok(Self {
            p: pa(p),
            t: k(t),
            c: velocity,
            w: velocity,
            ..*self
        })
    }

    /// Same static state observed from a frame where the flow moves at `w`.
    pub fn with_relative_velocity(&self, w: Velocity) -> GasResult<Self> {
        check_speed(w.value)?;
        Ok(Self { w, ..*self })
    }

    /// New state at rest with different total conditions, same gas and mass flow.
    pub fn with_total_conditions(&self, p0: Pressure, t0: Temperature) -> GasResult<Self> {
        Self::from_total_conditions(p0, t0, self.mdot, self.gas)
    }

    pub fn gas(&self) -> GasProperties {
        self.gas
    }

    pub fn total_pressure(&self) -> Pressure {
        self.p0
    }

    pub fn total_temperature(&self) -> Temperature {
        self.t0
    }

    pub fn static_pressure(&self) -> Pressure {
        self.p
    }

    pub fn static_temperature(&self) -> Temperature {
        self.t
    }

    pub fn mass_flow(&self) -> MassRate {
        self.mdot
    }

    /// Absolute velocity magnitude.
    pub fn velocity(&self) -> Velocity {
        self.c
    }

    /// Velocity magnitude in the frame of the blade row.
    pub fn relative_velocity(&self) -> Velocity {
        self.w
    }

    pub fn density(&self) -> Density {
        kg_m3(self.p.value / (self.gas.gas_constant() * self.t.value))
    }

    pub fn speed_of_sound(&self) -> Velocity {
        mps((self.gas.gamma() * self.gas.gas_constant() * self.t.value).sqrt())
    }

    pub fn mach_number(&self) -> f64 {
        self.c.value / self.speed_of_sound().value
    }

    pub fn relative_mach_number(&self) -> f64 {
        self.w.value / self.speed_of_sound().value
    }

    /// Static specific enthalpy cp·T [J/kg].
    pub fn enthalpy(&self) -> f64 {
        self.gas.cp() * self.t.value
    }

    /// Total specific enthalpy cp·T0 [J/kg].
    pub fn total_enthalpy(&self) -> f64 {
        self.gas.cp() * self.t0.value
    }

    /// Stagnation temperature in the blade-row frame.
    pub fn relative_total_temperature(&self) -> Temperature {
        k(self.t.value + self.w.value * self.w.value / (2.0 * self.gas.cp()))
    }

    /// Stagnation pressure in the blade-row frame.
    pub fn relative_total_pressure(&self) -> Pressure {
        let ttr = self.relative_total_temperature().value;
        pa(self.p.value * (ttr / self.t.value).powf(self.gas.isentropic_exponent()))
    }

    /// Flow area [m²] passing the mass flow at the given axial velocity.
    pub fn flow_area(&self, axial_velocity: Velocity) -> GasResult<f64> {
        check_positive(axial_velocity.value, "axial velocity must be positive")?;
        Ok(self.mdot.value / (self.density().value * axial_velocity.value))
    }
}
