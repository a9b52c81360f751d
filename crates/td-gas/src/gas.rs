//! Calorically perfect gas properties.

use crate::error::{GasError, GasResult};

/// Specific gas constant R [J/(kg·K)] and ratio of specific heats γ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasProperties {
    gas_constant: f64,
    gamma: f64,
}

impl GasProperties {
    pub fn new(gas_constant: f64, gamma: f64) -> GasResult<Self> {
        if !gas_constant.is_finite() || gas_constant <= 0.0 {
            return Err(GasError::InvalidGasProperties {
                what: "gas constant must be positive and finite",
            });
        }
        if !gamma.is_finite() || gamma <= 1.0 {
            return Err(GasError::InvalidGasProperties {
                what: "ratio of specific heats must be greater than one",
            });
        }
        Ok(Self {
            gas_constant,
            gamma,
        })
    }

    /// Dry air, R = 287 J/(kg·K), γ = 1.4.
    pub fn air() -> Self {
        Self {
            gas_constant: 287.0,
            gamma: 1.4,
        }
    }

    /// Specific gas constant [J/(kg·K)].
    pub fn gas_constant(&self) -> f64 {
        self.gas_constant
    }

    /// Ratio of specific heats.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Specific heat at constant pressure [J/(kg·K)].
    pub fn cp(&self) -> f64 {
        self.gas_constant * self.gamma / (self.gamma - 1.0)
    }

    /// Specific heat at constant volume [J/(kg·K)].
    pub fn cv(&self) -> f64 {
        self.gas_constant / (self.gamma - 1.0)
    }

    /// Exponent γ/(γ−1) of the isentropic pressure-temperature relation.
    pub fn isentropic_exponent(&self) -> f64 {
        self.gamma / (self.gamma - 1.0)
    }

    /// Polytropic efficiency equivalent to an isentropic efficiency at a
    /// given compressor pressure ratio.
    pub fn polytropic_efficiency(
        &self,
        pressure_ratio: f64,
        isentropic_efficiency: f64,
    ) -> GasResult<f64> {
        if !pressure_ratio.is_finite() || pressure_ratio <= 1.0 {
            return Err(GasError::InvalidGasState {
                what: "pressure ratio must be greater than one",
            });
        }
        if isentropic_efficiency.is_nan()
            || isentropic_efficiency <= 0.0
            || isentropic_efficiency > 1.0
        {
            return Err(GasError::InvalidGasState {
                what: "isentropic efficiency must be in (0,1]",
            });
        }
        let g = self.gamma;
        let ideal = pressure_ratio.powf((g - 1.0) / g);
        let actual = (isentropic_efficiency + ideal - 1.0) / isentropic_efficiency;
        Ok((g - 1.0) * pressure_ratio.ln() / (g * actual.ln()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_specific_heats() {
        let air = GasProperties::air();
        assert!((air.cp() - 1004.5).abs() < 1e-9);
        assert!((air.cv() - 717.5).abs() < 1e-9);
        assert!((air.cp() - air.cv() - air.gas_constant()).abs() < 1e-9);
    }

    #[test]
    fn rejects_gamma_at_or_below_one() {
        assert!(GasProperties::new(287.0, 1.0).is_err());
        assert!(GasProperties::new(287.0, 0.9).is_err());
        assert!(GasProperties::new(-1.0, 1.4).is_err());
        assert!(GasProperties::new(f64::NAN, 1.4).is_err());
    }

    #[test]
    fn polytropic_exceeds_isentropic_for_compression() {
        let air = GasProperties::air();
        let eta_p = air.polytropic_efficiency(4.15, 0.82).unwrap();
        assert!(eta_p > 0.82 && eta_p < 1.0);
    }

    #[test]
    fn polytropic_equals_isentropic_when_ideal() {
        let air = GasProperties::air();
        let eta_p = air.polytropic_efficiency(3.0, 1.0).unwrap();
        assert!((eta_p - 1.0).abs() < 1e-12);
    }
}
