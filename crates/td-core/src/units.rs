// td-core/src/units.rs

use uom::si::f64::{
    MassDensity as UomMassDensity, MassRate as UomMassRate, Power as UomPower,
    Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature,
    Torque as UomTorque, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Torque = UomTorque;
pub type Velocity = UomVelocity;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn kg_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn watt(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn newton_meter(v: f64) -> Torque {
    use uom::si::torque::newton_meter;
    Torque::new::<newton_meter>(v)
}

pub mod constants {
    /// Seconds per minute, for shaft speeds given in rpm.
    pub const SECONDS_PER_MINUTE: f64 = 60.0;

    /// Blade speed (m/s) at `radius_m` for a shaft turning at `rpm`.
    #[inline]
    pub fn blade_speed(rpm: f64, radius_m: f64) -> f64 {
        2.0 * core::f64::consts::PI * rpm * radius_m / SECONDS_PER_MINUTE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _t = k(288.0);
        let _mdot = kgps(5.0);
        let _c = mps(150.0);
        let _rho = kg_m3(1.2);
        let _w = watt(1.0e5);
        let _tq = newton_meter(12.0);
    }

    #[test]
    fn blade_speed_at_reference_point() {
        // 15000 rpm at r = 0.1696031 m
        let u = constants::blade_speed(15_000.0, 0.169_603_1);
        assert!((u - 266.411_926_49).abs() < 1e-6);
    }
}
