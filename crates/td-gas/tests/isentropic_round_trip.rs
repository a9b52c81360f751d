use proptest::prelude::*;
use td_core::units::{k, kgps, mps, pa};
use td_gas::{GasProperties, ThermoState};

fn rel(a: f64, b: f64) -> f64 {
    (a - b).abs() / b.abs()
}

proptest! {
    #[test]
    fn static_then_total_recovers_inlet(
        p0 in 2.0e4_f64..2.0e6,
        t0 in 200.0_f64..900.0,
        velocity in 0.0_f64..300.0,
    ) {
        let gas = GasProperties::air();
        let total = ThermoState::from_total_conditions(pa(p0), k(t0), kgps(3.0), gas).unwrap();
        let moving = total.derive_static(mps(velocity)).unwrap();

        let back = ThermoState::from_static_conditions(
            moving.static_pressure(),
            moving.static_temperature(),
            moving.velocity(),
            moving.mass_flow(),
            gas,
        )
        .unwrap();

        prop_assert!(rel(back.total_pressure().value, p0) < 1e-6);
        prop_assert!(rel(back.total_temperature().value, t0) < 1e-6);
    }

    #[test]
    fn static_conditions_never_exceed_totals(
        t0 in 250.0_f64..600.0,
        velocity in 0.0_f64..250.0,
    ) {
        let air = GasProperties::air();
        let total = ThermoState::from_total_conditions(pa(1.0e5), k(t0), kgps(1.0), air).unwrap();
        let moving = total.derive_static(mps(velocity)).unwrap();
        prop_assert!(moving.static_temperature() <= moving.total_temperature());
        prop_assert!(moving.static_pressure() <= moving.total_pressure());
    }
}

#[test]
fn non_air_gas_round_trip() {
    let gas = GasProperties::new(296.8, 1.4).unwrap();
    let total = ThermoState::from_total_conditions(pa(3.0e5), k(500.0), kgps(2.0), gas).unwrap();
    let moving = total.derive_static(mps(200.0)).unwrap();
    let back = ThermoState::from_static_conditions(
        moving.static_pressure(),
        moving.static_temperature(),
        moving.velocity(),
        moving.mass_flow(),
        gas,
    )
    .unwrap();
    assert!(rel(back.total_pressure().value, 3.0e5) < 1e-9);
}
