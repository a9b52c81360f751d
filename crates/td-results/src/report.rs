//! Building a `DesignReport` from a sequenced machine.

use crate::types::*;
use td_gas::ThermoState;
use td_geometry::{GeometryError, GeometryPlanOutcome};
use td_solver::{
    BladeRow, RadialStation, SolvedStage, StageOutcome, StageRecord, Turbomachinery,
    VelocityTriangle,
};

pub(crate) fn state(state: &ThermoState) -> StateReport {
    StateReport {
        total_pressure_pa: state.total_pressure().value,
        total_temperature_k: state.total_temperature().value,
        static_pressure_pa: state.static_pressure().value,
        static_temperature_k: state.static_temperature().value,
        velocity_m_s: state.velocity().value,
        mach: state.mach_number(),
        density_kg_m3: state.density().value,
        mass_flow_kg_s: state.mass_flow().value,
    }
}

fn triangle(t: &VelocityTriangle) -> TriangleReport {
    TriangleReport {
        radius_m: t.radius,
        blade_speed_m_s: t.blade_speed,
        axial_m_s: t.axial,
        tangential_m_s: t.tangential,
        alpha_deg: t.alpha().to_degrees(),
        beta_deg: t.beta().to_degrees(),
        absolute_m_s: t.absolute(),
        relative_m_s: t.relative(),
    }
}

fn station(s: &RadialStation) -> StationReport {
    StationReport {
        span_fraction: s.span_fraction,
        inlet: triangle(&s.inlet),
        outlet: triangle(&s.outlet),
        inlet_mach: s.inlet_state.mach_number(),
        inlet_row_mach: s.inlet_state.relative_mach_number(),
    }
}

fn row(blades: &BladeRow, stations: &[RadialStation]) -> RowReport {
    let summary = blades.summary();
    RowReport {
        hub_radius_m: summary.hub_radius,
        tip_radius_m: summary.tip_radius,
        mean_radius_m: summary.mean_radius,
        height_m: summary.height,
        chord_m: summary.chord,
        max_thickness_m: summary.max_thickness,
        blade_count: summary.blade_count,
        pitch_m: summary.pitch,
        solidity: summary.solidity,
        twist_deg: summary.twist.to_degrees(),
        disk_height_m: summary.disk_height,
        attachment_height_m: summary.attachment.height(),
        attachment_bottom_width_m: summary.attachment.bottom_width(),
        de_haller: summary.de_haller.clone(),
        diffusion_factor: summary.diffusion_factor.clone(),
        stations: stations.iter().map(station).collect(),
        sections: blades
            .sections()
            .iter()
            .map(|s| SectionReport {
                span_fraction: s.span_fraction,
                radius_m: s.radius,
                incidence_deg: s.angles.incidence.to_degrees(),
                deviation_deg: s.angles.deviation.to_degrees(),
                inlet_metal_deg: s.angles.inlet_metal().to_degrees(),
                outlet_metal_deg: s.angles.outlet_metal().to_degrees(),
                camber_deg: s.angles.camber().to_degrees(),
                stagger_deg: s.angles.stagger().to_degrees(),
            })
            .collect(),
        rejected: blades
            .rejected()
            .iter()
            .map(|r| RejectedReport {
                span_fraction: r.span_fraction,
                radius_m: r.radius,
                reason: r.error.to_string(),
            })
            .collect(),
    }
}

fn solved(stage: &SolvedStage) -> SolvedStageReport {
    let solution = &stage.solution;
    SolvedStageReport {
        work_coefficient: stage.design.work_coefficient,
        flow_coefficient: stage.design.flow_coefficient,
        reaction: stage.design.reaction,
        pressure_ratio: solution.pressure_ratio,
        temperature_rise_k: solution.temperature_rise,
        specific_work_j_kg: solution.specific_work,
        torque_n_m: solution.torque.value,
        power_w: solution.power.value,
        mean: MeanTriangles {
            rotor_inlet: triangle(&solution.mean_inlet),
            rotor_exit: triangle(&solution.mean_exit),
            stator_exit: triangle(&solution.mean_outlet),
        },
        rotor: row(&stage.rotor, &solution.rotor_stations),
        stator: row(&stage.stator, &solution.stator_stations),
    }
}

fn stage(record: &StageRecord) -> StageReport {
    let status = match &record.outcome {
        StageOutcome::Solved(stage) => StageStatus::Solved(Box::new(solved(stage))),
        StageOutcome::Failed { error, .. } => StageStatus::Failed {
            reason: error.to_string(),
        },
    };
    StageReport {
        index: record.index,
        inlet: state(&record.inlet),
        outlet: record.outlet().map(|s| state(&s)),
        status,
    }
}

fn geometry(outcome: &GeometryPlanOutcome) -> GeometryReport {
    GeometryReport {
        requests: outcome.plan.requests.len(),
        stages: outcome.plan.stages(),
        infeasible: outcome
            .infeasible
            .iter()
            .map(|err| InfeasibleStageReport {
                stage: match err {
                    GeometryError::Infeasible { stage, .. } => Some(*stage),
                    GeometryError::InvalidSpec { .. } => None,
                },
                reason: err.to_string(),
            })
            .collect(),
    }
}

impl DesignReport {
    pub fn new(
        design_name: impl Into<String>,
        machine: &Turbomachinery,
        plan: Option<&GeometryPlanOutcome>,
    ) -> Self {
        Self {
            design_name: design_name.into(),
            rpm: machine.machine().rpm,
            mean_radius_m: machine.mean_radius(),
            blade_speed_m_s: machine.blade_speed(),
            inlet: state(machine.inlet()),
            outlet: machine.outlet().map(|s| state(&s)),
            planned_stages: machine.planned_stages(),
            halted_at: machine.halted_at(),
            pressure_ratio: machine.pressure_ratio(),
            target_pressure_ratio: machine.machine().target_pressure_ratio,
            stages: machine.stages().iter().map(stage).collect(),
            warnings: machine.warnings().iter().map(|w| w.to_string()).collect(),
            geometry: plan.map(geometry),
        }
    }
}
