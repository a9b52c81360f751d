//! Blade row generation from radial stations.

use crate::design::{RowKind, RowParameters, StageDesign};
use crate::error::{StageError, StageResult};
use crate::incidence::{Cascade, IncidenceDeviation, MetalAngles, ZeroIncidence};
use crate::triangle::{RadialStation, VelocityTriangle};
use rayon::prelude::*;
use std::f64::consts::PI;
use std::sync::Arc;
use td_airfoil::{
    AirfoilFamily, AirfoilProfile, Attachment, DoubleCircularArc, FirTree, SectionShape,
};
use tracing::warn;

/// Disk height over the axial projection of the chord.
const DISK_HEIGHT_FACTOR: f64 = 1.25;

/// Fit clearance across a root slot [m].
const ROOT_TOLERANCE: f64 = 6e-4;

/// One blade section at a span station.
#[derive(Debug, Clone, PartialEq)]
pub struct BladeSection {
    pub span_fraction: f64,
    pub radius: f64,
    pub angles: MetalAngles,
    pub profile: AirfoilProfile,
}

/// A station whose section could not be built.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedStation {
    pub span_fraction: f64,
    pub radius: f64,
    pub error: StageError,
}

/// Row-level sizing and loading figures.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSummary {
    pub hub_radius: f64,
    pub tip_radius: f64,
    pub mean_radius: f64,
    /// Blade height [m].
    pub height: f64,
    /// Chord [m].
    pub chord: f64,
    pub max_thickness: f64,
    pub blade_count: u32,
    /// Blade spacing at the hub [m].
    pub pitch: f64,
    pub solidity: f64,
    /// Stagger change from hub to tip [rad].
    pub twist: f64,
    /// Axial extent of the row's disk [m].
    pub disk_height: f64,
    /// Exit over inlet velocity in the row frame, per station hub to tip.
    pub de_haller: Vec<f64>,
    /// Lieblein diffusion factor, per station hub to tip.
    pub diffusion_factor: Vec<f64>,
    /// Fir-tree root, top edge at the hub for rotors and at the tip for stators.
    pub attachment: Attachment,
}

/// Immutable blade row: sections ordered hub to tip plus rejected stations.
#[derive(Debug, Clone, PartialEq)]
pub struct BladeRow {
    kind: RowKind,
    sections: Vec<BladeSection>,
    rejected: Vec<RejectedStation>,
    summary: RowSummary,
}

impl BladeRow {
    pub fn kind(&self) -> RowKind {
        self.kind
    }

    pub fn sections(&self) -> &[BladeSection] {
        &self.sections
    }

    pub fn rejected(&self) -> &[RejectedStation] {
        &self.rejected
    }

    pub fn summary(&self) -> &RowSummary {
        &self.summary
    }

    /// True when every station produced a section.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Builds blade rows from the radial tables of a solved stage.
#[derive(Debug, Clone)]
pub struct BladeRowGenerator {
    family: Arc<dyn AirfoilFamily>,
    incidence: Arc<dyn IncidenceDeviation>,
}

impl Default for BladeRowGenerator {
    fn default() -> Self {
        Self::new(Arc::new(DoubleCircularArc::default()), Arc::new(ZeroIncidence))
    }
}

/// Flow angles seen by the row: relative for rotors, absolute for stators.
fn row_angle(kind: RowKind, triangle: &VelocityTriangle) -> f64 {
    match kind {
        RowKind::Rotor => triangle.beta(),
        RowKind::Stator => triangle.alpha(),
    }
}

/// Rotor roots follow the hub rim; stator roots are straight and a pitch wide.
fn root_attachment(kind: RowKind, pitch: f64, hub_radius: f64) -> StageResult<Attachment> {
    let (top_width, rim_radius) = match kind {
        RowKind::Rotor => (0.75 * pitch, Some(hub_radius)),
        RowKind::Stator => (pitch, None),
    };
    FirTree::for_pitch(pitch, top_width, rim_radius, ROOT_TOLERANCE)
        .attachment()
        .map_err(StageError::from)
}

fn row_speed(kind: RowKind, triangle: &VelocityTriangle) -> f64 {
    match kind {
        RowKind::Rotor => triangle.relative(),
        RowKind::Stator => triangle.absolute(),
    }
}

/// Lieblein diffusion factor from row-frame flow angles.
fn lieblein_diffusion(inlet: f64, outlet: f64, solidity: f64) -> f64 {
    1.0 - inlet.cos() / outlet.cos()
        + inlet.cos() * (inlet.tan() - outlet.tan()).abs() / (2.0 * solidity)
}

impl BladeRowGenerator {
    pub fn new(family: Arc<dyn AirfoilFamily>, incidence: Arc<dyn IncidenceDeviation>) -> Self {
        Self { family, incidence }
    }

    pub fn generate(
        &self,
        design: &StageDesign,
        kind: RowKind,
        stations: &[RadialStation],
        params: &RowParameters,
    ) -> StageResult<BladeRow> {
        params.validate()?;
        let (first, last) = match stations {
            [first, .., last] => (first, last),
            _ => {
                return Err(StageError::infeasible(
                    "a blade row needs at least two stations",
                ));
            }
        };

        let hub_radius = first.radius;
        let tip_radius = last.radius;
        let height = tip_radius - hub_radius;
        if !height.is_finite() || height <= 0.0 {
            return Err(StageError::infeasible("blade height must be positive"));
        }
        let mean_radius = design.annulus.mean();
        let chord = height / params.aspect_ratio;
        let max_thickness = params.thickness_to_chord * chord;
        let solidity = params.solidity();

        let raw_count = (2.0 * PI * mean_radius / (params.pitch_to_chord * chord)).ceil();
        if !raw_count.is_finite() || raw_count < 1.0 || raw_count > f64::from(u32::MAX) {
            return Err(StageError::infeasible("blade count out of range"));
        }
        let mut blade_count = raw_count as u32;
        // stators carry an even count
        if kind == RowKind::Stator && blade_count % 2 != 0 {
            blade_count -= 1;
        }
        if blade_count == 0 {
            return Err(StageError::infeasible("blade row has no blades"));
        }
        let pitch = 2.0 * PI * hub_radius / f64::from(blade_count);
        let attachment = root_attachment(kind, pitch, hub_radius)?;

        let outcomes: Vec<Result<BladeSection, RejectedStation>> = stations
            .par_iter()
            .map(|station| {
                self.section(kind, station, chord, max_thickness, params, solidity)
                    .map_err(|error| RejectedStation {
                        span_fraction: station.span_fraction,
                        radius: station.radius,
                        error,
                    })
            })
            .collect();

        let mut sections = Vec::with_capacity(outcomes.len());
        let mut rejected = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(section) => sections.push(section),
                Err(station) => {
                    warn!(
                        row = ?kind,
                        span = station.span_fraction,
                        error = %station.error,
                        "station rejected"
                    );
                    rejected.push(station);
                }
            }
        }

        let de_haller = stations
            .iter()
            .map(|s| row_speed(kind, &s.outlet) / row_speed(kind, &s.inlet))
            .collect();
        let diffusion_factor = stations
            .iter()
            .map(|s| {
                lieblein_diffusion(row_angle(kind, &s.inlet), row_angle(kind, &s.outlet), solidity)
            })
            .collect();

        let twist = match (sections.first(), sections.last()) {
            (Some(hub), Some(tip)) => tip.angles.stagger() - hub.angles.stagger(),
            _ => 0.0,
        };
        // rotor disks sit under the hub section, stator rings over the tip section
        let disk_section = match kind {
            RowKind::Rotor => sections.first(),
            RowKind::Stator => sections.last(),
        };
        let disk_stagger = disk_section.map_or(0.0, |s| s.angles.stagger());
        let disk_height = (chord * disk_stagger.cos()).abs() * DISK_HEIGHT_FACTOR;

        Ok(BladeRow {
            kind,
            sections,
            rejected,
            summary: RowSummary {
                hub_radius,
                tip_radius,
                mean_radius,
                height,
                chord,
                max_thickness,
                blade_count,
                pitch,
                solidity,
                twist,
                disk_height,
                de_haller,
                diffusion_factor,
                attachment,
            },
        })
    }

    fn section(
        &self,
        kind: RowKind,
        station: &RadialStation,
        chord: f64,
        max_thickness: f64,
        params: &RowParameters,
        solidity: f64,
    ) -> StageResult<BladeSection> {
        let cascade = Cascade {
            inlet_flow: row_angle(kind, &station.inlet),
            outlet_flow: row_angle(kind, &station.outlet),
            solidity,
            thickness_to_chord: params.thickness_to_chord,
        };
        let angles = self.incidence.metal_angles(&cascade)?;
        let shape = SectionShape {
            chord,
            max_thickness,
            camber: angles.camber(),
            stagger: angles.stagger(),
        };
        let profile = self.family.profile(station.span_fraction, &shape)?;
        Ok(BladeSection {
            span_fraction: station.span_fraction,
            radius: station.radius,
            angles,
            profile,
        })
    }
}
