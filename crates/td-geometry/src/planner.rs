//! Turns a sequenced machine into a kernel request plan.
//!
//! Stages are laid out along the axis first, then validated independently;
//! only stages that pass contribute requests. Nothing is auto-corrected.
//!
//! Every blade carries its fir-tree root. Rotor roots hang into slots cut in
//! the shaft disks, stator roots reach into slots cut in the casing wall.

use crate::error::{GeometryError, GeometryResult};
use crate::request::{
    GeometryOp, GeometryRequest, GeometryRequestPlan, LoftSection, RowPlacement, RowSide, UnitKey,
};
use rayon::prelude::*;
use td_airfoil::{CurveResolution, Point};
use td_core::RequestId;
use td_solver::{BladeRow, StageRecord, Turbomachinery};
use tracing::{debug, info, warn};

/// Spindle carrying the rotor disks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaftSpec {
    /// Spindle outer radius [m].
    pub outer_radius: f64,
    /// Minimum radial gap between spindle and every hub [m].
    pub clearance: f64,
}

impl ShaftSpec {
    pub fn validate(&self) -> GeometryResult<()> {
        if !self.outer_radius.is_finite() || self.outer_radius <= 0.0 {
            return Err(GeometryError::InvalidSpec {
                what: "shaft outer radius must be positive",
            });
        }
        if !self.clearance.is_finite() || self.clearance < 0.0 {
            return Err(GeometryError::InvalidSpec {
                what: "shaft clearance must be non-negative",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CasingSpec {
    /// Radial gap between blade tips and the casing wall [m].
    pub tip_clearance: f64,
    /// Wall thickness [m].
    pub thickness: f64,
}

impl CasingSpec {
    pub fn validate(&self) -> GeometryResult<()> {
        if !self.tip_clearance.is_finite() || self.tip_clearance < 0.0 {
            return Err(GeometryError::InvalidSpec {
                what: "casing tip clearance must be non-negative",
            });
        }
        if !self.thickness.is_finite() || self.thickness <= 0.0 {
            return Err(GeometryError::InvalidSpec {
                what: "casing thickness must be positive",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Thinnest blade section accepted [m].
    pub min_thickness: f64,
    /// Minimum overlap of adjacent section envelopes, as a fraction of the
    /// smaller envelope's area.
    pub min_envelope_overlap: f64,
    pub resolution: CurveResolution,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_thickness: 5e-4,
            min_envelope_overlap: 0.25,
            resolution: CurveResolution::default(),
        }
    }
}

/// Plan for the feasible stages plus one error per infeasible stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPlanOutcome {
    pub plan: GeometryRequestPlan,
    pub infeasible: Vec<GeometryError>,
}

/// Axis-aligned bounding box of a section outline in its own plane.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Envelope {
    min: [f64; 2],
    max: [f64; 2],
}

impl Envelope {
    fn of(points: &[[f64; 2]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut env = Envelope {
            min: *first,
            max: *first,
        };
        for p in rest {
            for axis in 0..2 {
                env.min[axis] = env.min[axis].min(p[axis]);
                env.max[axis] = env.max[axis].max(p[axis]);
            }
        }
        Some(env)
    }

    fn area(&self) -> f64 {
        (self.max[0] - self.min[0]) * (self.max[1] - self.min[1])
    }

    /// Intersection area over the smaller of the two areas.
    fn overlap_ratio(&self, other: &Envelope) -> f64 {
        let width = (self.max[0].min(other.max[0]) - self.min[0].max(other.min[0])).max(0.0);
        let height = (self.max[1].min(other.max[1]) - self.min[1].max(other.min[1])).max(0.0);
        let smaller = self.area().min(other.area());
        if smaller <= 0.0 {
            0.0
        } else {
            width * height / smaller
        }
    }
}

/// Slots start this far past the rim, relative to its radius, so the cut
/// clears the disk or casing surface.
const SLOT_LIFT: f64 = 1e-4;

/// Blade row positioned on the axis, sections already in the machine frame.
#[derive(Debug, Clone)]
struct RowGeometry {
    placement: RowPlacement,
    sections: Vec<LoftSection>,
    /// Root and slot outlines on the disk start face.
    root: Vec<[f64; 3]>,
    slot: Vec<[f64; 3]>,
    root_height: f64,
    axial_min: f64,
    axial_max: f64,
}

#[derive(Debug, Clone)]
struct StageGeometry {
    stage: usize,
    rotor: RowGeometry,
    stator: RowGeometry,
}

/// Axial slots of one solved stage.
#[derive(Debug, Clone, Copy)]
struct StageSlot<'a> {
    record: &'a StageRecord,
    rotor: &'a BladeRow,
    stator: &'a BladeRow,
    rotor_start: f64,
    stator_start: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryAssemblyPlanner {
    config: PlannerConfig,
}

impl GeometryAssemblyPlanner {
    pub fn new(config: PlannerConfig) -> GeometryResult<Self> {
        if !config.min_thickness.is_finite() || config.min_thickness < 0.0 {
            return Err(GeometryError::InvalidSpec {
                what: "minimum thickness must be non-negative",
            });
        }
        if !(0.0..=1.0).contains(&config.min_envelope_overlap) {
            return Err(GeometryError::InvalidSpec {
                what: "minimum envelope overlap must lie in [0, 1]",
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(
        &self,
        machine: &Turbomachinery,
        shaft: &ShaftSpec,
        casing: &CasingSpec,
    ) -> GeometryResult<GeometryPlanOutcome> {
        shaft.validate()?;
        casing.validate()?;

        let mut infeasible = Vec::new();
        let slots = layout(machine, &mut infeasible);

        let checked: Vec<Result<StageGeometry, GeometryError>> = slots
            .par_iter()
            .map(|slot| self.stage_geometry(slot, shaft, casing))
            .collect();

        let feasible = admit(checked, &mut infeasible);
        infeasible.sort_by_key(|err| match err {
            GeometryError::Infeasible { stage, .. } => *stage,
            GeometryError::InvalidSpec { .. } => usize::MAX,
        });
        for err in &infeasible {
            warn!(error = %err, "stage geometry rejected");
        }

        let plan = build_plan(&feasible, shaft, casing)?;
        info!(
            stages = feasible.len(),
            rejected = infeasible.len(),
            requests = plan.requests.len(),
            "geometry plan built"
        );
        Ok(GeometryPlanOutcome { plan, infeasible })
    }

    /// Like `plan`, but the first infeasible stage is an error.
    pub fn plan_strict(
        &self,
        machine: &Turbomachinery,
        shaft: &ShaftSpec,
        casing: &CasingSpec,
    ) -> GeometryResult<GeometryRequestPlan> {
        let outcome = self.plan(machine, shaft, casing)?;
        match outcome.infeasible.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(outcome.plan),
        }
    }

    fn stage_geometry(
        &self,
        slot: &StageSlot<'_>,
        shaft: &ShaftSpec,
        casing: &CasingSpec,
    ) -> Result<StageGeometry, GeometryError> {
        let stage = slot.record.index;
        let infeasible = |reason: String| GeometryError::Infeasible { stage, reason };

        let rotor = self
            .row_geometry(stage, slot.rotor, slot.rotor_start)
            .map_err(infeasible)?;
        let stator = self
            .row_geometry(stage, slot.stator, slot.stator_start)
            .map_err(infeasible)?;

        let stage = StageGeometry {
            stage,
            rotor,
            stator,
        };
        check_stage(&stage, shaft, casing)?;
        debug!(stage = stage.stage, "stage geometry validated");
        Ok(stage)
    }

    fn row_geometry(
        &self,
        stage: usize,
        row: &BladeRow,
        disk_start: f64,
    ) -> Result<RowGeometry, String> {
        let side = RowSide::from(row.kind());
        if !row.rejected().is_empty() {
            return Err(format!(
                "{side} row has {} degenerate stations",
                row.rejected().len()
            ));
        }
        if row.sections().len() < 2 {
            return Err(format!("{side} row needs at least two sections"));
        }

        let summary = row.summary();
        let center = disk_start + summary.disk_height / 2.0;
        let mut sections = Vec::with_capacity(row.sections().len());
        let mut envelopes: Vec<Envelope> = Vec::with_capacity(row.sections().len());
        for section in row.sections() {
            let thickness = section.profile.max_thickness();
            if thickness < self.config.min_thickness {
                return Err(format!(
                    "{side} section at span {:.3} is {thickness:.2e} m thick, below {:.2e} m",
                    section.span_fraction, self.config.min_thickness
                ));
            }
            let outline: Vec<[f64; 2]> = section
                .profile
                .curve(self.config.resolution)
                .map_err(|e| format!("{side} section at span {:.3}: {e}", section.span_fraction))?
                .iter()
                .map(|p| [p.x, p.y])
                .collect();
            let envelope = Envelope::of(&outline)
                .ok_or_else(|| format!("{side} section outline is empty"))?;
            if let Some(previous) = envelopes.last() {
                let ratio = previous.overlap_ratio(&envelope);
                if ratio < self.config.min_envelope_overlap {
                    return Err(format!(
                        "{side} sections next to span {:.3} overlap by {ratio:.2}, below {:.2}",
                        section.span_fraction, self.config.min_envelope_overlap
                    ));
                }
            }
            envelopes.push(envelope);
            sections.push(LoftSection {
                span_fraction: section.span_fraction,
                radius: section.radius,
                outline: outline
                    .iter()
                    .map(|[x, y]| [center + x, *y, section.radius])
                    .collect(),
            });
        }

        let attachment = &summary.attachment;
        let (rim, inward) = match side {
            RowSide::Rotor => (summary.hub_radius, true),
            RowSide::Stator => (summary.tip_radius, false),
        };
        let lift = if inward { SLOT_LIFT } else { -SLOT_LIFT };
        let root = place_root(attachment.outline(), disk_start, rim, inward);
        let slot = place_root(attachment.slot(), disk_start, rim * (1.0 + lift), inward);

        let axial_min = envelopes
            .iter()
            .map(|e| center + e.min[0])
            .fold(f64::INFINITY, f64::min);
        let axial_max = envelopes
            .iter()
            .map(|e| center + e.max[0])
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(RowGeometry {
            placement: RowPlacement {
                stage,
                row: side,
                disk_start,
                disk_end: disk_start + summary.disk_height,
                hub_radius: summary.hub_radius,
                tip_radius: summary.tip_radius,
                blade_count: summary.blade_count,
            },
            sections,
            root,
            slot,
            root_height: attachment.height(),
            axial_min,
            axial_max,
        })
    }
}

/// Checks a stage's rows against each other and against the shaft and
/// casing.
fn check_stage(
    stage: &StageGeometry,
    shaft: &ShaftSpec,
    casing: &CasingSpec,
) -> Result<(), GeometryError> {
    let infeasible = |reason: String| GeometryError::Infeasible {
        stage: stage.stage,
        reason,
    };
    let (rotor, stator) = (&stage.rotor, &stage.stator);

    if rotor.axial_max >= stator.axial_min {
        return Err(infeasible("rotor and stator overlap axially".to_string()));
    }
    let min_hub = rotor.placement.hub_radius.min(stator.placement.hub_radius);
    if shaft.outer_radius + shaft.clearance >= min_hub {
        return Err(infeasible(format!(
            "shaft radius {:.4} m plus clearance {:.4} m reaches hub radius {:.4} m",
            shaft.outer_radius, shaft.clearance, min_hub
        )));
    }
    let root_bottom = rotor.placement.hub_radius - rotor.root_height;
    if shaft.outer_radius + shaft.clearance >= root_bottom {
        return Err(infeasible(format!(
            "rotor root reaches down to {root_bottom:.4} m, inside the shaft \
             radius {:.4} m plus clearance {:.4} m",
            shaft.outer_radius, shaft.clearance
        )));
    }
    if stator.root_height >= casing.thickness {
        return Err(infeasible(format!(
            "stator root is {:.4} m tall, not inside the {:.4} m casing wall",
            stator.root_height, casing.thickness
        )));
    }
    Ok(())
}

/// Keeps checked stages in order, dropping any whose rotor reaches back into
/// the stator of the last stage kept.
fn admit(
    checked: Vec<Result<StageGeometry, GeometryError>>,
    infeasible: &mut Vec<GeometryError>,
) -> Vec<StageGeometry> {
    let mut feasible: Vec<StageGeometry> = Vec::with_capacity(checked.len());
    for result in checked {
        let stage = match result {
            Ok(stage) => stage,
            Err(err) => {
                infeasible.push(err);
                continue;
            }
        };
        if let Some(upstream) = feasible.last() {
            if upstream.stator.axial_max >= stage.rotor.axial_min {
                infeasible.push(GeometryError::Infeasible {
                    stage: stage.stage,
                    reason: format!(
                        "rotor overlaps the stator of stage {} axially",
                        upstream.stage
                    ),
                });
                continue;
            }
        }
        feasible.push(stage);
    }
    feasible
}

/// Root outline on the axial plane `axial`, top edge at radius `rim`. Roots
/// grow towards the axis when `inward`, away from it otherwise.
fn place_root(outline: &[Point], axial: f64, rim: f64, inward: bool) -> Vec<[f64; 3]> {
    outline
        .iter()
        .map(|p| {
            let radial = if inward { rim + p.y } else { rim - p.y };
            [axial, p.x, radial]
        })
        .collect()
}

/// Rotor at the stage offset, stator after the rotor disk and row gap, next
/// stage after the stage gap. Gaps scale with the rotor chord.
fn layout<'a>(
    machine: &'a Turbomachinery,
    infeasible: &mut Vec<GeometryError>,
) -> Vec<StageSlot<'a>> {
    let mut slots = Vec::with_capacity(machine.stages().len());
    let mut cursor = 0.0;
    for record in machine.stages() {
        let Some(solved) = record.solved() else {
            infeasible.push(GeometryError::Infeasible {
                stage: record.index,
                reason: "stage did not solve".to_string(),
            });
            continue;
        };
        let rotor = solved.rotor.summary();
        let stator = solved.stator.summary();
        let rotor_start = cursor;
        let stator_start =
            rotor_start + rotor.disk_height + record.target.row_gap_to_chord * rotor.chord;
        cursor =
            stator_start + stator.disk_height + record.target.stage_gap_to_chord * rotor.chord;
        slots.push(StageSlot {
            record,
            rotor: &solved.rotor,
            stator: &solved.stator,
            rotor_start,
            stator_start,
        });
    }
    slots
}

struct PlanBuilder {
    requests: Vec<GeometryRequest>,
}

impl PlanBuilder {
    fn push(&mut self, unit: UnitKey, op: GeometryOp) -> GeometryResult<RequestId> {
        let index = u32::try_from(self.requests.len()).map_err(|_| GeometryError::InvalidSpec {
            what: "too many geometry requests",
        })?;
        let id = RequestId::from_index(index);
        self.requests.push(GeometryRequest { id, unit, op });
        Ok(id)
    }
}

/// Appends `point` unless it repeats the previous one.
fn push_point(profile: &mut Vec<[f64; 2]>, point: [f64; 2]) {
    if profile.last() != Some(&point) {
        profile.push(point);
    }
}

fn close(profile: &mut Vec<[f64; 2]>) {
    if let Some(&first) = profile.first() {
        if profile.last() != Some(&first) {
            profile.push(first);
        }
    }
}

/// Spindle with a raised disk under every rotor row.
fn shaft_profile(rows: &[&RowGeometry], shaft: &ShaftSpec) -> Vec<[f64; 2]> {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Vec::new();
    };
    let r0 = shaft.outer_radius;
    let (start, end) = (first.placement.disk_start, last.placement.disk_end);
    let mut profile = vec![[start, 0.0]];
    push_point(&mut profile, [start, r0]);
    for row in rows.iter().filter(|r| r.placement.row == RowSide::Rotor) {
        let p = &row.placement;
        push_point(&mut profile, [p.disk_start, r0]);
        push_point(&mut profile, [p.disk_start, p.hub_radius]);
        push_point(&mut profile, [p.disk_end, p.hub_radius]);
        push_point(&mut profile, [p.disk_end, r0]);
    }
    push_point(&mut profile, [end, r0]);
    push_point(&mut profile, [end, 0.0]);
    close(&mut profile);
    profile
}

/// Wall clearing the rotor tips and meeting the stator tips.
fn casing_profile(rows: &[&RowGeometry], casing: &CasingSpec) -> Vec<[f64; 2]> {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Vec::new();
    };
    let inner = |row: &RowGeometry| match row.placement.row {
        RowSide::Rotor => row.placement.tip_radius + casing.tip_clearance,
        RowSide::Stator => row.placement.tip_radius,
    };
    let outer = rows.iter().map(|r| inner(r)).fold(f64::NEG_INFINITY, f64::max) + casing.thickness;

    let mut profile = Vec::with_capacity(2 * rows.len() + 3);
    for row in rows {
        let r = inner(row);
        push_point(&mut profile, [row.placement.disk_start, r]);
        push_point(&mut profile, [row.placement.disk_end, r]);
    }
    push_point(&mut profile, [last.placement.disk_end, outer]);
    push_point(&mut profile, [first.placement.disk_start, outer]);
    close(&mut profile);
    profile
}

fn build_plan(
    stages: &[StageGeometry],
    shaft: &ShaftSpec,
    casing: &CasingSpec,
) -> GeometryResult<GeometryRequestPlan> {
    let mut builder = PlanBuilder {
        requests: Vec::new(),
    };
    if stages.is_empty() {
        return Ok(GeometryRequestPlan::default());
    }

    let rows: Vec<&RowGeometry> = stages.iter().flat_map(|s| [&s.rotor, &s.stator]).collect();
    let mut rotor_patterns = Vec::with_capacity(stages.len());
    let mut stator_patterns = Vec::with_capacity(stages.len());
    for row in &rows {
        let p = &row.placement;
        let unit = UnitKey::BladeRow {
            stage: p.stage,
            row: p.row,
        };
        let airfoil = builder.push(
            unit,
            GeometryOp::Loft {
                sections: row.sections.clone(),
            },
        )?;
        let root = builder.push(
            unit,
            GeometryOp::Extrude {
                profile: row.root.clone(),
                depth: p.disk_end - p.disk_start,
            },
        )?;
        let blade = builder.push(
            unit,
            GeometryOp::Boolean {
                target: airfoil,
                tools: vec![root],
            },
        )?;
        let pattern = builder.push(
            unit,
            GeometryOp::CircularPattern {
                source: blade,
                count: p.blade_count,
            },
        )?;
        match p.row {
            RowSide::Rotor => rotor_patterns.push(pattern),
            RowSide::Stator => stator_patterns.push(pattern),
        }
    }

    let shaft_id = builder.push(
        UnitKey::Shaft,
        GeometryOp::Revolve {
            profile: shaft_profile(&rows, shaft),
        },
    )?;
    let shaft_id = cut_slots(&mut builder, UnitKey::Shaft, shaft_id, &rows, RowSide::Rotor)?;
    let casing_id = builder.push(
        UnitKey::Casing,
        GeometryOp::Revolve {
            profile: casing_profile(&rows, casing),
        },
    )?;
    let casing_id = cut_slots(&mut builder, UnitKey::Casing, casing_id, &rows, RowSide::Stator)?;
    builder.push(
        UnitKey::Assembly,
        GeometryOp::Boolean {
            target: shaft_id,
            tools: rotor_patterns,
        },
    )?;
    builder.push(
        UnitKey::Assembly,
        GeometryOp::Boolean {
            target: casing_id,
            tools: stator_patterns,
        },
    )?;

    Ok(GeometryRequestPlan {
        requests: builder.requests,
        rows: rows.iter().map(|r| r.placement).collect(),
    })
}

/// Cuts one patterned root slot per `side` row out of `body`, returning the
/// id of the final cut.
fn cut_slots(
    builder: &mut PlanBuilder,
    unit: UnitKey,
    body: RequestId,
    rows: &[&RowGeometry],
    side: RowSide,
) -> GeometryResult<RequestId> {
    let mut body = body;
    for row in rows.iter().filter(|r| r.placement.row == side) {
        let p = &row.placement;
        let slot = builder.push(
            unit,
            GeometryOp::Extrude {
                profile: row.slot.clone(),
                depth: p.disk_end - p.disk_start,
            },
        )?;
        let slots = builder.push(
            unit,
            GeometryOp::CircularPattern {
                source: slot,
                count: p.blade_count,
            },
        )?;
        body = builder.push(
            unit,
            GeometryOp::Cut {
                target: body,
                tools: vec![slots],
            },
        )?;
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(stage: usize, side: RowSide, start: f64, end: f64, hub: f64, tip: f64) -> RowGeometry {
        RowGeometry {
            placement: RowPlacement {
                stage,
                row: side,
                disk_start: start,
                disk_end: end,
                hub_radius: hub,
                tip_radius: tip,
                blade_count: 10,
            },
            sections: Vec::new(),
            root: Vec::new(),
            slot: Vec::new(),
            root_height: 0.0,
            axial_min: start,
            axial_max: end,
        }
    }

    fn stage(index: usize, start: f64) -> StageGeometry {
        StageGeometry {
            stage: index,
            rotor: row(index, RowSide::Rotor, start, start + 0.02, 0.05, 0.1),
            stator: row(index, RowSide::Stator, start + 0.03, start + 0.05, 0.05, 0.1),
        }
    }

    fn shaft() -> ShaftSpec {
        ShaftSpec {
            outer_radius: 0.02,
            clearance: 0.005,
        }
    }

    fn casing() -> CasingSpec {
        CasingSpec {
            tip_clearance: 0.0005,
            thickness: 0.004,
        }
    }

    fn reason(err: GeometryError) -> (usize, String) {
        match err {
            GeometryError::Infeasible { stage, reason } => (stage, reason),
            other => panic!("expected an infeasible stage, got {other:?}"),
        }
    }

    #[test]
    fn rotor_reaching_into_its_stator_is_infeasible() {
        assert!(check_stage(&stage(1, 0.0), &shaft(), &casing()).is_ok());

        let mut crowded = stage(1, 0.0);
        crowded.stator.axial_min = 0.015;
        let (index, why) = reason(check_stage(&crowded, &shaft(), &casing()).unwrap_err());
        assert_eq!(index, 1);
        assert!(why.contains("overlap axially"));
    }

    #[test]
    fn roots_must_fit_the_shaft_and_casing() {
        let mut deep = stage(2, 0.0);
        deep.rotor.root_height = 0.03;
        let (index, why) = reason(check_stage(&deep, &shaft(), &casing()).unwrap_err());
        assert_eq!(index, 2);
        assert!(why.contains("rotor root"));

        let mut tall = stage(2, 0.0);
        tall.stator.root_height = 0.004;
        let (_, why) = reason(check_stage(&tall, &shaft(), &casing()).unwrap_err());
        assert!(why.contains("casing wall"));
    }

    #[test]
    fn stage_reaching_back_upstream_is_dropped_alone() {
        let checked = vec![
            Ok(stage(0, 0.0)),
            Ok(stage(1, 0.04)),
            Ok(stage(2, 0.1)),
            Err(GeometryError::Infeasible {
                stage: 3,
                reason: "test".to_string(),
            }),
        ];
        let mut infeasible = Vec::new();
        let kept: Vec<usize> = admit(checked, &mut infeasible)
            .iter()
            .map(|s| s.stage)
            .collect();
        assert_eq!(kept, vec![0, 2]);
        assert_eq!(infeasible.len(), 2);
        let (index, why) = reason(infeasible.remove(0));
        assert_eq!(index, 1);
        assert!(why.contains("stator of stage 0"));
        assert_eq!(reason(infeasible.remove(0)).0, 3);
    }

    #[test]
    fn envelope_overlap_ratio() {
        let a = Envelope::of(&[[0.0, 0.0], [2.0, 1.0]]).unwrap();
        let b = Envelope::of(&[[1.0, 0.0], [3.0, 1.0], [2.0, 0.5]]).unwrap();
        assert!((a.overlap_ratio(&b) - 0.5).abs() < 1e-12);
        let far = Envelope::of(&[[5.0, 5.0], [6.0, 6.0]]).unwrap();
        assert_eq!(a.overlap_ratio(&far), 0.0);
        assert!(Envelope::of(&[]).is_none());
    }

    #[test]
    fn shaft_profile_steps_up_under_rotors() {
        let rotor = row(0, RowSide::Rotor, 0.0, 0.02, 0.05, 0.1);
        let stator = row(0, RowSide::Stator, 0.03, 0.05, 0.055, 0.1);
        let shaft = ShaftSpec {
            outer_radius: 0.02,
            clearance: 0.005,
        };
        let profile = shaft_profile(&[&rotor, &stator], &shaft);
        assert_eq!(
            profile,
            vec![
                [0.0, 0.0],
                [0.0, 0.02],
                [0.0, 0.05],
                [0.02, 0.05],
                [0.02, 0.02],
                [0.05, 0.02],
                [0.05, 0.0],
                [0.0, 0.0],
            ]
        );
    }

    #[test]
    fn casing_profile_clears_rotors_and_meets_stators() {
        let rotor = row(0, RowSide::Rotor, 0.0, 0.02, 0.05, 0.11);
        let stator = row(0, RowSide::Stator, 0.03, 0.05, 0.055, 0.1);
        let casing = CasingSpec {
            tip_clearance: 0.001,
            thickness: 0.004,
        };
        let profile = casing_profile(&[&rotor, &stator], &casing);
        assert_eq!(profile.first(), profile.last());
        assert_eq!(profile[..4], [[0.0, 0.111], [0.02, 0.111], [0.03, 0.1], [0.05, 0.1]]);
        assert!(profile.iter().any(|p| (p[1] - 0.115).abs() < 1e-12));
    }

    #[test]
    fn roots_grow_away_from_the_rim() {
        let outline = [Point::new(-0.002, 0.0), Point::new(0.0, -0.006), Point::new(0.002, 0.0)];
        let rotor = place_root(&outline, 0.1, 0.05, true);
        assert_eq!(rotor[1], [0.1, 0.0, 0.05 - 0.006]);
        let stator = place_root(&outline, 0.1, 0.12, false);
        assert_eq!(stator[1], [0.1, 0.0, 0.12 + 0.006]);
        assert!(stator.iter().all(|p| p[0] == 0.1 && p[2] >= 0.12));
    }

    #[test]
    fn slots_are_cut_in_sequence() {
        let rotors = [
            row(0, RowSide::Rotor, 0.0, 0.02, 0.05, 0.11),
            row(1, RowSide::Rotor, 0.06, 0.08, 0.052, 0.11),
        ];
        let rows: Vec<&RowGeometry> = rotors.iter().collect();
        let mut builder = PlanBuilder {
            requests: Vec::new(),
        };
        let body = builder
            .push(UnitKey::Shaft, GeometryOp::Revolve { profile: Vec::new() })
            .unwrap();
        let last = cut_slots(&mut builder, UnitKey::Shaft, body, &rows, RowSide::Rotor).unwrap();
        assert_eq!(builder.requests.len(), 1 + 2 * 3);
        assert_eq!(last, builder.requests[6].id);
        let GeometryOp::Cut { target, tools } = &builder.requests[3].op else {
            panic!("expected a cut");
        };
        assert_eq!((*target, tools.as_slice()), (body, &[builder.requests[2].id][..]));
        let GeometryOp::Cut { target, .. } = &builder.requests[6].op else {
            panic!("expected a cut");
        };
        assert_eq!(*target, builder.requests[3].id);
        let stators = cut_slots(&mut builder, UnitKey::Shaft, body, &rows, RowSide::Stator);
        assert_eq!(stators.unwrap(), body);
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(
            GeometryAssemblyPlanner::new(PlannerConfig {
                min_envelope_overlap: 1.5,
                ..PlannerConfig::default()
            })
            .is_err()
        );
        let casing = CasingSpec {
            tip_clearance: 0.001,
            thickness: 0.0,
        };
        assert!(casing.validate().is_err());
        let shaft = ShaftSpec {
            outer_radius: -1.0,
            clearance: 0.0,
        };
        assert!(shaft.validate().is_err());
    }
}
