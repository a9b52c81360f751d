//! Solid-construction requests handed to an external geometry kernel.
//!
//! Machine frame: x axial (flow direction), y tangential, z radial. Blade
//! sections are planar outlines stacked along z at their station radius.

use serde::{Deserialize, Serialize};
use std::fmt;
use td_core::RequestId;
use td_solver::RowKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowSide {
    Rotor,
    Stator,
}

impl From<RowKind> for RowSide {
    fn from(kind: RowKind) -> Self {
        match kind {
            RowKind::Rotor => RowSide::Rotor,
            RowKind::Stator => RowSide::Stator,
        }
    }
}

impl fmt::Display for RowSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSide::Rotor => write!(f, "rotor"),
            RowSide::Stator => write!(f, "stator"),
        }
    }
}

/// Independent unit of kernel work. Requests of one unit only reference
/// requests of the same unit, except for the assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum UnitKey {
    BladeRow { stage: usize, row: RowSide },
    Shaft,
    Casing,
    Assembly,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKey::BladeRow { stage, row } => write!(f, "stage {stage} {row}"),
            UnitKey::Shaft => write!(f, "shaft"),
            UnitKey::Casing => write!(f, "casing"),
            UnitKey::Assembly => write!(f, "assembly"),
        }
    }
}

/// One closed blade section placed in the machine frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoftSection {
    pub span_fraction: f64,
    pub radius: f64,
    /// Closed outline, `[axial, tangential, radial]` in meters.
    pub outline: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GeometryOp {
    /// Loft a blade solid through sections ordered hub to tip.
    Loft { sections: Vec<LoftSection> },
    /// Copy a solid `count` times evenly around the machine axis.
    CircularPattern { source: RequestId, count: u32 },
    /// Revolve a closed `[axial, radial]` profile about the machine axis.
    Revolve { profile: Vec<[f64; 2]> },
    /// Extrude a closed `[axial, tangential, radial]` outline lying in a
    /// plane of constant axial position by `depth` along the axis.
    Extrude { profile: Vec<[f64; 3]>, depth: f64 },
    /// Union of `tools` onto `target`.
    Boolean {
        target: RequestId,
        tools: Vec<RequestId>,
    },
    /// `target` with every solid of `tools` removed.
    Cut {
        target: RequestId,
        tools: Vec<RequestId>,
    },
}

impl GeometryOp {
    /// Requests whose solids this operation consumes, in input order.
    pub fn inputs(&self) -> Vec<RequestId> {
        match self {
            GeometryOp::Loft { .. } | GeometryOp::Revolve { .. } | GeometryOp::Extrude { .. } => {
                Vec::new()
            }
            GeometryOp::CircularPattern { source, .. } => vec![*source],
            GeometryOp::Boolean { target, tools } | GeometryOp::Cut { target, tools } => {
                let mut inputs = Vec::with_capacity(tools.len() + 1);
                inputs.push(*target);
                inputs.extend_from_slice(tools);
                inputs
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRequest {
    pub id: RequestId,
    pub unit: UnitKey,
    pub op: GeometryOp,
}

/// Axial placement of one blade row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowPlacement {
    pub stage: usize,
    pub row: RowSide,
    /// Disk start and end along the axis [m].
    pub disk_start: f64,
    pub disk_end: f64,
    pub hub_radius: f64,
    pub tip_radius: f64,
    pub blade_count: u32,
}

/// Ordered request list for the stages that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryRequestPlan {
    pub requests: Vec<GeometryRequest>,
    pub rows: Vec<RowPlacement>,
}

impl GeometryRequestPlan {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn request(&self, id: RequestId) -> Option<&GeometryRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Requests grouped by unit, units in order of first appearance.
    pub fn units(&self) -> Vec<(UnitKey, Vec<&GeometryRequest>)> {
        let mut units: Vec<(UnitKey, Vec<&GeometryRequest>)> = Vec::new();
        for request in &self.requests {
            match units.iter_mut().find(|(key, _)| *key == request.unit) {
                Some((_, group)) => group.push(request),
                None => units.push((request.unit, vec![request])),
            }
        }
        units
    }

    /// Stage indices with geometry in this plan.
    pub fn stages(&self) -> Vec<usize> {
        let mut stages: Vec<usize> = self.rows.iter().map(|r| r.stage).collect();
        stages.dedup();
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> RequestId {
        RequestId::from_index(i)
    }

    #[test]
    fn boolean_and_cut_inputs_start_with_target() {
        let op = GeometryOp::Boolean {
            target: id(4),
            tools: vec![id(1), id(3)],
        };
        assert_eq!(op.inputs(), vec![id(4), id(1), id(3)]);
        assert!(GeometryOp::Revolve { profile: vec![] }.inputs().is_empty());

        let cut = GeometryOp::Cut {
            target: id(0),
            tools: vec![id(2)],
        };
        assert_eq!(cut.inputs(), vec![id(0), id(2)]);
        let extrude = GeometryOp::Extrude {
            profile: vec![[0.0, 0.0, 0.1]],
            depth: 0.01,
        };
        assert!(extrude.inputs().is_empty());
    }

    #[test]
    fn units_group_in_first_appearance_order() {
        let rotor = UnitKey::BladeRow {
            stage: 0,
            row: RowSide::Rotor,
        };
        let revolve = || GeometryOp::Revolve { profile: vec![] };
        let plan = GeometryRequestPlan {
            requests: vec![
                GeometryRequest { id: id(0), unit: rotor, op: revolve() },
                GeometryRequest { id: id(1), unit: UnitKey::Shaft, op: revolve() },
                GeometryRequest { id: id(2), unit: rotor, op: revolve() },
            ],
            rows: Vec::new(),
        };
        let units = plan.units();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].0, rotor);
        assert_eq!(units[0].1.len(), 2);
        assert_eq!(units[1].0, UnitKey::Shaft);
        assert_eq!(rotor.to_string(), "stage 0 rotor");
    }

    #[test]
    fn requests_serialize_with_tags() {
        let request = GeometryRequest {
            id: id(2),
            unit: UnitKey::Casing,
            op: GeometryOp::CircularPattern {
                source: id(1),
                count: 24,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"unit\":\"casing\""));
        assert!(json.contains("\"op\":\"circular_pattern\""));
        let back: GeometryRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
