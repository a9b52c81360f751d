//! Fir-tree blade root.
//!
//! The left flank is built bottom up: a dovetail arc, then `lobes` repeats of
//! lower flank, neck arc, upper flank and lobe arc. The right flank mirrors
//! it. The top edge either follows the disk rim or is straight. Outlines are
//! shifted so their highest point sits at y = 0 and the root hangs below.

use crate::Point;
use crate::error::{AirfoilError, AirfoilResult};
use nalgebra::Vector2;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use td_core::numeric::linspace;

/// Fir-tree root proportions. Lengths in meters, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirTree {
    /// Upper flank angle γ above the horizontal.
    pub upper_flank_angle: f64,
    /// Lower flank angle β above the horizontal.
    pub lower_flank_angle: f64,
    pub lower_flank: f64,
    pub upper_flank: f64,
    /// Radius of the outward lobe arcs.
    pub lobe_radius: f64,
    /// Radius of the inward neck arcs.
    pub neck_radius: f64,
    pub dove_radius: f64,
    /// Width of the top edge where the root meets the blade.
    pub top_width: f64,
    pub lobes: usize,
    /// Rim the top edge follows; straight when `None`.
    pub rim_radius: Option<f64>,
    /// Fit clearance added across the slot width.
    pub tolerance: f64,
    pub arc_points: usize,
}

impl FirTree {
    /// Two-lobe root with 40° flanks, sized from the blade pitch.
    pub fn for_pitch(
        pitch: f64,
        top_width: f64,
        rim_radius: Option<f64>,
        tolerance: f64,
    ) -> Self {
        let flank = 40.0_f64.to_radians();
        Self {
            upper_flank_angle: flank,
            lower_flank_angle: flank,
            lower_flank: 0.15 * pitch,
            upper_flank: 0.2 * pitch,
            lobe_radius: 0.05 * pitch,
            neck_radius: 0.025 * pitch,
            dove_radius: 0.05 * pitch,
            top_width,
            lobes: 2,
            rim_radius,
            tolerance,
            arc_points: 20,
        }
    }

    pub fn validate(&self) -> AirfoilResult<()> {
        let invalid = |what| Err(AirfoilError::InvalidAttachment { what });
        let positive = |v: f64| v.is_finite() && v > 0.0;
        for angle in [self.upper_flank_angle, self.lower_flank_angle] {
            if !(angle > 0.0 && angle < FRAC_PI_2) {
                return invalid("flank angles must lie in (0, 90) degrees");
            }
        }
        let lengths = [
            self.lower_flank,
            self.upper_flank,
            self.lobe_radius,
            self.neck_radius,
            self.dove_radius,
            self.top_width,
        ];
        if !lengths.into_iter().all(positive) {
            return invalid("flank lengths, radii and top width must be positive");
        }
        if self.lobes == 0 {
            return invalid("at least one lobe is required");
        }
        if self.arc_points < 2 {
            return invalid("arcs need at least two points");
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return invalid("tolerance must be non-negative");
        }
        if let Some(radius) = self.rim_radius {
            if !positive(radius) || self.top_width + self.tolerance >= 2.0 * radius {
                return invalid("top edge must fit inside the rim diameter");
            }
        }
        Ok(())
    }

    pub fn attachment(&self) -> AirfoilResult<Attachment> {
        self.validate()?;
        let left = self.left_flank();
        let outline = self.outline(&left, 0.0);
        let slot = self.outline(&left, self.tolerance);
        if outline
            .iter()
            .chain(&slot)
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(AirfoilError::InvalidAttachment {
                what: "outline contains non-finite coordinates",
            });
        }

        let lowest = outline.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let bottom_width = left.first().map_or(0.0, |p| 2.0 * p.x.abs());
        Ok(Attachment {
            height: -lowest,
            bottom_width,
            outline,
            slot,
        })
    }

    /// One lobe starting at the origin, ending on top of its lobe arc.
    fn lobe(&self) -> Vec<Point> {
        let (gamma, beta) = (self.upper_flank_angle, self.lower_flank_angle);
        let origin = Point::origin();
        let neck_start = origin + Vector2::new(beta.cos(), beta.sin()) * self.lower_flank;
        let neck_end = neck_start + Vector2::new(0.0, 2.0 * self.neck_radius * gamma.cos());
        let neck_center = neck_start + Vector2::new(-gamma.sin(), gamma.cos()) * self.neck_radius;
        let lobe_start = neck_end + Vector2::new(-gamma.cos(), gamma.sin()) * self.upper_flank;
        let lobe_end = lobe_start + Vector2::new(0.0, 2.0 * self.lobe_radius * gamma.cos());
        let lobe_center = lobe_start + Vector2::new(beta.sin(), beta.cos()) * self.lobe_radius;

        let n = self.arc_points;
        let mut points = vec![origin, nalgebra::center(&origin, &neck_start)];
        points.extend(sweep(
            neck_center,
            self.neck_radius,
            angle_of(neck_center, neck_start),
            angle_of(neck_center, neck_end),
            n,
            false,
        ));
        points.push(neck_end);
        points.push(nalgebra::center(&neck_end, &lobe_start));
        // lobe arcs bulge outwards, through the leftmost point of the circle
        points.extend(sweep(
            lobe_center,
            self.lobe_radius,
            angle_of(lobe_center, lobe_start) + TAU,
            angle_of(lobe_center, lobe_end),
            n,
            true,
        ));
        points
    }

    /// Left flank from the bottom of the dovetail to the top corner, placed
    /// so the top corner sits at x = -top_width / 2.
    fn left_flank(&self) -> Vec<Point> {
        let lobe = self.lobe();
        let mut side = lobe.clone();
        for _ in 1..self.lobes {
            let Some(top) = side.pop() else { break };
            side.extend(lobe.iter().map(|p| top + p.coords));
        }

        let beta = self.lower_flank_angle;
        let dove_center = Point::from(Vector2::new(beta.sin(), -beta.cos()) * self.dove_radius);
        let dove_bottom = dove_center + Vector2::new(0.0, -self.dove_radius);
        let mut dove = sweep(
            dove_center,
            self.dove_radius,
            angle_of(dove_center, dove_bottom) + TAU,
            angle_of(dove_center, Point::origin()),
            self.arc_points,
            true,
        );
        // the first lobe starts at the origin
        dove.pop();

        let corner = side.last().map_or(0.0, |p| p.x);
        let shift = Vector2::new(-corner - self.top_width / 2.0, 0.0);
        dove.into_iter().chain(side).map(|p| p + shift).collect()
    }

    /// Closed outline with each flank moved out by half of `tolerance`.
    fn outline(&self, left: &[Point], tolerance: f64) -> Vec<Point> {
        let offset = Vector2::new(tolerance / 2.0, 0.0);
        let left: Vec<Point> = left.iter().map(|&p| p - offset).collect();
        let (Some(&bottom), Some(&corner)) = (left.first(), left.last()) else {
            return Vec::new();
        };

        let top = match self.rim_radius {
            Some(radius) => {
                let width = self.top_width + tolerance;
                let drop = (radius * radius - width * width / 4.0).sqrt();
                let center = Point::new(0.0, corner.y - drop);
                let start = angle_of(center, corner);
                sweep(center, radius, start, PI - start, self.arc_points, true)
            }
            None => vec![corner, Point::new(-corner.x, corner.y)],
        };

        let mut outline: Vec<Point> = left[..left.len() - 1]
            .iter()
            .chain(&top[..top.len() - 1])
            .copied()
            .chain(left.iter().rev().map(|p| Point::new(-p.x, p.y)))
            .chain(std::iter::once(bottom))
            .collect();
        let peak = outline.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        for p in &mut outline {
            p.y -= peak;
        }
        outline
    }
}

/// Closed root outline in the blade's tangential-radial plane: x across the
/// root, y radial, top edge at y = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    outline: Vec<Point>,
    slot: Vec<Point>,
    height: f64,
    bottom_width: f64,
}

impl Attachment {
    /// Root outline; the last point repeats the first.
    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    /// Outline widened by the fit tolerance, for cutting the slot.
    pub fn slot(&self) -> &[Point] {
        &self.slot
    }

    /// Radial extent of the root [m].
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Width across the bottom of the dovetail [m].
    pub fn bottom_width(&self) -> f64 {
        self.bottom_width
    }
}

fn angle_of(center: Point, p: Point) -> f64 {
    let d = p - center;
    d.y.atan2(d.x)
}

fn sweep(
    center: Point,
    radius: f64,
    from: f64,
    to: f64,
    points: usize,
    include_end: bool,
) -> Vec<Point> {
    // without the end, sample one more and drop it so the spacing is unchanged
    let mut angles = linspace(from, to, if include_end { points } else { points + 1 });
    if !include_end {
        angles.pop();
    }
    angles
        .into_iter()
        .map(|a| center + Vector2::new(a.cos(), a.sin()) * radius)
        .collect()
}
