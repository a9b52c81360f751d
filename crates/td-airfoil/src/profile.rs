//! Double-circular-arc (DCA) section.
//!
//! The outline is built from four pieces: a leading-edge circle, the lower
//! (pressure-side) arc, a trailing-edge circle and the upper (suction-side)
//! arc traversed backwards. Both arcs span `arc_weight · chord` around the
//! mid-chord and are trimmed to the portion lying between the edge circles.

use crate::Point;
use crate::error::{AirfoilError, AirfoilResult};
use nalgebra::{Rotation2, Vector2};
use std::f64::consts::{FRAC_PI_2, PI};
use td_core::numeric::linspace;

/// Camber magnitudes below this are treated as this value so the camber
/// radius stays finite.
const MIN_CAMBER: f64 = 1e-5;

/// Size and orientation of a blade section, independent of the family that
/// turns it into an outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionShape {
    /// Chord length [m].
    pub chord: f64,
    /// Maximum thickness [m].
    pub max_thickness: f64,
    /// Camber angle θ = κ1 − κ2 [rad].
    pub camber: f64,
    /// Stagger angle ξ [rad], measured from the axial direction.
    pub stagger: f64,
}

/// Number of samples per outline piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveResolution {
    pub arc_points: usize,
    pub circle_points: usize,
}

impl Default for CurveResolution {
    fn default() -> Self {
        Self {
            arc_points: 20,
            circle_points: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirfoilProfile {
    shape: SectionShape,
    leading_edge_radius: f64,
    arc_weight: f64,
}

impl AirfoilProfile {
    pub fn new(
        shape: SectionShape,
        leading_edge_radius: f64,
        arc_weight: f64,
    ) -> AirfoilResult<Self> {
        if !shape.chord.is_finite() || shape.chord <= 0.0 {
            return Err(AirfoilError::DegenerateProfile {
                what: "chord must be positive and finite",
            });
        }
        if !shape.max_thickness.is_finite() || shape.max_thickness <= 0.0 {
            return Err(AirfoilError::DegenerateProfile {
                what: "maximum thickness must be positive and finite",
            });
        }
        if !leading_edge_radius.is_finite()
            || leading_edge_radius <= 0.0
            || leading_edge_radius >= shape.max_thickness / 2.0
        {
            return Err(AirfoilError::DegenerateProfile {
                what: "leading-edge radius must lie in (0, thickness/2)",
            });
        }
        if !(0.0..=1.0).contains(&arc_weight) {
            return Err(AirfoilError::DegenerateProfile {
                what: "arc weight must lie in [0, 1]",
            });
        }
        if !shape.camber.is_finite() || shape.camber.abs() >= PI {
            return Err(AirfoilError::DegenerateProfile {
                what: "camber angle must be finite and below 180 degrees",
            });
        }
        if !shape.stagger.is_finite() {
            return Err(AirfoilError::DegenerateProfile {
                what: "stagger angle must be finite",
            });
        }

        Ok(Self {
            shape,
            leading_edge_radius,
            arc_weight,
        })
    }

    pub fn shape(&self) -> SectionShape {
        self.shape
    }

    pub fn chord(&self) -> f64 {
        self.shape.chord
    }

    pub fn max_thickness(&self) -> f64 {
        self.shape.max_thickness
    }

    pub fn camber(&self) -> f64 {
        self.shape.camber
    }

    pub fn stagger(&self) -> f64 {
        self.shape.stagger
    }

    pub fn leading_edge_radius(&self) -> f64 {
        self.leading_edge_radius
    }

    pub fn arc_weight(&self) -> f64 {
        self.arc_weight
    }

    fn effective_camber(&self) -> f64 {
        if self.shape.camber.abs() < MIN_CAMBER {
            MIN_CAMBER.copysign(self.shape.camber)
        } else {
            self.shape.camber
        }
    }

    fn camber_sign(&self) -> f64 {
        if self.effective_camber() < 0.0 { -1.0 } else { 1.0 }
    }

    fn stagger_rotation(&self) -> Rotation2<f64> {
        Rotation2::new(self.shape.stagger)
    }

    /// Closed outline, counter-clockwise from the leading edge.
    ///
    /// The last point is the first point repeated.
    pub fn curve(&self, resolution: CurveResolution) -> AirfoilResult<Vec<Point>> {
        if resolution.arc_points < 2 || resolution.circle_points < 2 {
            return Err(AirfoilError::DegenerateProfile {
                what: "curve resolution needs at least two points per piece",
            });
        }

        let left = self.edge_circle(true, resolution.circle_points);
        let right = self.edge_circle(false, resolution.circle_points);
        let upper = self.arc(false, resolution.arc_points)?;
        let lower = self.arc(true, resolution.arc_points)?;

        let (left_first, left_last) = (left[0], left[left.len() - 1]);
        let (right_first, right_last) = (right[0], right[right.len() - 1]);

        let lower_kept = lower
            .iter()
            .filter(|p| p.x > left_last.x && p.x < right_first.x);
        let upper_kept = upper
            .iter()
            .rev()
            .filter(|p| p.x > left_first.x && p.x < right_last.x);

        let theta = self.effective_camber();
        let center = Vector2::new(0.0, (self.shape.chord / 2.0) * (theta / 4.0).tan());
        let rotation = self.stagger_rotation();

        let mut outline: Vec<Point> = left
            .iter()
            .chain(lower_kept)
            .chain(right.iter())
            .chain(upper_kept)
            .map(|p| rotation * (p - center))
            .collect();

        if outline.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(AirfoilError::DegenerateProfile {
                what: "outline contains non-finite coordinates",
            });
        }

        let first = outline[0];
        outline.push(first);
        Ok(outline)
    }

    /// Camber line sampled at `points` chord positions, leading to trailing edge,
    /// in the same frame as [`curve`](Self::curve).
    pub fn camber_line(&self, points: usize) -> AirfoilResult<Vec<Point>> {
        if points < 2 {
            return Err(AirfoilError::DegenerateProfile {
                what: "camber line needs at least two points",
            });
        }

        let half_chord = self.shape.chord / 2.0;
        let theta = self.effective_camber();
        let sign = self.camber_sign();
        let radius = half_chord / (theta / 2.0).sin();
        let rotation = self.stagger_rotation();

        let line: Vec<Point> = linspace(-half_chord, half_chord, points)
            .into_iter()
            .map(|x| {
                let y = sign * (radius * radius - x * x).sqrt() - radius;
                rotation * Point::new(x, y)
            })
            .collect();

        if line.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(AirfoilError::DegenerateProfile {
                what: "camber line contains non-finite coordinates",
            });
        }
        Ok(line)
    }

    fn edge_circle(&self, leading: bool, points: usize) -> Vec<Point> {
        let x_sign = if leading { -1.0 } else { 1.0 };
        let r0 = self.leading_edge_radius;
        let half_theta = self.effective_camber().abs() / 2.0;
        let sign = self.camber_sign();

        let x_center = x_sign * (self.shape.chord / 2.0 - r0 * half_theta.cos());
        let y_center = r0 * half_theta.sin();

        // the circle is tangent to the chord end point
        let end_offset = (x_sign * half_theta.cos()).clamp(-1.0, 1.0);
        let angle_offset = PI - end_offset.acos() + FRAC_PI_2;

        linspace(0.0, PI, points)
            .into_iter()
            .map(|a| {
                let angle = a + angle_offset;
                Point::new(
                    r0 * angle.cos() + x_center,
                    (r0 * angle.sin() + y_center) * sign,
                )
            })
            .collect()
    }

    fn arc(&self, lower: bool, points: usize) -> AirfoilResult<Vec<Point>> {
        let side = if lower { -1.0 } else { 1.0 };
        let r0 = side * self.leading_edge_radius;
        let tb = side * self.shape.max_thickness;
        let half_chord = self.shape.chord / 2.0;
        let theta_mag = self.effective_camber().abs();
        let sign = self.camber_sign();

        let ym = half_chord * (theta_mag / 4.0).tan();
        let d = ym + tb / 2.0 - r0 * (theta_mag / 2.0).sin();
        let reach = half_chord - r0 * (theta_mag / 2.0).cos();
        let radius = (d * d - r0 * r0 + reach * reach) / (2.0 * (d - r0));
        if !radius.is_finite() {
            return Err(AirfoilError::DegenerateProfile {
                what: "arc radius is not finite",
            });
        }
        let y0 = ym + tb / 2.0 - radius;

        let half_extent = self.shape.chord * self.arc_weight / 2.0;
        // a zero-width arc collapses to its mid-point
        let samples = if half_extent > 0.0 {
            linspace(-half_extent, half_extent, points)
        } else {
            vec![0.0]
        };
        let mut arc: Vec<Point> = samples
            .into_iter()
            .map(|x| Point::new(x, sign * (y0 + (radius * radius - x * x).sqrt())))
            .collect();

        // a pressure-side arc that bulges past the section is replaced by a flat side
        if lower && arc[0].y.abs() > 2.0 * self.shape.max_thickness {
            for p in &mut arc {
                p.y = -sign * self.leading_edge_radius;
            }
        }

        if arc.iter().any(|p| !p.y.is_finite()) {
            return Err(AirfoilError::DegenerateProfile {
                what: "arc does not span the requested extent",
            });
        }
        Ok(arc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(camber: f64, stagger: f64) -> SectionShape {
        SectionShape {
            chord: 0.05,
            max_thickness: 0.005,
            camber,
            stagger,
        }
    }

    fn profile(camber: f64, stagger: f64) -> AirfoilProfile {
        AirfoilProfile::new(shape(camber, stagger), 0.15 * 0.005, 0.8).unwrap()
    }

    #[test]
    fn outline_is_closed() {
        let curve = profile(0.4, 0.3).curve(CurveResolution::default()).unwrap();
        assert_eq!(curve.first(), curve.last());
        // both circles plus every arc point inside the circles, plus the closing point
        assert_eq!(curve.len(), 61);
    }

    #[test]
    fn zero_camber_is_finite() {
        let curve = profile(0.0, 0.0).curve(CurveResolution::default()).unwrap();
        assert!(curve.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert_eq!(curve.first(), curve.last());
    }

    #[test]
    fn unstaggered_outline_spans_the_chord() {
        let curve = profile(0.4, 0.0).curve(CurveResolution::default()).unwrap();
        let min_x = curve.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = curve.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_x > -0.0251 && min_x < -0.024);
        assert!(max_x < 0.0251 && max_x > 0.024);
    }

    #[test]
    fn negative_camber_mirrors_positive() {
        let pos = profile(0.4, 0.0).curve(CurveResolution::default()).unwrap();
        let neg = profile(-0.4, 0.0).curve(CurveResolution::default()).unwrap();
        assert_eq!(pos.len(), neg.len());
        for (a, b) in pos.iter().zip(&neg) {
            assert!((a.x - b.x).abs() < 1e-12);
            assert!((a.y + b.y).abs() < 1e-12);
        }
    }

    #[test]
    fn camber_line_passes_through_origin() {
        let line = profile(0.6, 0.2).camber_line(21).unwrap();
        assert_eq!(line.len(), 21);
        assert!(line[10].x.abs() < 1e-12 && line[10].y.abs() < 1e-12);
    }

    #[test]
    fn camber_line_end_slopes_match_camber() {
        let theta: f64 = 0.6;
        let line = profile(theta, 0.0).camber_line(2001).unwrap();
        let slope = |a: &Point, b: &Point| ((b.y - a.y) / (b.x - a.x)).atan();
        let inlet = slope(&line[0], &line[1]);
        let outlet = slope(&line[1999], &line[2000]);
        assert!(((inlet - outlet) - theta).abs() < 1e-2);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let bad_weight = AirfoilProfile::new(shape(0.4, 0.0), 0.00075, 1.2);
        assert!(matches!(bad_weight, Err(AirfoilError::DegenerateProfile { .. })));
        let negative_weight = AirfoilProfile::new(shape(0.4, 0.0), 0.00075, -0.1);
        assert!(negative_weight.is_err());
        let fat_nose = AirfoilProfile::new(shape(0.4, 0.0), 0.0025, 0.8);
        assert!(fat_nose.is_err());
        let no_chord = AirfoilProfile::new(
            SectionShape {
                chord: 0.0,
                ..shape(0.4, 0.0)
            },
            0.00075,
            0.8,
        );
        assert!(no_chord.is_err());
    }

    #[test]
    fn weight_bounds_are_accepted() {
        for weight in [0.0, 1.0] {
            let profile = AirfoilProfile::new(shape(0.4, 0.1), 0.00075, weight).unwrap();
            let curve = profile.curve(CurveResolution::default()).unwrap();
            assert_eq!(curve.first(), curve.last());
        }
    }

    #[test]
    fn zero_arc_weight_has_no_repeated_points() {
        let profile = AirfoilProfile::new(shape(0.4, 0.1), 0.00075, 0.0).unwrap();
        let curve = profile.curve(CurveResolution::default()).unwrap();
        // two edge circles, one mid-point per side, the closing point
        assert_eq!(curve.len(), 23);
        assert!(curve.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(curve.first(), curve.last());
    }

    #[test]
    fn rejects_tiny_resolution() {
        let resolution = CurveResolution {
            arc_points: 1,
            circle_points: 10,
        };
        assert!(profile(0.4, 0.0).curve(resolution).is_err());
    }
}
