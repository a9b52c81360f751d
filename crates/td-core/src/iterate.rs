//! Bounded fixed-point iteration.
//!
//! Correlation-based corrections (incidence, deviation) are implicit in the
//! quantity they correct. They are resolved by repeated substitution with a
//! hard iteration cap; the outcome is tagged so callers decide what a
//! non-converged result means for them.

use crate::numeric::Real;

/// Fixed-point iteration configuration.
#[derive(Clone, Copy, Debug)]
pub struct FixedPointConfig {
    /// Maximum substitutions
    pub max_iterations: usize,
    /// Absolute tolerance on the step size
    pub abs_tol: Real,
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-10,
        }
    }
}

/// Outcome of a bounded fixed-point iteration.
#[derive(Clone, Debug, PartialEq)]
pub enum FixedPoint<T> {
    Converged { value: T, iterations: usize },
    Diverged { last_residual: Real, iterations: usize },
}

impl<T> FixedPoint<T> {
    pub fn converged(self) -> Option<T> {
        match self {
            FixedPoint::Converged { value, .. } => Some(value),
            FixedPoint::Diverged { .. } => None,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, FixedPoint::Converged { .. })
    }
}

/// Iterate `x <- step(x)` until `distance(x_new, x)` is within tolerance.
///
/// `distance` must be a non-negative measure; a non-finite distance ends the
/// iteration as `Diverged`.
pub fn fixed_point<T, S, D>(
    x0: T,
    mut step: S,
    distance: D,
    config: &FixedPointConfig,
) -> FixedPoint<T>
where
    S: FnMut(&T) -> T,
    D: Fn(&T, &T) -> Real,
{
    let mut x = x0;
    let mut residual = Real::INFINITY;

    for iter in 0..config.max_iterations {
        let next = step(&x);
        residual = distance(&next, &x);

        if !residual.is_finite() {
            return FixedPoint::Diverged {
                last_residual: residual,
                iterations: iter + 1,
            };
        }

        x = next;
        if residual <= config.abs_tol {
            return FixedPoint::Converged {
                value: x,
                iterations: iter + 1,
            };
        }
    }

    FixedPoint::Diverged {
        last_residual: residual,
        iterations: config.max_iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contraction_converges() {
        // x = cos(x) has a unique attracting fixed point near 0.739085
        let out = fixed_point(
            1.0_f64,
            |x| x.cos(),
            |a, b| (a - b).abs(),
            &FixedPointConfig {
                max_iterations: 200,
                ..FixedPointConfig::default()
            },
        );
        let value = out.converged().unwrap();
        assert!((value - 0.739_085_133_2).abs() < 1e-8);
    }

    #[test]
    fn expansion_is_reported_as_diverged() {
        let out = fixed_point(
            1.0_f64,
            |x| 2.0 * x + 1.0,
            |a, b| (a - b).abs(),
            &FixedPointConfig::default(),
        );
        match out {
            FixedPoint::Diverged {
                last_residual,
                iterations,
            } => {
                assert_eq!(iterations, 50);
                assert!(last_residual > 1.0);
            }
            FixedPoint::Converged { .. } => panic!("expansion must not converge"),
        }
    }

    #[test]
    fn nan_step_stops_immediately() {
        let out = fixed_point(
            1.0_f64,
            |_| f64::NAN,
            |a, b| (a - b).abs(),
            &FixedPointConfig::default(),
        );
        match out {
            FixedPoint::Diverged {
                last_residual,
                iterations,
            } => {
                assert!(last_residual.is_nan());
                assert_eq!(iterations, 1);
            }
            FixedPoint::Converged { .. } => panic!("NaN step must not converge"),
        }
    }
}
