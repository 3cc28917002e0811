//! Numerical arc-length integration over an ordered polyline.
//!
//! Four methods compute the same quantity independently and cross-validate:
//! adaptive Simpson, 5-point Gauss-Legendre quadrature, a sampled cubic
//! B-spline approximation, and plain linear summation. The highest-confidence
//! succeeding method is reported, with its confidence adjusted by the
//! coefficient of variation across all of them.

use cad_mesh::Point3;
use nalgebra::Vector3;

use crate::coefficient_of_variation;

const SIMPSON_CONFIDENCE: f64 = 0.85;
const GAUSS_CONFIDENCE: f64 = 0.80;
const BSPLINE_CONFIDENCE: f64 = 0.75;
const LINEAR_CONFIDENCE: f64 = 0.60;

const SIMPSON_TOLERANCE: f64 = 1e-6;
const SIMPSON_MAX_DEPTH: usize = 10;
const BSPLINE_DEGREE: usize = 3;
const BSPLINE_SAMPLES: usize = 100;

/// Result of integrating a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationOutcome {
    /// Arc length in the polyline's units.
    pub length: f64,
    /// Confidence in `[0, 1]` after cross-validation.
    pub confidence: f64,
}

/// Compute the arc length of an ordered polyline.
///
/// Returns `None` for fewer than two points, a zero-length path, or a
/// non-finite result; callers treat that as a skipped estimator.
///
/// Agreement across methods (CV < 0.15) raises the winner's confidence by
/// 0.05 (capped at 0.95); disagreement (CV > 0.30) lowers it by 0.15
/// (floored at 0.30).
#[must_use]
pub fn integrate_polyline(points: &[Point3<f64>]) -> Option<IntegrationOutcome> {
    if points.len() < 2 {
        return None;
    }

    let mut results: Vec<(f64, f64)> = Vec::with_capacity(4);
    for (length, confidence) in [
        (simpson_length(points), SIMPSON_CONFIDENCE),
        (gauss_length(points), GAUSS_CONFIDENCE),
        (bspline_length(points), BSPLINE_CONFIDENCE),
        (Some(linear_length(points)), LINEAR_CONFIDENCE),
    ] {
        if let Some(length) = length {
            if length.is_finite() && length > 0.0 {
                results.push((length, confidence));
            }
        }
    }

    let &(length, confidence) = results
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    let lengths: Vec<f64> = results.iter().map(|r| r.0).collect();
    let cv = coefficient_of_variation(&lengths);
    let confidence = if cv < 0.15 {
        (confidence + 0.05).min(0.95)
    } else if cv > 0.30 {
        (confidence - 0.15).max(0.30)
    } else {
        confidence
    };

    Some(IntegrationOutcome { length, confidence })
}

/// Straight sum of inter-point distances.
fn linear_length(points: &[Point3<f64>]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Adaptive Simpson's rule over each segment's speed function.
///
/// Segments of a polyline have constant speed, so the rule degenerates to
/// the Euclidean distance; the adaptive machinery is what lets the same
/// integrator serve curved parameterizations.
fn simpson_length(points: &[Point3<f64>]) -> Option<f64> {
    let mut total = 0.0;
    for w in points.windows(2) {
        let delta: Vector3<f64> = w[1] - w[0];
        let speed = move |_t: f64| delta.norm();
        total += adaptive_simpson(&speed, 0.0, 1.0, SIMPSON_TOLERANCE, SIMPSON_MAX_DEPTH);
    }
    total.is_finite().then_some(total)
}

fn adaptive_simpson(f: &impl Fn(f64) -> f64, a: f64, b: f64, tol: f64, depth: usize) -> f64 {
    let m = f64::midpoint(a, b);
    let (fa, fm, fb) = (f(a), f(m), f(b));
    let whole = (b - a) / 6.0 * 4.0f64.mul_add(fm, fa + fb);
    simpson_step(f, a, b, fa, fm, fb, whole, tol, depth)
}

#[allow(clippy::too_many_arguments)]
fn simpson_step(
    f: &impl Fn(f64) -> f64,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    tol: f64,
    depth: usize,
) -> f64 {
    let m = f64::midpoint(a, b);
    let lm = f64::midpoint(a, m);
    let rm = f64::midpoint(m, b);
    let (flm, frm) = (f(lm), f(rm));
    let left = (m - a) / 6.0 * 4.0f64.mul_add(flm, fa + fm);
    let right = (b - m) / 6.0 * 4.0f64.mul_add(frm, fm + fb);
    let delta = left + right - whole;

    if depth == 0 || delta.abs() <= 15.0 * tol {
        return left + right + delta / 15.0;
    }
    simpson_step(f, a, m, fa, flm, fm, left, tol / 2.0, depth - 1)
        + simpson_step(f, m, b, fm, frm, fb, right, tol / 2.0, depth - 1)
}

/// 5-point Gauss-Legendre quadrature per segment.
fn gauss_length(points: &[Point3<f64>]) -> Option<f64> {
    // Nodes and weights on [-1, 1].
    const NODES: [f64; 5] = [
        0.0,
        -0.538_469_310_105_683_1,
        0.538_469_310_105_683_1,
        -0.906_179_845_938_664,
        0.906_179_845_938_664,
    ];
    const WEIGHTS: [f64; 5] = [
        0.568_888_888_888_888_9,
        0.478_628_670_499_366_5,
        0.478_628_670_499_366_5,
        0.236_926_885_056_189_1,
        0.236_926_885_056_189_1,
    ];

    let mut total = 0.0;
    for w in points.windows(2) {
        let delta: Vector3<f64> = w[1] - w[0];
        let speed = |_t: f64| delta.norm();
        // Map [-1, 1] onto the segment parameter [0, 1].
        let segment: f64 = NODES
            .iter()
            .zip(WEIGHTS.iter())
            .map(|(x, wt)| wt * speed(f64::midpoint(*x, 1.0)))
            .sum::<f64>()
            * 0.5;
        total += segment;
    }
    total.is_finite().then_some(total)
}

/// Length of a clamped uniform cubic B-spline through the control polyline,
/// sampled at [`BSPLINE_SAMPLES`] parameter values.
///
/// With fewer control points than the degree allows, falls back to the
/// linear sum.
fn bspline_length(points: &[Point3<f64>]) -> Option<f64> {
    let n = points.len();
    if n < BSPLINE_DEGREE + 1 {
        return Some(linear_length(points));
    }

    let spans = n - BSPLINE_DEGREE;
    let mut knots = Vec::with_capacity(n + BSPLINE_DEGREE + 1);
    knots.extend(std::iter::repeat_n(0.0, BSPLINE_DEGREE + 1));
    for i in 1..spans {
        knots.push(i as f64 / spans as f64);
    }
    knots.extend(std::iter::repeat_n(1.0, BSPLINE_DEGREE + 1));

    let mut length = 0.0;
    let mut prev = spline_point(points, &knots, 0.0)?;
    for i in 1..=BSPLINE_SAMPLES {
        let u = i as f64 / BSPLINE_SAMPLES as f64;
        let p = spline_point(points, &knots, u)?;
        length += (p - prev).norm();
        prev = p;
    }
    length.is_finite().then_some(length)
}

/// Evaluate the clamped B-spline at parameter `u` in `[0, 1]`.
fn spline_point(ctrl: &[Point3<f64>], knots: &[f64], u: f64) -> Option<Point3<f64>> {
    let degree = BSPLINE_DEGREE;
    let n = ctrl.len();

    // Locate the knot span.
    let mut span = degree;
    while span < n - 1 && u >= knots[span + 1] {
        span += 1;
    }

    // Cox-de Boor basis for the nonzero functions on this span.
    let mut basis = [0.0; BSPLINE_DEGREE + 1];
    let mut left = [0.0; BSPLINE_DEGREE + 1];
    let mut right = [0.0; BSPLINE_DEGREE + 1];
    basis[0] = 1.0;
    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let term = if denom.abs() > f64::EPSILON {
                basis[r] / denom
            } else {
                0.0
            };
            basis[r] = right[r + 1].mul_add(term, saved);
            saved = left[j - r] * term;
        }
        basis[j] = saved;
    }

    let mut point = Vector3::zeros();
    for (j, b) in basis.iter().enumerate() {
        point += ctrl.get(span - degree + j)?.coords * *b;
    }
    Some(Point3::from(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight(n: usize, length: f64) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| Point3::new(length * i as f64 / (n - 1) as f64, 0.0, 0.0))
            .collect()
    }

    #[test]
    fn too_few_points_skips() {
        assert!(integrate_polyline(&[]).is_none());
        assert!(integrate_polyline(&[Point3::origin()]).is_none());
    }

    #[test]
    fn zero_length_path_skips() {
        let points = vec![Point3::origin(); 5];
        assert!(integrate_polyline(&points).is_none());
    }

    #[test]
    fn straight_line_exact_for_all_methods() {
        let points = straight(10, 42.0);
        assert_relative_eq!(linear_length(&points), 42.0, epsilon = 1e-9);
        assert_relative_eq!(simpson_length(&points).unwrap(), 42.0, epsilon = 1e-9);
        assert_relative_eq!(gauss_length(&points).unwrap(), 42.0, epsilon = 1e-9);
        // A straight control polyline produces a straight spline.
        assert_relative_eq!(bspline_length(&points).unwrap(), 42.0, epsilon = 1e-6);
    }

    #[test]
    fn agreement_boosts_confidence() {
        let outcome = integrate_polyline(&straight(20, 100.0)).unwrap();
        assert_relative_eq!(outcome.length, 100.0, epsilon = 1e-6);
        // Simpson wins at 0.85, CV ~0 adds the agreement bonus.
        assert_relative_eq!(outcome.confidence, 0.90, epsilon = 1e-12);
    }

    #[test]
    fn right_angle_path() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
        ];
        let outcome = integrate_polyline(&points).unwrap();
        // Three control points fall back to linear inside the B-spline
        // method, so every method agrees on 20.
        assert_relative_eq!(outcome.length, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn bspline_fallback_below_degree() {
        let points = vec![Point3::origin(), Point3::new(3.0, 4.0, 0.0)];
        assert_relative_eq!(bspline_length(&points).unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn dense_arc_length_close_to_analytic() {
        // Quarter circle of radius 10, 100 samples.
        let points: Vec<Point3<f64>> = (0..=100)
            .map(|i| {
                let a = std::f64::consts::FRAC_PI_2 * i as f64 / 100.0;
                Point3::new(10.0 * a.cos(), 10.0 * a.sin(), 0.0)
            })
            .collect();
        let outcome = integrate_polyline(&points).unwrap();
        let analytic = std::f64::consts::FRAC_PI_2 * 10.0;
        assert!((outcome.length - analytic).abs() / analytic < 0.01);
        assert!(outcome.confidence >= 0.85);
    }
}
