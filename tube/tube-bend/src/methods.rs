//! The three bend-counting sub-methods.
//!
//! Each method returns an independent count with its own confidence; the
//! selector in the crate root weighs them. The geometric methods read the
//! vertex buffer as an ordered path, which is exact for line-strip decodes
//! and a serviceable approximation for tessellator output (the slenderness
//! guards absorb the noise on straight parts).

use cad_mesh::Point3;
use nalgebra::Vector3;

use crate::BendParams;

/// One sub-method's verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MethodEstimate {
    pub bends: u32,
    pub confidence: f64,
}

/// Evenly stride a position buffer down to at most `cap` samples.
fn stride_samples(positions: &[Point3<f64>], cap: usize) -> Vec<Point3<f64>> {
    if positions.is_empty() || cap == 0 {
        return Vec::new();
    }
    let stride = positions.len().div_ceil(cap);
    positions.iter().step_by(stride).copied().collect()
}

/// Angle between two vectors, zero when either is degenerate.
fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let (na, nb) = (a.norm(), b.norm());
    if na <= f64::EPSILON || nb <= f64::EPSILON {
        return 0.0;
    }
    (a.dot(b) / (na * nb)).clamp(-1.0, 1.0).acos()
}

/// Curvature method: five-point turning stencil over sampled vertices.
///
/// For each interior sample the turning angles of the two adjacent segment
/// joints are summed; indices exceeding the threshold are counted and every
/// three counted indices read as one bend.
pub(crate) fn curvature(positions: &[Point3<f64>], params: &BendParams) -> Option<MethodEstimate> {
    let samples = stride_samples(positions, params.curvature_samples);
    let n = samples.len();
    if n < 5 {
        return None;
    }

    let directions: Vec<Vector3<f64>> = samples.windows(2).map(|w| w[1] - w[0]).collect();
    let mut count = 0_u32;
    for i in 2..=(n - 2) {
        let turning = angle_between(&directions[i - 2], &directions[i - 1])
            + angle_between(&directions[i - 1], &directions[i]);
        if turning > params.curvature_threshold {
            count += 1;
        }
    }

    Some(MethodEstimate {
        bends: count / 3,
        confidence: (0.5 + n as f64 / 200.0).min(0.9),
    })
}

/// Direction-change method: chord angles across a four-sample window.
pub(crate) fn direction_change(
    positions: &[Point3<f64>],
    params: &BendParams,
) -> Option<MethodEstimate> {
    let samples = stride_samples(positions, params.direction_samples);
    let n = samples.len();
    if n < 5 {
        return None;
    }

    let mut count = 0_u32;
    for i in 2..=(n - 3) {
        let before = samples[i] - samples[i - 2];
        let after = samples[i + 2] - samples[i];
        if angle_between(&before, &after) > params.direction_threshold {
            count += 1;
        }
    }

    Some(MethodEstimate {
        bends: count / 2,
        confidence: 0.7,
    })
}

/// Complexity heuristic: a dense mesh suggests bend features even when the
/// vertex order carries no path information.
pub(crate) fn complexity(vertex_count: usize, triangle_count: usize) -> Option<MethodEstimate> {
    if vertex_count == 0 {
        return None;
    }
    let score = (vertex_count as f64).ln() + (triangle_count as f64 + 1.0).ln();
    let bends = if score > 8.0 {
        (((score - 8.0) / 1.5) as u32).min(10)
    } else {
        0
    };
    Some(MethodEstimate {
        bends,
        confidence: 0.3,
    })
}
