//! Centerline length by principal-component slab slicing.
//!
//! Projects surface samples onto the dominant principal axis, slices the
//! projection span into slabs, and threads a smoothed polyline through the
//! slab centroids. Works well for gently bent tubes; sharply folded parts
//! under-report and are rejected by the length ratio check.

use cad_mesh::{Aabb, MeshSet, Point3};
use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use crate::{sample, CenterlineParams, LengthEstimate, LengthMethod};

const PCA_CONFIDENCE: f64 = 0.7;
const POWER_ITERATIONS: usize = 20;
/// Moving-average window radius over the slab centroids.
const SMOOTHING_RADIUS: usize = 3;

/// Run the PCA slicing estimator. `None` means skipped or rejected.
pub(crate) fn estimate(
    meshes: &MeshSet,
    bounds: &Aabb,
    params: &CenterlineParams,
) -> Option<LengthEstimate> {
    let samples = sample::collect(meshes, params.pca_samples);
    if samples.len() < 2 {
        return None;
    }

    let mean = centroid(&samples);
    let axis = dominant_axis(&samples, &mean)?;

    // Project onto the axis and slice the span into slabs.
    let projections: Vec<f64> = samples.iter().map(|p| (p - mean).dot(&axis)).collect();
    let t_min = projections.iter().copied().fold(f64::INFINITY, f64::min);
    let t_max = projections.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = t_max - t_min;
    if !span.is_finite() || span <= f64::EPSILON {
        return None;
    }

    let slabs = params.pca_slabs;
    let mut sums = vec![Vector3::zeros(); slabs];
    let mut counts = vec![0_usize; slabs];
    for (p, &t) in samples.iter().zip(&projections) {
        let slab = (((t - t_min) / span * slabs as f64) as usize).min(slabs - 1);
        sums[slab] += p.coords;
        counts[slab] += 1;
    }

    let centroids: Vec<Point3<f64>> = sums
        .iter()
        .zip(&counts)
        .filter(|&(_, &count)| count > 0)
        .map(|(sum, &count)| Point3::from(sum / count as f64))
        .collect();
    if centroids.len() < 2 {
        return None;
    }

    let smoothed = moving_average(&centroids, SMOOTHING_RADIUS);
    let length: f64 = smoothed.windows(2).map(|w| (w[1] - w[0]).norm()).sum();

    let dominant = bounds.sorted_extents()[0];
    if !length.is_finite() || length < params.pca_min_ratio * dominant {
        debug!(length, dominant, "PCA slice length rejected");
        return None;
    }

    debug!(length, slabs = centroids.len(), "PCA slicing complete");
    Some(LengthEstimate {
        length,
        confidence: PCA_CONFIDENCE,
        method: LengthMethod::PcaSlicing,
    })
}

fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Point3::from(sum / points.len() as f64)
}

/// Dominant covariance eigenvector by power iteration.
///
/// Retries with axis-aligned seeds when a seed lands in the covariance
/// null space (a seed orthogonal to the dominant direction).
fn dominant_axis(points: &[Point3<f64>], mean: &Point3<f64>) -> Option<Vector3<f64>> {
    let mut cov = Matrix3::zeros();
    for p in points {
        let d = p - mean;
        cov += d * d.transpose();
    }
    cov /= points.len() as f64;

    let seeds = [
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::x(),
        Vector3::y(),
        Vector3::z(),
    ];
    for seed in seeds {
        if let Some(axis) = power_iterate(&cov, seed) {
            return Some(axis);
        }
    }
    None
}

fn power_iterate(cov: &Matrix3<f64>, seed: Vector3<f64>) -> Option<Vector3<f64>> {
    let mut v = seed.normalize();
    for _ in 0..POWER_ITERATIONS {
        let next = cov * v;
        let norm = next.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return None;
        }
        v = next / norm;
    }
    Some(v)
}

/// Length-`2r + 1` moving average, window clipped at the ends.
fn moving_average(points: &[Point3<f64>], radius: usize) -> Vec<Point3<f64>> {
    (0..points.len())
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(points.len() - 1);
            let sum: Vector3<f64> = points[lo..=hi].iter().map(|p| p.coords).sum();
            Point3::from(sum / (hi - lo + 1) as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cad_mesh::TriMesh;

    /// Points on the surface of a straight tube along X.
    fn straight_tube(length: f64, radius: f64, rings: usize) -> MeshSet {
        let mut positions = Vec::new();
        for ring in 0..rings {
            let x = length * ring as f64 / (rings - 1) as f64;
            for k in 0..12 {
                let a = std::f64::consts::TAU * f64::from(k) / 12.0;
                positions.push(Point3::new(x, radius * a.cos(), radius * a.sin()));
            }
        }
        MeshSet::from_meshes(vec![TriMesh::from_positions(positions)])
    }

    #[test]
    fn straight_tube_length_recovered() {
        let meshes = straight_tube(100.0, 3.0, 120);
        let bounds = meshes.bounds();
        let estimate = estimate(&meshes, &bounds, &CenterlineParams::default()).unwrap();
        assert_eq!(estimate.method, LengthMethod::PcaSlicing);
        assert!(
            (estimate.length - 100.0).abs() / 100.0 < 0.05,
            "got {}",
            estimate.length
        );
        assert_relative_eq!(estimate.confidence, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn dominant_axis_of_straight_cloud_is_x() {
        let points: Vec<Point3<f64>> =
            (0..100).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
        let mean = centroid(&points);
        let axis = dominant_axis(&points, &mean).unwrap();
        assert!(axis.x.abs() > 0.999);
    }

    #[test]
    fn axis_found_for_y_aligned_cloud() {
        // A diagonal seed projects onto Y fine; this exercises convergence
        // toward a non-X axis.
        let points: Vec<Point3<f64>> =
            (0..100).map(|i| Point3::new(0.0, f64::from(i), 0.0)).collect();
        let mean = centroid(&points);
        let axis = dominant_axis(&points, &mean).unwrap();
        assert!(axis.y.abs() > 0.999);
    }

    #[test]
    fn coincident_points_are_skipped() {
        let meshes = MeshSet::from_meshes(vec![TriMesh::from_positions(vec![
            Point3::origin();
            100
        ])]);
        let bounds = meshes.bounds();
        assert!(estimate(&meshes, &bounds, &CenterlineParams::default()).is_none());
    }

    #[test]
    fn short_result_is_rejected() {
        // A sphere-ish blob: the slab polyline is much shorter than the
        // dominant extent is wide relative to itself only for tubes; for a
        // blob the centroid path stays near the middle.
        let mut positions = Vec::new();
        for i in 0..500 {
            let t = f64::from(i);
            let (a, b) = (t * 0.7, t * 1.3);
            positions.push(Point3::new(
                50.0 * a.sin() * b.cos(),
                50.0 * a.sin() * b.sin(),
                50.0 * a.cos(),
            ));
        }
        let meshes = MeshSet::from_meshes(vec![TriMesh::from_positions(positions)]);
        let bounds = meshes.bounds();
        // The centroid polyline of a ball collapses to the axis midline and
        // comes out near the dominant extent; accept either skip or a
        // plausible value, but never an inflated one.
        if let Some(e) = estimate(&meshes, &bounds, &CenterlineParams::default()) {
            assert!(e.length < bounds.sorted_extents()[0] * 2.0);
        }
    }

    #[test]
    fn moving_average_flattens_noise() {
        let noisy: Vec<Point3<f64>> = (0..50)
            .map(|i| Point3::new(f64::from(i), if i % 2 == 0 { 0.5 } else { -0.5 }, 0.0))
            .collect();
        let smoothed = moving_average(&noisy, 3);
        assert_eq!(smoothed.len(), 50);
        // Interior points average seven alternating offsets to within a
        // fraction of the raw amplitude.
        for p in &smoothed[3..47] {
            assert!(p.y.abs() < 0.1);
        }
    }
}
