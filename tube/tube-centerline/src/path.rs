//! Centerline length from ordered vertex-buffer sampling.
//!
//! Some tessellators emit vertex buffers that already follow the tube
//! lengthwise (line-strip decoders always do). Walking evenly spaced
//! positions then traces the centerline directly. The estimate is lossy on
//! unordered buffers, so it is only accepted when the sampled path clearly
//! exceeds the bounding-box diagonal.

use cad_mesh::{Aabb, MeshSet, Point3};
use tracing::debug;

use crate::{CenterlineParams, LengthEstimate, LengthMethod};

const PATH_CONFIDENCE: f64 = 0.6;

/// Run the path sampling estimator on a single-mesh input. `None` means
/// skipped or rejected.
pub(crate) fn estimate(
    meshes: &MeshSet,
    bounds: &Aabb,
    params: &CenterlineParams,
) -> Option<LengthEstimate> {
    if meshes.len() != 1 {
        return None;
    }
    let mesh = meshes.iter().next()?;
    let n = mesh.positions.len();
    if n < 2 {
        return None;
    }

    let count = params.path_samples.min(n);
    let picks: Vec<Point3<f64>> = (0..count)
        .map(|i| mesh.positions[i * (n - 1) / (count - 1)])
        .collect();

    let length: f64 = picks.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    if !length.is_finite() || length <= params.path_min_ratio * bounds.diagonal() {
        debug!(length, diagonal = bounds.diagonal(), "path sample rejected");
        return None;
    }

    debug!(length, samples = count, "path sampling accepted");
    Some(LengthEstimate {
        length,
        confidence: PATH_CONFIDENCE,
        method: LengthMethod::PathSampling,
    })
}
