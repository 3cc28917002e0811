//! Bounding-box length fallback.
//!
//! Always available for non-degenerate geometry. A clearly slender box is
//! read as a straight tube of its longest extent; anything stockier gets a
//! curvature allowance scaled by how far the box is from slender, at much
//! lower confidence.

use cad_mesh::Aabb;
use tracing::debug;

use crate::{LengthEstimate, LengthMethod};

const SLENDER_CONFIDENCE: f64 = 0.5;
const STOCKY_CONFIDENCE: f64 = 0.2;
/// Longest-to-cross-section ratio above which the box reads as straight.
const SLENDER_RATIO: f64 = 3.0;

/// Run the bounding-box estimator. Skips only for degenerate bounds.
pub(crate) fn estimate(bounds: &Aabb) -> Option<LengthEstimate> {
    let [longest, mid, short] = bounds.sorted_extents();
    if !longest.is_finite() || longest <= 0.0 {
        return None;
    }
    let cross = f64::midpoint(mid, short);

    let (length, confidence) = if cross <= f64::EPSILON || longest > SLENDER_RATIO * cross {
        (longest, SLENDER_CONFIDENCE)
    } else {
        // A bent tube folds length into the cross extents; inflate by the
        // square root of the aspect as a conservative allowance.
        (longest * (longest / cross).sqrt().max(1.0), STOCKY_CONFIDENCE)
    };

    debug!(length, confidence, "bounding-box fallback");
    Some(LengthEstimate {
        length,
        confidence,
        method: LengthMethod::BoundingBox,
    })
}
