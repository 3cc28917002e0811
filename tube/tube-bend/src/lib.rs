//! Bend counting for tubular meshes.
//!
//! Three sub-methods vote on the number of distinct curvature features along
//! a tube: a turning-stencil curvature count, a chord direction-change
//! count, and a mesh-complexity heuristic. The two most confident methods
//! are averaged by confidence, then a slenderness guard ladder clamps the
//! result: a long thin bounding box is overwhelming evidence of a straight
//! or near-straight part, whatever the vertex order suggested.
//!
//! # Example
//!
//! ```
//! use cad_mesh::{MeshSet, TriMesh, Point3};
//! use tube_bend::{estimate_bends, BendParams};
//!
//! // A long straight rod: slender enough that the guards force zero bends.
//! let rod = TriMesh::from_positions(
//!     (0..100).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect(),
//! );
//! let meshes = MeshSet::from_meshes(vec![rod]);
//!
//! let estimate = estimate_bends(&meshes, &BendParams::default());
//! assert_eq!(estimate.bends, 0);
//! assert_eq!(estimate.cuts, 2);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

mod methods;
mod params;

pub use params::BendParams;

use cad_mesh::MeshSet;
use methods::MethodEstimate;
use tracing::debug;

/// Bends are clamped to this ceiling.
pub const MAX_BENDS: u32 = 20;

/// Result of bend analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BendAnalysis {
    /// Estimated bend count in `[0, 20]`.
    pub bends: u32,
    /// Estimated cut count.
    pub cuts: u32,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Cut count for a bend count: two end cuts, plus one per three bends on
/// parts complex enough to need staged handling.
#[must_use]
pub const fn cuts_for(bends: u32) -> u32 {
    if bends > 3 { 2 + bends / 3 } else { 2 }
}

/// Estimate the number of bends in the given meshes.
///
/// The geometric methods run on the largest mesh's ordered vertex buffer;
/// the complexity heuristic sees set-wide totals.
#[must_use]
pub fn estimate_bends(meshes: &MeshSet, params: &BendParams) -> BendAnalysis {
    let positions: &[cad_mesh::Point3<f64>] = meshes
        .largest_mesh()
        .map_or(&[], |m| m.positions.as_slice());

    let curvature = methods::curvature(positions, params);
    let direction = methods::direction_change(positions, params);
    let complexity =
        methods::complexity(meshes.total_vertex_count(), meshes.total_triangle_count());

    let mut ranked: Vec<MethodEstimate> = [curvature, direction, complexity]
        .into_iter()
        .flatten()
        .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let Some(top) = ranked.first().copied() else {
        return BendAnalysis {
            bends: 0,
            cuts: cuts_for(0),
            confidence: 0.0,
        };
    };

    // Confidence-weighted average of the two most trusted methods.
    let mut bends = match ranked.get(1) {
        Some(second) => {
            let weighted = (f64::from(top.bends) * top.confidence
                + f64::from(second.bends) * second.confidence)
                / (top.confidence + second.confidence);
            weighted.round() as u32
        }
        None => top.bends,
    };
    let mut confidence = top.confidence;

    // Slenderness guard ladder: a long thin box overrules path noise.
    let slenderness = meshes.bounds().slenderness();
    if slenderness > 10.0 && top.bends <= 1 {
        bends = top.bends;
    }
    let geometric_straight = curvature.is_some_and(|m| m.bends <= 1)
        || direction.is_some_and(|m| m.bends <= 1);
    if slenderness > 12.0 && geometric_straight {
        bends = bends.min(1);
        if slenderness > 18.0 {
            bends = 0;
        }
    }
    if slenderness > 22.0 {
        bends = bends.min(1);
    }
    if slenderness > 30.0 {
        bends = 0;
        confidence = confidence.min(0.6);
    }

    let bends = bends.min(MAX_BENDS);
    debug!(bends, slenderness, confidence, "bend analysis complete");

    BendAnalysis {
        bends,
        cuts: cuts_for(bends),
        confidence,
    }
}
