//! Analysis pipeline for bent-tube CAD files.
//!
//! Wires the full flow: file bytes are decoded into meshes, the authoring
//! unit is resolved, geometry is prepared, and the centerline-length and
//! bend estimators run on the untouched analysis copy. The result is a
//! single [`TubeAnalysis`] record or a single fatal error; estimator misses
//! never produce partial results, only lower confidence.
//!
//! ```text
//! bytes -> decode -> (MeshSet, MetadataBag, prefix)
//!       -> resolve units -> prepare -> {length, bends} -> TubeAnalysis
//! ```
//!
//! # Example
//!
//! ```
//! use cad_mesh::{MeshSet, MetadataBag, TriMesh, Point3};
//! use cad_decode::FileFormat;
//! use tube_analyze::{analyze_meshes, AnalyzeParams};
//!
//! // A straight 100 mm path decoded from some file.
//! let strip = TriMesh::from_positions(
//!     (0..=200).map(|i| Point3::new(f64::from(i) * 0.5, 0.0, 0.0)).collect(),
//! );
//! let analysis = analyze_meshes(
//!     MeshSet::from_meshes(vec![strip]),
//!     &MetadataBag::with_units("mm"),
//!     FileFormat::Dxf,
//!     "",
//!     &AnalyzeParams::default(),
//! );
//!
//! assert!((analysis.total_length_mm - 100.0).abs() < 5.0);
//! assert_eq!(analysis.estimated_bends, 0);
//! assert_eq!(analysis.estimated_cuts, 2);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod prep;
mod result;

pub use error::{AnalyzeError, AnalyzeResult};
pub use prep::{display_copy, prepare, DISPLAY_TARGET_EXTENT};
pub use result::{BoundingBox, TubeAnalysis};

use cad_decode::FileFormat;
use cad_mesh::{MeshSet, MetadataBag};
use cad_units::Unit;
use tracing::info;
use tube_bend::BendParams;
use tube_centerline::{CenterlineParams, LengthMethod};

/// Parameters for a full analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeParams {
    /// Centerline length estimation knobs.
    pub centerline: CenterlineParams,
    /// Bend detection knobs.
    pub bend: BendParams,
}

/// Analyze a CAD file from its bytes and filename.
///
/// # Errors
///
/// Fails only at the decoding boundary: unsupported extension, oversized
/// input, parser failure, or empty geometry. See [`AnalyzeError`].
pub fn analyze_file(
    bytes: &[u8],
    filename: &str,
    params: &AnalyzeParams,
) -> AnalyzeResult<TubeAnalysis> {
    let decoded = cad_decode::decode(bytes, filename)?;
    Ok(analyze_meshes(
        decoded.meshes,
        &decoded.metadata,
        decoded.format,
        &decoded.raw_prefix,
        params,
    ))
}

/// Analyze pre-decoded geometry.
///
/// This is the decoder-independent entry: callers that already hold meshes
/// (or tests exercising the numeric pipeline) start here. The mesh set is
/// consumed; analysis owns its geometry exclusively.
#[must_use]
pub fn analyze_meshes(
    mut meshes: MeshSet,
    metadata: &MetadataBag,
    format: FileFormat,
    raw_prefix: &str,
    params: &AnalyzeParams,
) -> TubeAnalysis {
    prepare(&mut meshes);
    let bounds = meshes.bounds();
    let units = cad_units::resolve(metadata, format, raw_prefix, &bounds);

    // Degenerate geometry produces the explicit empty record rather than a
    // zero-confidence guess.
    if bounds.is_degenerate() {
        return TubeAnalysis {
            total_length_mm: 0.0,
            estimated_bends: 0,
            estimated_cuts: tube_bend::cuts_for(0),
            units: Unit::Millimeter,
            original_units: units.unit,
            unit_confidence: units.confidence,
            length_method: LengthMethod::None,
            length_confidence: 0.0,
            bounding_box: BoundingBox::from(bounds),
        };
    }

    let length = tube_centerline::estimate_length(&meshes, &params.centerline);
    let bends = tube_bend::estimate_bends(&meshes, &params.bend);

    let total_length_mm = length.length * units.unit.to_mm();

    let analysis = TubeAnalysis {
        total_length_mm,
        estimated_bends: bends.bends,
        estimated_cuts: bends.cuts,
        units: Unit::Millimeter,
        original_units: units.unit,
        unit_confidence: units.confidence.clamp(0.0, 1.0),
        length_method: length.method,
        length_confidence: length.confidence.clamp(0.0, 1.0),
        bounding_box: BoundingBox::from(bounds),
    };

    info!(
        length_mm = analysis.total_length_mm,
        method = %analysis.length_method,
        bends = analysis.estimated_bends,
        cuts = analysis.estimated_cuts,
        units = %analysis.original_units,
        "analysis complete"
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_mesh::{Point3, TriMesh};

    #[test]
    fn degenerate_geometry_reports_none() {
        let meshes = MeshSet::from_meshes(vec![TriMesh::from_positions(vec![
            Point3::new(1.0, 1.0, 1.0);
            8
        ])]);
        let analysis = analyze_meshes(
            meshes,
            &MetadataBag::default(),
            FileFormat::Step,
            "",
            &AnalyzeParams::default(),
        );

        assert_eq!(analysis.length_method, LengthMethod::None);
        assert_eq!(analysis.total_length_mm, 0.0);
        assert_eq!(analysis.estimated_bends, 0);
        assert_eq!(analysis.estimated_cuts, 2);
        assert_eq!(analysis.original_units, Unit::Millimeter);
        assert!((analysis.unit_confidence - 0.2).abs() < 1e-12);
    }

    #[test]
    fn unit_conversion_applies_once() {
        // A 10-unit straight strip authored in inches.
        let strip = TriMesh::from_positions(
            (0..=200).map(|i| Point3::new(f64::from(i) * 0.05, 0.0, 0.0)).collect(),
        );
        let analysis = analyze_meshes(
            MeshSet::from_meshes(vec![strip]),
            &MetadataBag::with_units("inch"),
            FileFormat::Iges,
            "",
            &AnalyzeParams::default(),
        );

        assert_eq!(analysis.original_units, Unit::Inch);
        assert_eq!(analysis.units, Unit::Millimeter);
        // 10 in = 254 mm, within the estimator tolerance.
        assert!(
            (analysis.total_length_mm - 254.0).abs() <= 254.0 * 0.05,
            "got {} mm",
            analysis.total_length_mm
        );
        // Bounding box stays in original units.
        assert!((analysis.bounding_box.size.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn confidences_stay_in_range() {
        let strip = TriMesh::from_positions(
            (0..=100).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect(),
        );
        let analysis = analyze_meshes(
            MeshSet::from_meshes(vec![strip]),
            &MetadataBag::default(),
            FileFormat::Dxf,
            "",
            &AnalyzeParams::default(),
        );
        assert!((0.0..=1.0).contains(&analysis.unit_confidence));
        assert!((0.0..=1.0).contains(&analysis.length_confidence));
        assert!(analysis.estimated_bends <= 20);
        assert!(analysis.estimated_cuts >= 2);
    }
}
