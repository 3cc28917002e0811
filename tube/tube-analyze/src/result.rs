//! The analysis output contract.

use cad_mesh::{Aabb, Point3, Vector3};
use cad_units::Unit;
use tube_centerline::LengthMethod;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bounding box of the analyzed part, in its original units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
    /// Extent along each axis.
    pub size: Vector3<f64>,
}

impl From<Aabb> for BoundingBox {
    fn from(aabb: Aabb) -> Self {
        if aabb.is_empty() {
            return Self {
                min: Point3::origin(),
                max: Point3::origin(),
                size: Vector3::zeros(),
            };
        }
        Self {
            min: aabb.min,
            max: aabb.max,
            size: aabb.size(),
        }
    }
}

/// The analysis record handed to the pricing layer.
///
/// Lengths are normalized to millimeters; the bounding box stays in the
/// file's original units. Confidence scores are the caller's signal for
/// routing a quote to manual review.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TubeAnalysis {
    /// Centerline arc length, millimeters.
    pub total_length_mm: f64,
    /// Estimated bend count in `[0, 20]`.
    pub estimated_bends: u32,
    /// Estimated cut count, at least 2.
    pub estimated_cuts: u32,
    /// Normalized storage unit, always millimeter.
    pub units: Unit,
    /// The unit the file was authored in, after validation overrides.
    pub original_units: Unit,
    /// Confidence in the unit resolution, `[0, 1]`.
    pub unit_confidence: f64,
    /// Which estimator produced the length.
    pub length_method: LengthMethod,
    /// Confidence in the length estimate, `[0, 1]`.
    pub length_confidence: f64,
    /// Part bounds in original units.
    pub bounding_box: BoundingBox,
}

impl TubeAnalysis {
    /// Centerline length in inches, as the pricing calculator consumes it.
    #[must_use]
    pub fn length_in_inches(&self) -> f64 {
        self.total_length_mm / 25.4
    }
}

impl std::fmt::Display for TubeAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tube Analysis:")?;
        writeln!(
            f,
            "  Length: {:.2} mm ({} at {:.0}% confidence)",
            self.total_length_mm,
            self.length_method,
            self.length_confidence * 100.0
        )?;
        writeln!(f, "  Bends:  {}", self.estimated_bends)?;
        writeln!(f, "  Cuts:   {}", self.estimated_cuts)?;
        writeln!(
            f,
            "  Units:  {} ({:.0}% confidence)",
            self.original_units,
            self.unit_confidence * 100.0
        )?;
        write!(
            f,
            "  Size:   {:.2} x {:.2} x {:.2}",
            self.bounding_box.size.x, self.bounding_box.size.y, self.bounding_box.size.z
        )
    }
}
