//! The unit resolution ladder and plausibility validation.

use cad_decode::FileFormat;
use cad_mesh::{Aabb, MetadataBag};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::Unit;

/// Where a resolved unit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitSource {
    /// Decoder-reported `units` metadata.
    Metadata,
    /// A `units` entry in the free-form metadata.
    ExtraMetadata,
    /// The format header's length unit.
    LengthUnit,
    /// A regex match in the raw STEP header prefix.
    HeaderScan,
    /// Estimated from the geometry's physical size.
    GeometryEstimate,
    /// Millimeter default, nothing else matched.
    Default,
    /// Plausibility validation overrode the detected unit.
    Override,
}

/// A resolved unit with its confidence and provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitResolution {
    /// The canonical unit.
    pub unit: Unit,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Which rung of the ladder produced the unit.
    pub source: UnitSource,
}

/// Regex set for STEP header unit declarations, in priority order.
static STEP_UNIT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)SI_UNIT\s*\(\s*\*\s*,\s*\.([^,)]+)\.\s*,",
        r"(?i)SI_UNIT\s*\(\s*\*\s*,\s*([^,)]+)\s*,",
        r"(?i)LENGTH_UNIT\s*\(\s*\)\s*,\s*\.([^,)]+)\.",
        r"(?i)UNIT\s*\(\s*LENGTH_MEASURE\s*,\s*\.([^,)]+)\.",
        r"(?i)UNCERTAINTY_MEASURE_WITH_UNIT[^(]*\([^,]*,\s*\.([^,)]+)\.",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Valid size range and typical size (in that unit) for a single part.
const fn plausibility(unit: Unit) -> Option<(f64, f64, f64)> {
    match unit {
        Unit::Millimeter => Some((0.1, 10_000.0, 100.0)),
        Unit::Meter => Some((0.001, 100.0, 0.1)),
        Unit::Inch => Some((0.01, 1000.0, 4.0)),
        Unit::Foot => Some((0.001, 100.0, 0.33)),
        Unit::Centimeter => Some((0.01, 1000.0, 10.0)),
        _ => None,
    }
}

/// Units considered as replacements when a detection fails validation.
const fn neighbors(unit: Unit) -> &'static [Unit] {
    match unit {
        Unit::Meter => &[Unit::Millimeter],
        Unit::Millimeter => &[Unit::Meter],
        Unit::Foot => &[Unit::Inch],
        Unit::Inch => &[Unit::Foot],
        Unit::Centimeter => &[Unit::Meter, Unit::Millimeter],
        _ => &[],
    }
}

/// Resolve the authoring unit for a decoded file.
///
/// Walks the trust ladder described in the crate docs, then validates the
/// winner against the geometry's bounding box, possibly overriding it.
#[must_use]
pub fn resolve(
    metadata: &MetadataBag,
    format: FileFormat,
    raw_prefix: &str,
    bounds: &Aabb,
) -> UnitResolution {
    let detected = detect(metadata, format, raw_prefix, bounds);
    let validated = validate(detected, bounds);
    debug!(
        unit = %validated.unit,
        confidence = validated.confidence,
        source = ?validated.source,
        "unit resolved"
    );
    validated
}

fn detect(
    metadata: &MetadataBag,
    format: FileFormat,
    raw_prefix: &str,
    bounds: &Aabb,
) -> UnitResolution {
    if let Some(name) = &metadata.units {
        let unit = Unit::parse(name);
        if unit.is_known() {
            return UnitResolution {
                unit,
                confidence: 0.9,
                source: UnitSource::Metadata,
            };
        }
    }

    if let Some(name) = metadata.extra_units() {
        let unit = Unit::parse(name);
        if unit.is_known() {
            return UnitResolution {
                unit,
                confidence: 0.85,
                source: UnitSource::ExtraMetadata,
            };
        }
    }

    if format == FileFormat::Step {
        if let Some(name) = &metadata.length_unit {
            let unit = Unit::parse(name);
            if unit.is_known() {
                return UnitResolution {
                    unit,
                    confidence: 0.85,
                    source: UnitSource::LengthUnit,
                };
            }
        }

        if let Some(unit) = scan_step_header(raw_prefix) {
            return UnitResolution {
                unit,
                confidence: 0.8,
                source: UnitSource::HeaderScan,
            };
        }
    }

    if matches!(format, FileFormat::Dxf | FileFormat::Step) {
        let extent = bounds.max_extent();
        if extent.is_finite() && extent > 0.0 {
            return UnitResolution {
                unit: estimate_from_magnitude(extent),
                confidence: 0.4,
                source: UnitSource::GeometryEstimate,
            };
        }
    }

    UnitResolution {
        unit: Unit::Millimeter,
        confidence: 0.2,
        source: UnitSource::Default,
    }
}

/// Scan a STEP header prefix for a unit declaration.
///
/// Patterns are tried in priority order; the first matching pattern wins.
/// The scan runs over a bounded prefix, so it is O(1) in file size.
#[must_use]
pub fn scan_step_header(prefix: &str) -> Option<Unit> {
    for pattern in STEP_UNIT_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(prefix) {
            let name = captures.get(1)?.as_str();
            let unit = Unit::parse(name);
            if unit.is_known() {
                return Some(unit);
            }
        }
    }
    None
}

/// Pick the unit whose typical part size best matches the given extent.
fn estimate_from_magnitude(extent: f64) -> Unit {
    const CANDIDATES: [Unit; 5] = [
        Unit::Millimeter,
        Unit::Centimeter,
        Unit::Meter,
        Unit::Inch,
        Unit::Foot,
    ];

    let mut best = Unit::Millimeter;
    let mut best_score = f64::INFINITY;
    for unit in CANDIDATES {
        if let Some((_, _, typical)) = plausibility(unit) {
            let score = (extent / typical).log10().abs();
            if score < best_score {
                best_score = score;
                best = unit;
            }
        }
    }
    best
}

/// Validate a detection against the geometry size, overriding implausible
/// units with a plausible neighbor.
fn validate(detected: UnitResolution, bounds: &Aabb) -> UnitResolution {
    if bounds.is_degenerate() {
        return detected;
    }
    let extent = bounds.max_extent();
    let Some((min, max, _)) = plausibility(detected.unit) else {
        return detected;
    };
    if (min..=max).contains(&extent) {
        return detected;
    }

    for &candidate in neighbors(detected.unit) {
        if let Some((c_min, c_max, c_typical)) = plausibility(candidate) {
            if (c_min..=c_max).contains(&extent) {
                let confidence =
                    (1.0 - (extent / c_typical).log10().abs() / 2.0).clamp(0.3, 0.95);
                warn!(
                    detected = %detected.unit,
                    chosen = %candidate,
                    extent,
                    "geometry size implausible for detected unit, overriding"
                );
                return UnitResolution {
                    unit: candidate,
                    confidence,
                    source: UnitSource::Override,
                };
            }
        }
    }

    warn!(
        detected = %detected.unit,
        extent,
        "geometry size implausible and no neighbor unit fits"
    );
    UnitResolution {
        confidence: 0.1,
        ..detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_mesh::Point3;

    fn bounds_of_extent(extent: f64) -> Aabb {
        Aabb::new(Point3::origin(), Point3::new(extent, extent / 10.0, extent / 10.0))
    }

    #[test]
    fn metadata_units_win_at_high_confidence() {
        let metadata = MetadataBag::with_units("inch");
        let r = resolve(&metadata, FileFormat::Step, "", &bounds_of_extent(10.0));
        assert_eq!(r.unit, Unit::Inch);
        assert_eq!(r.source, UnitSource::Metadata);
        assert!((r.confidence - 0.9).abs() < 1e-12);
    }

    #[test]
    fn extra_metadata_is_second() {
        let mut metadata = MetadataBag::default();
        metadata.extra.push(("units".to_string(), "cm".to_string()));
        let r = resolve(&metadata, FileFormat::Step, "", &bounds_of_extent(20.0));
        assert_eq!(r.unit, Unit::Centimeter);
        assert_eq!(r.source, UnitSource::ExtraMetadata);
        assert!((r.confidence - 0.85).abs() < 1e-12);
    }

    #[test]
    fn step_header_si_unit_scan() {
        let prefix = "#12 = ( LENGTH_UNIT() NAMED_UNIT(*) SI_UNIT(*,.MILLI.,.METRE.) );";
        let r = resolve(
            &MetadataBag::default(),
            FileFormat::Step,
            prefix,
            &bounds_of_extent(100.0),
        );
        assert_eq!(r.unit, Unit::Millimeter);
        assert_eq!(r.source, UnitSource::HeaderScan);
        assert!((r.confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn step_header_inch_conversion_scan() {
        let prefix = "#9 = UNIT ( LENGTH_MEASURE , .INCH. );";
        let r = resolve(
            &MetadataBag::default(),
            FileFormat::Step,
            prefix,
            &bounds_of_extent(10.0),
        );
        assert_eq!(r.unit, Unit::Inch);
        assert_eq!(r.source, UnitSource::HeaderScan);
    }

    #[test]
    fn uncertainty_measure_scan() {
        let prefix = "UNCERTAINTY_MEASURE_WITH_UNIT (LENGTH_MEASURE(1.0E-05), .METRE.)";
        assert_eq!(scan_step_header(prefix), Some(Unit::Meter));
    }

    #[test]
    fn scan_misses_return_none() {
        assert_eq!(scan_step_header("no units here"), None);
        assert_eq!(scan_step_header(""), None);
    }

    #[test]
    fn dxf_estimates_from_geometry_magnitude() {
        // A 500-unit extent sits closest to millimeter's typical 100.
        let r = resolve(
            &MetadataBag::default(),
            FileFormat::Dxf,
            "",
            &bounds_of_extent(500.0),
        );
        assert_eq!(r.unit, Unit::Millimeter);
        assert_eq!(r.source, UnitSource::GeometryEstimate);
        assert!((r.confidence - 0.4).abs() < 1e-12);
    }

    #[test]
    fn degenerate_geometry_defaults_to_millimeter() {
        let r = resolve(&MetadataBag::default(), FileFormat::Step, "", &Aabb::empty());
        assert_eq!(r.unit, Unit::Millimeter);
        assert_eq!(r.source, UnitSource::Default);
        assert!((r.confidence - 0.2).abs() < 1e-12);
    }

    #[test]
    fn iges_without_metadata_defaults_to_millimeter() {
        let r = resolve(
            &MetadataBag::default(),
            FileFormat::Iges,
            "",
            &bounds_of_extent(100.0),
        );
        assert_eq!(r.unit, Unit::Millimeter);
        assert_eq!(r.source, UnitSource::Default);
    }

    #[test]
    fn plausible_meter_detection_is_kept() {
        // 0.3 m part: perfectly plausible for meter, stays meter.
        let metadata = MetadataBag::with_units("metre");
        let r = resolve(&metadata, FileFormat::Iges, "", &bounds_of_extent(0.3));
        assert_eq!(r.unit, Unit::Meter);
        assert!((r.confidence - 0.9).abs() < 1e-12);
    }

    #[test]
    fn implausible_meter_detection_is_overridden_to_millimeter() {
        // A "300 meter" tube is really a 300 mm tube.
        let metadata = MetadataBag::with_units("metre");
        let r = resolve(&metadata, FileFormat::Iges, "", &bounds_of_extent(300.0));
        assert_eq!(r.unit, Unit::Millimeter);
        assert_eq!(r.source, UnitSource::Override);
        // 1 - |log10(300/100)|/2 = 0.761...
        assert!((r.confidence - (1.0 - (3.0_f64).log10() / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn override_confidence_is_clamped() {
        // Extent 10000: outside foot's range, inch neighbor fits but is far
        // from typical, so confidence bottoms out at 0.3.
        let metadata = MetadataBag::with_units("ft");
        let r = resolve(&metadata, FileFormat::Iges, "", &bounds_of_extent(1000.0));
        assert_eq!(r.unit, Unit::Inch);
        assert!((r.confidence - 0.3).abs() < 1e-12);
    }

    #[test]
    fn failed_validation_keeps_unit_at_low_confidence() {
        // 0.0005 extent fits neither inch nor its foot neighbor.
        let metadata = MetadataBag::with_units("inch");
        let r = resolve(&metadata, FileFormat::Iges, "", &bounds_of_extent(0.0005));
        assert_eq!(r.unit, Unit::Inch);
        assert!((r.confidence - 0.1).abs() < 1e-12);
    }

    #[test]
    fn unknown_metadata_falls_through_the_ladder() {
        let metadata = MetadataBag::with_units("parsec");
        let r = resolve(&metadata, FileFormat::Dxf, "", &bounds_of_extent(150.0));
        // Unknown name skipped; geometry estimate takes over.
        assert_eq!(r.unit, Unit::Millimeter);
        assert_eq!(r.source, UnitSource::GeometryEstimate);
    }
}
