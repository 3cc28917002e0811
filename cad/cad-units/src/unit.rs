//! Canonical length units and name normalization.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A canonical length unit.
///
/// Every variant maps to an exact multiplicative factor to millimeters.
/// [`Unit::Unknown`] is carried through unconverted (factor 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Unit {
    /// Millimeter, the normalized storage unit.
    #[default]
    Millimeter,
    /// Centimeter.
    Centimeter,
    /// Meter.
    Meter,
    /// Micrometer.
    Micrometer,
    /// Nanometer.
    Nanometer,
    /// Inch.
    Inch,
    /// Foot.
    Foot,
    /// Yard.
    Yard,
    /// Unrecognized unit name.
    Unknown,
}

impl Unit {
    /// Exact conversion factor to millimeters.
    #[must_use]
    pub const fn to_mm(self) -> f64 {
        match self {
            Self::Millimeter | Self::Unknown => 1.0,
            Self::Centimeter => 10.0,
            Self::Meter => 1000.0,
            Self::Micrometer => 1e-3,
            Self::Nanometer => 1e-6,
            Self::Inch => 25.4,
            Self::Foot => 304.8,
            Self::Yard => 914.4,
        }
    }

    /// Parse a unit name as found in metadata or format headers.
    ///
    /// Normalization lowercases, trims whitespace, and strips dots (STEP
    /// enumerations arrive as `.MILLI.`), then applies a fixed alias table.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '.')
            .collect::<String>()
            .to_lowercase();

        match normalized.trim() {
            "metre" | "meter" | "m" => Self::Meter,
            "milli" | "millimetre" | "millimeter" | "mm" => Self::Millimeter,
            "centi" | "centimetre" | "centimeter" | "cm" => Self::Centimeter,
            "micro" | "micrometre" | "micrometer" | "um" | "\u{b5}m" => Self::Micrometer,
            "nano" | "nanometre" | "nanometer" | "nm" => Self::Nanometer,
            "inch" | "in" | "\"" => Self::Inch,
            "foot" | "ft" | "'" => Self::Foot,
            "yard" | "yd" => Self::Yard,
            _ => Self::Unknown,
        }
    }

    /// True when [`Unit::parse`] recognized the name.
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Millimeter => "millimeter",
            Self::Centimeter => "centimeter",
            Self::Meter => "meter",
            Self::Micrometer => "micrometer",
            Self::Nanometer => "nanometer",
            Self::Inch => "inch",
            Self::Foot => "foot",
            Self::Yard => "yard",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_are_exact() {
        assert_eq!(Unit::Millimeter.to_mm(), 1.0);
        assert_eq!(Unit::Centimeter.to_mm(), 10.0);
        assert_eq!(Unit::Meter.to_mm(), 1000.0);
        assert_eq!(Unit::Inch.to_mm(), 25.4);
        assert_eq!(Unit::Foot.to_mm(), 304.8);
        assert_eq!(Unit::Yard.to_mm(), 914.4);
        assert_eq!(Unit::Micrometer.to_mm(), 1e-3);
        assert_eq!(Unit::Nanometer.to_mm(), 1e-6);
    }

    #[test]
    fn parse_step_enumerations() {
        assert_eq!(Unit::parse(".MILLI."), Unit::Millimeter);
        assert_eq!(Unit::parse(".METRE."), Unit::Meter);
        assert_eq!(Unit::parse(".INCH."), Unit::Inch);
        assert_eq!(Unit::parse("MILLIMETRE"), Unit::Millimeter);
    }

    #[test]
    fn parse_aliases_and_symbols() {
        assert_eq!(Unit::parse("mm"), Unit::Millimeter);
        assert_eq!(Unit::parse(" in "), Unit::Inch);
        assert_eq!(Unit::parse("\""), Unit::Inch);
        assert_eq!(Unit::parse("'"), Unit::Foot);
        assert_eq!(Unit::parse("YD"), Unit::Yard);
        assert_eq!(Unit::parse("cm"), Unit::Centimeter);
        assert_eq!(Unit::parse("nm"), Unit::Nanometer);
    }

    #[test]
    fn unrecognized_names_are_unknown() {
        assert_eq!(Unit::parse("furlong"), Unit::Unknown);
        assert_eq!(Unit::parse(""), Unit::Unknown);
        assert!(!Unit::parse("lightyear").is_known());
    }

    #[test]
    fn display_uses_normalized_names() {
        assert_eq!(Unit::Millimeter.to_string(), "millimeter");
        assert_eq!(Unit::Inch.to_string(), "inch");
        assert_eq!(Unit::Unknown.to_string(), "unknown");
    }
}
