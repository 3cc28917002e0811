//! Loose metadata reported by decoders.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metadata a decoder may report alongside geometry.
///
/// Every field is optional; the unit resolver tolerates a fully empty bag.
///
/// # Example
///
/// ```
/// use cad_mesh::MetadataBag;
///
/// let mut bag = MetadataBag::default();
/// bag.extra.push(("Units".to_string(), "inch".to_string()));
/// assert_eq!(bag.extra_units(), Some("inch"));
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetadataBag {
    /// Unit name reported directly by the decoder.
    pub units: Option<String>,
    /// Length unit from a format-level header (STEP, IGES global section).
    pub length_unit: Option<String>,
    /// Free-form key/value pairs passed through from the decoder.
    pub extra: Vec<(String, String)>,
}

impl MetadataBag {
    /// A bag with only the decoder-reported unit set.
    #[must_use]
    pub fn with_units(units: impl Into<String>) -> Self {
        Self {
            units: Some(units.into()),
            ..Self::default()
        }
    }

    /// Look up a `units` entry in the free-form metadata, case-insensitive.
    #[must_use]
    pub fn extra_units(&self) -> Option<&str> {
        self.extra
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("units"))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bag_is_legal() {
        let bag = MetadataBag::default();
        assert!(bag.units.is_none());
        assert!(bag.length_unit.is_none());
        assert!(bag.extra_units().is_none());
    }

    #[test]
    fn extra_units_is_case_insensitive() {
        let mut bag = MetadataBag::default();
        bag.extra.push(("UNITS".to_string(), "mm".to_string()));
        assert_eq!(bag.extra_units(), Some("mm"));
    }
}
