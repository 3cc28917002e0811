//! Unit-of-measure resolution for decoded CAD geometry.
//!
//! CAD files rarely state their unit in one reliable place. This crate
//! resolves a canonical [`Unit`] plus a confidence in `[0, 1]` from, in
//! order of trust:
//!
//! 1. decoder-reported metadata,
//! 2. free-form metadata entries,
//! 3. the STEP header's length unit,
//! 4. regex scans of the raw STEP header prefix,
//! 5. the plausibility of the geometry's physical size,
//! 6. a millimeter default.
//!
//! The chosen unit is then validated against the bounding box and may be
//! overridden by a more plausible neighbor (a "metre" file whose part is
//! 300 units long is almost certainly millimeters).
//!
//! # Example
//!
//! ```
//! use cad_units::Unit;
//!
//! assert_eq!(Unit::parse(".MILLI."), Unit::Millimeter);
//! assert_eq!(Unit::parse("\""), Unit::Inch);
//! assert!((Unit::Inch.to_mm() - 25.4).abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod resolve;
mod unit;

pub use resolve::{resolve, UnitResolution, UnitSource};
pub use unit::Unit;
