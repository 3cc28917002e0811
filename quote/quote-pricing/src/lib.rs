//! Deterministic quote calculation for bent tube parts.
//!
//! A quote is a pure function of material, quantity, gauge, centerline
//! length, bend count, and cut count. All monetary arithmetic happens in
//! integer cents ([`Money`]), so identical inputs always produce identical
//! breakdowns.
//!
//! # Example
//!
//! ```
//! use quote_pricing::{calculate_quote, Material, PricingInputs};
//!
//! let quote = calculate_quote(&PricingInputs {
//!     material: Material {
//!         id: "steel-14".to_string(),
//!         name: "Mild Steel".to_string(),
//!         price_per_lb: 4.75,
//!     },
//!     quantity: 10,
//!     gauge: "14 AWG".to_string(),
//!     length_in: 48.0,
//!     bends: 3,
//!     cuts: 2,
//! });
//!
//! assert_eq!(quote.total.to_string(), "$1826.05");
//! assert_eq!(quote.total, quote.subtotal + quote.tax);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::cast_possible_truncation)]

mod money;
mod quote;
pub mod rates;

pub use money::Money;
pub use quote::{calculate_quote, Material, PricingInputs, QuoteBreakdown, QuoteDetails};
