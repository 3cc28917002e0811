//! Shop rate tables and constants.

/// Weight per inch of stock by gauge, in pounds.
const GAUGE_WEIGHTS: [(&str, f64); 5] = [
    ("16", 0.15),
    ("14", 0.19),
    ("12", 0.25),
    ("10", 0.32),
    ("8", 0.41),
];

/// Weight per inch for unrecognized gauges (14 AWG).
pub const DEFAULT_WEIGHT_PER_IN: f64 = 0.19;

/// Cost per bend, dollars.
pub const BEND_COST: f64 = 15.00;
/// Cost per cut, dollars.
pub const CUT_COST: f64 = 8.00;
/// One-time setup cost, dollars.
pub const SETUP_COST: f64 = 75.00;
/// Shop labor rate, dollars per hour.
pub const LABOR_RATE: f64 = 65.00;
/// Base handling time per part, hours.
pub const BASE_TIME_PER_PART: f64 = 0.25;
/// Added time per bend, hours.
pub const TIME_PER_BEND: f64 = 0.15;
/// Added time per cut, hours.
pub const TIME_PER_CUT: f64 = 0.08;
/// Sales tax rate.
pub const TAX_RATE: f64 = 0.088_75;

/// Weight per inch for a gauge designation.
///
/// Accepts forms like `"14AWG"`, `"14 AWG"`, or a bare `"14"`; anything
/// unrecognized falls back to the 14 AWG weight.
#[must_use]
pub fn weight_per_inch(gauge: &str) -> f64 {
    let digits: String = gauge.chars().take_while(|c| c.is_ascii_digit()).collect();
    GAUGE_WEIGHTS
        .iter()
        .find(|(g, _)| *g == digits)
        .map_or(DEFAULT_WEIGHT_PER_IN, |(_, w)| *w)
}

/// Quantity discount fraction for an order size.
#[must_use]
pub const fn quantity_discount(quantity: u32) -> f64 {
    match quantity {
        0..=10 => 0.0,
        11..=50 => 0.05,
        51..=100 => 0.10,
        _ => 0.15,
    }
}
