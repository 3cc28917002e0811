//! Quote assembly.

use crate::money::Money;
use crate::rates;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A sellable stock material.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Material {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price per pound, dollars.
    pub price_per_lb: f64,
}

/// Everything the calculator needs for one quote.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PricingInputs {
    /// Stock material.
    pub material: Material,
    /// Parts ordered; zero is treated as one.
    pub quantity: u32,
    /// Gauge designation, e.g. `"14 AWG"`.
    pub gauge: String,
    /// Centerline length per part, inches.
    pub length_in: f64,
    /// Bends per part.
    pub bends: u32,
    /// Cuts per part.
    pub cuts: u32,
}

/// Rate details echoed back with a quote.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuoteDetails {
    /// Stock weight per part, pounds.
    pub material_weight_lb: f64,
    /// Per-bend rate.
    pub bending_rate: Money,
    /// Per-cut rate.
    pub cutting_rate: Money,
    /// One-time setup rate.
    pub setup_rate: Money,
    /// Total labor hours for the order.
    pub labor_hours: f64,
    /// Labor rate per hour.
    pub labor_rate: Money,
}

/// An itemized quote for an order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuoteBreakdown {
    /// Stock material for the whole order.
    pub material_cost: Money,
    /// Bending for the whole order.
    pub bending_cost: Money,
    /// Cutting for the whole order.
    pub cutting_cost: Money,
    /// One-time setup.
    pub setup_cost: Money,
    /// Labor for the whole order.
    pub labor_cost: Money,
    /// Sum of line items after the quantity discount.
    pub subtotal: Money,
    /// Tax on the discounted subtotal.
    pub tax: Money,
    /// `subtotal + tax`, exact in cents.
    pub total: Money,
    /// Total divided by quantity, rounded to the cent.
    pub price_per_part: Money,
    /// Rates and intermediate figures.
    pub details: QuoteDetails,
}

impl std::fmt::Display for QuoteBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Material: {}", self.material_cost)?;
        writeln!(f, "Bending:  {}", self.bending_cost)?;
        writeln!(f, "Cutting:  {}", self.cutting_cost)?;
        writeln!(f, "Labor:    {}", self.labor_cost)?;
        writeln!(f, "Setup:    {}", self.setup_cost)?;
        writeln!(f, "Subtotal: {}", self.subtotal)?;
        writeln!(f, "Tax:      {}", self.tax)?;
        writeln!(f, "Total:    {}  ({} per part)", self.total, self.price_per_part)
    }
}

/// Compute a quote.
///
/// Pure and deterministic: identical inputs produce identical breakdowns
/// bit for bit. Per-part figures are rounded to the cent before scaling by
/// quantity, and tax applies to the discounted subtotal.
#[must_use]
pub fn calculate_quote(inputs: &PricingInputs) -> QuoteBreakdown {
    let quantity = inputs.quantity.max(1);
    let bends = f64::from(inputs.bends);
    let cuts = f64::from(inputs.cuts);
    let length_in = inputs.length_in.max(0.0);

    let weight_per_in = rates::weight_per_inch(&inputs.gauge);
    let material_weight_lb = length_in * weight_per_in;

    let material_per_part = Money::from_dollars(material_weight_lb * inputs.material.price_per_lb);
    let material_cost = material_per_part * quantity;

    let bending_cost = Money::from_dollars(rates::BEND_COST * bends) * quantity;
    let cutting_cost = Money::from_dollars(rates::CUT_COST * cuts) * quantity;

    let labor_hours = f64::from(quantity)
        * cuts.mul_add(
            rates::TIME_PER_CUT,
            bends.mul_add(rates::TIME_PER_BEND, rates::BASE_TIME_PER_PART),
        );
    let labor_cost = Money::from_dollars(labor_hours * rates::LABOR_RATE);
    let setup_cost = Money::from_dollars(rates::SETUP_COST);

    let before_discount: Money = [
        material_cost,
        bending_cost,
        cutting_cost,
        labor_cost,
        setup_cost,
    ]
    .into_iter()
    .sum();

    let discount =
        Money::from_dollars(before_discount.as_dollars() * rates::quantity_discount(quantity));
    let subtotal = before_discount - discount;

    let tax = Money::from_dollars(subtotal.as_dollars() * rates::TAX_RATE);
    let total = subtotal + tax;
    let price_per_part = total.per_unit(quantity);

    QuoteBreakdown {
        material_cost,
        bending_cost,
        cutting_cost,
        setup_cost,
        labor_cost,
        subtotal,
        tax,
        total,
        price_per_part,
        details: QuoteDetails {
            material_weight_lb,
            bending_rate: Money::from_dollars(rates::BEND_COST),
            cutting_rate: Money::from_dollars(rates::CUT_COST),
            setup_rate: setup_cost,
            labor_hours,
            labor_rate: Money::from_dollars(rates::LABOR_RATE),
        },
    }
}
