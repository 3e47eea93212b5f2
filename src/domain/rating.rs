//! Chargeable-weight normalization and slab pricing.

use super::entities::{SizeUnit, ZonePriceTier};

/// GST applied on top of the margin-adjusted charge.
pub const GST_RATE: f64 = 0.18;

const VOLUMETRIC_DIVISOR_CM: f64 = 5000.0;
const VOLUMETRIC_DIVISOR_M: f64 = 5.0;

/// Volumetric weight of a box, in kilograms.
pub fn volumetric_weight(length: f64, width: f64, height: f64, unit: SizeUnit) -> f64 {
    let volume = length * width * height;
    match unit {
        SizeUnit::Cm => volume / VOLUMETRIC_DIVISOR_CM,
        SizeUnit::M => volume / VOLUMETRIC_DIVISOR_M,
    }
}

/// Dimensional-weight billing: whichever of volumetric and declared
/// weight is larger governs the charge.
pub fn chargeable_weight(volumetric: f64, declared: f64) -> f64 {
    volumetric.max(declared)
}

/// Price a chargeable weight against a zone tier, then apply the
/// seller margin and GST in that order.
///
/// Weights below the slab minimum bill at the base price; the
/// increment ratio never goes negative.
pub fn compute_charge(
    tier: &ZonePriceTier,
    chargeable: f64,
    weight_slab: f64,
    increment_weight: f64,
    margin_percent: f64,
) -> f64 {
    let increment_ratio = ((chargeable - weight_slab) / increment_weight).max(0.0);
    let mut charge = tier.base_price + tier.increment_price * increment_ratio;
    charge += charge * (margin_percent / 100.0);
    charge += charge * GST_RATE;
    charge
}
