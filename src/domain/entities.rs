//! Core data types for the rate engine.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Declared weight unit. Vendor rate cards are expressed in kilograms,
/// the only unit accepted on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
}

/// Unit the box dimensions are declared in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Cm,
    M,
}

/// One inbound rate request. Built per call and discarded with the
/// response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub pickup_pincode: u32,
    pub delivery_pincode: u32,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub box_length: f64,
    pub box_width: f64,
    pub box_height: f64,
    pub size_unit: SizeUnit,
    pub is_fragile_goods: bool,
}

/// District/state metadata for a pincode. Read-only reference data
/// owned by the pincode directory; the engine never mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PincodeRecord {
    pub pincode: u32,
    pub district: String,
    pub state_name: String,
}

/// Base/increment price pair for one shipping zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePriceTier {
    pub base_price: f64,
    pub increment_price: f64,
}

/// A courier vendor's rate card, supplied by the vendor catalog.
///
/// A zone tier left as `None` means the vendor does not serve that
/// zone; such vendors are skipped for requests landing in it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPricingConfig {
    pub name: String,
    /// Service tier label, e.g. "express" or "surface".
    pub service_type: String,
    /// Daily pickup cutoff, "HH:MM:SS" local time.
    pub pickup_time: String,
    /// Minimum chargeable weight covered by the base price.
    pub weight_slab: f64,
    /// Weight step each increment price covers.
    pub increment_weight: f64,
    pub within_city: Option<ZonePriceTier>,
    pub within_zone: Option<ZonePriceTier>,
    pub within_metro: Option<ZonePriceTier>,
    pub north_east: Option<ZonePriceTier>,
    pub within_roi: Option<ZonePriceTier>,
}

/// Seller-level pricing input resolved upstream of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SellerProfile {
    /// Markup percentage added to every charge, >= 0.
    pub margin: f64,
}

/// Whether the vendor can still collect the package today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedPickup {
    Today,
    Tomorrow,
}

impl ExpectedPickup {
    pub fn label(&self) -> &'static str {
        match self {
            ExpectedPickup::Today => "Today",
            ExpectedPickup::Tomorrow => "Tomorrow",
        }
    }
}

/// One priced vendor offer. Constructed fresh per request, never
/// persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    pub name: String,
    pub min_weight: f64,
    pub charge: f64,
    pub service_type: String,
    pub expected_pickup: ExpectedPickup,
    /// Concrete instant of the next pickup window.
    #[serde(with = "time::serde::rfc3339")]
    pub pickup_at: OffsetDateTime,
}
