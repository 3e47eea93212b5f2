//! Domain logic for shipment rating lives here.

pub mod calculator;
pub mod entities;
pub mod providers;
pub mod rating;
pub mod schedule;
pub mod zoning;

pub use calculator::{
    sort_quotes, RateCalculator, RateComputationResult, RateError, RateSort, SkippedVendor,
    VendorSkipReason,
};
pub use entities::{
    ExpectedPickup, PincodeRecord, RateQuote, SellerProfile, ShipmentRequest, SizeUnit,
    VendorPricingConfig, WeightUnit, ZonePriceTier,
};
pub use providers::{DirectoryError, PincodeDirectory, SellerDirectory, VendorCatalog};
pub use rating::{chargeable_weight, compute_charge, volumetric_weight, GST_RATE};
pub use schedule::{expected_pickup, next_pickup_instant, parse_cutoff};
pub use zoning::{
    classify_zone, Zone, ZoneReference, METRO_CITIES, NORTH_EAST_STATES,
};
