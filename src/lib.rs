//! Shipment rate engine for courier aggregation.
//!
//! Given pickup/delivery pincodes, package dimensions and a declared
//! weight, the engine prices the lane across every active courier
//! vendor: shipping-zone classification, volumetric-weight
//! normalization, tiered slab pricing with seller margin and GST, and
//! next-pickup estimation.
//!
//! The pincode directory, vendor catalog and seller profiles are
//! external collaborators reached through the traits in
//! [`domain::providers`]; [`infra::directory::DirectoryClient`] is the
//! reference HTTP implementation.

pub mod domain;
pub mod infra;

pub use domain::{
    RateCalculator, RateComputationResult, RateQuote, ShipmentRequest, VendorPricingConfig, Zone,
};
pub use infra::DirectoryClient;
