//! End-to-end rate computation against in-memory collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use time::macros::datetime;

use shipment_rate_engine::domain::{
    DirectoryError, ExpectedPickup, PincodeDirectory, PincodeRecord, RateCalculator,
    VendorCatalog, VendorPricingConfig, VendorSkipReason, Zone, ZonePriceTier,
};

struct FixedDirectory {
    records: HashMap<u32, PincodeRecord>,
    vendors: Vec<VendorPricingConfig>,
}

impl FixedDirectory {
    fn new(records: Vec<PincodeRecord>, vendors: Vec<VendorPricingConfig>) -> Arc<Self> {
        Arc::new(Self {
            records: records.into_iter().map(|r| (r.pincode, r)).collect(),
            vendors,
        })
    }
}

#[async_trait]
impl PincodeDirectory for FixedDirectory {
    async fn lookup_pincode(&self, pincode: u32) -> Result<Option<PincodeRecord>, DirectoryError> {
        Ok(self.records.get(&pincode).cloned())
    }
}

#[async_trait]
impl VendorCatalog for FixedDirectory {
    async fn list_active_vendors(&self) -> Result<Vec<VendorPricingConfig>, DirectoryError> {
        Ok(self.vendors.clone())
    }
}

fn record(pincode: u32, district: &str, state: &str) -> PincodeRecord {
    PincodeRecord {
        pincode,
        district: district.to_string(),
        state_name: state.to_string(),
    }
}

fn tier(base: f64, increment: f64) -> Option<ZonePriceTier> {
    Some(ZonePriceTier {
        base_price: base,
        increment_price: increment,
    })
}

fn vendor(name: &str, pickup_time: &str) -> VendorPricingConfig {
    VendorPricingConfig {
        name: name.to_string(),
        service_type: "surface".to_string(),
        pickup_time: pickup_time.to_string(),
        weight_slab: 1.0,
        increment_weight: 1.0,
        within_city: tier(100.0, 10.0),
        within_zone: tier(120.0, 12.0),
        within_metro: tier(150.0, 15.0),
        north_east: tier(200.0, 20.0),
        within_roi: tier(180.0, 18.0),
    }
}

fn mumbai_lane_payload() -> Value {
    json!({
        "pickupPincode": 400001,
        "deliveryPincode": 400050,
        // Declared weight dominates the 0.2 kg volumetric weight.
        "weight": 3.0,
        "weightUnit": "kg",
        "boxLength": 10.0,
        "boxWidth": 10.0,
        "boxHeight": 10.0,
        "sizeUnit": "cm",
        "isFragileGoods": false,
    })
}

fn city_directory(vendors: Vec<VendorPricingConfig>) -> Arc<FixedDirectory> {
    FixedDirectory::new(
        vec![
            record(400001, "Mumbai", "Maharashtra"),
            record(400050, "Mumbai", "Maharashtra"),
            record(110001, "Delhi", "Delhi"),
        ],
        vendors,
    )
}

#[tokio::test]
async fn prices_a_within_city_lane_end_to_end() {
    let directory = city_directory(vec![vendor("Speedy", "23:00:00")]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let now = datetime!(2024-03-10 10:00:00 +5:30);
    let result = calculator
        .compute_rates_at(&mumbai_lane_payload(), 10.0, now)
        .await;

    assert!(result.valid);
    assert_eq!(result.rates.len(), 1);

    let quote = &result.rates[0];
    assert_eq!(quote.name, "Speedy");
    assert_eq!(quote.min_weight, 1.0);
    assert_eq!(quote.service_type, "surface");
    // base 100 + 10 * 2 extra kg = 120; +10% margin = 132; +18% GST.
    assert!((quote.charge - 155.76).abs() < 1e-9);
    assert_eq!(quote.expected_pickup, ExpectedPickup::Today);
    assert_eq!(quote.pickup_at, datetime!(2024-03-10 23:00:00 +5:30));
}

#[tokio::test]
async fn past_cutoff_rolls_pickup_to_tomorrow() {
    let directory = city_directory(vec![vendor("Speedy", "23:00:00")]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let now = datetime!(2024-03-10 23:30:00 +5:30);
    let result = calculator
        .compute_rates_at(&mumbai_lane_payload(), 10.0, now)
        .await;

    assert!(result.valid);
    let quote = &result.rates[0];
    assert_eq!(quote.expected_pickup, ExpectedPickup::Tomorrow);
    assert_eq!(quote.pickup_at, datetime!(2024-03-11 23:00:00 +5:30));
}

#[tokio::test]
async fn volumetric_weight_governs_bulky_parcels() {
    let directory = city_directory(vec![vendor("Speedy", "23:00:00")]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let mut payload = mumbai_lane_payload();
    // 100 x 20 x 5 cm = 2 kg volumetric against 1 kg declared.
    payload["weight"] = json!(1.0);
    payload["boxLength"] = json!(100.0);
    payload["boxWidth"] = json!(20.0);
    payload["boxHeight"] = json!(5.0);

    let now = datetime!(2024-03-10 10:00:00 +5:30);
    let result = calculator.compute_rates_at(&payload, 0.0, now).await;

    assert!(result.valid);
    // base 100 + 10 * 1 extra kg = 110; no margin; +18% GST.
    assert!((result.rates[0].charge - 129.8).abs() < 1e-9);
}

#[tokio::test]
async fn missing_field_fails_validation() {
    let directory = city_directory(vec![vendor("Speedy", "23:00:00")]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let mut payload = mumbai_lane_payload();
    payload.as_object_mut().unwrap().remove("weight");

    let now = datetime!(2024-03-10 10:00:00 +5:30);
    let result = calculator.compute_rates_at(&payload, 10.0, now).await;

    assert!(!result.valid);
    assert!(result.message.as_deref().unwrap().contains("invalid payload"));
    assert!(result.rates.is_empty());
}

#[tokio::test]
async fn unhandled_size_unit_fails_validation() {
    let directory = city_directory(vec![vendor("Speedy", "23:00:00")]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let mut payload = mumbai_lane_payload();
    payload["sizeUnit"] = json!("in");

    let now = datetime!(2024-03-10 10:00:00 +5:30);
    let result = calculator.compute_rates_at(&payload, 10.0, now).await;

    assert!(!result.valid);
    assert!(result
        .message
        .as_deref()
        .unwrap()
        .contains("unhandled size unit"));
}

#[tokio::test]
async fn unknown_delivery_pincode_is_reported() {
    let directory = city_directory(vec![vendor("Speedy", "23:00:00")]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let mut payload = mumbai_lane_payload();
    payload["deliveryPincode"] = json!(999999);

    let now = datetime!(2024-03-10 10:00:00 +5:30);
    let result = calculator.compute_rates_at(&payload, 10.0, now).await;

    assert!(!result.valid);
    assert!(result.message.as_deref().unwrap().contains("999999"));
}

#[tokio::test]
async fn vendor_without_the_selected_tier_is_skipped_not_fatal() {
    let mut partial = vendor("NoCity", "18:00:00");
    partial.within_city = None;
    let directory = city_directory(vec![partial, vendor("Speedy", "23:00:00")]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let now = datetime!(2024-03-10 10:00:00 +5:30);
    let result = calculator
        .compute_rates_at(&mumbai_lane_payload(), 10.0, now)
        .await;

    assert!(result.valid);
    assert_eq!(result.rates.len(), 1);
    assert_eq!(result.rates[0].name, "Speedy");
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].name, "NoCity");
    assert_eq!(
        result.skipped[0].reason,
        VendorSkipReason::MissingZoneTier {
            zone: Zone::SameCity
        }
    );
}

#[tokio::test]
async fn quotes_come_back_in_catalog_order() {
    let directory = city_directory(vec![
        vendor("First", "18:00:00"),
        vendor("Second", "19:00:00"),
        vendor("Third", "20:00:00"),
    ]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let now = datetime!(2024-03-10 10:00:00 +5:30);
    let result = calculator
        .compute_rates_at(&mumbai_lane_payload(), 0.0, now)
        .await;

    let names: Vec<_> = result.rates.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, ["First", "Second", "Third"]);
}

#[tokio::test]
async fn cross_metro_lane_bills_the_metro_tier() {
    let directory = city_directory(vec![vendor("Speedy", "23:00:00")]);
    let calculator = RateCalculator::new(directory.clone(), directory);

    let mut payload = mumbai_lane_payload();
    payload["deliveryPincode"] = json!(110001);

    let now = datetime!(2024-03-10 10:00:00 +5:30);
    let result = calculator.compute_rates_at(&payload, 0.0, now).await;

    assert!(result.valid);
    // metro tier: base 150 + 15 * 2 = 180; +18% GST.
    assert!((result.rates[0].charge - 212.4).abs() < 1e-9);
}
