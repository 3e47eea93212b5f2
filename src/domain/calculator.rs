//! Request validation and per-vendor rate aggregation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use super::entities::{RateQuote, ShipmentRequest, VendorPricingConfig};
use super::providers::{DirectoryError, PincodeDirectory, VendorCatalog};
use super::rating::{chargeable_weight, compute_charge, volumetric_weight};
use super::schedule::{expected_pickup, next_pickup_instant, parse_cutoff};
use super::zoning::{classify_zone, Zone, ZoneReference};

/// Fields a rate payload must carry, checked before deserialization.
const REQUIRED_FIELDS: [&str; 9] = [
    "pickupPincode",
    "deliveryPincode",
    "weight",
    "weightUnit",
    "boxLength",
    "boxWidth",
    "boxHeight",
    "sizeUnit",
    "isFragileGoods",
];

/// Request-level failures. Each aborts the whole computation and maps
/// to a `valid == false` result.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("invalid payload: missing {0}")]
    MissingField(&'static str),
    #[error("invalid payload: {0}")]
    MalformedPayload(String),
    #[error("unhandled size unit: {0}")]
    UnsupportedSizeUnit(String),
    #[error("unknown pincode {0}")]
    UnknownPincode(u32),
    #[error("directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),
}

/// Why a single vendor was left out of the rate sheet. Never aborts
/// the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum VendorSkipReason {
    #[error("no {zone} price tier configured")]
    MissingZoneTier { zone: Zone },
    #[error("unparseable pickup cutoff {cutoff:?}")]
    BadPickupCutoff { cutoff: String },
}

/// Side-channel entry for a vendor excluded from the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedVendor {
    pub name: String,
    pub reason: VendorSkipReason,
}

/// Outcome of a rate computation. Every failure path lands here with
/// `valid == false`; nothing escapes the engine as a panic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateComputationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub rates: Vec<RateQuote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedVendor>,
}

impl RateComputationResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            rates: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn success(rates: Vec<RateQuote>, skipped: Vec<SkippedVendor>) -> Self {
        Self {
            valid: true,
            message: None,
            rates,
            skipped,
        }
    }
}

/// Sorting options for an aggregated rate sheet. Results come back in
/// catalog order unless the caller asks otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RateSort {
    #[default]
    Charge,
    MinWeight,
}

/// Sort quotes by the given criteria. Stable, so catalog order breaks
/// ties.
pub fn sort_quotes(quotes: &mut [RateQuote], sort: RateSort, descending: bool) {
    quotes.sort_by(|a, b| {
        let ord = match sort {
            RateSort::Charge => a
                .charge
                .partial_cmp(&b.charge)
                .unwrap_or(std::cmp::Ordering::Equal),
            RateSort::MinWeight => a
                .min_weight
                .partial_cmp(&b.min_weight)
                .unwrap_or(std::cmp::Ordering::Equal),
        };
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Prices a shipment across every active vendor.
pub struct RateCalculator {
    pincodes: Arc<dyn PincodeDirectory>,
    vendors: Arc<dyn VendorCatalog>,
    zones: ZoneReference,
}

impl RateCalculator {
    pub fn new(pincodes: Arc<dyn PincodeDirectory>, vendors: Arc<dyn VendorCatalog>) -> Self {
        Self {
            pincodes,
            vendors,
            zones: ZoneReference::default(),
        }
    }

    /// Override the zone reference sets, e.g. for regional deployments.
    pub fn with_zone_reference(mut self, zones: ZoneReference) -> Self {
        self.zones = zones;
        self
    }

    /// Compute a rate sheet from a raw JSON payload against the local
    /// wall clock.
    pub async fn compute_rates(&self, payload: &Value, seller_margin: f64) -> RateComputationResult {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        self.compute_rates_at(payload, seller_margin, now).await
    }

    /// Same as [`compute_rates`](Self::compute_rates) with an explicit
    /// clock, which keeps pickup expectations deterministic in tests.
    pub async fn compute_rates_at(
        &self,
        payload: &Value,
        seller_margin: f64,
        now: OffsetDateTime,
    ) -> RateComputationResult {
        let request_id = Uuid::new_v4();
        let outcome = match parse_request(payload) {
            Ok(request) => self.compute_request(&request, seller_margin, now).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(result) => {
                debug!(
                    %request_id,
                    rates = result.rates.len(),
                    skipped = result.skipped.len(),
                    "rate sheet computed"
                );
                result
            }
            Err(err) => {
                warn!(%request_id, error = %err, "rate computation rejected");
                RateComputationResult::failure(err.to_string())
            }
        }
    }

    /// Typed entry point: validate, resolve geo metadata, and quote
    /// every vendor. Per-vendor failures land in the skip side channel
    /// instead of aborting the batch.
    pub async fn compute_request(
        &self,
        request: &ShipmentRequest,
        seller_margin: f64,
        now: OffsetDateTime,
    ) -> Result<RateComputationResult, RateError> {
        validate_request(request)?;
        if seller_margin < 0.0 {
            return Err(RateError::MalformedPayload(
                "seller margin must be non-negative".to_string(),
            ));
        }

        let volumetric = volumetric_weight(
            request.box_length,
            request.box_width,
            request.box_height,
            request.size_unit,
        );
        let chargeable = chargeable_weight(volumetric, request.weight);

        // The two lookups are independent; issue them together.
        let (pickup, delivery) = tokio::try_join!(
            self.pincodes.lookup_pincode(request.pickup_pincode),
            self.pincodes.lookup_pincode(request.delivery_pincode),
        )?;
        let pickup = pickup.ok_or(RateError::UnknownPincode(request.pickup_pincode))?;
        let delivery = delivery.ok_or(RateError::UnknownPincode(request.delivery_pincode))?;

        let zone = classify_zone(&pickup, &delivery, &self.zones);
        debug!(%zone, chargeable, "lane classified");

        let vendors = self.vendors.list_active_vendors().await?;
        let mut rates = Vec::with_capacity(vendors.len());
        let mut skipped = Vec::new();
        for vendor in &vendors {
            match quote_vendor(vendor, zone, chargeable, seller_margin, now) {
                Ok(quote) => rates.push(quote),
                Err(reason) => {
                    warn!(vendor = %vendor.name, %reason, "vendor excluded from rate sheet");
                    skipped.push(SkippedVendor {
                        name: vendor.name.clone(),
                        reason,
                    });
                }
            }
        }

        Ok(RateComputationResult::success(rates, skipped))
    }
}

/// Price one vendor for an already-classified lane.
fn quote_vendor(
    vendor: &VendorPricingConfig,
    zone: Zone,
    chargeable: f64,
    seller_margin: f64,
    now: OffsetDateTime,
) -> Result<RateQuote, VendorSkipReason> {
    let tier = vendor
        .tier_for(zone)
        .ok_or(VendorSkipReason::MissingZoneTier { zone })?;
    let cutoff = parse_cutoff(&vendor.pickup_time).map_err(|_| VendorSkipReason::BadPickupCutoff {
        cutoff: vendor.pickup_time.clone(),
    })?;

    let charge = compute_charge(
        tier,
        chargeable,
        vendor.weight_slab,
        vendor.increment_weight,
        seller_margin,
    );

    Ok(RateQuote {
        name: vendor.name.clone(),
        min_weight: vendor.weight_slab,
        charge,
        service_type: vendor.service_type.clone(),
        expected_pickup: expected_pickup(cutoff, now.time()),
        pickup_at: next_pickup_instant(cutoff, now),
    })
}

/// Check the raw payload for the required fields, then deserialize.
fn parse_request(payload: &Value) -> Result<ShipmentRequest, RateError> {
    let body = payload
        .as_object()
        .ok_or_else(|| RateError::MalformedPayload("expected a JSON object".to_string()))?;
    if body.is_empty() {
        return Err(RateError::MalformedPayload("empty payload".to_string()));
    }
    for field in REQUIRED_FIELDS {
        if !body.contains_key(field) {
            return Err(RateError::MissingField(field));
        }
    }
    // Surface a bad unit as its own error rather than a generic
    // deserialization failure.
    if let Some(unit) = body.get("sizeUnit").and_then(Value::as_str) {
        if unit != "cm" && unit != "m" {
            return Err(RateError::UnsupportedSizeUnit(unit.to_string()));
        }
    }

    serde_json::from_value(payload.clone())
        .map_err(|err| RateError::MalformedPayload(err.to_string()))
}

fn validate_request(request: &ShipmentRequest) -> Result<(), RateError> {
    if request.pickup_pincode == 0 || request.delivery_pincode == 0 {
        return Err(RateError::MalformedPayload(
            "pincodes must be positive".to_string(),
        ));
    }
    if !(request.weight.is_finite() && request.weight > 0.0) {
        return Err(RateError::MalformedPayload(
            "weight must be positive".to_string(),
        ));
    }
    let dims = [request.box_length, request.box_width, request.box_height];
    if !dims.iter().all(|side| side.is_finite() && *side > 0.0) {
        return Err(RateError::MalformedPayload(
            "box dimensions must be positive".to_string(),
        ));
    }
    Ok(())
}
