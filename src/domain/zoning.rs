//! Shipping-zone classification for a pickup/delivery lane.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::entities::{PincodeRecord, VendorPricingConfig, ZonePriceTier};

/// Districts that qualify a lane for metro pricing.
pub const METRO_CITIES: [&str; 7] = [
    "Delhi",
    "Mumbai",
    "Kolkata",
    "Hyderabad",
    "Chennai",
    "Bangalore",
    "Ahmedabad",
];

/// States billed under the north-east tier.
pub const NORTH_EAST_STATES: [&str; 7] = [
    "Arunachal Pradesh",
    "Assam",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Tripura",
];

/// Shipping-zone category. Every lane maps to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    SameCity,
    SameZone,
    Metro,
    NorthEast,
    RestOfIndia,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Zone::SameCity => "within-city",
            Zone::SameZone => "within-zone",
            Zone::Metro => "metro",
            Zone::NorthEast => "north-east",
            Zone::RestOfIndia => "rest-of-india",
        };
        f.write_str(label)
    }
}

/// Reference sets consulted by the classifier. Injected at
/// construction so deployments can override the defaults.
#[derive(Clone, Debug)]
pub struct ZoneReference {
    metro_cities: HashSet<String>,
    north_east_states: HashSet<String>,
}

impl Default for ZoneReference {
    fn default() -> Self {
        Self::new(METRO_CITIES, NORTH_EAST_STATES)
    }
}

impl ZoneReference {
    pub fn new<M, N, S>(metro_cities: M, north_east_states: N) -> Self
    where
        M: IntoIterator<Item = S>,
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metro_cities: metro_cities.into_iter().map(Into::into).collect(),
            north_east_states: north_east_states.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_metro(&self, district: &str) -> bool {
        self.metro_cities.contains(district)
    }

    pub fn is_north_east(&self, state: &str) -> bool {
        self.north_east_states.contains(state)
    }
}

/// Classify a lane. First match wins: district match dominates state
/// match, which dominates the metro and north-east pair checks.
pub fn classify_zone(
    pickup: &PincodeRecord,
    delivery: &PincodeRecord,
    reference: &ZoneReference,
) -> Zone {
    if pickup.district == delivery.district {
        Zone::SameCity
    } else if pickup.state_name == delivery.state_name {
        Zone::SameZone
    } else if reference.is_metro(&pickup.district) && reference.is_metro(&delivery.district) {
        Zone::Metro
    } else if reference.is_north_east(&pickup.state_name)
        && reference.is_north_east(&delivery.state_name)
    {
        Zone::NorthEast
    } else {
        Zone::RestOfIndia
    }
}

impl VendorPricingConfig {
    /// Price tier the given zone bills against, if the vendor serves
    /// it.
    pub fn tier_for(&self, zone: Zone) -> Option<&ZonePriceTier> {
        match zone {
            Zone::SameCity => self.within_city.as_ref(),
            Zone::SameZone => self.within_zone.as_ref(),
            Zone::Metro => self.within_metro.as_ref(),
            Zone::NorthEast => self.north_east.as_ref(),
            Zone::RestOfIndia => self.within_roi.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pincode: u32, district: &str, state: &str) -> PincodeRecord {
        PincodeRecord {
            pincode,
            district: district.to_string(),
            state_name: state.to_string(),
        }
    }

    #[test]
    fn same_district_is_same_city() {
        let pickup = record(400001, "Mumbai", "Maharashtra");
        let delivery = record(400050, "Mumbai", "Maharashtra");
        let zone = classify_zone(&pickup, &delivery, &ZoneReference::default());
        assert_eq!(zone, Zone::SameCity);
    }

    #[test]
    fn same_state_different_district_is_same_zone() {
        let pickup = record(411001, "Pune", "Maharashtra");
        let delivery = record(422001, "Nashik", "Maharashtra");
        let zone = classify_zone(&pickup, &delivery, &ZoneReference::default());
        assert_eq!(zone, Zone::SameZone);
    }

    #[test]
    fn metro_pair_across_states() {
        let pickup = record(400001, "Mumbai", "Maharashtra");
        let delivery = record(110001, "Delhi", "Delhi");
        let zone = classify_zone(&pickup, &delivery, &ZoneReference::default());
        assert_eq!(zone, Zone::Metro);
    }

    #[test]
    fn city_match_dominates_metro_pair() {
        // Both endpoints are metro districts, but the district match
        // must win under the stated priority.
        let pickup = record(110001, "Delhi", "Delhi");
        let delivery = record(110092, "Delhi", "Delhi");
        let zone = classify_zone(&pickup, &delivery, &ZoneReference::default());
        assert_eq!(zone, Zone::SameCity);
    }

    #[test]
    fn north_east_pair() {
        let pickup = record(781001, "Kamrup", "Assam");
        let delivery = record(795001, "Imphal West", "Manipur");
        let zone = classify_zone(&pickup, &delivery, &ZoneReference::default());
        assert_eq!(zone, Zone::NorthEast);
    }

    #[test]
    fn one_north_east_endpoint_falls_back_to_roi() {
        let pickup = record(781001, "Kamrup", "Assam");
        let delivery = record(560001, "Bangalore Urban", "Karnataka");
        let zone = classify_zone(&pickup, &delivery, &ZoneReference::default());
        assert_eq!(zone, Zone::RestOfIndia);
    }

    #[test]
    fn rest_of_india_fallback() {
        let pickup = record(682001, "Ernakulam", "Kerala");
        let delivery = record(302001, "Jaipur", "Rajasthan");
        let zone = classify_zone(&pickup, &delivery, &ZoneReference::default());
        assert_eq!(zone, Zone::RestOfIndia);
    }

    #[test]
    fn custom_reference_sets_apply() {
        let reference = ZoneReference::new(vec!["Pune", "Nagpur"], Vec::new());
        let pickup = record(411001, "Pune", "Maharashtra");
        let delivery = record(440001, "Nagpur", "Madhya Pradesh");
        assert_eq!(classify_zone(&pickup, &delivery, &reference), Zone::Metro);
    }

    #[test]
    fn tier_selection_is_exhaustive_over_zones() {
        let tier = |base: f64| ZonePriceTier {
            base_price: base,
            increment_price: 1.0,
        };
        let vendor = VendorPricingConfig {
            name: "Speedy".to_string(),
            service_type: "express".to_string(),
            pickup_time: "18:00:00".to_string(),
            weight_slab: 0.5,
            increment_weight: 0.5,
            within_city: Some(tier(10.0)),
            within_zone: Some(tier(20.0)),
            within_metro: Some(tier(30.0)),
            north_east: Some(tier(40.0)),
            within_roi: Some(tier(50.0)),
        };

        assert_eq!(vendor.tier_for(Zone::SameCity).unwrap().base_price, 10.0);
        assert_eq!(vendor.tier_for(Zone::SameZone).unwrap().base_price, 20.0);
        assert_eq!(vendor.tier_for(Zone::Metro).unwrap().base_price, 30.0);
        assert_eq!(vendor.tier_for(Zone::NorthEast).unwrap().base_price, 40.0);
        assert_eq!(vendor.tier_for(Zone::RestOfIndia).unwrap().base_price, 50.0);
    }
}
