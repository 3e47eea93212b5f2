//! Thin asynchronous client for the logistics directory API.
//!
//! - Typed accessors for pincode records, vendor rate cards and
//!   seller profiles.
//! - Maintains a simple in-memory cache with TTL and stale fallbacks;
//!   the vendor catalog is additionally cached on disk (see
//!   `infra::cache`).

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{
    DirectoryError, PincodeDirectory, PincodeRecord, SellerDirectory, SellerProfile,
    VendorCatalog, VendorPricingConfig, ZonePriceTier,
};
use crate::infra::cache::{load_vendor_cache, save_vendor_cache, VendorCatalogCache};

const DEFAULT_BASE_URL: &str = "https://api.shipdesk.in/v1/";
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const USER_AGENT: &str = "shipment-rate-engine/0.1.0";

impl From<url::ParseError> for DirectoryError {
    fn from(err: url::ParseError) -> Self {
        DirectoryError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        DirectoryError::Transport(err.to_string())
    }
}

/// Where a payload came from, for callers that care about freshness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Default)]
struct DirectoryMemCache {
    pincodes: HashMap<u32, Cached<Option<PincodeRecord>>>,
    vendors: Option<Cached<Vec<VendorPricingConfig>>>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: String,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Async client for the directory API, cloneable across tasks.
#[derive(Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<DirectoryMemCache>>,
    ttl: Duration,
}

impl DirectoryClient {
    pub fn new() -> Result<Self, DirectoryError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, DirectoryError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(DirectoryMemCache::default())),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Resolve a pincode to its district/state record. `Ok(None)`
    /// means the directory does not know the pincode.
    pub async fn get_pincode(
        &self,
        pincode: u32,
    ) -> Result<CachedPayload<Option<PincodeRecord>>, DirectoryError> {
        if let Some(payload) = self.cached_pincode(pincode).await {
            return Ok(payload);
        }

        let mut url = self.url("pincodes")?;
        url.query_pairs_mut()
            .append_pair("pincode", &pincode.to_string());

        debug!(%url, "requesting pincode record");
        match self
            .fetch_optional::<PincodeDto>(self.http.get(url.clone()))
            .await
        {
            Ok(dto) => {
                let record = dto.map(PincodeRecord::from);
                Ok(self.store_pincode(pincode, record, CacheStatus::Fresh).await)
            }
            Err(error) => {
                warn!(%url, %error, "pincode request failed");
                if let Some(stale) = self.cached_pincode_stale(pincode).await {
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    /// Fetch all active vendor rate cards. Falls back to the disk
    /// cache, then to stale in-memory data, before giving up.
    pub async fn get_vendors(
        &self,
    ) -> Result<CachedPayload<Vec<VendorPricingConfig>>, DirectoryError> {
        if let Some(payload) = self.cached_vendors().await {
            return Ok(payload);
        }

        if let Some(disk) = load_vendor_cache() {
            debug!(
                vendors = disk.vendors.len(),
                age = %disk.age_string(),
                "serving vendor catalog from disk cache"
            );
            return Ok(self
                .store_vendors(disk.vendors, CacheStatus::Cached)
                .await);
        }

        let mut url = self.url("vendors")?;
        url.query_pairs_mut().append_pair("status", "active");

        debug!(%url, "requesting vendor catalog");
        match self
            .fetch_data::<Vec<VendorDto>>(self.http.get(url.clone()))
            .await
        {
            Ok(response) => {
                let vendors = response
                    .into_iter()
                    .map(VendorPricingConfig::from)
                    .collect::<Vec<_>>();
                if let Err(err) = save_vendor_cache(&VendorCatalogCache::new(vendors.clone())) {
                    warn!(%err, "failed to save vendor cache");
                }
                Ok(self.store_vendors(vendors, CacheStatus::Fresh).await)
            }
            Err(error) => {
                warn!(%url, %error, "vendor catalog request failed");
                if let Some(stale) = self.cached_vendors_stale().await {
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    /// Fetch a seller's pricing profile. Margins change with contract
    /// renegotiations, so these are never cached.
    pub async fn get_seller(
        &self,
        seller_id: &str,
    ) -> Result<Option<SellerProfile>, DirectoryError> {
        let mut url = self.url("sellers")?;
        url.query_pairs_mut().append_pair("id", seller_id);

        debug!(%url, "requesting seller profile");
        let dto = self
            .fetch_optional::<SellerDto>(self.http.get(url))
            .await?;
        Ok(dto.map(SellerProfile::from))
    }

    pub async fn clear_cache(&self) {
        let mut cache = self.cache.lock().await;
        cache.pincodes.clear();
        cache.vendors = None;
    }

    async fn cached_pincode(&self, pincode: u32) -> Option<CachedPayload<Option<PincodeRecord>>> {
        let cache = self.cache.lock().await;
        let result = cache
            .pincodes
            .get(&pincode)
            .and_then(|entry| entry.if_fresh(self.ttl));
        if result.is_some() {
            debug!(pincode, "serving cached pincode record");
        }
        result
    }

    async fn cached_pincode_stale(
        &self,
        pincode: u32,
    ) -> Option<CachedPayload<Option<PincodeRecord>>> {
        let cache = self.cache.lock().await;
        cache.pincodes.get(&pincode).map(Cached::stale)
    }

    async fn cached_vendors(&self) -> Option<CachedPayload<Vec<VendorPricingConfig>>> {
        let cache = self.cache.lock().await;
        cache
            .vendors
            .as_ref()
            .and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_vendors_stale(&self) -> Option<CachedPayload<Vec<VendorPricingConfig>>> {
        let cache = self.cache.lock().await;
        cache.vendors.as_ref().map(Cached::stale)
    }

    async fn store_pincode(
        &self,
        pincode: u32,
        record: Option<PincodeRecord>,
        status: CacheStatus,
    ) -> CachedPayload<Option<PincodeRecord>> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(record.clone(), fetched_at, status);
        let mut cache = self.cache.lock().await;
        cache.pincodes.insert(pincode, Cached::new(record, fetched_at));
        payload
    }

    async fn store_vendors(
        &self,
        vendors: Vec<VendorPricingConfig>,
        status: CacheStatus,
    ) -> CachedPayload<Vec<VendorPricingConfig>> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(vendors.clone(), fetched_at, status);
        let mut cache = self.cache.lock().await;
        cache.vendors = Some(Cached::new(vendors, fetched_at));
        payload
    }

    async fn fetch_data<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, DirectoryError>
    where
        T: DeserializeOwned,
    {
        self.fetch_optional(builder)
            .await?
            .ok_or_else(|| DirectoryError::Api("response missing data".into()))
    }

    async fn fetch_optional<T>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Option<T>, DirectoryError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?.error_for_status()?;
        let envelope: ApiEnvelope<T> = response.json().await?;
        let ApiEnvelope {
            status,
            data,
            message,
        } = envelope;

        if status.eq_ignore_ascii_case("ok") {
            Ok(data)
        } else {
            Err(DirectoryError::Api(message.unwrap_or(status)))
        }
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

#[async_trait]
impl PincodeDirectory for DirectoryClient {
    async fn lookup_pincode(&self, pincode: u32) -> Result<Option<PincodeRecord>, DirectoryError> {
        Ok(self.get_pincode(pincode).await?.data)
    }
}

#[async_trait]
impl VendorCatalog for DirectoryClient {
    async fn list_active_vendors(&self) -> Result<Vec<VendorPricingConfig>, DirectoryError> {
        Ok(self.get_vendors().await?.data)
    }
}

#[async_trait]
impl SellerDirectory for DirectoryClient {
    async fn seller_profile(
        &self,
        seller_id: &str,
    ) -> Result<Option<SellerProfile>, DirectoryError> {
        self.get_seller(seller_id).await
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

#[derive(Debug, Deserialize)]
struct PincodeDto {
    #[serde(alias = "Pincode")]
    pincode: u32,
    #[serde(alias = "District")]
    district: String,
    #[serde(alias = "StateName", alias = "state_name")]
    state_name: String,
}

impl From<PincodeDto> for PincodeRecord {
    fn from(dto: PincodeDto) -> Self {
        Self {
            pincode: dto.pincode,
            district: dto.district,
            state_name: dto.state_name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneTierDto {
    base_price: f64,
    increment_price: f64,
}

impl From<ZoneTierDto> for ZonePriceTier {
    fn from(dto: ZoneTierDto) -> Self {
        Self {
            base_price: dto.base_price,
            increment_price: dto.increment_price,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorDto {
    name: String,
    #[serde(alias = "type")]
    service_type: String,
    pickup_time: String,
    weight_slab: f64,
    increment_weight: f64,
    #[serde(default)]
    within_city: Option<ZoneTierDto>,
    #[serde(default)]
    within_zone: Option<ZoneTierDto>,
    #[serde(default)]
    within_metro: Option<ZoneTierDto>,
    #[serde(default)]
    north_east: Option<ZoneTierDto>,
    #[serde(default)]
    within_roi: Option<ZoneTierDto>,
}

impl From<VendorDto> for VendorPricingConfig {
    fn from(dto: VendorDto) -> Self {
        Self {
            name: dto.name,
            service_type: dto.service_type,
            pickup_time: dto.pickup_time,
            weight_slab: dto.weight_slab,
            increment_weight: dto.increment_weight,
            within_city: dto.within_city.map(ZonePriceTier::from),
            within_zone: dto.within_zone.map(ZonePriceTier::from),
            within_metro: dto.within_metro.map(ZonePriceTier::from),
            north_east: dto.north_east.map(ZonePriceTier::from),
            within_roi: dto.within_roi.map(ZonePriceTier::from),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SellerDto {
    #[serde(default)]
    margin: f64,
}

impl From<SellerDto> for SellerProfile {
    fn from(dto: SellerDto) -> Self {
        Self { margin: dto.margin }
    }
}
