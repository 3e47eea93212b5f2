//! Collaborator seams for external reference data.
//!
//! The engine only ever reads through these traits; the reference
//! HTTP implementation lives in `infra::directory`.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{PincodeRecord, SellerProfile, VendorPricingConfig};

/// Errors surfaced by the directory collaborators.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("api error: {0}")]
    Api(String),
}

/// Pincode to district/state resolution.
#[async_trait]
pub trait PincodeDirectory: Send + Sync {
    /// `Ok(None)` means the pincode is not serviceable.
    async fn lookup_pincode(&self, pincode: u32) -> Result<Option<PincodeRecord>, DirectoryError>;
}

/// Active vendor rate cards.
#[async_trait]
pub trait VendorCatalog: Send + Sync {
    async fn list_active_vendors(&self) -> Result<Vec<VendorPricingConfig>, DirectoryError>;
}

/// Seller margin resolution. Performed upstream of the engine; the
/// resolved margin is passed into the rate computation.
#[async_trait]
pub trait SellerDirectory: Send + Sync {
    async fn seller_profile(&self, seller_id: &str)
        -> Result<Option<SellerProfile>, DirectoryError>;
}
