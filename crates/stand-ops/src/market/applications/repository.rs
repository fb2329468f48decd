use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, StandDetails, VendorApplication};
use crate::market::pricing::PriceConfig;

/// Storage abstraction so the service module can be exercised in isolation.
/// Records are externally durable; nothing here assumes an in-memory cache
/// survives restarts.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: VendorApplication) -> Result<VendorApplication, RepositoryError>;
    fn update(&self, record: VendorApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<VendorApplication>, RepositoryError>;
    fn list(&self) -> Result<Vec<VendorApplication>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Result of one notification attempt. Delivery failure is data reported back
/// to the caller, never an error that could undo a committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "delivery", content = "reason")]
pub enum DeliveryReport {
    Sent,
    Failed(String),
}

/// Outbound mail hooks; the transport implementation lives at the service
/// edge (SMTP, provider API, or a recording double in tests).
pub trait NotificationSender: Send + Sync {
    fn send_acceptance(
        &self,
        record: &VendorApplication,
        message: Option<&str>,
        config: &PriceConfig,
    ) -> DeliveryReport;

    fn send_rejection(
        &self,
        record: &VendorApplication,
        justification: &str,
        config: &PriceConfig,
    ) -> DeliveryReport;

    fn send_final_confirmation(
        &self,
        record: &VendorApplication,
        details: &StandDetails,
        config: &PriceConfig,
    ) -> DeliveryReport;
}

/// Source of the known per-edition price configurations. Selection logic
/// lives in [`crate::market::pricing::resolve_config`], never in the store.
pub trait PriceConfigSource: Send + Sync {
    fn configs(&self) -> Result<Vec<PriceConfig>, RepositoryError>;
}
