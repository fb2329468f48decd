//! Vendor application intake review: lifecycle rules, orchestration, and the
//! HTTP surface used by the committee dashboard.

pub mod domain;
pub mod justify;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, ApplicationView, DetailsValidationError, PostalAddress,
    StandDetails, StandDetailsForm, TableTier, VendorApplication,
};
pub use justify::{JustificationWriter, RejectionReason, TemplateJustificationWriter};
pub use lifecycle::{
    decide, LifecycleError, LifecycleEvent, NotificationIntent, TransitionDecision,
};
pub use repository::{
    ApplicationRepository, DeliveryReport, NotificationSender, PriceConfigSource, RepositoryError,
};
pub use router::application_router;
pub use service::{
    ApplicationServiceError, MarketApplicationService, NotificationStatus, TransitionReport,
};
