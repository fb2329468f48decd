use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ApplicationId, ApplicationStatus, VendorApplication};
use super::lifecycle::{self, LifecycleError, LifecycleEvent, NotificationIntent};
use super::repository::{
    ApplicationRepository, DeliveryReport, NotificationSender, PriceConfigSource, RepositoryError,
};
use crate::market::pricing::{resolve_config, PriceConfig};
use crate::market::stats::{aggregate, EditionStats};

/// Service composing the lifecycle rules, the repository, and the notifier.
///
/// The status mutation is committed before any notification attempt; a failed
/// delivery is reported on the [`TransitionReport`] and never rolls the
/// transition back.
pub struct MarketApplicationService<R, N, P> {
    repository: Arc<R>,
    notifier: Arc<N>,
    pricing: Arc<P>,
}

/// Outcome of an applied transition, reporting "state changed" separately
/// from "notification sent" so an admin can retry delivery on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionReport {
    pub id: ApplicationId,
    pub from: &'static str,
    pub to: &'static str,
    pub notification: NotificationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum NotificationStatus {
    NotRequired,
    Sent,
    Failed(String),
}

impl<R, N, P> MarketApplicationService<R, N, P>
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, pricing: Arc<P>) -> Self {
        Self {
            repository,
            notifier,
            pricing,
        }
    }

    /// Apply a lifecycle event to a stored application.
    pub fn apply(
        &self,
        id: &ApplicationId,
        event: LifecycleEvent,
    ) -> Result<TransitionReport, ApplicationServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let from = record.status;
        let decision = lifecycle::decide(record.status, &event)?;

        record.status = decision.next_status;
        match &decision.intent {
            Some(NotificationIntent::Rejection { justification }) => {
                record.rejection_justification = Some(justification.clone());
            }
            Some(NotificationIntent::FinalConfirmation) => {
                if let LifecycleEvent::SubmitDetails { details } = &event {
                    record.stand_details = Some(details.clone());
                }
            }
            _ => {}
        }

        // Commit first; dispatch is a best-effort side channel.
        self.repository.update(record.clone())?;
        info!(id = %record.id.0, from = from.label(), to = record.status.label(), "transition applied");

        let notification = match decision.intent {
            None => NotificationStatus::NotRequired,
            Some(intent) => self.dispatch(&record, &intent),
        };

        Ok(TransitionReport {
            id: record.id,
            from: from.label(),
            to: decision.next_status.label(),
            notification,
        })
    }

    /// Retry the notification implied by the record's current status without
    /// re-running any transition.
    ///
    /// The personal message that may accompany an acceptance is not persisted,
    /// so a resent acceptance goes out without one; the stored rejection
    /// justification is reused as-is.
    pub fn resend_notification(
        &self,
        id: &ApplicationId,
    ) -> Result<TransitionReport, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let intent = match record.status {
            ApplicationStatus::Accepted => NotificationIntent::Acceptance { message: None },
            ApplicationStatus::Rejected => NotificationIntent::Rejection {
                justification: record.rejection_justification.clone().unwrap_or_default(),
            },
            ApplicationStatus::DetailsSubmitted | ApplicationStatus::Validated => {
                NotificationIntent::FinalConfirmation
            }
            ApplicationStatus::Pending => {
                return Err(LifecycleError::InvalidTransition {
                    from: record.status.label(),
                    event: "resend_notification",
                }
                .into())
            }
        };

        let notification = self.dispatch(&record, &intent);
        let status = record.status.label();
        Ok(TransitionReport {
            id: record.id,
            from: status,
            to: status,
            notification,
        })
    }

    pub fn get(&self, id: &ApplicationId) -> Result<VendorApplication, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<VendorApplication>, ApplicationServiceError> {
        Ok(self.repository.list()?)
    }

    /// Dashboard statistics for the selected edition (or the active one).
    pub fn stats(
        &self,
        selected_year: Option<i32>,
    ) -> Result<EditionStats, ApplicationServiceError> {
        let records = self.repository.list()?;
        let configs = self.pricing.configs()?;
        let config = resolve_config(&configs, selected_year);
        Ok(aggregate(&records, &config))
    }

    fn active_config(&self) -> PriceConfig {
        match self.pricing.configs() {
            Ok(configs) => resolve_config(&configs, None),
            Err(err) => {
                warn!(error = %err, "price configs unavailable, using built-in default");
                PriceConfig::builtin_default()
            }
        }
    }

    fn dispatch(
        &self,
        record: &VendorApplication,
        intent: &NotificationIntent,
    ) -> NotificationStatus {
        let config = self.active_config();
        let report = match intent {
            NotificationIntent::Acceptance { message } => {
                self.notifier
                    .send_acceptance(record, message.as_deref(), &config)
            }
            NotificationIntent::Rejection { justification } => {
                self.notifier.send_rejection(record, justification, &config)
            }
            NotificationIntent::FinalConfirmation => match &record.stand_details {
                Some(details) => self.notifier.send_final_confirmation(record, details, &config),
                // Unreachable under the status invariant; treat as a delivery
                // failure rather than panicking on a corrupt record.
                None => DeliveryReport::Failed("record has no stand details".to_string()),
            },
        };

        match report {
            DeliveryReport::Sent => NotificationStatus::Sent,
            DeliveryReport::Failed(reason) => {
                warn!(id = %record.id.0, %reason, "notification delivery failed");
                NotificationStatus::Failed(reason)
            }
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
