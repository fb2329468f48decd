//! Pure transition decisions for the application lifecycle.
//!
//! `decide` answers three questions with zero I/O: is the event legal from the
//! current status, what is the next status, and which notification should go
//! out. The service layer persists the new status first and performs the
//! dispatch afterwards, so these rules stay unit-testable in isolation.

use super::domain::{ApplicationStatus, StandDetails};

/// Admin- or applicant-driven event applied to an application.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// Committee accepts the application, optionally with a personal message.
    Accept { message: Option<String> },
    /// Committee rejects the application; the justification is persisted.
    Reject { justification: String },
    /// Applicant returns the logistics/payment declaration.
    SubmitDetails { details: StandDetails },
    /// Committee confirms a complete declaration; end of the happy path.
    Validate,
}

impl LifecycleEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Accept { .. } => "accept",
            LifecycleEvent::Reject { .. } => "reject",
            LifecycleEvent::SubmitDetails { .. } => "submit_details",
            LifecycleEvent::Validate => "validate",
        }
    }
}

/// Side-effect request produced by a legal transition; executed by the
/// service layer, never by the state machine itself.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationIntent {
    Acceptance { message: Option<String> },
    Rejection { justification: String },
    FinalConfirmation,
}

/// Outcome of a legal transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDecision {
    pub next_status: ApplicationStatus,
    pub intent: Option<NotificationIntent>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error("event '{event}' is not legal from status '{from}'")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

/// Decide whether `event` may be applied to an application in `status`.
///
/// Re-submitting the declaration from `details_submitted` is legal and
/// overwrites the previous form; `validated` and `rejected` are terminal.
/// A justification that is empty after trimming is refused as invalid input.
pub fn decide(
    status: ApplicationStatus,
    event: &LifecycleEvent,
) -> Result<TransitionDecision, LifecycleError> {
    match (status, event) {
        (ApplicationStatus::Pending, LifecycleEvent::Accept { message }) => {
            Ok(TransitionDecision {
                next_status: ApplicationStatus::Accepted,
                intent: Some(NotificationIntent::Acceptance {
                    message: message.clone(),
                }),
            })
        }
        (ApplicationStatus::Pending, LifecycleEvent::Reject { justification }) => {
            let justification = justification.trim();
            if justification.is_empty() {
                return Err(LifecycleError::InvalidInput {
                    reason: "rejection justification must not be empty".to_string(),
                });
            }
            Ok(TransitionDecision {
                next_status: ApplicationStatus::Rejected,
                intent: Some(NotificationIntent::Rejection {
                    justification: justification.to_string(),
                }),
            })
        }
        (
            ApplicationStatus::Accepted | ApplicationStatus::DetailsSubmitted,
            LifecycleEvent::SubmitDetails { details },
        ) => {
            details
                .validate()
                .map_err(|source| LifecycleError::InvalidInput {
                    reason: source.to_string(),
                })?;
            Ok(TransitionDecision {
                next_status: ApplicationStatus::DetailsSubmitted,
                intent: Some(NotificationIntent::FinalConfirmation),
            })
        }
        (ApplicationStatus::DetailsSubmitted, LifecycleEvent::Validate) => Ok(TransitionDecision {
            next_status: ApplicationStatus::Validated,
            intent: None,
        }),
        (from, event) => Err(LifecycleError::InvalidTransition {
            from: from.label(),
            event: event.name(),
        }),
    }
}
