use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for vendor applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Discrete stand capacity an applicant can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableTier {
    SingleTable,
    DoubleTable,
}

impl TableTier {
    pub const fn label(self) -> &'static str {
        match self {
            TableTier::SingleTable => "single_table",
            TableTier::DoubleTable => "double_table",
        }
    }
}

/// Postal address captured at submission; feeds billing letters and the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub postal_code: String,
    pub city: String,
}

/// High level status tracked throughout the application lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    DetailsSubmitted,
    Validated,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::DetailsSubmitted => "details_submitted",
            ApplicationStatus::Validated => "validated",
        }
    }

    /// Whether the logistics declaration has been received for this status.
    pub const fn has_details(self) -> bool {
        matches!(
            self,
            ApplicationStatus::DetailsSubmitted | ApplicationStatus::Validated
        )
    }
}

/// Logistics and payment declaration submitted once an application is accepted.
///
/// Overwritten wholesale on re-submission; never edited field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandDetails {
    pub tax_id: Option<String>,
    pub id_document_key: Option<String>,
    pub needs_electricity: bool,
    pub sunday_lunch_count: u32,
    pub tombola_participation: bool,
    pub tombola_lot: Option<String>,
    pub insurance_company: String,
    pub insurance_policy: String,
    pub accepts_rules: bool,
    pub certifies_insurance: bool,
    pub comments: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl StandDetails {
    /// Caterer cap on Sunday lunches per stand.
    pub const MAX_SUNDAY_LUNCHES: u32 = 20;

    /// Boundary validation applied before the declaration reaches the state
    /// machine; billing assumes well-formed details afterwards.
    pub fn validate(&self) -> Result<(), DetailsValidationError> {
        if !self.accepts_rules {
            return Err(DetailsValidationError::RulesNotAccepted);
        }
        if !self.certifies_insurance {
            return Err(DetailsValidationError::InsuranceNotCertified);
        }
        if self.sunday_lunch_count > Self::MAX_SUNDAY_LUNCHES {
            return Err(DetailsValidationError::TooManyLunches {
                requested: self.sunday_lunch_count,
            });
        }
        if self.tombola_participation && self.insurance_company.trim().is_empty() {
            return Err(DetailsValidationError::MissingInsurer);
        }
        Ok(())
    }
}

/// Why a logistics declaration was refused at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetailsValidationError {
    #[error("the market rules must be accepted")]
    RulesNotAccepted,
    #[error("liability insurance must be certified")]
    InsuranceNotCertified,
    #[error("at most {max} Sunday lunches per stand, {requested} requested", max = StandDetails::MAX_SUNDAY_LUNCHES)]
    TooManyLunches { requested: u32 },
    #[error("insurance company is required")]
    MissingInsurer,
}

/// Payload accepted from the logistics form; stamped on conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct StandDetailsForm {
    pub tax_id: Option<String>,
    pub id_document_key: Option<String>,
    #[serde(default)]
    pub needs_electricity: bool,
    #[serde(default)]
    pub sunday_lunch_count: u32,
    #[serde(default)]
    pub tombola_participation: bool,
    pub tombola_lot: Option<String>,
    pub insurance_company: String,
    pub insurance_policy: String,
    pub accepts_rules: bool,
    pub certifies_insurance: bool,
    pub comments: Option<String>,
}

impl StandDetailsForm {
    pub fn into_details(self) -> StandDetails {
        StandDetails {
            tax_id: self.tax_id,
            id_document_key: self.id_document_key,
            needs_electricity: self.needs_electricity,
            sunday_lunch_count: self.sunday_lunch_count,
            tombola_participation: self.tombola_participation,
            tombola_lot: self.tombola_lot,
            insurance_company: self.insurance_company,
            insurance_policy: self.insurance_policy,
            accepts_rules: self.accepts_rules,
            certifies_insurance: self.certifies_insurance,
            comments: self.comments,
            submitted_at: Utc::now(),
        }
    }
}

/// One vendor submission for the current edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorApplication {
    pub id: ApplicationId,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: String,
    pub products: String,
    pub address: PostalAddress,
    pub formally_registered: bool,
    pub requested_tables: TableTier,
    pub status: ApplicationStatus,
    pub rejection_justification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub stand_details: Option<StandDetails>,
}

impl VendorApplication {
    /// Sunday lunches declared on the logistics form, zero until it arrives.
    pub fn meal_count(&self) -> u32 {
        self.stand_details
            .as_ref()
            .map(|details| details.sunday_lunch_count)
            .unwrap_or(0)
    }

    pub fn needs_electricity(&self) -> bool {
        self.stand_details
            .as_ref()
            .map(|details| details.needs_electricity)
            .unwrap_or(false)
    }

    pub fn status_view(&self) -> ApplicationView {
        ApplicationView {
            id: self.id.clone(),
            company: self.company.clone(),
            city: self.address.city.clone(),
            requested_tables: self.requested_tables.label(),
            status: self.status.label(),
            has_details: self.stand_details.is_some(),
            rejection_justification: self.rejection_justification.clone(),
            created_at: self.created_at,
        }
    }
}

/// Sanitized representation of an application exposed to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub company: String,
    pub city: String,
    pub requested_tables: &'static str,
    pub status: &'static str,
    pub has_details: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_justification: Option<String>,
    pub created_at: DateTime<Utc>,
}
