use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::market::applications::domain::{
    ApplicationId, ApplicationStatus, PostalAddress, StandDetails, TableTier, VendorApplication,
};
use crate::market::applications::repository::{
    ApplicationRepository, DeliveryReport, NotificationSender, PriceConfigSource, RepositoryError,
};
use crate::market::applications::{application_router, MarketApplicationService};
use crate::market::pricing::PriceConfig;

pub(super) fn price_config() -> PriceConfig {
    PriceConfig {
        year: 2026,
        label: "Edition 2026".to_string(),
        price_single_table: 40,
        price_double_table: 60,
        price_meal: 8,
        price_electricity: 1,
        is_current: true,
        notify_email: "committee@marche.example".to_string(),
    }
}

pub(super) fn application(id: &str, status: ApplicationStatus) -> VendorApplication {
    let details = status.has_details().then(details);
    VendorApplication {
        id: ApplicationId(id.to_string()),
        contact_name: "Ana Ruiz".to_string(),
        email: "ana@ceramics.example".to_string(),
        phone: Some("+33 6 11 22 33 44".to_string()),
        company: "Atelier Ruiz".to_string(),
        products: "Hand-thrown ceramics".to_string(),
        address: PostalAddress {
            street: "12 rue des Lilas".to_string(),
            postal_code: "69003".to_string(),
            city: "Lyon".to_string(),
        },
        formally_registered: true,
        requested_tables: TableTier::DoubleTable,
        status,
        rejection_justification: (status == ApplicationStatus::Rejected)
            .then(|| "products too similar".to_string()),
        created_at: Utc::now(),
        stand_details: details,
    }
}

pub(super) fn details() -> StandDetails {
    StandDetails {
        tax_id: Some("FR-41-123".to_string()),
        id_document_key: Some("docs/app-1/id.jpg".to_string()),
        needs_electricity: true,
        sunday_lunch_count: 3,
        tombola_participation: true,
        tombola_lot: Some("A small teapot".to_string()),
        insurance_company: "MAIF".to_string(),
        insurance_policy: "POL-8891".to_string(),
        accepts_rules: true,
        certifies_insurance: true,
        comments: None,
        submitted_at: Utc::now(),
    }
}

pub(super) type TestService =
    MarketApplicationService<MemoryRepository, RecordingNotifier, StaticPricing>;

pub(super) fn build_service() -> (
    Arc<TestService>,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let pricing = Arc::new(StaticPricing(vec![price_config()]));
    let service = Arc::new(MarketApplicationService::new(
        repository.clone(),
        notifier.clone(),
        pricing,
    ));
    (service, repository, notifier)
}

pub(super) fn build_failing_service() -> (Arc<TestService>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(RecordingNotifier::failing("smtp timeout"));
    let pricing = Arc::new(StaticPricing(vec![price_config()]));
    let service = Arc::new(MarketApplicationService::new(
        repository.clone(),
        notifier,
        pricing,
    ));
    (service, repository)
}

pub(super) fn seeded(
    status: ApplicationStatus,
) -> (
    Arc<TestService>,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
    ApplicationId,
) {
    let (service, repository, notifier) = build_service();
    let record = application("app-000001", status);
    let id = record.id.clone();
    repository.insert(record).expect("seed record");
    (service, repository, notifier, id)
}

pub(super) fn router_with(service: Arc<TestService>) -> axum::Router {
    application_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, VendorApplication>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: VendorApplication) -> Result<VendorApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: VendorApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<VendorApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<VendorApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// What the recording notifier saw, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum SentMail {
    Acceptance {
        id: ApplicationId,
        message: Option<String>,
    },
    Rejection {
        id: ApplicationId,
        justification: String,
    },
    FinalConfirmation {
        id: ApplicationId,
        total_meals: u32,
    },
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    mails: Mutex<Vec<SentMail>>,
    failure: Option<String>,
}

impl RecordingNotifier {
    pub(super) fn failing(reason: &str) -> Self {
        Self {
            mails: Mutex::new(Vec::new()),
            failure: Some(reason.to_string()),
        }
    }

    pub(super) fn mails(&self) -> Vec<SentMail> {
        self.mails.lock().expect("notifier mutex poisoned").clone()
    }

    fn record(&self, mail: SentMail) -> DeliveryReport {
        self.mails
            .lock()
            .expect("notifier mutex poisoned")
            .push(mail);
        match &self.failure {
            Some(reason) => DeliveryReport::Failed(reason.clone()),
            None => DeliveryReport::Sent,
        }
    }
}

impl NotificationSender for RecordingNotifier {
    fn send_acceptance(
        &self,
        record: &VendorApplication,
        message: Option<&str>,
        _config: &PriceConfig,
    ) -> DeliveryReport {
        self.record(SentMail::Acceptance {
            id: record.id.clone(),
            message: message.map(str::to_string),
        })
    }

    fn send_rejection(
        &self,
        record: &VendorApplication,
        justification: &str,
        _config: &PriceConfig,
    ) -> DeliveryReport {
        self.record(SentMail::Rejection {
            id: record.id.clone(),
            justification: justification.to_string(),
        })
    }

    fn send_final_confirmation(
        &self,
        record: &VendorApplication,
        details: &StandDetails,
        _config: &PriceConfig,
    ) -> DeliveryReport {
        self.record(SentMail::FinalConfirmation {
            id: record.id.clone(),
            total_meals: details.sunday_lunch_count,
        })
    }
}

pub(super) struct StaticPricing(pub(super) Vec<PriceConfig>);

impl PriceConfigSource for StaticPricing {
    fn configs(&self) -> Result<Vec<PriceConfig>, RepositoryError> {
        Ok(self.0.clone())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: VendorApplication) -> Result<VendorApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: VendorApplication) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<VendorApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<VendorApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
