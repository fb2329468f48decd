use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use stand_ops::market::applications::{
    ApplicationId, ApplicationRepository, ApplicationStatus, DeliveryReport, NotificationSender,
    PostalAddress, PriceConfigSource, RepositoryError, StandDetails, TableTier, VendorApplication,
};
use stand_ops::market::pricing::PriceConfig;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) pricing: Arc<EditionConfigStore>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, VendorApplication>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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

/// Notifier used by the serve and demo commands: mail transport is out of
/// scope here, so deliveries are logged and reported as sent. A real mailer
/// plugs in behind the same trait.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotifier;

impl NotificationSender for LoggingNotifier {
    fn send_acceptance(
        &self,
        record: &VendorApplication,
        message: Option<&str>,
        config: &PriceConfig,
    ) -> DeliveryReport {
        info!(
            id = %record.id.0,
            to = %record.email,
            from = %config.notify_email,
            personal_message = message.is_some(),
            "acceptance notification"
        );
        DeliveryReport::Sent
    }

    fn send_rejection(
        &self,
        record: &VendorApplication,
        justification: &str,
        config: &PriceConfig,
    ) -> DeliveryReport {
        info!(
            id = %record.id.0,
            to = %record.email,
            from = %config.notify_email,
            justification,
            "rejection notification"
        );
        DeliveryReport::Sent
    }

    fn send_final_confirmation(
        &self,
        record: &VendorApplication,
        details: &StandDetails,
        config: &PriceConfig,
    ) -> DeliveryReport {
        info!(
            id = %record.id.0,
            to = %record.email,
            from = %config.notify_email,
            lunches = details.sunday_lunch_count,
            "final confirmation notification"
        );
        DeliveryReport::Sent
    }
}

/// Mutable store for per-edition price configurations. One entry per year;
/// upserting replaces the matching year wholesale.
#[derive(Default)]
pub(crate) struct EditionConfigStore {
    configs: Mutex<Vec<PriceConfig>>,
}

impl EditionConfigStore {
    pub(crate) fn seeded(configs: Vec<PriceConfig>) -> Self {
        Self {
            configs: Mutex::new(configs),
        }
    }

    pub(crate) fn upsert(&self, config: PriceConfig) {
        let mut guard = self.configs.lock().expect("pricing mutex poisoned");
        if config.is_current {
            for existing in guard.iter_mut() {
                existing.is_current = false;
            }
        }
        match guard.iter_mut().find(|existing| existing.year == config.year) {
            Some(existing) => *existing = config,
            None => guard.push(config),
        }
    }
}

impl PriceConfigSource for EditionConfigStore {
    fn configs(&self) -> Result<Vec<PriceConfig>, RepositoryError> {
        Ok(self.configs.lock().expect("pricing mutex poisoned").clone())
    }
}

pub(crate) fn default_price_configs() -> Vec<PriceConfig> {
    vec![PriceConfig {
        year: 2026,
        label: "Edition 2026".to_string(),
        price_single_table: 40,
        price_double_table: 60,
        price_meal: 8,
        price_electricity: 1,
        is_current: true,
        notify_email: "committee@marche.example".to_string(),
    }]
}

/// A handful of records so a development server has something on the
/// dashboard; the public submission form lives in another system.
pub(crate) fn sample_applications() -> Vec<VendorApplication> {
    let vendors = [
        (
            "app-000001",
            "Atelier Ruiz",
            "Hand-thrown ceramics",
            "12 rue des Lilas",
            "69003",
            "Lyon",
            TableTier::DoubleTable,
        ),
        (
            "app-000002",
            "Ruchers Blanc",
            "Honey and beeswax candles",
            "3 chemin des Abeilles",
            "69210",
            "Villeurbanne",
            TableTier::SingleTable,
        ),
        (
            "app-000003",
            "Bois & Co",
            "Carved wooden toys",
            "4 place du Marche",
            "69001",
            "Lyon",
            TableTier::SingleTable,
        ),
    ];

    vendors
        .into_iter()
        .map(
            |(id, company, products, street, postal_code, city, tables)| VendorApplication {
                id: ApplicationId(id.to_string()),
                contact_name: "Demo Contact".to_string(),
                email: format!("{}@example.org", id),
                phone: None,
                company: company.to_string(),
                products: products.to_string(),
                address: PostalAddress {
                    street: street.to_string(),
                    postal_code: postal_code.to_string(),
                    city: city.to_string(),
                },
                formally_registered: true,
                requested_tables: tables,
                status: ApplicationStatus::Pending,
                rejection_justification: None,
                created_at: Utc::now(),
                stand_details: None,
            },
        )
        .collect()
}
