//! Scripted walk through the application lifecycle for stakeholder demos:
//! accept, collect the declaration, validate, reject, aggregate, then geocode
//! the confirmed stands for the map.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde_json::json;
use stand_ops::error::AppError;
use stand_ops::market::applications::{
    ApplicationId, ApplicationRepository, ApplicationServiceError, LifecycleEvent,
    MarketApplicationService, StandDetails, VendorApplication,
};
use stand_ops::market::geocode::{geocode_batch, GeoMatch, GeocodeError, Geocoder};

use crate::infra::{
    default_price_configs, sample_applications, EditionConfigStore, InMemoryApplicationRepository,
    LoggingNotifier,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pace between geocoding lookups, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub(crate) pace_ms: u64,
}

/// Offline stand-in for the geocoding service so the demo needs no network.
struct CannedGeocoder;

#[async_trait::async_trait]
impl Geocoder for CannedGeocoder {
    async fn lookup(&self, query: &str) -> Result<Vec<GeoMatch>, GeocodeError> {
        // Nudge each stand off the city center so markers do not overlap.
        let offset = query.len() as f64 * 0.0003;
        Ok(vec![GeoMatch {
            latitude: 45.7578 + offset,
            longitude: 4.8320 - offset,
        }])
    }
}

/// Same selection as the map endpoint: only stands with a submitted
/// declaration appear on the map.
fn confirmed_stands(records: Vec<VendorApplication>) -> Vec<VendorApplication> {
    records
        .into_iter()
        .filter(|record| record.status.has_details())
        .collect()
}

fn declaration(lunches: u32, electricity: bool) -> StandDetails {
    StandDetails {
        tax_id: Some("FR-41-123".to_string()),
        id_document_key: None,
        needs_electricity: electricity,
        sunday_lunch_count: lunches,
        tombola_participation: true,
        tombola_lot: Some("A jar of honey".to_string()),
        insurance_company: "MAIF".to_string(),
        insurance_policy: "POL-8891".to_string(),
        accepts_rules: true,
        certifies_insurance: true,
        comments: None,
        submitted_at: chrono::Utc::now(),
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let pricing = Arc::new(EditionConfigStore::seeded(default_price_configs()));
    let service = MarketApplicationService::new(
        repository.clone(),
        Arc::new(LoggingNotifier),
        pricing,
    );

    for record in sample_applications() {
        repository
            .insert(record)
            .map_err(ApplicationServiceError::from)?;
    }

    let first = ApplicationId("app-000001".to_string());
    let second = ApplicationId("app-000002".to_string());
    let third = ApplicationId("app-000003".to_string());

    let accepted = service.apply(
        &first,
        LifecycleEvent::Accept {
            message: Some("Welcome back for this edition".to_string()),
        },
    )?;
    println!("{}", json!({ "step": "accept", "report": accepted }));

    let detailed = service.apply(
        &first,
        LifecycleEvent::SubmitDetails {
            details: declaration(3, true),
        },
    )?;
    println!("{}", json!({ "step": "details", "report": detailed }));

    let validated = service.apply(&first, LifecycleEvent::Validate)?;
    println!("{}", json!({ "step": "validate", "report": validated }));

    let accepted = service.apply(&second, LifecycleEvent::Accept { message: None })?;
    println!("{}", json!({ "step": "accept", "report": accepted }));

    let rejected = service.apply(
        &third,
        LifecycleEvent::Reject {
            justification: "several confirmed stands already sell carved toys".to_string(),
        },
    )?;
    println!("{}", json!({ "step": "reject", "report": rejected }));

    let stats = service.stats(None)?;
    println!("{}", json!({ "step": "stats", "edition": stats }));

    let records = confirmed_stands(service.list()?);
    let mut stream = geocode_batch(
        Arc::new(CannedGeocoder),
        records,
        Duration::from_millis(args.pace_ms),
    );
    while let Some(point) = stream.recv().await {
        println!("{}", json!({ "step": "map", "point": point }));
    }

    Ok(())
}
