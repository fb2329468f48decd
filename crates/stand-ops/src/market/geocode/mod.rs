//! Paced geocoding pipeline for the stand map.
//!
//! The upstream service tolerates roughly one request per second, so the
//! batch processor serializes lookups on a single spawned task and sleeps a
//! fixed pace before every attempt after the first. Results flow through a
//! bounded channel: the consumer sees each resolved stand as soon as it is
//! available, and dropping the stream abandons whatever is left of the batch.

mod client;

pub use client::NominatimGeocoder;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::applications::domain::{ApplicationId, VendorApplication};

/// Default pace between consecutive lookups.
pub const DEFAULT_PACE: Duration = Duration::from_secs(1);

/// One candidate position returned by the upstream service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoMatch {
    pub latitude: f64,
    pub longitude: f64,
}

/// An application resolved to map coordinates. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub application_id: ApplicationId,
    pub company: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoder transport error: {0}")]
    Transport(String),
    #[error("malformed geocoder response: {0}")]
    Malformed(String),
}

/// Network seam for the upstream geocoding service.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Vec<GeoMatch>, GeocodeError>;
}

/// Incremental results of one batch. Dropping the stream cancels the
/// remaining lookups; no guarantee is owed for abandoned records.
pub struct GeocodeStream {
    rx: mpsc::Receiver<GeocodeResult>,
}

impl GeocodeStream {
    /// Next resolved stand, or `None` once the batch is exhausted.
    pub async fn recv(&mut self) -> Option<GeocodeResult> {
        self.rx.recv().await
    }

    /// Drain the whole batch. Mostly useful in tests and the CLI demo; the
    /// dashboard consumes results one at a time to render a partial map.
    pub async fn collect(mut self) -> Vec<GeocodeResult> {
        let mut results = Vec::new();
        while let Some(result) = self.rx.recv().await {
            results.push(result);
        }
        results
    }
}

/// Query string for one record: street, postal code, city. `None` when the
/// city is missing, since the upstream cannot resolve anything useful then.
pub fn query_string(record: &VendorApplication) -> Option<String> {
    let city = record.address.city.trim();
    if city.is_empty() {
        return None;
    }

    let mut parts = Vec::with_capacity(3);
    let street = record.address.street.trim();
    if !street.is_empty() {
        parts.push(street);
    }
    let postal_code = record.address.postal_code.trim();
    if !postal_code.is_empty() {
        parts.push(postal_code);
    }
    parts.push(city);
    Some(parts.join(", "))
}

/// Resolve a batch of records, one paced lookup at a time.
///
/// Failures are logged and skipped; they consume a pace slot but never abort
/// the batch. Records without a city are skipped without consuming one.
pub fn geocode_batch<G>(
    geocoder: Arc<G>,
    records: Vec<VendorApplication>,
    pace: Duration,
) -> GeocodeStream
where
    G: Geocoder + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut attempted = false;
        for record in records {
            if tx.is_closed() {
                debug!("geocode batch abandoned by consumer");
                return;
            }

            let Some(query) = query_string(&record) else {
                debug!(id = %record.id.0, "skipping record without city");
                continue;
            };

            if attempted {
                tokio::time::sleep(pace).await;
            }
            attempted = true;

            match geocoder.lookup(&query).await {
                Ok(matches) => match matches.first() {
                    Some(position) => {
                        let result = GeocodeResult {
                            application_id: record.id.clone(),
                            company: record.company.clone(),
                            latitude: position.latitude,
                            longitude: position.longitude,
                        };
                        if tx.send(result).await.is_err() {
                            return;
                        }
                    }
                    None => debug!(id = %record.id.0, query, "no geocoder match"),
                },
                Err(error) => {
                    warn!(id = %record.id.0, %error, "geocoder lookup failed, skipping record")
                }
            }
        }
    });

    GeocodeStream { rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::applications::domain::{
        ApplicationStatus, PostalAddress, TableTier, VendorApplication,
    };
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    fn record(id: &str, city: &str) -> VendorApplication {
        VendorApplication {
            id: ApplicationId(id.to_string()),
            contact_name: "Lea Blanc".to_string(),
            email: "lea@honey.example".to_string(),
            phone: None,
            company: "Ruchers Blanc".to_string(),
            products: "Honey and candles".to_string(),
            address: PostalAddress {
                street: "3 chemin des Abeilles".to_string(),
                postal_code: "69210".to_string(),
                city: city.to_string(),
            },
            formally_registered: true,
            requested_tables: TableTier::SingleTable,
            status: ApplicationStatus::Validated,
            rejection_justification: None,
            created_at: Utc::now(),
            stand_details: None,
        }
    }

    /// Scripted geocoder: one outcome per call, in order.
    struct ScriptedGeocoder {
        outcomes: Vec<Result<Vec<GeoMatch>, ()>>,
        calls: AtomicUsize,
    }

    impl ScriptedGeocoder {
        fn new(outcomes: Vec<Result<Vec<GeoMatch>, ()>>) -> Self {
            Self {
                outcomes,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        async fn lookup(&self, _query: &str) -> Result<Vec<GeoMatch>, GeocodeError> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcomes.get(index) {
                Some(Ok(matches)) => Ok(matches.clone()),
                Some(Err(())) => Err(GeocodeError::Transport("connection reset".to_string())),
                None => Ok(Vec::new()),
            }
        }
    }

    fn hit(latitude: f64, longitude: f64) -> Vec<GeoMatch> {
        vec![GeoMatch {
            latitude,
            longitude,
        }]
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_is_skipped_but_keeps_its_pace_slot() {
        let geocoder = Arc::new(ScriptedGeocoder::new(vec![
            Ok(hit(45.76, 4.83)),
            Err(()),
            Ok(hit(45.77, 4.85)),
        ]));
        let records = vec![
            record("app-1", "Lyon"),
            record("app-2", "Villeurbanne"),
            record("app-3", "Caluire"),
        ];

        let started = Instant::now();
        let results = geocode_batch(geocoder.clone(), records, DEFAULT_PACE)
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].application_id, ApplicationId("app-1".to_string()));
        assert_eq!(results[1].application_id, ApplicationId("app-3".to_string()));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 3);
        // One pace before the failed attempt, one before the third.
        assert!(started.elapsed() >= DEFAULT_PACE * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn records_without_city_skip_the_pace_slot() {
        let geocoder = Arc::new(ScriptedGeocoder::new(vec![
            Ok(hit(45.76, 4.83)),
            Ok(hit(45.77, 4.85)),
        ]));
        let records = vec![
            record("app-1", "Lyon"),
            record("app-2", "  "),
            record("app-3", "Caluire"),
        ];

        let started = Instant::now();
        let results = geocode_batch(geocoder.clone(), records, DEFAULT_PACE)
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
        // Only one real gap: between the first and the third record.
        assert!(started.elapsed() >= DEFAULT_PACE);
        assert!(started.elapsed() < DEFAULT_PACE * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn results_arrive_incrementally() {
        let geocoder = Arc::new(ScriptedGeocoder::new(vec![
            Ok(hit(45.76, 4.83)),
            Ok(hit(45.77, 4.85)),
        ]));
        let records = vec![record("app-1", "Lyon"), record("app-2", "Caluire")];

        let started = Instant::now();
        let mut stream = geocode_batch(geocoder, records, DEFAULT_PACE);

        let first = stream.recv().await.expect("first result");
        assert_eq!(first.application_id, ApplicationId("app-1".to_string()));
        assert!(started.elapsed() < DEFAULT_PACE);

        let second = stream.recv().await.expect("second result");
        assert_eq!(second.application_id, ApplicationId("app-2".to_string()));
        assert!(started.elapsed() >= DEFAULT_PACE);

        assert!(stream.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_stream_abandons_the_batch() {
        let geocoder = Arc::new(ScriptedGeocoder::new(vec![
            Ok(hit(45.76, 4.83)),
            Ok(hit(45.77, 4.85)),
            Ok(hit(45.78, 4.86)),
        ]));
        let records = vec![
            record("app-1", "Lyon"),
            record("app-2", "Caluire"),
            record("app-3", "Oullins"),
        ];

        let mut stream = geocode_batch(geocoder.clone(), records, DEFAULT_PACE);
        stream.recv().await.expect("first result");
        drop(stream);

        // Give the abandoned task time to notice and stop.
        tokio::time::sleep(DEFAULT_PACE * 10).await;
        assert!(geocoder.calls.load(Ordering::SeqCst) < 3);
    }

    #[test]
    fn query_string_joins_non_empty_address_parts() {
        let full = record("app-1", "Lyon");
        assert_eq!(
            query_string(&full).as_deref(),
            Some("3 chemin des Abeilles, 69210, Lyon")
        );

        let mut bare = record("app-2", "Lyon");
        bare.address.street = String::new();
        bare.address.postal_code = String::new();
        assert_eq!(query_string(&bare).as_deref(), Some("Lyon"));

        let missing = record("app-3", "");
        assert!(query_string(&missing).is_none());
    }
}
