use crate::cli::ServeArgs;
use crate::infra::{
    default_price_configs, sample_applications, AppState, EditionConfigStore,
    InMemoryApplicationRepository, LoggingNotifier,
};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use stand_ops::config::{AppConfig, AppEnvironment};
use stand_ops::error::AppError;
use stand_ops::market::applications::{ApplicationRepository, MarketApplicationService};
use stand_ops::market::geocode::NominatimGeocoder;
use stand_ops::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let pricing = Arc::new(EditionConfigStore::seeded(default_price_configs()));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        pricing: pricing.clone(),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    if config.environment == AppEnvironment::Development {
        for record in sample_applications() {
            repository.insert(record).ok();
        }
    }

    let notifier = Arc::new(LoggingNotifier);
    let application_service = Arc::new(MarketApplicationService::new(
        repository,
        notifier,
        pricing,
    ));
    let geocoder = Arc::new(NominatimGeocoder::new(config.geocoder.base_url.clone())?);

    let app = with_application_routes(application_service, geocoder, config.geocoder.pace)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "stand service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
