use crate::cli::ServeArgs;
use crate::infra::{demo_catalog, AppState};
use crate::routes::with_comparison_routes;
use appscope::config::AppConfig;
use appscope::error::AppError;
use appscope::telemetry;
use appscope::workflows::comparison::{
    AttributeCatalog, ComparisonService, CsvCatalog, ScoringConfig,
};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    match config.catalog.path.take() {
        Some(path) => {
            info!(path = %path.display(), "loading CSV catalog");
            let catalog = Arc::new(CsvCatalog::from_path(&path)?);
            info!(apps = catalog.len(), "catalog ready");
            serve(catalog, config).await
        }
        None => {
            info!("no APP_CATALOG_PATH configured, using the bundled demo catalog");
            serve(Arc::new(demo_catalog()), config).await
        }
    }
}

async fn serve<C>(catalog: Arc<C>, config: AppConfig) -> Result<(), AppError>
where
    C: AttributeCatalog + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(ComparisonService::new(catalog, ScoringConfig::default()));

    let app = with_comparison_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "app comparison service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
