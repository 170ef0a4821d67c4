//! Anomaly enrichment engine for municipal service requests.
//!
//! Runs the daily enrichment job: newly closed service requests are scored
//! by the external model service and the verdicts upserted for the
//! dashboard to join against. The HTTP surface here is health probes only;
//! the dashboard API is a separate service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tokio::signal;
use tracing::{error, info};

use model_client::{HttpPredictionClient, MockPredictionClient, ModelConfig, PredictionClient};
use postgres_store::{
    PgAnomalyStore, PgCheckpointStore, PgRequestSource, PostgresClient, PostgresConfig,
};
use telemetry::{health, init_tracing_from_env, metrics, MetricsSnapshot};
use worker::{EnrichmentPipeline, JobScheduler, SchedulerConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    postgres: PostgresConfig,

    #[serde(default)]
    model: ModelConfig,

    #[serde(default)]
    job: SchedulerConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            postgres: PostgresConfig::default(),
            model: ModelConfig::default(),
            job: SchedulerConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider BEFORE any TLS operations
    // rustls 0.23+ requires explicit crypto provider selection
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting Anomaly Enrichment Engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    info!(
        time_spec = %config.job.time_spec,
        timezone = %config.job.timezone,
        page_size = config.job.page_size,
        mocked_model = config.model.mocked,
        "Loaded job config"
    );

    // Connect Postgres
    let postgres = PostgresClient::connect(config.postgres.clone())
        .await
        .context("Failed to connect to Postgres")?;

    // Provision service-owned tables and the checkpoint row
    if let Err(e) = postgres_store::health::init_schema(&postgres).await {
        error!("Failed to initialize Postgres schema: {}", e);
        // Continue anyway - schema might already exist
    }

    // Check health and update status
    check_health(&config, &postgres).await;

    // Wire the pipeline
    let model: Arc<dyn PredictionClient> = if config.model.mocked {
        info!("Using mocked prediction client");
        Arc::new(MockPredictionClient::new())
    } else {
        Arc::new(
            HttpPredictionClient::new(config.model.clone())
                .context("Failed to create prediction client")?,
        )
    };

    let pipeline = Arc::new(
        EnrichmentPipeline::new(
            Arc::new(PgCheckpointStore::new(postgres.clone())),
            Arc::new(PgRequestSource::new(postgres.clone())),
            model,
            Arc::new(PgAnomalyStore::new(postgres.clone())),
        )
        .with_page_size(config.job.page_size),
    );

    // Start the daily scheduler
    let scheduler = JobScheduler::new(config.job.clone(), pipeline);
    let scheduler_handle = scheduler.start().context("Failed to start scheduler")?;

    // Health endpoints
    let app = router();

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");
    scheduler_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("ANOMALY")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("ANOMALY_POSTGRES_URL") {
        config.postgres.url = url;
    }
    if let Ok(base_url) = std::env::var("ANOMALY_MODEL_BASE_URL") {
        config.model.base_url = base_url;
    }
    if let Ok(endpoint) = std::env::var("ANOMALY_MODEL_PREDICT_ENDPOINT") {
        config.model.predict_endpoint = endpoint;
    }
    if let Ok(mocked) = std::env::var("ANOMALY_MODEL_MOCKED") {
        config.model.mocked = mocked == "1" || mocked.to_lowercase() == "true";
    }
    if let Ok(time_spec) = std::env::var("ANOMALY_JOB_TIME_SPEC") {
        config.job.time_spec = time_spec;
    }
    if let Ok(timezone) = std::env::var("ANOMALY_JOB_TIMEZONE") {
        config.job.timezone = timezone;
    }

    Ok(config)
}

/// Check component health on startup.
async fn check_health(config: &Config, postgres: &PostgresClient) {
    let pg_healthy = postgres_store::health::check_connection(postgres).await;
    if pg_healthy {
        health().postgres.set_healthy();
        info!("Postgres connection: healthy");
    } else {
        health().postgres.set_unhealthy("Connection failed");
        error!("Postgres connection: unhealthy");
    }

    if config.model.mocked {
        health().model.set_healthy();
        info!("Model service: mocked");
    } else if model_client::health::check_connection(&config.model).await {
        health().model.set_healthy();
        info!("Model service: reachable");
    } else {
        health().model.set_unhealthy("Unreachable");
        error!("Model service: unreachable");
    }
}

/// Health check response.
#[derive(Debug, Clone, serde::Serialize)]
struct HealthResponse {
    status: String,
    postgres_connected: bool,
    model_connected: bool,
    job: MetricsSnapshot,
}

fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/ready", get(ready_handler))
        .route("/health/live", get(live_handler))
}

/// GET /health - Full health check.
async fn health_handler() -> Json<HealthResponse> {
    let report = health().report();

    Json(HealthResponse {
        status: format!("{:?}", report.status).to_lowercase(),
        postgres_connected: health().postgres.is_healthy(),
        model_connected: health().model.is_healthy(),
        job: metrics().snapshot(),
    })
}

/// GET /health/ready - Readiness probe (can make progress).
async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
