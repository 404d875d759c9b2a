use std::path::Path;
use std::sync::Arc;
use tamper_gate::api::create_router;
use tamper_gate::common::bits2hr;
use tamper_gate::known_good::{DEFAULT_SEEDS, build_filter, known_good_corpus};
use tamper_gate::{
    AlertTrigger, AppState, FilterConfigBuilder, LogAlertSink, ServerConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // load configuration from environment variables
    let config = ServerConfig::from_env()?;

    let filter_config = FilterConfigBuilder::default()
        .bits(config.filter_bits)
        .num_hashes(config.filter_hashes)
        .build()?;

    let corpus = known_good_corpus(
        &DEFAULT_SEEDS,
        config.known_good_path.as_deref().map(Path::new),
    )?;
    let filter = build_filter(filter_config, &corpus)?;
    let stats = filter.stats();

    let alerts = AlertTrigger::new(
        Arc::new(LogAlertSink),
        config.alert_destination.clone(),
    );

    // Create application state
    let state = Arc::new(
        AppState::new(filter, alerts)
            .with_limits(config.max_body_bytes, config.body_read_timeout),
    );

    // Create router with logging middleware
    let app = create_router(state).layer(
        tower_http::trace::TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            })
            .on_response(
                |response: &axum::http::Response<_>,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    tracing::info!(
                        status = %response.status(),
                        latency = ?latency,
                        "response generated"
                    );
                },
            ),
    );

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        r#"
    Tamper gate starting

    Filter Configuration:
       • Bits:                {:>12}
       • Hash projections:    {:>12}
       • Known-good entries:  {:>12}
       • Estimated FPR:       {:>11.6}%
       • Memory:              {:>12}
       • Provisioning file:   {:>12}

    Server Information:
       • Listening on:  http://{}
       • Swagger UI:    http://{}/swagger-ui/
       • Max body:      {} bytes, read timeout {:?}
       • Alert target:  {}

    API Endpoints:
       • POST   /ingest   - Screen a payload
       • GET    /stats    - Filter statistics
       • GET    /health   - Health check
    "#,
        stats.bits,
        stats.num_hashes,
        stats.inserted,
        stats.estimated_false_positive_rate * 100.0,
        bits2hr(stats.bits),
        config.known_good_path.as_deref().unwrap_or("none"),
        addr,
        addr,
        config.max_body_bytes,
        config.body_read_timeout,
        config.alert_destination,
    );

    axum::serve(listener, app).await?;
    Ok(())
}
