use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use nobel::api::ApiServer;
use nobel::config::{Config, ObservabilityConfig};
use nobel::gateway::EsGateway;
use nobel_es::EsClient;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Parser, Debug)]
#[command(name = "nobel-server")]
#[command(about = "Nobel prize search API")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "NOBEL_CONFIG", default_value = "nobel.toml")]
    config: String,

    /// Host to bind to (overrides server.bind_addr)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides server.bind_addr)
    #[arg(short, long)]
    port: Option<u16>,

    /// Recreate the index and load the public prize feed before serving
    #[arg(long)]
    bootstrap: bool,
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&observability.log_level));

    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| observability.log_format.clone());
    let fmt_layer = match format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().boxed(),
        _ => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Resolve the listen address from CLI flags, falling back to the config
fn bind_addr(args: &Args, configured: &str) -> String {
    let (host, port) = configured.rsplit_once(':').unwrap_or((configured, "5000"));
    let host = args.host.as_deref().unwrap_or(host);
    let port = args.port.map_or_else(|| port.to_string(), |p| p.to_string());
    format!("{host}:{port}")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_create(Path::new(&args.config))?;
    init_tracing(&config.observability);

    if args.bootstrap {
        config.bootstrap.recreate_index = true;
        config.bootstrap.load_data = true;
    }

    let addr = bind_addr(&args, &config.server.bind_addr);
    tracing::info!("Starting Nobel search server on {}", addr);
    tracing::info!("Config file: {}", args.config);

    let client = EsClient::connect(
        &config.elasticsearch.url,
        config.elasticsearch.client_options(),
    )
    .await?;
    let gateway = EsGateway::new(client, config.elasticsearch.index.clone());

    if config.bootstrap.is_enabled() {
        if let Some(report) = nobel::bootstrap::run(&gateway, &config.bootstrap).await? {
            tracing::info!(
                indexed = report.indexed,
                failed = report.failed,
                skipped = report.skipped,
                "Bootstrap finished"
            );
        }
    }

    let mut server = ApiServer::with_config(Arc::new(gateway), config.server.clone());

    if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        let metrics_route = axum::routing::get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        });
        server = server.with_routes(axum::Router::new().route("/metrics", metrics_route));
        tracing::info!("Prometheus metrics enabled at /metrics");
    }

    server.serve(&addr).await?;

    Ok(())
}
