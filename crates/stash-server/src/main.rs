//! Stash server - HTTP gateway over an S3-compatible object store

use clap::Parser;
use stash_server::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "stash-server")]
#[command(about = "HTTP gateway exposing object-storage operations")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "STASH_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "STASH_PORT")]
    port: u16,

    /// Object store endpoint URL
    #[arg(long, default_value = "http://localhost:9000", env = "STASH_STORE_ENDPOINT")]
    store_endpoint: String,

    /// Object store region
    #[arg(long, default_value = "us-east-1", env = "STASH_STORE_REGION")]
    store_region: String,

    /// Access key for the store
    #[arg(long, default_value = "minioadmin", env = "STASH_ACCESS_KEY")]
    access_key: String,

    /// Secret key for the store
    #[arg(long, default_value = "minioadmin", env = "STASH_SECRET_KEY")]
    secret_key: String,

    /// Bucket used when an upload names none
    #[arg(long, default_value = "uploads", env = "STASH_DEFAULT_BUCKET")]
    default_bucket: String,

    /// Teardown batch pack size used when a request supplies none
    #[arg(long, default_value = "500", env = "STASH_PACK_SIZE")]
    pack_size: usize,

    /// Enable debug logging
    #[arg(short, long, env = "STASH_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("stash_server={log_level},stash_gateway={log_level},tower_http=debug")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting stash server on {}:{}", args.host, args.port);

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        store_endpoint: args.store_endpoint,
        store_region: args.store_region,
        access_key: args.access_key,
        secret_key: args.secret_key,
        default_bucket: args.default_bucket,
        teardown_pack_size: args.pack_size,
        ..Default::default()
    };

    run_server(config).await
}
