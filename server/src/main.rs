use anyhow::Result;
use axum::Router;
use clap::Parser;
use scorer::RecommenderConfig;
use server::{build_app, AppOptions};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Dataset directory (jobs*, applications*, interactions* JSON/JSONL)
    #[arg(long, default_value = "./data")]
    data: PathBuf,
    /// Optional JSON recommender config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bound the profile store to this many users
    #[arg(long)]
    max_profiles: Option<u64>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RecommenderConfig::from_file(path)?,
        None => RecommenderConfig::default(),
    };
    if args.max_profiles.is_some() {
        config.store.max_profiles = args.max_profiles;
    }
    let options = AppOptions { data_dir: args.data, config, admin_token: std::env::var("ADMIN_TOKEN").ok() };
    let app: Router = build_app(options)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
