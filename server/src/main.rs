use anyhow::Result;
use axum::Router;
use clap::Parser;
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// JSON array of documents to index at startup
    #[arg(long)]
    seed: Option<PathBuf>,
    /// Space separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Use the built-in English stop-word list instead of --stop-words
    #[arg(long, default_value_t = false)]
    english_stop_words: bool,
    /// Number of requests kept in the search history
    #[arg(long, default_value_t = search_core::REQUEST_WINDOW)]
    history_window: usize,
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
    let app: Router = build_app(ServerConfig {
        stop_words: args.stop_words,
        english_stop_words: args.english_stop_words,
        seed: args.seed,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
        history_window: args.history_window,
    })?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
