use anyhow::Result;
use axum::Router;
use clap::Parser;
use sift_server::{build_app, load_engine};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus to index at startup (JSON/JSONL file or directory)
    #[arg(long)]
    corpus: Option<String>,
    /// Space separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
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
    let engine = load_engine(args.corpus.as_deref(), &args.stop_words)?;
    tracing::info!(num_docs = engine.document_count(), "engine ready");
    let app: Router = build_app(engine);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
