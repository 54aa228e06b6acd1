use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).try_init() {
        eprintln!("tracing init failed: {e}");
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %environment, "listening");
    mock_server::serve(listener, mock_server::app_with_environment(&environment)).await
}
