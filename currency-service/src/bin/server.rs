//! Currency catalog gRPC server binary

use currency_service::grpc::server::currencies::currency_catalog_server::CurrencyCatalogServer;
use currency_service::{Config, CurrencyCatalog, CurrencyGrpcServer, Metrics};
use prometheus::{Encoder, TextEncoder};
use revision_store::RocksStore;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting currency catalog server");

    // Load configuration
    let config = Config::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    // Open revision stores
    let currency_store = RocksStore::open(config.currency_store_path())?;
    let denomination_store = RocksStore::open(config.denomination_store_path())?;
    tracing::info!("Revision stores opened");

    let catalog = Arc::new(CurrencyCatalog::new(currency_store, denomination_store));
    let metrics = Metrics::new()?;

    // Metrics endpoint
    let metrics_addr = config.metrics_listen_addr.clone();
    let metrics_registry = metrics.clone();
    tokio::spawn(async move {
        if let Err(e) = serve_metrics(&metrics_addr, metrics_registry).await {
            tracing::error!(error = %e, "Metrics endpoint failed");
        }
    });

    // Start gRPC server
    let grpc_server = CurrencyGrpcServer::new(catalog, metrics);
    let grpc_addr = config.grpc_listen_addr.parse()?;

    tracing::info!(addr = %config.grpc_listen_addr, "Serving gRPC");

    tonic::transport::Server::builder()
        .add_service(CurrencyCatalogServer::new(grpc_server))
        .serve_with_shutdown(grpc_addr, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Currency catalog server stopped");
    Ok(())
}

/// Minimal Prometheus text-format exporter
async fn serve_metrics(addr: &str, metrics: Metrics) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Serving metrics");

    loop {
        let (mut socket, _) = listener.accept().await?;
        let encoder = TextEncoder::new();
        let mut body = Vec::new();
        encoder.encode(&metrics.registry().gather(), &mut body)?;

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            encoder.format_type(),
            body.len()
        );

        tokio::spawn(async move {
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.shutdown().await;
        });
    }
}
