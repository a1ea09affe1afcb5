//! HTTP server lifecycle: bind, spawn the axum server in a background
//! task, and hand back a handle with a shutdown channel.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use care_registry_core::Database;

use crate::api::router::api_router;

/// Handle to a running registry server.
pub struct RegistryServer {
    pub local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl RegistryServer {
    /// Signal a graceful shutdown. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("registry server shutdown signal sent");
        }
    }

    /// Wait for the background server task to exit.
    pub async fn stopped(self) {
        if let Err(e) = self.handle.await {
            tracing::error!("registry server task failed: {e}");
        }
    }
}

/// Bind `addr` and serve the registry API on it.
///
/// Port 0 binds an ephemeral port; the chosen address is reported in
/// `RegistryServer::local_addr`.
pub async fn start_server(
    addr: SocketAddr,
    db: Arc<Mutex<Database>>,
) -> anyhow::Result<RegistryServer> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind registry server on {addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to read bound server address")?;

    let app = api_router(db);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("registry server received shutdown signal");
        };

        tracing::info!(addr = %local_addr, "registry server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("registry server error: {e}");
        }

        tracing::info!("registry server stopped");
    });

    Ok(RegistryServer {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn raw_get(addr: SocketAddr, path: &str, auth: Option<&str>) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
        if let Some(token) = auth {
            request.push_str(&format!("Authorization: Bearer {token}\r\n"));
        }
        request.push_str("\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    fn test_db() -> Arc<Mutex<Database>> {
        Arc::new(Mutex::new(Database::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn start_serve_and_stop() {
        let loopback: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut server = start_server(loopback, test_db()).await.expect("server should start");
        assert!(server.local_addr.port() > 0);

        let health = raw_get(server.local_addr, "/api/health", None).await;
        assert!(health.starts_with("HTTP/1.1 200"), "got: {health}");

        let doctors = raw_get(server.local_addr, "/api/doctors", None).await;
        assert!(doctors.starts_with("HTTP/1.1 401"), "got: {doctors}");

        server.shutdown();
        server.stopped().await;
    }

    #[tokio::test]
    async fn binding_a_taken_port_fails() {
        let loopback: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut first = start_server(loopback, test_db()).await.unwrap();
        let second = start_server(first.local_addr, test_db()).await;
        assert!(second.is_err());

        first.shutdown();
        first.stopped().await;
    }
}
