//! Shared utilities for integration and load testing.

use std::net::SocketAddr;

use devops_services::config::{ServiceConfig, ServiceKind};
use devops_services::http::HttpServer;
use devops_services::lifecycle::Shutdown;
use tokio::net::TcpListener;

/// A service running on an ephemeral local port.
pub struct RunningService {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl RunningService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Start a service with the given configuration.
pub async fn start_service(config: ServiceConfig) -> RunningService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    RunningService {
        addr,
        shutdown,
        handle,
    }
}

/// Start a service with default settings for `kind`.
#[allow(dead_code)]
pub async fn start_default(kind: ServiceKind) -> RunningService {
    start_service(ServiceConfig::for_service(kind)).await
}

/// HTTP client that never reuses connections across tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
