//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Construct the per-process context (metrics, stores) explicitly
//! - Create the Axum Router for the configured service
//! - Wire up middleware (request ID, panic guard, instrumentation, limits)
//! - Serve until the shutdown signal, running the task worker alongside

use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::config::{ServiceConfig, ServiceKind};
use crate::handlers::{self, system};
use crate::http::middleware::instrument_request;
use crate::http::response::panic_response;
use crate::items::ItemStore;
use crate::lifecycle::shutdown;
use crate::observability::{Instrumentation, Metrics, MetricsError};
use crate::tasks::{TaskStore, TaskWorker};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: ServiceKind,
    pub metrics: Metrics,
    pub items: ItemStore,
    pub tasks: TaskStore,
}

/// HTTP server for one service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    state: AppState,
    worker: Option<TaskWorker>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, MetricsError> {
        let metrics = Metrics::new(config.metrics_prefix(), &config.observability.latency_buckets)?;
        let (tasks, worker) = TaskStore::with_mode(config.tasks.mode, metrics.clone());
        if config.service == ServiceKind::Worker {
            metrics.set_active_tasks(0);
        }

        let state = AppState {
            service: config.service,
            metrics: metrics.clone(),
            items: ItemStore::new(),
            tasks,
        };
        let instrumentation = Instrumentation::new(config.service_name(), metrics);

        let router = handlers::system_routes(config.observability.metrics_enabled)
            .merge(handlers::service_routes(config.service))
            .fallback(system::not_found)
            .with_state(state.clone());
        let router = apply_middleware(router, &config, instrumentation);

        Ok(Self {
            router,
            config,
            state,
            worker,
        })
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = self.config.service.as_str(),
            mode = ?self.state.tasks.mode(),
            "HTTP server starting"
        );

        let worker = self
            .worker
            .map(|worker| tokio::spawn(worker.run(shutdown.resubscribe())));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;
        tracing::info!("HTTP server stopped");

        // The router is gone; dropping the last store handle closes the
        // queue so the worker finishes tasks accepted during the drain.
        drop(self.state);
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Task worker terminated abnormally");
            }
        }

        Ok(())
    }

    /// A handle to the fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

}

/// Wrap every route (and the fallback) of `router` in the standard layers.
///
/// Outermost first: request id, id propagation, panic guard,
/// instrumentation, timeout, body limit.
#[allow(deprecated)]
pub fn apply_middleware(router: Router, config: &ServiceConfig, instrumentation: Instrumentation) -> Router {
    router
        .layer(DefaultBodyLimit::max(config.security.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(middleware::from_fn_with_state(instrumentation, instrument_request))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
