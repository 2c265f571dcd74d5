use crate::config::Config;
use crate::metrics::MetricsRegistry;
use crate::probe::SystemProbe;
use crate::response::ResponseBuilder;
use crate::routes::RouteTable;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared application state, built once at startup and injected into the
/// dispatcher. The metrics registry is the only cross-request mutable
/// surface; everything else is read-only after construction.
pub struct AppState {
    pub config: Config,
    pub responses: ResponseBuilder,
    pub routes: RouteTable,
    pub metrics: MetricsRegistry,
    pub probe: SystemProbe,
    started_at: Instant,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let responses = ResponseBuilder::new(&config.cors_origin)?;
        debug!(
            cors_origin = %config.cors_origin,
            environment = config.environment.as_str(),
            "Application state initialized"
        );
        Ok(AppState {
            responses,
            routes: RouteTable::new(),
            metrics: MetricsRegistry::default(),
            probe: SystemProbe::default(),
            started_at: Instant::now(),
            config,
        })
    }

    /// Time elapsed since process boot; the start instant is captured once.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
