//! Health-Check-Endpunkt fuer Chatonimy
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime und Hub-Status

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub hub_running: bool,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone, Debug)]
pub struct HealthState {
    start_time: Arc<Instant>,
    hub_laeuft: Arc<AtomicBool>,
}

impl HealthState {
    pub fn neu() -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            hub_laeuft: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn hub_laeuft(&self) -> bool {
        self.hub_laeuft.load(Ordering::Relaxed)
    }

    /// Wird vom Server gesetzt sobald der Hub-Task endet
    pub fn hub_status_setzen(&self, laeuft: bool) {
        self.hub_laeuft.store(laeuft, Ordering::Relaxed);
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::neu()
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let hub_running = state.hub_laeuft();
    let (status, http_status) = if hub_running {
        (HealthStatus::Healthy, StatusCode::OK)
    } else {
        (HealthStatus::Unhealthy, StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        hub_running,
    };

    (http_status, Json(response))
}
