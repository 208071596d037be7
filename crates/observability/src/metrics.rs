//! Prometheus-kompatible Metriken fuer Chatonimy
//!
//! Registrierte Metriken:
//! - `chatonimy_connected_clients` – Gauge: Aktuell verbundene Clients
//! - `chatonimy_waiting_clients` – Gauge: Clients in der Warteschlange
//! - `chatonimy_active_rooms` – Gauge: Aktive Zweier-Raeume
//! - `chatonimy_rooms_created_total` – Counter: Erstellte Raeume
//! - `chatonimy_messages_relayed_total` – Counter: Weitergeleitete Nachrichten
//! - `chatonimy_stale_candidates_total` – Counter: Verworfene tote Kandidaten
//! - `chatonimy_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `chatonimy_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit
//!
//! Unter Linux kommen die Prozess-Metriken (`process_*`) dazu.

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Zaehlerstaende des Chat-Hubs zu einem Zeitpunkt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatKennzahlen {
    pub verbindungen: usize,
    pub wartende: usize,
    pub raeume: usize,
    pub raeume_gesamt: u64,
    pub nachrichten_gesamt: u64,
    pub verworfene_kandidaten_gesamt: u64,
}

/// Alle Chatonimy-Prometheus-Metriken
#[derive(Clone)]
pub struct ChatonimyMetrics {
    pub registry: Arc<Registry>,

    // Chat-Metriken
    pub connected_clients: IntGauge,
    pub waiting_clients: IntGauge,
    pub active_rooms: IntGauge,
    pub rooms_created_total: IntCounter,
    pub messages_relayed_total: IntCounter,
    pub stale_candidates_total: IntCounter,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl ChatonimyMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Chat-Metriken ---
        let connected_clients = IntGauge::with_opts(Opts::new(
            "chatonimy_connected_clients",
            "Anzahl aktuell verbundener Clients",
        ))?;
        registry.register(Box::new(connected_clients.clone()))?;

        let waiting_clients = IntGauge::with_opts(Opts::new(
            "chatonimy_waiting_clients",
            "Anzahl Clients in der Warteschlange",
        ))?;
        registry.register(Box::new(waiting_clients.clone()))?;

        let active_rooms = IntGauge::with_opts(Opts::new(
            "chatonimy_active_rooms",
            "Anzahl aktiver Chat-Raeume",
        ))?;
        registry.register(Box::new(active_rooms.clone()))?;

        let rooms_created_total = IntCounter::with_opts(Opts::new(
            "chatonimy_rooms_created_total",
            "Gesamtanzahl erstellter Chat-Raeume",
        ))?;
        registry.register(Box::new(rooms_created_total.clone()))?;

        let messages_relayed_total = IntCounter::with_opts(Opts::new(
            "chatonimy_messages_relayed_total",
            "Gesamtanzahl weitergeleiteter Nachrichten",
        ))?;
        registry.register(Box::new(messages_relayed_total.clone()))?;

        let stale_candidates_total = IntCounter::with_opts(Opts::new(
            "chatonimy_stale_candidates_total",
            "Aus der Warteschlange verworfene tote Kandidaten",
        ))?;
        registry.register(Box::new(stale_candidates_total.clone()))?;

        // --- HTTP-Metriken ---
        let http_requests_total = IntCounterVec::new(
            Opts::new("chatonimy_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "chatonimy_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        // --- Prozess-Metriken ---
        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry: Arc::new(registry),
            connected_clients,
            waiting_clients,
            active_rooms,
            rooms_created_total,
            messages_relayed_total,
            stale_candidates_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Uebernimmt einen Zaehlerstand des Hubs
    ///
    /// Gauges werden gesetzt, Counter um die Differenz zum letzten Stand
    /// erhoeht (Counter duerfen nie sinken).
    pub fn kennzahlen_setzen(&self, kennzahlen: ChatKennzahlen) {
        self.connected_clients.set(kennzahlen.verbindungen as i64);
        self.waiting_clients.set(kennzahlen.wartende as i64);
        self.active_rooms.set(kennzahlen.raeume as i64);

        counter_nachziehen(&self.rooms_created_total, kennzahlen.raeume_gesamt);
        counter_nachziehen(&self.messages_relayed_total, kennzahlen.nachrichten_gesamt);
        counter_nachziehen(
            &self.stale_candidates_total,
            kennzahlen.verworfene_kandidaten_gesamt,
        );
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn counter_nachziehen(counter: &IntCounter, stand: u64) {
    let bisher = counter.get();
    if stand > bisher {
        counter.inc_by(stand - bisher);
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: ChatonimyMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<ChatonimyMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metriken_erstellen_erfolgreich() {
        let metriken = ChatonimyMetrics::neu().unwrap();
        assert!(!metriken.registry.gather().is_empty());
    }

    #[test]
    fn kennzahlen_setzen_gauges() {
        let metriken = ChatonimyMetrics::neu().unwrap();
        metriken.kennzahlen_setzen(ChatKennzahlen {
            verbindungen: 10,
            wartende: 3,
            raeume: 2,
            ..Default::default()
        });

        assert_eq!(metriken.connected_clients.get(), 10);
        assert_eq!(metriken.waiting_clients.get(), 3);
        assert_eq!(metriken.active_rooms.get(), 2);
    }

    #[test]
    fn counter_folgen_dem_gesamtstand() {
        let metriken = ChatonimyMetrics::neu().unwrap();
        let mut kennzahlen = ChatKennzahlen {
            raeume_gesamt: 5,
            nachrichten_gesamt: 40,
            ..Default::default()
        };
        metriken.kennzahlen_setzen(kennzahlen);
        assert_eq!(metriken.rooms_created_total.get(), 5);

        kennzahlen.raeume_gesamt = 7;
        metriken.kennzahlen_setzen(kennzahlen);
        assert_eq!(metriken.rooms_created_total.get(), 7);
        assert_eq!(metriken.messages_relayed_total.get(), 40);

        // Ein kleinerer Stand laesst den Counter unveraendert
        kennzahlen.raeume_gesamt = 1;
        metriken.kennzahlen_setzen(kennzahlen);
        assert_eq!(metriken.rooms_created_total.get(), 7);
    }

    #[test]
    fn http_counter_mit_labels() {
        let metriken = ChatonimyMetrics::neu().unwrap();
        metriken
            .http_requests_total
            .with_label_values(&["GET", "/api/status", "200"])
            .inc();
        let wert = metriken
            .http_requests_total
            .with_label_values(&["GET", "/api/status", "200"])
            .get();
        assert_eq!(wert, 1);
    }

    #[test]
    fn metriken_export_prometheus_format() {
        let metriken = ChatonimyMetrics::neu().unwrap();
        metriken.connected_clients.set(5);
        metriken.stale_candidates_total.inc();

        let output = metriken.exportieren().unwrap();
        assert!(output.contains("chatonimy_connected_clients 5"));
        assert!(output.contains("chatonimy_stale_candidates_total 1"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn alle_chat_metriken_registriert() {
        let metriken = ChatonimyMetrics::neu().unwrap();
        let families = metriken.registry.gather();
        let namen: Vec<&str> = families.iter().map(|f| f.get_name()).collect();

        for name in [
            "chatonimy_connected_clients",
            "chatonimy_waiting_clients",
            "chatonimy_active_rooms",
            "chatonimy_rooms_created_total",
            "chatonimy_messages_relayed_total",
            "chatonimy_stale_candidates_total",
        ] {
            assert!(namen.contains(&name), "{name} fehlt");
        }
    }
}
