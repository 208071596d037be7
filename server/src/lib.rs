//! chatonimy-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod routes;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::Router;
use chatonimy_matchmaking::{ws_router, ChatHub, ChatStatus, WsState};
use chatonimy_observability::{
    observability_server_starten, request_timing_layer, timing_middleware, ChatKennzahlen,
    ChatonimyMetrics, HealthState,
};
use config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;

/// Intervall in dem die Hub-Zaehler in die Metriken uebernommen werden
const METRIKEN_INTERVALL: Duration = Duration::from_secs(5);

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Chat-Hub starten
    /// 2. Observability-Server und Metriken-Sampler starten
    /// 3. HTTP/WebSocket-Listener starten
    /// 4. Auf Ctrl-C warten, dann alle Verbindungen schliessen
    pub async fn starten(self) -> Result<()> {
        let bind_addr: SocketAddr = self.config.http_bind_adresse().parse()?;
        let chat_config = Arc::new(self.config.chat_config());

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %bind_addr,
            max_verbindungen = chat_config.max_verbindungen,
            "Server startet"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (hub, hub_handle) = ChatHub::starten(&chat_config);

        let metriken = ChatonimyMetrics::neu()?;
        let health = HealthState::neu();

        // Hub-Ende im Health-Check sichtbar machen
        let health_hub = health.clone();
        tokio::spawn(async move {
            if let Err(e) = hub_handle.await {
                tracing::error!(fehler = %e, "Chat-Hub abgestuerzt");
            }
            health_hub.hub_status_setzen(false);
        });

        tokio::spawn(metriken_sampler(
            hub.clone(),
            metriken.clone(),
            shutdown_rx.clone(),
        ));

        if self.config.observability.aktiviert {
            let obs_addr: SocketAddr = self.config.observability_bind_adresse().parse()?;
            let obs_metriken = metriken.clone();
            let obs_shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                if let Err(e) =
                    observability_server_starten(obs_addr, obs_metriken, health, obs_shutdown).await
                {
                    tracing::error!(fehler = %e, "Observability-Server beendet");
                }
            });
        }

        let app = Router::new()
            .merge(routes::api_router(hub.clone()))
            .merge(ws_router(WsState {
                hub,
                config: chat_config,
                shutdown_rx: shutdown_rx.clone(),
            }))
            .layer(axum::middleware::from_fn_with_state(
                metriken,
                timing_middleware,
            ))
            .layer(request_timing_layer())
            .layer(cors_layer(&self.config.netzwerk.cors_origins));

        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!(adresse = %bind_addr, "CHATONIMY server running");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
                }
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                let _ = shutdown_tx.send(true);
            })
            .await?;

        tracing::info!("Server gestoppt");
        Ok(())
    }
}

/// CORS konfigurieren: entweder spezifische Origins oder alle
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

/// Uebernimmt die Hub-Zaehler periodisch in die Prometheus-Metriken
async fn metriken_sampler(
    hub: ChatHub,
    metriken: ChatonimyMetrics,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut takt = tokio::time::interval(METRIKEN_INTERVALL);

    loop {
        tokio::select! {
            _ = takt.tick() => {
                match hub.status().await {
                    Ok(status) => metriken.kennzahlen_setzen(kennzahlen(status)),
                    Err(e) => {
                        tracing::warn!(fehler = %e, "Metriken-Sampler beendet");
                        break;
                    }
                }
            }
            Ok(()) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
}

fn kennzahlen(status: ChatStatus) -> ChatKennzahlen {
    ChatKennzahlen {
        verbindungen: status.aktive_verbindungen,
        wartende: status.wartende,
        raeume: status.aktive_raeume,
        raeume_gesamt: status.raeume_erstellt_gesamt,
        nachrichten_gesamt: status.nachrichten_gesamt,
        verworfene_kandidaten_gesamt: status.verworfene_kandidaten_gesamt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kennzahlen_aus_status() {
        let status = ChatStatus {
            aktive_verbindungen: 4,
            wartende: 1,
            aktive_raeume: 1,
            raeume_erstellt_gesamt: 9,
            nachrichten_gesamt: 120,
            verworfene_kandidaten_gesamt: 2,
        };
        let k = kennzahlen(status);
        assert_eq!(k.verbindungen, 4);
        assert_eq!(k.raeume_gesamt, 9);
        assert_eq!(k.verworfene_kandidaten_gesamt, 2);
    }

    async fn allow_origin(layer: CorsLayer, origin: &str) -> Option<String> {
        use axum::body::Body;
        use axum::http::{header, Request};
        use axum::routing::get;
        use tower::ServiceExt;

        let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);
        let antwort = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        antwort
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|wert| wert.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn cors_ohne_origins_ist_offen() {
        let erlaubt = allow_origin(cors_layer(&[]), "https://irgendwo.example").await;
        assert_eq!(erlaubt.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn cors_mit_origins_erlaubt_nur_konfigurierte() {
        // Ungueltige Eintraege werden still ignoriert
        let origins = vec!["https://chat.example".to_string(), "\n".to_string()];

        let erlaubt = allow_origin(cors_layer(&origins), "https://chat.example").await;
        assert_eq!(erlaubt.as_deref(), Some("https://chat.example"));

        let fremd = allow_origin(cors_layer(&origins), "https://fremd.example").await;
        assert_eq!(fremd, None);
    }
}
