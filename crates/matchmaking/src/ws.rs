//! WebSocket-Endpunkt (`GET /ws`)
//!
//! Prueft das Verbindungslimit vor dem Upgrade und startet danach fuer jede
//! Verbindung eine `ClientConnection`.

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::ChatConfig;
use crate::connection::ClientConnection;
use crate::hub::ChatHub;

/// Gemeinsamer Zustand des WebSocket-Endpunkts
#[derive(Clone)]
pub struct WsState {
    pub hub: ChatHub,
    pub config: Arc<ChatConfig>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Erstellt den Router mit dem `/ws`-Endpunkt
pub fn ws_router(state: WsState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> Response {
    if state.hub.ist_voll() {
        tracing::warn!(
            verbindungen = state.hub.verbindungs_anzahl(),
            "Server voll – WebSocket-Upgrade abgelehnt"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Server ist voll").into_response();
    }

    let verbindung = ClientConnection::neu(state.hub.clone(), Arc::clone(&state.config));
    let shutdown_rx = state.shutdown_rx.clone();
    ws.on_upgrade(move |socket| verbindung.verarbeiten(socket, shutdown_rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn ohne_upgrade_header_abgelehnt() {
        let (hub, _handle) = ChatHub::starten(&ChatConfig::default());
        let (_tx, shutdown_rx) = watch::channel(false);
        let app = ws_router(WsState {
            hub,
            config: Arc::new(ChatConfig::default()),
            shutdown_rx,
        });

        let antwort = app
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(antwort.status().is_client_error());
    }
}
