//! HTTP-Routen neben dem WebSocket-Endpunkt
//!
//! - `GET /`           – Lebenszeichen als Klartext
//! - `GET /api/status` – Zaehler des Chat-Hubs (nur lesend)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chatonimy_matchmaking::ChatHub;
use serde::Serialize;

/// Antwort von `GET /api/status`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusAntwort {
    pub status: &'static str,
    pub active_users: usize,
    pub waiting_users: usize,
    pub active_rooms: usize,
}

/// Router fuer `/` und `/api/status`
pub fn api_router(hub: ChatHub) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(status))
        .with_state(hub)
}

async fn index() -> &'static str {
    "CHATONIMY server is running!"
}

async fn status(State(hub): State<ChatHub>) -> Response {
    match hub.status().await {
        Ok(status) => Json(StatusAntwort {
            status: "online",
            active_users: status.aktive_verbindungen,
            waiting_users: status.wartende,
            active_rooms: status.aktive_raeume,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(fehler = %e, "Status-Abfrage fehlgeschlagen");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "offline" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chatonimy_matchmaking::ChatConfig;
    use tower::ServiceExt;

    #[tokio::test]
    async fn index_meldet_laufenden_server() {
        let (hub, _handle) = ChatHub::starten(&ChatConfig::default());
        let antwort = api_router(hub)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(antwort.status(), StatusCode::OK);
        let body = to_bytes(antwort.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"CHATONIMY server is running!");
    }

    #[tokio::test]
    async fn status_zaehlt_verbindungen() {
        let (hub, _handle) = ChatHub::starten(&ChatConfig::default());
        let (_id, _rx) = hub.verbinden().unwrap();

        let antwort = api_router(hub)
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(antwort.status(), StatusCode::OK);

        let body = to_bytes(antwort.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "online");
        assert_eq!(json["activeUsers"], 1);
        assert_eq!(json["waitingUsers"], 0);
        assert_eq!(json["activeRooms"], 0);
    }
}
