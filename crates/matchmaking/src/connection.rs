//! Client-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede WebSocket-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Sie dekodiert eingehende Frames, reicht gueltige Ereignisse an
//! den Hub weiter und schreibt ausgehende Ereignisse aus der Send-Queue.
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen WebSocket-Ping
//! - Kommt innerhalb von `verbindungs_timeout_sek` kein Frame, wird getrennt
//!
//! ## Fehlerhafte Frames
//! Ungueltiges JSON, unbekannte Ereignisse und zu grosse Frames werden mit
//! einem `error`-Ereignis beantwortet. Die Verbindung bleibt offen.

use axum::extract::ws::{Message, WebSocket};
use chatonimy_protocol::{ErrorCode, EventCodec, ServerEvent};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::ChatConfig;
use crate::error::MatchmakingResult;
use crate::hub::ChatHub;

type WsSender = SplitSink<WebSocket, Message>;

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct ClientConnection {
    hub: ChatHub,
    config: Arc<ChatConfig>,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(hub: ChatHub, config: Arc<ChatConfig>) -> Self {
        Self { hub, config }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis der Client trennt, der Timeout greift oder ein
    /// Shutdown-Signal eingeht. Meldet die Trennung in jedem Fall an den Hub.
    pub async fn verarbeiten(self, mut socket: WebSocket, mut shutdown_rx: watch::Receiver<bool>) {
        let (id, mut empfang) = match self.hub.verbinden() {
            Ok(verbindung) => verbindung,
            Err(e) => {
                tracing::warn!(fehler = %e, "Verbindung abgelehnt");
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        };

        let codec = EventCodec::with_max_size(self.config.max_frame_groesse);
        // Weitergeleitete Nachrichten tragen zusaetzlich die Absender-ID
        let ausgang = EventCodec::with_max_size(self.config.max_frame_groesse.saturating_mul(2));
        let keepalive_intervall = Duration::from_secs(self.config.keepalive_sek.max(1));
        let timeout_dauer = Duration::from_secs(self.config.verbindungs_timeout_sek);

        let (mut ws_tx, mut ws_rx) = socket.split();
        let mut letzter_empfang = Instant::now();
        let mut ping_takt =
            tokio::time::interval_at(Instant::now() + keepalive_intervall, keepalive_intervall);

        loop {
            tokio::select! {
                // Eingehender Frame vom Client
                frame = ws_rx.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            letzter_empfang = Instant::now();
                            match codec.decode(&text) {
                                Ok(ereignis) => {
                                    if self.hub.ereignis_melden(id, ereignis).is_err() {
                                        tracing::warn!(connection_id = %id, "Hub beendet – Verbindung wird getrennt");
                                        break;
                                    }
                                }
                                Err(e) => {
                                    tracing::debug!(connection_id = %id, fehler = %e, "Ungueltiger Frame");
                                    if let Err(e) = ereignis_schreiben(&mut ws_tx, &ausgang, &e.als_ereignis()).await {
                                        tracing::warn!(connection_id = %id, fehler = %e, "Senden fehlgeschlagen");
                                        break;
                                    }
                                }
                            }
                        }
                        Some(Ok(Message::Binary(_))) => {
                            letzter_empfang = Instant::now();
                            let antwort = ServerEvent::error(
                                ErrorCode::UnsupportedFrame,
                                "Nur Text-Frames werden unterstuetzt",
                            );
                            if let Err(e) = ereignis_schreiben(&mut ws_tx, &ausgang, &antwort).await {
                                tracing::warn!(connection_id = %id, fehler = %e, "Senden fehlgeschlagen");
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                            letzter_empfang = Instant::now();
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::debug!(connection_id = %id, "Verbindung vom Client getrennt");
                            break;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(connection_id = %id, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                    }
                }

                // Ausgehendes Ereignis aus dem Hub
                Some(ereignis) = empfang.recv() => {
                    if let Err(e) = ereignis_schreiben(&mut ws_tx, &ausgang, &ereignis).await {
                        tracing::warn!(connection_id = %id, fehler = %e, "Senden fehlgeschlagen");
                        break;
                    }
                }

                // Keepalive-Ping und Timeout-Pruefung
                _ = ping_takt.tick() => {
                    if letzter_empfang.elapsed() > timeout_dauer {
                        tracing::warn!(connection_id = %id, "Verbindungs-Timeout");
                        break;
                    }
                    if let Err(e) = ws_tx.send(Message::Ping(Vec::new())).await {
                        tracing::warn!(connection_id = %id, fehler = %e, "Ping-Senden fehlgeschlagen");
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(connection_id = %id, "Shutdown-Signal – Verbindung wird getrennt");
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }

        self.hub.trennen(id);
        tracing::debug!(connection_id = %id, "Verbindungs-Task beendet");
    }
}

/// Kodiert ein Ereignis und schreibt es auf den WebSocket
///
/// Kodierungsfehler betreffen nur dieses eine Ereignis und werden verworfen;
/// nur Transportfehler beenden die Verbindung.
async fn ereignis_schreiben(
    ws_tx: &mut WsSender,
    codec: &EventCodec,
    ereignis: &ServerEvent,
) -> MatchmakingResult<()> {
    let text = match codec.encode(ereignis) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(ereignis = ereignis.name(), fehler = %e, "Ereignis nicht kodierbar – verworfen");
            return Ok(());
        }
    };
    ws_tx.send(Message::Text(text)).await?;
    Ok(())
}
