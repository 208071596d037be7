//! Chat-Hub – Einziger Besitzer des Vermittlungs-Zustands
//!
//! Der Hub laeuft als eigener tokio-Task und empfaengt Befehle ueber einen
//! unbegrenzten mpsc-Kanal. Damit werden alle Ereignisse aller Verbindungen
//! in eine einzige Reihenfolge gebracht und ohne Locks nacheinander auf
//! `ChatState` angewendet.
//!
//! ```text
//! ClientConnection ─┐
//! ClientConnection ─┼─ HubBefehl ──> hub_schleife (ChatState)
//! Status-Endpunkt ──┘                     │
//!                                         └── ClientSender (pro Verbindung)
//! ```
//!
//! Die Anzahl offener Verbindungen wird zusaetzlich atomar ausserhalb des
//! Hubs gezaehlt, damit das Verbindungslimit vor dem WebSocket-Upgrade
//! geprueft werden kann.

use chatonimy_core::types::ConnectionId;
use chatonimy_protocol::{ClientEvent, ServerEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::ChatConfig;
use crate::error::{MatchmakingError, MatchmakingResult};
use crate::sender::ClientSender;
use crate::state::{ChatState, ChatStatus};

/// Befehle an den Hub-Task
#[derive(Debug)]
pub enum HubBefehl {
    /// Neue Verbindung registrieren
    Verbinden { sender: ClientSender },
    /// Dekodiertes Client-Ereignis verarbeiten
    Ereignis {
        connection_id: ConnectionId,
        ereignis: ClientEvent,
    },
    /// Verbindung wurde getrennt
    Trennen { connection_id: ConnectionId },
    /// Momentaufnahme der Zaehler anfordern
    Status { antwort: oneshot::Sender<ChatStatus> },
}

/// Handle auf den laufenden Hub (guenstig klonbar)
#[derive(Clone, Debug)]
pub struct ChatHub {
    tx: mpsc::UnboundedSender<HubBefehl>,
    offene_verbindungen: Arc<AtomicUsize>,
    send_queue_groesse: usize,
    max_verbindungen: usize,
}

impl ChatHub {
    /// Startet den Hub-Task
    ///
    /// Der Task endet, sobald alle `ChatHub`-Handles fallen gelassen wurden.
    pub fn starten(config: &ChatConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(hub_schleife(rx));

        tracing::info!(
            max_verbindungen = config.max_verbindungen,
            send_queue_groesse = config.send_queue_groesse,
            "Chat-Hub gestartet"
        );

        let hub = Self {
            tx,
            offene_verbindungen: Arc::new(AtomicUsize::new(0)),
            send_queue_groesse: config.send_queue_groesse,
            max_verbindungen: config.max_verbindungen,
        };
        (hub, handle)
    }

    /// Registriert eine neue Verbindung
    ///
    /// Gibt die neue ID und die Empfangs-Queue fuer ausgehende Ereignisse
    /// zurueck. Jeder erfolgreiche Aufruf muss mit genau einem `trennen`
    /// abgeschlossen werden.
    pub fn verbinden(&self) -> MatchmakingResult<(ConnectionId, mpsc::Receiver<ServerEvent>)> {
        let max = self.max_verbindungen;
        self.offene_verbindungen
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < max).then_some(n + 1)
            })
            .map_err(|_| MatchmakingError::ServerVoll)?;

        let id = ConnectionId::new();
        let (sender, empfang) = ClientSender::neu(id, self.send_queue_groesse);

        if self.tx.send(HubBefehl::Verbinden { sender }).is_err() {
            self.zaehler_verringern();
            return Err(MatchmakingError::HubBeendet);
        }
        Ok((id, empfang))
    }

    /// Leitet ein Client-Ereignis an den Hub weiter
    pub fn ereignis_melden(
        &self,
        connection_id: ConnectionId,
        ereignis: ClientEvent,
    ) -> MatchmakingResult<()> {
        self.tx
            .send(HubBefehl::Ereignis {
                connection_id,
                ereignis,
            })
            .map_err(|_| MatchmakingError::HubBeendet)
    }

    /// Meldet eine getrennte Verbindung
    pub fn trennen(&self, connection_id: ConnectionId) {
        self.zaehler_verringern();
        if self.tx.send(HubBefehl::Trennen { connection_id }).is_err() {
            tracing::debug!(connection_id = %connection_id, "Trennen nach Hub-Ende ignoriert");
        }
    }

    /// Fragt eine Momentaufnahme der Zaehler ab
    pub async fn status(&self) -> MatchmakingResult<ChatStatus> {
        let (antwort, empfang) = oneshot::channel();
        self.tx
            .send(HubBefehl::Status { antwort })
            .map_err(|_| MatchmakingError::HubBeendet)?;
        empfang.await.map_err(|_| MatchmakingError::HubBeendet)
    }

    /// Anzahl offener Verbindungen (inkl. noch nicht verarbeiteter)
    pub fn verbindungs_anzahl(&self) -> usize {
        self.offene_verbindungen.load(Ordering::SeqCst)
    }

    /// Prueft ob das Verbindungslimit erreicht ist
    pub fn ist_voll(&self) -> bool {
        self.verbindungs_anzahl() >= self.max_verbindungen
    }

    /// Prueft ob der Hub-Task noch Befehle annimmt
    pub fn laeuft(&self) -> bool {
        !self.tx.is_closed()
    }

    fn zaehler_verringern(&self) {
        let _ = self
            .offene_verbindungen
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}

async fn hub_schleife(mut rx: mpsc::UnboundedReceiver<HubBefehl>) {
    let mut state = ChatState::neu();

    while let Some(befehl) = rx.recv().await {
        match befehl {
            HubBefehl::Verbinden { sender } => state.verbindung_hergestellt(sender),
            HubBefehl::Ereignis {
                connection_id,
                ereignis,
            } => state.ereignis_verarbeiten(connection_id, ereignis),
            HubBefehl::Trennen { connection_id } => {
                state.verbindung_getrennt(&connection_id);
            }
            HubBefehl::Status { antwort } => {
                let _ = antwort.send(state.status());
            }
        }

        debug_assert!(
            state.konsistenz_pruefen().is_empty(),
            "Inkonsistenter Zustand: {:?}",
            state.konsistenz_pruefen()
        );
    }

    tracing::info!("Chat-Hub beendet");
}
