//! Client-Sender – Best-Effort-Zustellung an eine Verbindung
//!
//! Jede Verbindung hat eine begrenzte Send-Queue. Der Vermittlungskern legt
//! Ereignisse nicht-blockierend hinein; der Verbindungs-Task liest sie aus und
//! schreibt sie auf den WebSocket.
//!
//! Zustellung ist fire-and-forget: eine volle oder geschlossene Queue wird
//! geloggt, aber nie als Fehler an den ausloesenden Handler gemeldet.

use chatonimy_core::types::ConnectionId;
use chatonimy_protocol::ServerEvent;
use tokio::sync::mpsc;

/// Standard-Groesse der Send-Queue pro Client
pub const SEND_QUEUE_GROESSE: usize = 64;

/// Handle auf die Send-Queue eines verbundenen Clients
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub connection_id: ConnectionId,
    tx: mpsc::Sender<ServerEvent>,
}

impl ClientSender {
    /// Erstellt einen Sender fuer eine Verbindung und gibt die Empfangs-Queue zurueck
    ///
    /// Der Verbindungs-Task haelt den Receiver. Sobald er ihn fallen laesst,
    /// gilt die Verbindung als nicht mehr lebendig.
    pub fn neu(
        connection_id: ConnectionId,
        queue_groesse: usize,
    ) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(queue_groesse.max(1));
        (Self { connection_id, tx }, rx)
    }

    /// Sendet ein Ereignis nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, ereignis: ServerEvent) -> bool {
        let name = ereignis.name();
        match self.tx.try_send(ereignis) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    ereignis = name,
                    "Send-Queue voll – Ereignis verworfen"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    connection_id = %self.connection_id,
                    ereignis = name,
                    "Send-Queue geschlossen (Client getrennt)"
                );
                false
            }
        }
    }

    /// Prueft ob die Gegenseite die Queue noch liest
    pub fn ist_offen(&self) -> bool {
        !self.tx.is_closed()
    }
}
