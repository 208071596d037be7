//! Connection-Registry – Wer ist verbunden, mit welchen Metadaten
//!
//! Haelt den ephemeren Zustand aller Verbindungen: Sender-Handle,
//! Benutzer-Metadaten aus `findPartner` und Verbindungszeitpunkt.
//!
//! Lebendigkeit wird nicht als separates Flag gepflegt, sondern aus dem
//! Sender abgeleitet: eine Verbindung ist lebendig solange ihr Verbindungs-Task
//! die Send-Queue noch liest. So erkennt die Vermittlung auch Verbindungen, deren
//! Trennung schon passiert ist, deren `Trennen`-Befehl aber noch in der
//! Hub-Queue wartet.

use chatonimy_core::types::ConnectionId;
use chatonimy_protocol::ServerEvent;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::sender::ClientSender;

// ---------------------------------------------------------------------------
// Verbindung
// ---------------------------------------------------------------------------

/// Eine registrierte Verbindung
#[derive(Debug, Clone)]
pub struct Verbindung {
    pub id: ConnectionId,
    /// Vom Client mit `findPartner` geschickte Metadaten
    pub user_data: Option<serde_json::Value>,
    pub verbunden_seit: DateTime<Utc>,
    sender: ClientSender,
}

impl Verbindung {
    /// Prueft ob der Transport der Verbindung noch aktiv ist
    pub fn ist_lebendig(&self) -> bool {
        self.sender.ist_offen()
    }
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Verwaltet alle bekannten Verbindungen
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    verbindungen: HashMap<ConnectionId, Verbindung>,
}

impl ConnectionRegistry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine neue Verbindung
    ///
    /// Eine bereits bekannte ID wird ersetzt (neuer Sender, Metadaten verworfen).
    pub fn registrieren(&mut self, sender: ClientSender) {
        let id = sender.connection_id;
        let verbindung = Verbindung {
            id,
            user_data: None,
            verbunden_seit: Utc::now(),
            sender,
        };
        if self.verbindungen.insert(id, verbindung).is_some() {
            tracing::warn!(connection_id = %id, "Verbindung doppelt registriert – ersetzt");
        }
    }

    /// Setzt oder erneuert die Benutzer-Metadaten einer Verbindung
    ///
    /// Gibt `false` zurueck wenn die Verbindung unbekannt ist.
    pub fn metadaten_setzen(
        &mut self,
        id: &ConnectionId,
        user_data: Option<serde_json::Value>,
    ) -> bool {
        match self.verbindungen.get_mut(id) {
            Some(verbindung) => {
                verbindung.user_data = user_data;
                true
            }
            None => false,
        }
    }

    /// Entfernt eine Verbindung
    pub fn entfernen(&mut self, id: &ConnectionId) -> Option<Verbindung> {
        self.verbindungen.remove(id)
    }

    /// Prueft ob eine Verbindung registriert und ihr Transport noch aktiv ist
    pub fn ist_lebendig(&self, id: &ConnectionId) -> bool {
        self.verbindungen
            .get(id)
            .is_some_and(Verbindung::ist_lebendig)
    }

    /// Prueft ob eine Verbindung registriert ist (unabhaengig von Lebendigkeit)
    pub fn ist_registriert(&self, id: &ConnectionId) -> bool {
        self.verbindungen.contains_key(id)
    }

    /// Gibt die Verbindung zurueck
    pub fn verbindung(&self, id: &ConnectionId) -> Option<&Verbindung> {
        self.verbindungen.get(id)
    }

    /// Sendet ein Ereignis an eine Verbindung (best effort)
    ///
    /// Gibt `true` zurueck wenn die Verbindung bekannt ist und das Ereignis
    /// eingereiht wurde.
    pub fn senden(&self, id: &ConnectionId, ereignis: ServerEvent) -> bool {
        match self.verbindungen.get(id) {
            Some(verbindung) => verbindung.sender.senden(ereignis),
            None => {
                tracing::debug!(connection_id = %id, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    /// Anzahl der registrierten Verbindungen
    pub fn anzahl(&self) -> usize {
        self.verbindungen.len()
    }
}
