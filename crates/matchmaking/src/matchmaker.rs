//! Matchmaker – Partnersuche ueber die Warteschlange
//!
//! ## Ablauf von `partner_suchen`
//! 1. Metadaten in der Registry setzen
//! 2. Eigenen Warteschlangen-Eintrag entfernen (doppelte Suchanfragen)
//! 3. Laufenden Raum aufloesen; der Partner bekommt `partnerLeft`
//! 4. Kandidaten in FIFO-Reihenfolge ziehen, tote Kandidaten verwerfen
//! 5. Kein lebendiger Kandidat: selbst hinten einreihen
//!
//! Verworfene Kandidaten werden nie wieder eingereiht.

use chatonimy_core::types::{ConnectionId, RoomId};
use chatonimy_protocol::ServerEvent;

use crate::state::ChatState;

/// Ergebnis einer Partnersuche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuchErgebnis {
    /// Raum erstellt, beide Seiten benachrichtigt
    Gepaart {
        raum_id: RoomId,
        partner_id: ConnectionId,
    },
    /// Kein Partner verfuegbar, Verbindung wartet
    Wartend,
    /// Verbindung ist nicht registriert; nichts veraendert
    Unbekannt,
}

impl ChatState {
    /// Sucht einen Partner fuer eine Verbindung
    pub fn partner_suchen(
        &mut self,
        id: ConnectionId,
        user_data: Option<serde_json::Value>,
    ) -> SuchErgebnis {
        if !self.verbindungen.metadaten_setzen(&id, user_data) {
            tracing::warn!(connection_id = %id, "Partnersuche von unbekannter Verbindung");
            return SuchErgebnis::Unbekannt;
        }

        self.warteschlange.entfernen(&id);

        // Eine neue Suche beendet die alte Sitzung
        if let Some(raum_id) = self.raeume.raum_von(&id) {
            self.raum_aufloesen(raum_id, &id, ServerEvent::PartnerLeft);
        }

        while let Some(kandidat) = self.warteschlange.naechster() {
            if kandidat == id {
                tracing::warn!(connection_id = %id, "Eigener Eintrag in der Warteschlange verworfen");
                continue;
            }

            if !self.verbindungen.ist_lebendig(&kandidat) {
                self.verbindungen.entfernen(&kandidat);
                self.statistik.verworfene_kandidaten += 1;
                tracing::debug!(
                    connection_id = %id,
                    kandidat = %kandidat,
                    "Toter Kandidat aus der Warteschlange verworfen"
                );
                continue;
            }

            let Some(raum) = self.raeume.erstellen(id, kandidat) else {
                // Kann bei konsistentem Zustand nicht passieren: beide sitzen in keinem Raum
                tracing::error!(
                    connection_id = %id,
                    kandidat = %kandidat,
                    "Raum konnte nicht erstellt werden"
                );
                continue;
            };
            self.statistik.raeume_erstellt += 1;

            self.verbindungen
                .senden(&id, ServerEvent::partner_found(raum.id, kandidat));
            self.verbindungen
                .senden(&kandidat, ServerEvent::partner_found(raum.id, id));

            tracing::info!(
                room_id = %raum.id,
                connection_id = %id,
                partner_id = %kandidat,
                "Raum erstellt"
            );
            return SuchErgebnis::Gepaart {
                raum_id: raum.id,
                partner_id: kandidat,
            };
        }

        self.warteschlange.einreihen(id);
        self.verbindungen.senden(&id, ServerEvent::WaitingForPartner);
        tracing::debug!(
            connection_id = %id,
            wartende = self.warteschlange.len(),
            "Verbindung in Warteschlange eingereiht"
        );
        SuchErgebnis::Wartend
    }

    /// Bricht die Partnersuche ab; No-op wenn die Verbindung nicht wartet
    pub fn suche_abbrechen(&mut self, id: &ConnectionId) -> bool {
        let entfernt = self.warteschlange.entfernen(id);
        if entfernt {
            tracing::debug!(connection_id = %id, "Partnersuche abgebrochen");
        }
        entfernt
    }
}
