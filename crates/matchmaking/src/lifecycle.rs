//! Sitzungs-Lebenszyklus – Verbinden, Trennen, Chat verlassen
//!
//! ## Zustaende pro Verbindung
//! ```text
//! Idle -> Searching -> Paired -> Idle
//!           |                     ^
//!           +------ cancel -------+
//!
//! {Idle | Searching | Paired} -> beendet (Trennung)
//! ```
//!
//! Der verbleibende Partner landet nach Verlassen oder Trennung in `Idle` und
//! muss selbst erneut suchen. Trennen gelingt immer und wartet nie auf eine
//! Bestaetigung des Partners.

use chatonimy_core::types::{ConnectionId, RoomId};
use chatonimy_protocol::ServerEvent;

use crate::rooms::Raum;
use crate::sender::ClientSender;
use crate::state::ChatState;

impl ChatState {
    /// Registriert eine neue Verbindung (Zustand `Idle`)
    pub fn verbindung_hergestellt(&mut self, sender: ClientSender) {
        let id = sender.connection_id;
        self.verbindungen.registrieren(sender);
        tracing::info!(
            connection_id = %id,
            verbindungen = self.verbindungen.anzahl(),
            "Verbindung hergestellt"
        );
    }

    /// Raeumt alles zu einer getrennten Verbindung auf
    ///
    /// Gibt den aufgeloesten Raum zurueck, falls die Verbindung in einem sass.
    pub fn verbindung_getrennt(&mut self, id: &ConnectionId) -> Option<RoomId> {
        self.warteschlange.entfernen(id);

        let aufgeloest = self
            .raeume
            .raum_von(id)
            .and_then(|raum_id| self.raum_aufloesen(raum_id, id, ServerEvent::PartnerDisconnected))
            .map(|raum| raum.id);

        self.verbindungen.entfernen(id);
        tracing::info!(
            connection_id = %id,
            verbindungen = self.verbindungen.anzahl(),
            "Verbindung getrennt"
        );
        aufgeloest
    }

    /// Verlaesst einen Chat ohne die Verbindung zu trennen
    ///
    /// Unbekannter Raum oder fremde Verbindung ist ein stiller No-op: beide
    /// Teilnehmer koennen gleichzeitig gehen.
    pub fn chat_verlassen(&mut self, id: &ConnectionId, raum_id: &RoomId) -> bool {
        let ist_teilnehmer = self
            .raeume
            .raum(raum_id)
            .is_some_and(|raum| raum.enthaelt(id));

        if !ist_teilnehmer {
            tracing::debug!(
                connection_id = %id,
                room_id = %raum_id,
                "Verlassen eines unbekannten oder fremden Raums ignoriert"
            );
            return false;
        }

        self.raum_aufloesen(*raum_id, id, ServerEvent::PartnerLeft)
            .is_some()
    }

    /// Loest einen Raum auf und benachrichtigt den verbleibenden Partner
    pub(crate) fn raum_aufloesen(
        &mut self,
        raum_id: RoomId,
        ausloeser: &ConnectionId,
        signal: ServerEvent,
    ) -> Option<Raum> {
        let raum = self.raeume.entfernen(&raum_id)?;
        let grund = signal.name();

        if let Some(partner) = raum.partner_von(ausloeser) {
            self.verbindungen.senden(&partner, signal);
        }

        tracing::info!(
            room_id = %raum.id,
            ausloeser = %ausloeser,
            grund,
            dauer_sek = (chrono::Utc::now() - raum.erstellt_am).num_seconds(),
            "Raum aufgeloest"
        );
        Some(raum)
    }
}
