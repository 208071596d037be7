//! Message-Relay – Nachrichten und Tipp-Indikatoren an den Partner
//!
//! Weitergeleitet wird nur, wenn der Raum existiert und der Absender einer
//! seiner beiden Teilnehmer ist. Alles andere wird still verworfen: eine
//! Nachricht an einen gerade geschlossenen Raum ist kein Fehler.
//!
//! Tipp-Indikatoren unterliegen derselben Mitgliedschaftspruefung wie
//! Nachrichten.

use chatonimy_core::types::{ConnectionId, RoomId};
use chatonimy_protocol::ServerEvent;

use crate::state::ChatState;

impl ChatState {
    /// Leitet eine Chat-Nachricht an den Partner weiter
    ///
    /// Gibt `true` zurueck wenn die Nachricht an einen Partner ging
    /// (unabhaengig davon, ob dessen Queue sie annehmen konnte).
    pub fn nachricht_senden(
        &mut self,
        absender: &ConnectionId,
        raum_id: &RoomId,
        nachricht: serde_json::Value,
        zeitstempel: serde_json::Value,
    ) -> bool {
        let Some(partner) = self.partner_in_raum(absender, raum_id) else {
            tracing::debug!(
                connection_id = %absender,
                room_id = %raum_id,
                "Nachricht an unbekannten oder fremden Raum verworfen"
            );
            return false;
        };

        self.verbindungen.senden(
            &partner,
            ServerEvent::message_received(nachricht, zeitstempel, *absender),
        );
        self.statistik.nachrichten_weitergeleitet += 1;
        tracing::trace!(connection_id = %absender, room_id = %raum_id, "Nachricht weitergeleitet");
        true
    }

    /// Leitet einen Tipp-Indikator an den Partner weiter
    pub fn tippen(&mut self, absender: &ConnectionId, raum_id: &RoomId, tippt: bool) -> bool {
        let Some(partner) = self.partner_in_raum(absender, raum_id) else {
            tracing::debug!(
                connection_id = %absender,
                room_id = %raum_id,
                "Tipp-Indikator an unbekannten oder fremden Raum verworfen"
            );
            return false;
        };

        self.verbindungen
            .senden(&partner, ServerEvent::partner_typing(tippt));
        true
    }

    fn partner_in_raum(&self, absender: &ConnectionId, raum_id: &RoomId) -> Option<ConnectionId> {
        self.raeume.raum(raum_id)?.partner_von(absender)
    }
}
