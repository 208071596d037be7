//! Ereignis-Dispatcher – Routet Client-Ereignisse an die Operationen
//!
//! Ereignisse einer Verbindung werden in Empfangsreihenfolge verarbeitet.
//! Es gibt keine Zustandspruefung vorab: jede Operation entscheidet selbst,
//! ob sie im aktuellen Zustand etwas tut oder ein No-op ist.
//!
//! Raum-Referenzen, die keine RoomId sein koennen, verhalten sich wie ein
//! unbekannter Raum: das Ereignis wird still verworfen.

use chatonimy_core::types::{ConnectionId, RoomId};
use chatonimy_protocol::{raum_referenz, ClientEvent};

use crate::state::ChatState;

impl ChatState {
    /// Verarbeitet ein dekodiertes Client-Ereignis
    pub fn ereignis_verarbeiten(&mut self, id: ConnectionId, ereignis: ClientEvent) {
        tracing::trace!(connection_id = %id, ereignis = ereignis.name(), "Ereignis empfangen");

        match ereignis {
            ClientEvent::FindPartner(user_data) => {
                self.partner_suchen(id, user_data);
            }
            ClientEvent::SendMessage(req) => {
                if let Some(raum_id) = raum_nachschlagen(&id, &req.room_id) {
                    self.nachricht_senden(&id, &raum_id, req.message, req.timestamp);
                }
            }
            ClientEvent::Typing(req) => {
                if let Some(raum_id) = raum_nachschlagen(&id, &req.room_id) {
                    self.tippen(&id, &raum_id, req.is_typing);
                }
            }
            ClientEvent::LeaveChat(req) => {
                if let Some(raum_id) = raum_nachschlagen(&id, &req.room_id) {
                    self.chat_verlassen(&id, &raum_id);
                }
            }
            ClientEvent::CancelSearch => {
                self.suche_abbrechen(&id);
            }
        }
    }
}

fn raum_nachschlagen(id: &ConnectionId, referenz: &str) -> Option<RoomId> {
    let raum_id = raum_referenz(referenz);
    if raum_id.is_none() {
        tracing::debug!(connection_id = %id, referenz, "Ereignis fuer unbekannten Raum verworfen");
    }
    raum_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::ClientSender;
    use chatonimy_protocol::control::{LeaveChatRequest, SendMessageRequest, TypingRequest};
    use chatonimy_protocol::{EventCodec, ServerEvent};
    use serde_json::json;

    #[test]
    fn kompletter_ablauf_ueber_ereignisse() {
        let mut state = ChatState::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let (sender_a, mut rx_a) = ClientSender::neu(a, 16);
        let (sender_b, mut rx_b) = ClientSender::neu(b, 16);
        state.verbindung_hergestellt(sender_a);
        state.verbindung_hergestellt(sender_b);

        state.ereignis_verarbeiten(a, ClientEvent::FindPartner(Some(json!({"name": "x"}))));
        assert_eq!(rx_a.try_recv().unwrap(), ServerEvent::WaitingForPartner);

        state.ereignis_verarbeiten(b, ClientEvent::FindPartner(None));
        let raum_id = state.raeume().raum_von(&a).unwrap();
        assert_eq!(rx_a.try_recv().unwrap(), ServerEvent::partner_found(raum_id, b));
        assert_eq!(rx_b.try_recv().unwrap(), ServerEvent::partner_found(raum_id, a));

        state.ereignis_verarbeiten(
            a,
            ClientEvent::SendMessage(SendMessageRequest {
                room_id: raum_id.inner().to_string(),
                message: "hi".into(),
                timestamp: json!("T"),
            }),
        );
        assert_eq!(
            rx_b.try_recv().unwrap(),
            ServerEvent::message_received("hi", json!("T"), a)
        );

        state.ereignis_verarbeiten(
            b,
            ClientEvent::Typing(TypingRequest {
                room_id: raum_id.inner().to_string(),
                is_typing: true,
            }),
        );
        assert_eq!(rx_a.try_recv().unwrap(), ServerEvent::partner_typing(true));

        state.ereignis_verarbeiten(
            b,
            ClientEvent::LeaveChat(LeaveChatRequest {
                room_id: raum_id.inner().to_string(),
            }),
        );
        assert_eq!(rx_a.try_recv().unwrap(), ServerEvent::PartnerLeft);
        assert!(rx_b.try_recv().is_err());
        assert_eq!(state.raeume().anzahl(), 0);
    }

    #[test]
    fn cancel_search_entfernt_aus_warteschlange() {
        let mut state = ChatState::neu();
        let a = ConnectionId::new();
        let (sender, _rx) = ClientSender::neu(a, 4);
        state.verbindung_hergestellt(sender);

        state.ereignis_verarbeiten(a, ClientEvent::FindPartner(None));
        state.ereignis_verarbeiten(a, ClientEvent::CancelSearch);
        assert!(state.warteschlange().is_empty());
    }

    #[test]
    fn metadaten_werden_gespeichert() {
        let mut state = ChatState::neu();
        let a = ConnectionId::new();
        let (sender, _rx) = ClientSender::neu(a, 4);
        state.verbindung_hergestellt(sender);

        state.ereignis_verarbeiten(a, ClientEvent::FindPartner(Some(json!({"alter": 30}))));
        let verbindung = state.verbindungen().verbindung(&a).unwrap();
        assert_eq!(verbindung.user_data, Some(json!({"alter": 30})));
    }

    #[test]
    fn fremde_raum_referenz_wird_still_verworfen() {
        let mut state = ChatState::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let (sender_a, mut rx_a) = ClientSender::neu(a, 16);
        let (sender_b, mut rx_b) = ClientSender::neu(b, 16);
        state.verbindung_hergestellt(sender_a);
        state.verbindung_hergestellt(sender_b);
        state.ereignis_verarbeiten(a, ClientEvent::FindPartner(None));
        state.ereignis_verarbeiten(b, ClientEvent::FindPartner(None));
        while rx_a.try_recv().is_ok() {}
        while rx_b.try_recv().is_ok() {}

        let codec = EventCodec::new();
        let frames = [
            r#"{"event":"sendMessage","data":{"roomId":"R2","message":"hi","timestamp":1}}"#,
            r#"{"event":"typing","data":{"roomId":"R2","isTyping":true}}"#,
            r#"{"event":"leaveChat","data":{"roomId":"R2"}}"#,
        ];
        for frame in frames {
            let ereignis = codec.decode(frame).unwrap();
            state.ereignis_verarbeiten(a, ereignis);
        }

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
        assert_eq!(state.raeume().anzahl(), 1);
        assert_eq!(state.status().nachrichten_gesamt, 0);
    }

    #[test]
    fn nachricht_als_json_objekt_wird_weitergeleitet() {
        let mut state = ChatState::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let (sender_a, _rx_a) = ClientSender::neu(a, 16);
        let (sender_b, mut rx_b) = ClientSender::neu(b, 16);
        state.verbindung_hergestellt(sender_a);
        state.verbindung_hergestellt(sender_b);
        state.ereignis_verarbeiten(a, ClientEvent::FindPartner(None));
        state.ereignis_verarbeiten(b, ClientEvent::FindPartner(None));
        let raum_id = state.raeume().raum_von(&a).unwrap();
        while rx_b.try_recv().is_ok() {}

        let frame = format!(
            r#"{{"event":"sendMessage","data":{{"roomId":"{}","message":{{"text":"hi"}}}}}}"#,
            raum_id.inner()
        );
        let ereignis = EventCodec::new().decode(&frame).unwrap();
        state.ereignis_verarbeiten(a, ereignis);

        assert_eq!(
            rx_b.try_recv().unwrap(),
            ServerEvent::message_received(json!({"text": "hi"}), serde_json::Value::Null, a)
        );
    }
}
