//! Chat-Ereignisse (WebSocket)
//!
//! Definiert alle benannten Ereignisse die zwischen Client und Server
//! ausgetauscht werden.
//!
//! ## Design
//! - Umschlag `{"event": "<name>", "data": <payload>}` (Adjacently Tagged Enum)
//! - Ereignisse ohne Nutzdaten lassen `data` weg
//! - Feldnamen in den Nutzdaten sind camelCase (`roomId`, `isTyping`, ...)
//! - `userData`, `message` und `timestamp` sind undurchsichtiges JSON und
//!   werden unveraendert durchgereicht
//! - `roomId` in Client-Ereignissen ist eine undurchsichtige Zeichenkette.
//!   Nur ein fehlendes Feld macht den Frame ungueltig; eine Referenz, die
//!   keine RoomId ist, passt einfach zu keinem Raum.

use chatonimy_core::types::{ConnectionId, RoomId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer `error`-Ereignisse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Frame konnte nicht als Ereignis gelesen werden
    InvalidRequest,
    /// Frame ueberschreitet die maximale Groesse
    FrameTooLarge,
    /// Binaer-Frames werden nicht unterstuetzt
    UnsupportedFrame,
}

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Loest eine Raum-Referenz aus einem Client-Ereignis auf
///
/// `None` heisst: die Referenz kann keinen existierenden Raum bezeichnen.
pub fn raum_referenz(room_id: &str) -> Option<RoomId> {
    room_id.parse().ok()
}

/// Chat-Nachricht an den Partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub room_id: String,
    pub message: serde_json::Value,
    /// Client-Zeitstempel, wird unveraendert weitergeleitet
    #[serde(default)]
    pub timestamp: serde_json::Value,
}

/// Tipp-Indikator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingRequest {
    pub room_id: String,
    pub is_typing: bool,
}

/// Chat verlassen (ohne die Verbindung zu trennen)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveChatRequest {
    pub room_id: String,
}

/// Alle Ereignisse die ein Client senden darf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Partnersuche starten; Nutzdaten sind frei waehlbare Benutzer-Metadaten
    FindPartner(Option<serde_json::Value>),
    SendMessage(SendMessageRequest),
    Typing(TypingRequest),
    LeaveChat(LeaveChatRequest),
    CancelSearch,
}

impl ClientEvent {
    /// Ereignisname wie auf dem Draht
    pub fn name(&self) -> &'static str {
        match self {
            Self::FindPartner(_) => "findPartner",
            Self::SendMessage(_) => "sendMessage",
            Self::Typing(_) => "typing",
            Self::LeaveChat(_) => "leaveChat",
            Self::CancelSearch => "cancelSearch",
        }
    }
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Partner gefunden, Raum wurde erstellt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerFound {
    pub room_id: RoomId,
    pub partner_id: ConnectionId,
}

/// Weitergeleitete Chat-Nachricht
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceived {
    pub message: serde_json::Value,
    pub timestamp: serde_json::Value,
    pub sender_id: ConnectionId,
}

/// Weitergeleiteter Tipp-Indikator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerTyping {
    pub is_typing: bool,
}

/// Fehler-Antwort der Transportschicht (erreicht nie den Vermittlungskern)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

/// Alle Ereignisse die der Server an einen Client sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    WaitingForPartner,
    PartnerFound(PartnerFound),
    PartnerLeft,
    PartnerDisconnected,
    MessageReceived(MessageReceived),
    PartnerTyping(PartnerTyping),
    Error(ErrorResponse),
}

impl ServerEvent {
    /// Erstellt ein `partnerFound`-Ereignis
    pub fn partner_found(room_id: RoomId, partner_id: ConnectionId) -> Self {
        Self::PartnerFound(PartnerFound {
            room_id,
            partner_id,
        })
    }

    /// Erstellt ein `messageReceived`-Ereignis
    pub fn message_received(
        message: impl Into<serde_json::Value>,
        timestamp: serde_json::Value,
        sender_id: ConnectionId,
    ) -> Self {
        Self::MessageReceived(MessageReceived {
            message: message.into(),
            timestamp,
            sender_id,
        })
    }

    /// Erstellt ein `partnerTyping`-Ereignis
    pub fn partner_typing(is_typing: bool) -> Self {
        Self::PartnerTyping(PartnerTyping { is_typing })
    }

    /// Erstellt ein `error`-Ereignis
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ErrorResponse {
            code,
            message: message.into(),
        })
    }

    /// Ereignisname wie auf dem Draht
    pub fn name(&self) -> &'static str {
        match self {
            Self::WaitingForPartner => "waitingForPartner",
            Self::PartnerFound(_) => "partnerFound",
            Self::PartnerLeft => "partnerLeft",
            Self::PartnerDisconnected => "partnerDisconnected",
            Self::MessageReceived(_) => "messageReceived",
            Self::PartnerTyping(_) => "partnerTyping",
            Self::Error(_) => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn find_partner_mit_metadaten() {
        let ereignis: ClientEvent = serde_json::from_value(json!({
            "event": "findPartner",
            "data": { "interests": ["musik"] }
        }))
        .unwrap();

        match ereignis {
            ClientEvent::FindPartner(Some(daten)) => {
                assert_eq!(daten["interests"][0], "musik");
            }
            anders => panic!("Erwartet FindPartner, erhalten {anders:?}"),
        }
    }

    #[test]
    fn find_partner_ohne_daten() {
        let ereignis: ClientEvent =
            serde_json::from_value(json!({ "event": "findPartner" })).unwrap();
        assert_eq!(ereignis, ClientEvent::FindPartner(None));
    }

    #[test]
    fn send_message_camel_case() {
        let raum = RoomId(Uuid::nil());
        let ereignis: ClientEvent = serde_json::from_value(json!({
            "event": "sendMessage",
            "data": {
                "roomId": raum,
                "message": "hi",
                "timestamp": "2024-01-01T12:00:00.000Z"
            }
        }))
        .unwrap();

        let ClientEvent::SendMessage(req) = ereignis else {
            panic!("Erwartet SendMessage");
        };
        assert_eq!(raum_referenz(&req.room_id), Some(raum));
        assert_eq!(req.message, "hi");
        assert_eq!(req.timestamp, json!("2024-01-01T12:00:00.000Z"));
    }

    #[test]
    fn fremde_raum_referenz_wird_gelesen() {
        let ereignis: ClientEvent = serde_json::from_value(json!({
            "event": "sendMessage",
            "data": { "roomId": "R2", "message": { "text": "hi" } }
        }))
        .unwrap();

        let ClientEvent::SendMessage(req) = ereignis else {
            panic!("Erwartet SendMessage");
        };
        assert_eq!(req.room_id, "R2");
        assert_eq!(raum_referenz(&req.room_id), None);
        assert_eq!(req.message["text"], "hi");
        assert_eq!(req.timestamp, serde_json::Value::Null);
    }

    #[test]
    fn send_message_ohne_room_id_ist_ungueltig() {
        let ergebnis = serde_json::from_value::<ClientEvent>(json!({
            "event": "sendMessage",
            "data": { "message": "hi" }
        }));
        assert!(ergebnis.is_err());
    }

    #[test]
    fn cancel_search_ohne_daten() {
        let ereignis: ClientEvent =
            serde_json::from_value(json!({ "event": "cancelSearch" })).unwrap();
        assert_eq!(ereignis, ClientEvent::CancelSearch);
        assert_eq!(ereignis.name(), "cancelSearch");
    }

    #[test]
    fn unbekanntes_ereignis_wird_abgelehnt() {
        let ergebnis =
            serde_json::from_value::<ClientEvent>(json!({ "event": "joinRoom", "data": {} }));
        assert!(ergebnis.is_err());
    }

    #[test]
    fn partner_found_format() {
        let raum = RoomId(Uuid::nil());
        let partner = ConnectionId(Uuid::nil());
        let json = serde_json::to_value(ServerEvent::partner_found(raum, partner)).unwrap();

        assert_eq!(json["event"], "partnerFound");
        assert_eq!(json["data"]["roomId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["data"]["partnerId"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn signale_ohne_nutzdaten() {
        let json = serde_json::to_value(ServerEvent::PartnerDisconnected).unwrap();
        assert_eq!(json, json!({ "event": "partnerDisconnected" }));

        let json = serde_json::to_value(ServerEvent::WaitingForPartner).unwrap();
        assert_eq!(json, json!({ "event": "waitingForPartner" }));
    }

    #[test]
    fn message_received_format() {
        let absender = ConnectionId::new();
        let json = serde_json::to_value(ServerEvent::message_received(
            "hallo",
            json!(1700000000000u64),
            absender,
        ))
        .unwrap();

        assert_eq!(json["event"], "messageReceived");
        assert_eq!(json["data"]["message"], "hallo");
        assert_eq!(json["data"]["timestamp"], 1700000000000u64);
        assert_eq!(json["data"]["senderId"], absender.inner().to_string());
    }

    #[test]
    fn error_codes_format() {
        let json =
            serde_json::to_value(ServerEvent::error(ErrorCode::FrameTooLarge, "zu gross")).unwrap();
        assert_eq!(json["data"]["code"], "FRAME_TOO_LARGE");
    }
}
