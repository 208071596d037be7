//! Gemeinsame Identifikationstypen fuer Chatonimy
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Verbindungs- und Raum-IDs zur Compilezeit auszuschliessen. Auf dem Draht
//! erscheinen beide als nackte UUID-Strings.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Eindeutige ID einer Transport-Verbindung
///
/// Gilt nur fuer die Dauer einer Verbindung; ein Reconnect bekommt eine neue ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Eindeutige ID eines Chat-Raums (einer Zweier-Sitzung)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub Uuid);

impl RoomId {
    /// Erstellt eine neue zufaellige RoomId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room:{}", self.0)
    }
}

/// Liest eine RoomId aus ihrer Draht-Form (nackte UUID)
impl FromStr for RoomId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_eindeutig() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b, "Zwei neue ConnectionIds muessen verschieden sein");
    }

    #[test]
    fn room_id_display() {
        let id = RoomId(Uuid::nil());
        assert!(id.to_string().starts_with("room:"));
    }

    #[test]
    fn room_id_aus_draht_form() {
        let id = RoomId::new();
        assert_eq!(id.inner().to_string().parse::<RoomId>().unwrap(), id);
        assert!("R2".parse::<RoomId>().is_err());
        assert!("".parse::<RoomId>().is_err());
    }

    #[test]
    fn ids_serialisieren_als_nackte_uuid() {
        let id = ConnectionId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");

        let zurueck: ConnectionId = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, id);
    }
}
