//! Fehlertypen fuer die Vermittlung
//!
//! Der Vermittlungskern selbst kennt keine Fehler: jede Operation endet als
//! No-op oder Aufraeumen. Fehler entstehen nur an den Raendern (Hub-Kanal,
//! WebSocket-Transport, Kodierung).

use chatonimy_protocol::WireError;
use thiserror::Error;

/// Fehlertyp fuer Hub und Transport
#[derive(Debug, Error)]
pub enum MatchmakingError {
    /// Hub-Task laeuft nicht mehr (Kanal geschlossen)
    #[error("Hub beendet")]
    HubBeendet,

    /// Protokollfehler (ungueltiger oder zu grosser Frame)
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] WireError),

    /// WebSocket-Fehler
    #[error("Transportfehler: {0}")]
    Transport(#[from] axum::Error),

    /// Maximale Verbindungsanzahl erreicht
    #[error("Server ist voll")]
    ServerVoll,
}

/// Result-Typ fuer die Vermittlung
pub type MatchmakingResult<T> = Result<T, MatchmakingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        assert_eq!(MatchmakingError::HubBeendet.to_string(), "Hub beendet");
        assert_eq!(MatchmakingError::ServerVoll.to_string(), "Server ist voll");
    }

    #[test]
    fn wire_fehler_konvertierung() {
        let wire = WireError::FrameZuGross {
            groesse: 10,
            maximum: 5,
        };
        let fehler: MatchmakingError = wire.into();
        assert!(fehler.to_string().starts_with("Protokollfehler"));
    }
}
