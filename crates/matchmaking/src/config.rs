//! Laufzeit-Konfiguration fuer Hub und Verbindungen

use chatonimy_protocol::wire::DEFAULT_MAX_FRAME_SIZE;

use crate::sender::SEND_QUEUE_GROESSE;

/// Einstellungen fuer den Chat-Transport
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// Groesse der Send-Queue pro Verbindung
    pub send_queue_groesse: usize,
    /// Maximale Groesse eines eingehenden Frames in Bytes
    pub max_frame_groesse: usize,
    /// Maximale gleichzeitige Verbindungen
    pub max_verbindungen: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            keepalive_sek: 25,
            verbindungs_timeout_sek: 60,
            send_queue_groesse: SEND_QUEUE_GROESSE,
            max_frame_groesse: DEFAULT_MAX_FRAME_SIZE,
            max_verbindungen: 10_000,
        }
    }
}
