//! Wire-Format fuer WebSocket-Verbindungen
//!
//! Jedes Ereignis ist genau ein WebSocket-Text-Frame mit JSON-Umschlag.
//!
//! ## Frame-Format
//!
//! ```text
//! {"event": "sendMessage", "data": {"roomId": "...", "message": "hi", "timestamp": ...}}
//! ```
//!
//! Maximale Frame-Groesse ist konfigurierbar (Standard: 64 KB). Ungueltige
//! Frames werden von der Transportschicht abgelehnt und erreichen nie den
//! Vermittlungskern.

use thiserror::Error;

use crate::control::{ClientEvent, ErrorCode, ServerEvent};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Standard-maximale Frame-Groesse (64 KB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Fehler
// ---------------------------------------------------------------------------

/// Fehler beim Lesen oder Schreiben eines Frames
#[derive(Debug, Error)]
pub enum WireError {
    /// Frame ueberschreitet die maximale Groesse
    #[error("Frame zu gross: {groesse} Bytes (Maximum: {maximum} Bytes)")]
    FrameZuGross { groesse: usize, maximum: usize },

    /// Ungueltiges JSON oder unbekanntes Ereignis
    #[error("JSON-Verarbeitung fehlgeschlagen: {0}")]
    Json(#[from] serde_json::Error),
}

impl WireError {
    /// Fehler-Code fuer die `error`-Antwort an den Client
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::FrameZuGross { .. } => ErrorCode::FrameTooLarge,
            Self::Json(_) => ErrorCode::InvalidRequest,
        }
    }

    /// Baut die `error`-Antwort fuer den Client
    pub fn als_ereignis(&self) -> ServerEvent {
        ServerEvent::error(self.code(), self.to_string())
    }
}

// ---------------------------------------------------------------------------
// EventCodec
// ---------------------------------------------------------------------------

/// Kodiert und dekodiert Ereignisse fuer WebSocket-Text-Frames
#[derive(Debug, Clone)]
pub struct EventCodec {
    /// Maximale erlaubte Frame-Groesse in Bytes
    max_frame_size: usize,
}

impl EventCodec {
    /// Erstellt einen neuen `EventCodec` mit Standard-Limits
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Erstellt einen `EventCodec` mit benutzerdefinierter maximaler Frame-Groesse
    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Gibt die konfigurierte maximale Frame-Groesse zurueck
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Liest ein Client-Ereignis aus einem Text-Frame
    pub fn decode(&self, text: &str) -> Result<ClientEvent, WireError> {
        self.groesse_pruefen(text.len())?;
        Ok(serde_json::from_str(text)?)
    }

    /// Schreibt ein Server-Ereignis als Text-Frame
    pub fn encode(&self, ereignis: &ServerEvent) -> Result<String, WireError> {
        let json = serde_json::to_string(ereignis)?;
        self.groesse_pruefen(json.len())?;
        Ok(json)
    }

    fn groesse_pruefen(&self, groesse: usize) -> Result<(), WireError> {
        if groesse > self.max_frame_size {
            return Err(WireError::FrameZuGross {
                groesse,
                maximum: self.max_frame_size,
            });
        }
        Ok(())
    }
}

impl Default for EventCodec {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
