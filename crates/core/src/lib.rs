//! chatonimy-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die Identifikationstypen bereit, die vom Protokoll,
//! der Vermittlung und dem Server gemeinsam genutzt werden.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{ConnectionId, RoomId};
