//! chatonimy-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle benannten Ereignisse, die zwischen Client und
//! Server ausgetauscht werden, sowie deren Kodierung als WebSocket-Frames.

pub mod control;
pub mod wire;

pub use control::{raum_referenz, ClientEvent, ErrorCode, ServerEvent};
pub use wire::{EventCodec, WireError};
