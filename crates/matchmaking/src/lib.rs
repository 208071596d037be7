//! chatonimy-matchmaking – Anonyme Zweier-Chats
//!
//! Dieser Crate implementiert die Partnervermittlung fuer Chatonimy: eine
//! FIFO-Warteschlange, Zweier-Raeume, das Weiterleiten von Nachrichten und
//! Tipp-Indikatoren sowie das Aufraeumen bei Verlassen und Trennung.
//!
//! ## Architektur
//!
//! ```text
//! GET /ws (ws_router)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  EventCodec: Text-Frame <-> ClientEvent / ServerEvent
//!     |
//!     v
//! ChatHub (ein Task, besitzt ChatState)
//!     |
//!     +-- Matchmaker   (findPartner, cancelSearch)
//!     +-- Lifecycle    (Verbinden, Trennen, leaveChat)
//!     +-- Relay        (sendMessage, typing)
//!
//! ChatState = ConnectionRegistry + WaitingQueue + RoomRegistry
//! ```

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod lifecycle;
pub mod matchmaker;
pub mod queue;
pub mod registry;
pub mod relay;
pub mod rooms;
pub mod sender;
pub mod state;
pub mod ws;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use config::ChatConfig;
pub use connection::ClientConnection;
pub use error::{MatchmakingError, MatchmakingResult};
pub use hub::{ChatHub, HubBefehl};
pub use matchmaker::SuchErgebnis;
pub use queue::WaitingQueue;
pub use registry::{ConnectionRegistry, Verbindung};
pub use rooms::{Raum, RoomRegistry};
pub use sender::ClientSender;
pub use state::{ChatState, ChatStatus};
pub use ws::{ws_router, WsState};
