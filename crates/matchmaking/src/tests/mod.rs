//! Ablauf-, Invarianten- und Transport-Tests ueber mehrere Operationen hinweg


use chatonimy_core::types::ConnectionId;
use chatonimy_protocol::ServerEvent;
use tokio::sync::mpsc;

use crate::sender::ClientSender;
use crate::state::ChatState;

/// Test-Client mit eigener Empfangs-Queue
pub(crate) struct TestClient {
    pub id: ConnectionId,
    pub rx: mpsc::Receiver<ServerEvent>,
}

impl TestClient {
    /// Verbindet einen neuen Client mit dem Zustand
    pub fn verbinden(state: &mut ChatState) -> Self {
        let id = ConnectionId::new();
        let (sender, rx) = ClientSender::neu(id, 64);
        state.verbindung_hergestellt(sender);
        Self { id, rx }
    }

    /// Liest alle bisher zugestellten Ereignisse
    pub fn ereignisse(&mut self) -> Vec<ServerEvent> {
        let mut ereignisse = Vec::new();
        while let Ok(ereignis) = self.rx.try_recv() {
            ereignisse.push(ereignis);
        }
        ereignisse
    }
}
