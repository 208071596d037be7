//! Warteschlange – FIFO der partnersuchenden Verbindungen
//!
//! Explizite Reihenfolge (`VecDeque`) plus paralleler Index fuer O(1)
//! Mitgliedschaft und Entfernen. Entfernte Eintraege bleiben als Grabsteine in
//! der Reihenfolge stehen und werden beim Herausnehmen uebersprungen; die
//! Sequenznummer verhindert, dass ein erneut eingereihter Client seinen alten
//! Platz zurueckbekommt.

use chatonimy_core::types::ConnectionId;
use std::collections::{HashMap, VecDeque};

/// Ab diesem Verhaeltnis Grabsteine zu Mitgliedern wird kompaktiert
const KOMPAKTIER_FAKTOR: usize = 2;
/// Mindestlaenge bevor ueberhaupt kompaktiert wird
const KOMPAKTIER_MINIMUM: usize = 64;

/// FIFO-Warteschlange ohne Duplikate
#[derive(Debug, Default)]
pub struct WaitingQueue {
    reihenfolge: VecDeque<(ConnectionId, u64)>,
    mitglieder: HashMap<ConnectionId, u64>,
    naechste_sequenz: u64,
}

impl WaitingQueue {
    /// Erstellt eine leere Warteschlange
    pub fn neu() -> Self {
        Self::default()
    }

    /// Haengt eine Verbindung hinten an
    ///
    /// Gibt `false` zurueck wenn sie bereits wartet (Position bleibt erhalten).
    pub fn einreihen(&mut self, id: ConnectionId) -> bool {
        if self.mitglieder.contains_key(&id) {
            return false;
        }
        let sequenz = self.naechste_sequenz;
        self.naechste_sequenz += 1;
        self.mitglieder.insert(id, sequenz);
        self.reihenfolge.push_back((id, sequenz));
        true
    }

    /// Entfernt eine Verbindung; No-op wenn sie nicht wartet
    pub fn entfernen(&mut self, id: &ConnectionId) -> bool {
        let entfernt = self.mitglieder.remove(id).is_some();
        if entfernt {
            self.kompaktieren_falls_noetig();
        }
        entfernt
    }

    /// Nimmt die am laengsten wartende Verbindung heraus
    pub fn naechster(&mut self) -> Option<ConnectionId> {
        while let Some((id, sequenz)) = self.reihenfolge.pop_front() {
            if self.mitglieder.get(&id) == Some(&sequenz) {
                self.mitglieder.remove(&id);
                return Some(id);
            }
        }
        None
    }

    /// Prueft ob eine Verbindung wartet
    pub fn enthaelt(&self, id: &ConnectionId) -> bool {
        self.mitglieder.contains_key(id)
    }

    /// Anzahl wartender Verbindungen
    pub fn len(&self) -> usize {
        self.mitglieder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mitglieder.is_empty()
    }

    /// Wartende Verbindungen in FIFO-Reihenfolge
    pub fn iter(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.reihenfolge
            .iter()
            .filter(|(id, sequenz)| self.mitglieder.get(id) == Some(sequenz))
            .map(|(id, _)| *id)
    }

    fn kompaktieren_falls_noetig(&mut self) {
        let schwelle = (self.mitglieder.len() * KOMPAKTIER_FAKTOR).max(KOMPAKTIER_MINIMUM);
        if self.reihenfolge.len() > schwelle {
            let mitglieder = &self.mitglieder;
            self.reihenfolge
                .retain(|(id, sequenz)| mitglieder.get(id) == Some(sequenz));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_reihenfolge() {
        let mut queue = WaitingQueue::neu();
        let ids: Vec<ConnectionId> = (0..3).map(|_| ConnectionId::new()).collect();
        for id in &ids {
            assert!(queue.einreihen(*id));
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.naechster(), Some(ids[0]));
        assert_eq!(queue.naechster(), Some(ids[1]));
        assert_eq!(queue.naechster(), Some(ids[2]));
        assert_eq!(queue.naechster(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn keine_duplikate() {
        let mut queue = WaitingQueue::neu();
        let id = ConnectionId::new();

        assert!(queue.einreihen(id));
        assert!(!queue.einreihen(id));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().count(), 1);
    }

    #[test]
    fn entfernen_ist_idempotent() {
        let mut queue = WaitingQueue::neu();
        let id = ConnectionId::new();

        assert!(!queue.entfernen(&id));
        queue.einreihen(id);
        assert!(queue.entfernen(&id));
        assert!(!queue.entfernen(&id));
        assert!(!queue.enthaelt(&id));
        assert_eq!(queue.naechster(), None);
    }

    #[test]
    fn erneut_eingereiht_kommt_ans_ende() {
        let mut queue = WaitingQueue::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        queue.einreihen(a);
        queue.einreihen(b);
        queue.entfernen(&a);
        queue.einreihen(a);

        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(queue.naechster(), Some(b));
        assert_eq!(queue.naechster(), Some(a));
    }

    #[test]
    fn kompaktieren_behaelt_reihenfolge() {
        let mut queue = WaitingQueue::neu();
        let bleibend = ConnectionId::new();
        queue.einreihen(bleibend);

        for _ in 0..(KOMPAKTIER_MINIMUM * 3) {
            let id = ConnectionId::new();
            queue.einreihen(id);
            queue.entfernen(&id);
        }

        assert!(queue.reihenfolge.len() <= KOMPAKTIER_MINIMUM + 1);
        assert_eq!(queue.naechster(), Some(bleibend));
    }
}
