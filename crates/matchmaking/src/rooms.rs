//! Raum-Registry – Aktive Zweier-Sitzungen
//!
//! Ein Raum hat fuer seine gesamte Lebensdauer genau zwei verschiedene
//! Teilnehmer. Er wird nie veraendert, nur erstellt und wieder entfernt.
//! Ein Rueckwaerts-Index Verbindung -> Raum erlaubt die Suche ohne Scan.

use chatonimy_core::types::{ConnectionId, RoomId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Raum
// ---------------------------------------------------------------------------

/// Eine aktive Chat-Sitzung zwischen zwei Verbindungen
#[derive(Debug, Clone, PartialEq)]
pub struct Raum {
    pub id: RoomId,
    /// Reihenfolge: [Suchender, wartender Partner]
    pub teilnehmer: [ConnectionId; 2],
    pub erstellt_am: DateTime<Utc>,
}

impl Raum {
    /// Prueft ob die Verbindung Teilnehmer des Raums ist
    pub fn enthaelt(&self, id: &ConnectionId) -> bool {
        self.teilnehmer.contains(id)
    }

    /// Gibt den jeweils anderen Teilnehmer zurueck
    pub fn partner_von(&self, id: &ConnectionId) -> Option<ConnectionId> {
        match self.teilnehmer {
            [a, b] if a == *id => Some(b),
            [a, b] if b == *id => Some(a),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomRegistry
// ---------------------------------------------------------------------------

/// Verwaltet alle aktiven Raeume
#[derive(Debug, Default)]
pub struct RoomRegistry {
    raeume: HashMap<RoomId, Raum>,
    /// Verbindung -> Raum in dem sie sitzt
    zuordnung: HashMap<ConnectionId, RoomId>,
}

impl RoomRegistry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Erstellt einen Raum fuer zwei Verbindungen
    ///
    /// Gibt `None` zurueck wenn beide IDs gleich sind oder eine der beiden
    /// bereits in einem Raum sitzt.
    pub fn erstellen(&mut self, a: ConnectionId, b: ConnectionId) -> Option<Raum> {
        if a == b || self.zuordnung.contains_key(&a) || self.zuordnung.contains_key(&b) {
            return None;
        }

        let raum = Raum {
            id: RoomId::new(),
            teilnehmer: [a, b],
            erstellt_am: Utc::now(),
        };
        self.zuordnung.insert(a, raum.id);
        self.zuordnung.insert(b, raum.id);
        self.raeume.insert(raum.id, raum.clone());
        Some(raum)
    }

    /// Entfernt einen Raum samt Zuordnungen
    pub fn entfernen(&mut self, id: &RoomId) -> Option<Raum> {
        let raum = self.raeume.remove(id)?;
        for teilnehmer in &raum.teilnehmer {
            self.zuordnung.remove(teilnehmer);
        }
        Some(raum)
    }

    /// Gibt einen Raum zurueck
    pub fn raum(&self, id: &RoomId) -> Option<&Raum> {
        self.raeume.get(id)
    }

    /// Gibt den Raum zurueck in dem eine Verbindung sitzt
    pub fn raum_von(&self, id: &ConnectionId) -> Option<RoomId> {
        self.zuordnung.get(id).copied()
    }

    /// Anzahl aktiver Raeume
    pub fn anzahl(&self) -> usize {
        self.raeume.len()
    }

    /// Alle aktiven Raeume
    pub fn iter(&self) -> impl Iterator<Item = &Raum> {
        self.raeume.values()
    }
}
