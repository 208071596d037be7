//! Vermittlungs-Zustand
//!
//! `ChatState` besitzt die drei Container (Verbindungen, Warteschlange,
//! Raeume) und ist das einzige Objekt, das sie veraendert. Die Operationen
//! sind auf mehrere Module verteilt:
//!
//! - `matchmaker` – Partnersuche und Abbruch
//! - `lifecycle`  – Verbinden, Trennen, Chat verlassen
//! - `relay`      – Nachrichten und Tipp-Indikatoren weiterleiten
//!
//! Alle Methoden sind synchron und nehmen `&mut self`: es gibt genau einen
//! Schreiber (den Hub-Task), daher keine Locks.

use serde::Serialize;

use crate::queue::WaitingQueue;
use crate::registry::ConnectionRegistry;
use crate::rooms::RoomRegistry;

/// Laufende Zaehler seit Prozessstart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistik {
    pub raeume_erstellt: u64,
    pub nachrichten_weitergeleitet: u64,
    pub verworfene_kandidaten: u64,
}

/// Momentaufnahme fuer Status-Endpunkt und Metriken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChatStatus {
    pub aktive_verbindungen: usize,
    pub wartende: usize,
    pub aktive_raeume: usize,
    pub raeume_erstellt_gesamt: u64,
    pub nachrichten_gesamt: u64,
    pub verworfene_kandidaten_gesamt: u64,
}

/// Gesamter Vermittlungs-Zustand
#[derive(Debug, Default)]
pub struct ChatState {
    pub(crate) verbindungen: ConnectionRegistry,
    pub(crate) warteschlange: WaitingQueue,
    pub(crate) raeume: RoomRegistry,
    pub(crate) statistik: Statistik,
}

impl ChatState {
    /// Erstellt einen leeren Zustand
    pub fn neu() -> Self {
        Self::default()
    }

    pub fn verbindungen(&self) -> &ConnectionRegistry {
        &self.verbindungen
    }

    pub fn warteschlange(&self) -> &WaitingQueue {
        &self.warteschlange
    }

    pub fn raeume(&self) -> &RoomRegistry {
        &self.raeume
    }

    /// Gibt eine Momentaufnahme der Zaehler zurueck
    pub fn status(&self) -> ChatStatus {
        ChatStatus {
            aktive_verbindungen: self.verbindungen.anzahl(),
            wartende: self.warteschlange.len(),
            aktive_raeume: self.raeume.anzahl(),
            raeume_erstellt_gesamt: self.statistik.raeume_erstellt,
            nachrichten_gesamt: self.statistik.nachrichten_weitergeleitet,
            verworfene_kandidaten_gesamt: self.statistik.verworfene_kandidaten,
        }
    }

    /// Prueft die Invarianten zwischen den drei Containern
    ///
    /// Gibt alle gefundenen Verletzungen zurueck; leer heisst konsistent.
    pub fn konsistenz_pruefen(&self) -> Vec<String> {
        let mut verletzungen = Vec::new();

        let wartend: Vec<_> = self.warteschlange.iter().collect();
        if wartend.len() != self.warteschlange.len() {
            verletzungen.push(format!(
                "Warteschlange: {} Eintraege in Reihenfolge, {} Mitglieder",
                wartend.len(),
                self.warteschlange.len()
            ));
        }
        for id in &wartend {
            if let Some(raum_id) = self.raeume.raum_von(id) {
                verletzungen.push(format!("{id} wartet und sitzt in {raum_id}"));
            }
            if !self.verbindungen.ist_registriert(id) {
                verletzungen.push(format!("{id} wartet, ist aber nicht registriert"));
            }
        }

        for raum in self.raeume.iter() {
            let [a, b] = raum.teilnehmer;
            if a == b {
                verletzungen.push(format!("{} hat zweimal denselben Teilnehmer {a}", raum.id));
            }
            for teilnehmer in &raum.teilnehmer {
                if !self.verbindungen.ist_registriert(teilnehmer) {
                    verletzungen.push(format!(
                        "{} referenziert unregistrierte Verbindung {teilnehmer}",
                        raum.id
                    ));
                }
                if self.raeume.raum_von(teilnehmer) != Some(raum.id) {
                    verletzungen.push(format!(
                        "Zuordnung von {teilnehmer} zeigt nicht auf {}",
                        raum.id
                    ));
                }
            }
        }

        verletzungen
    }
}
