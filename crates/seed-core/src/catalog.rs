//! Behaviour and Belief Catalogs
//!
//! The closed sets of travel modes and belief names shared by every run.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use seed_records::BehaviourRecord;

use crate::identity::{derive, Category};

/// A travel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Behaviour {
    Cycle,
    Walk,
    #[serde(rename = "PT")]
    PublicTransport,
    Drive,
}

impl Behaviour {
    pub const ALL: [Behaviour; 4] = [
        Behaviour::Cycle,
        Behaviour::Walk,
        Behaviour::PublicTransport,
        Behaviour::Drive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Behaviour::Cycle => "Cycle",
            Behaviour::Walk => "Walk",
            Behaviour::PublicTransport => "PT",
            Behaviour::Drive => "Drive",
        }
    }
}

impl fmt::Display for Behaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether holding a belief pushes towards or away from its group's theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

/// The nine belief names.
///
/// Groups 1, 2 and 4 pair a positive with a negative belief. Group 3 holds a
/// single belief and group 5 two beliefs of the same polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BeliefKind {
    Environmentalist,
    ClimateSceptic,
    HealthConscious,
    PhysicallyLimited,
    TimePressured,
    CostConscious,
    Affluent,
    TrafficAnxious,
    SecurityAnxious,
}

impl BeliefKind {
    pub const ALL: [BeliefKind; 9] = [
        BeliefKind::Environmentalist,
        BeliefKind::ClimateSceptic,
        BeliefKind::HealthConscious,
        BeliefKind::PhysicallyLimited,
        BeliefKind::TimePressured,
        BeliefKind::CostConscious,
        BeliefKind::Affluent,
        BeliefKind::TrafficAnxious,
        BeliefKind::SecurityAnxious,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BeliefKind::Environmentalist => "Environmentalist",
            BeliefKind::ClimateSceptic => "ClimateSceptic",
            BeliefKind::HealthConscious => "HealthConscious",
            BeliefKind::PhysicallyLimited => "PhysicallyLimited",
            BeliefKind::TimePressured => "TimePressured",
            BeliefKind::CostConscious => "CostConscious",
            BeliefKind::Affluent => "Affluent",
            BeliefKind::TrafficAnxious => "TrafficAnxious",
            BeliefKind::SecurityAnxious => "SecurityAnxious",
        }
    }

    /// Thematic group, 1 to 5
    pub fn group(self) -> u8 {
        match self {
            BeliefKind::Environmentalist | BeliefKind::ClimateSceptic => 1,
            BeliefKind::HealthConscious | BeliefKind::PhysicallyLimited => 2,
            BeliefKind::TimePressured => 3,
            BeliefKind::CostConscious | BeliefKind::Affluent => 4,
            BeliefKind::TrafficAnxious | BeliefKind::SecurityAnxious => 5,
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            BeliefKind::Environmentalist
            | BeliefKind::HealthConscious
            | BeliefKind::CostConscious => Polarity::Positive,
            _ => Polarity::Negative,
        }
    }
}

impl fmt::Display for BeliefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A behaviour with its process-wide identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviourEntry {
    pub behaviour: Behaviour,
    pub id: Uuid,
}

/// The four behaviours, generated once and shared by every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviourCatalog {
    entries: Vec<BehaviourEntry>,
}

impl BehaviourCatalog {
    pub fn new() -> Self {
        let entries = Behaviour::ALL
            .iter()
            .map(|&behaviour| BehaviourEntry {
                behaviour,
                id: derive(Category::Behaviours, None, behaviour.name()),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[BehaviourEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn id(&self, behaviour: Behaviour) -> Uuid {
        // entries follow Behaviour::ALL order
        self.entries[behaviour as usize].id
    }

    pub fn to_records(&self) -> Vec<BehaviourRecord> {
        self.entries
            .iter()
            .map(|e| BehaviourRecord::new(e.behaviour.name(), e.id))
            .collect()
    }
}

impl Default for BehaviourCatalog {
    fn default() -> Self {
        Self::new()
    }
}
