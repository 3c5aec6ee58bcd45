//! Record Types
//!
//! Serialization structs for behaviours, beliefs and agents.
//!
//! Every map is keyed by the identifier of the entity it refers to, so a
//! consumer can join agents to beliefs and behaviours without positional
//! coupling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Belief identifier -> behaviour identifier -> perceived performance.
pub type PerformanceRelationships = BTreeMap<Uuid, BTreeMap<Uuid, f64>>;

/// A travel mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourRecord {
    pub name: String,
    pub uuid: Uuid,
}

impl BehaviourRecord {
    pub fn new(name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            name: name.into(),
            uuid,
        }
    }
}

/// A belief with its perception and relationship vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefRecord {
    pub name: String,
    pub uuid: Uuid,
    /// Behaviour identifier -> believed effect in [-1, 1]
    pub perceptions: BTreeMap<Uuid, f64>,
    /// Belief identifier -> influence weight (includes this belief)
    pub relationships: BTreeMap<Uuid, f64>,
}

impl BeliefRecord {
    pub fn new(name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            name: name.into(),
            uuid,
            perceptions: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }
}

/// A behaviour performed by an agent during simulation.
///
/// Never produced at generation time; the type exists so that agent files
/// written by the simulation can be read back with the same schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub time: u64,
    pub behaviour: Uuid,
}

/// Full agent record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub uuid: Uuid,
    /// Activation history, oldest first. Each entry maps belief -> activation.
    pub activations: Vec<BTreeMap<Uuid, f64>>,
    /// Agent identifier -> social edge weight
    pub friends: BTreeMap<Uuid, f64>,
    /// Belief identifier -> decay coefficient
    pub deltas: BTreeMap<Uuid, f64>,
    pub performance_relationships: PerformanceRelationships,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

impl AgentRecord {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            activations: Vec::new(),
            friends: BTreeMap::new(),
            deltas: BTreeMap::new(),
            performance_relationships: BTreeMap::new(),
            actions: Vec::new(),
        }
    }

    /// Most recent activation vector, if any
    pub fn current_activation(&self) -> Option<&BTreeMap<Uuid, f64>> {
        self.activations.last()
    }

    /// Number of (belief, behaviour) cells in the performance tensor
    pub fn performance_cell_count(&self) -> usize {
        self.performance_relationships.values().map(|row| row.len()).sum()
    }
}
