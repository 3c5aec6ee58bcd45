//! Agent Population Generation
//!
//! Assembles agent records from a belief catalog and a social graph: an
//! initial activation vector, friend weights, decay coefficients and a
//! private resample of the perception table.

use rand::Rng;
use std::collections::BTreeMap;
use uuid::Uuid;

use seed_records::AgentRecord;

use crate::catalog::{Behaviour, BehaviourCatalog, BeliefKind};
use crate::identity::{derive, Category};
use crate::sampling::truncated_normal;
use crate::GenerationError;

use super::beliefs::{BeliefCatalog, BeliefParameters};
use super::social::SocialGraph;

/// Probability that an initial activation is exactly zero
pub const ACTIVATION_ZERO_PROBABILITY: f64 = 0.5;
/// Spread of non-zero initial activations around 0
pub const ACTIVATION_SD: f64 = 0.1;
pub const ACTIVATION_BOUNDS: (f64, f64) = (-1.0, 1.0);

pub const DECAY_MEAN: f64 = 0.7;
pub const DECAY_SD: f64 = 0.05;
/// Decay draws are truncated just above zero so coefficients stay positive
pub const DECAY_BOUNDS: (f64, f64) = (f64::MIN_POSITIVE, f64::INFINITY);

/// One agent's initial state
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: Uuid,
    /// Activation history, seeded with a single entry
    pub activations: Vec<BTreeMap<BeliefKind, f64>>,
    /// Agent identifier -> edge weight, including self if looped
    pub friends: BTreeMap<Uuid, f64>,
    pub deltas: BTreeMap<BeliefKind, f64>,
    pub performance_relationships: BTreeMap<BeliefKind, BTreeMap<Behaviour, f64>>,
}

impl Agent {
    pub fn to_record(&self, beliefs: &BeliefCatalog, behaviours: &BehaviourCatalog) -> AgentRecord {
        let mut record = AgentRecord::new(self.id);
        record.activations = self
            .activations
            .iter()
            .map(|step| step.iter().map(|(&k, &v)| (beliefs.id(k), v)).collect())
            .collect();
        record.friends = self.friends.clone();
        record.deltas = self
            .deltas
            .iter()
            .map(|(&k, &v)| (beliefs.id(k), v))
            .collect();
        record.performance_relationships = self
            .performance_relationships
            .iter()
            .map(|(&k, row)| {
                let row = row.iter().map(|(&b, &v)| (behaviours.id(b), v)).collect();
                (beliefs.id(k), row)
            })
            .collect();
        record
    }
}

/// All agents of one run
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPopulation {
    run: u32,
    agents: Vec<Agent>,
}

impl AgentPopulation {
    pub fn run(&self) -> u32 {
        self.run
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn to_records(
        &self,
        beliefs: &BeliefCatalog,
        behaviours: &BehaviourCatalog,
    ) -> Vec<AgentRecord> {
        self.agents
            .iter()
            .map(|agent| agent.to_record(beliefs, behaviours))
            .collect()
    }
}

/// Run-scoped identifier of the agent at graph position `index`
pub fn agent_id(run: u32, index: usize) -> Uuid {
    derive(Category::Agents, Some(run), &index.to_string())
}

fn initial_activation<R: Rng + ?Sized>(
    rng: &mut R,
) -> Result<BTreeMap<BeliefKind, f64>, GenerationError> {
    let (lower, upper) = ACTIVATION_BOUNDS;
    let mut activation = BTreeMap::new();
    for kind in BeliefKind::ALL {
        let value = if rng.gen_bool(ACTIVATION_ZERO_PROBABILITY) {
            0.0
        } else {
            truncated_normal(rng, 0.0, ACTIVATION_SD, lower, upper)?
        };
        activation.insert(kind, value);
    }
    Ok(activation)
}

fn decay_coefficients<R: Rng + ?Sized>(
    rng: &mut R,
) -> Result<BTreeMap<BeliefKind, f64>, GenerationError> {
    let (lower, upper) = DECAY_BOUNDS;
    BeliefKind::ALL
        .iter()
        .map(|&kind| -> Result<(BeliefKind, f64), GenerationError> {
            Ok((kind, truncated_normal(rng, DECAY_MEAN, DECAY_SD, lower, upper)?))
        })
        .collect()
}

/// Generate one agent per graph position.
///
/// The population size is the graph's node count; friend maps follow the
/// graph's incident edges.
pub fn generate_agents<R: Rng + ?Sized>(
    run: u32,
    params: &BeliefParameters,
    graph: &SocialGraph,
    rng: &mut R,
) -> Result<AgentPopulation, GenerationError> {
    let ids: Vec<Uuid> = (0..graph.node_count()).map(|i| agent_id(run, i)).collect();
    let mut agents = Vec::with_capacity(ids.len());

    for (index, &id) in ids.iter().enumerate() {
        let activation = initial_activation(rng)?;

        let friends = graph
            .neighbours(index)
            .map(|(other, weight)| (ids[other], weight))
            .collect();

        let deltas = decay_coefficients(rng)?;

        let mut performance_relationships = BTreeMap::new();
        for kind in BeliefKind::ALL {
            performance_relationships.insert(kind, params.sample_perceptions(kind, rng)?);
        }

        agents.push(Agent {
            id,
            activations: vec![activation],
            friends,
            deltas,
            performance_relationships,
        });
    }

    tracing::debug!(run, agents = agents.len(), "Generated agent population");
    Ok(AgentPopulation { run, agents })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BeliefConfig, SocialConfig};
    use crate::setup::beliefs::generate_beliefs;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn build(run: u32, n: usize, seed: u64) -> (BeliefCatalog, SocialGraph, AgentPopulation) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let params = BeliefParameters::from_config(&BeliefConfig::default());
        let beliefs = generate_beliefs(run, &params, &mut rng).unwrap();
        let graph = SocialGraph::build(n, &SocialConfig::default(), &mut rng).unwrap();
        let agents = generate_agents(run, &params, &graph, &mut rng).unwrap();
        (beliefs, graph, agents)
    }

    #[test]
    fn test_population_size() {
        let (_, _, agents) = build(0, 25, 12345);
        assert_eq!(agents.len(), 25);
        assert_eq!(agents.run(), 0);
    }

    #[test]
    fn test_agent_shape_and_bounds() {
        let (_, _, population) = build(0, 40, 12345);

        for agent in population.agents() {
            assert_eq!(agent.activations.len(), 1);
            let activation = &agent.activations[0];
            assert_eq!(activation.len(), 9);
            assert!(activation.values().all(|v| (-1.0..=1.0).contains(v)));

            assert_eq!(agent.deltas.len(), 9);
            assert!(agent.deltas.values().all(|&d| d > 0.0));

            let cells: usize = agent.performance_relationships.values().map(|r| r.len()).sum();
            assert_eq!(cells, 9 * 4);
            assert!(agent
                .performance_relationships
                .values()
                .flat_map(|r| r.values())
                .all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_roughly_half_of_activations_zero() {
        let (_, _, population) = build(0, 400, 77);

        let total = population.len() * 9;
        let zeros = population
            .agents()
            .iter()
            .flat_map(|a| a.activations[0].values())
            .filter(|&&v| v == 0.0)
            .count();
        let share = zeros as f64 / total as f64;
        assert!((share - 0.5).abs() < 0.05, "zero share was {}", share);
    }

    #[test]
    fn test_decay_clustered_near_mean() {
        let (_, _, population) = build(0, 200, 5);

        let values: Vec<f64> = population
            .agents()
            .iter()
            .flat_map(|a| a.deltas.values().copied())
            .collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((mean - DECAY_MEAN).abs() < 0.01);
    }

    #[test]
    fn test_friends_follow_graph() {
        let (_, graph, population) = build(2, 50, 21);
        let ids: HashSet<Uuid> = population.agents().iter().map(|a| a.id).collect();

        for (index, agent) in population.agents().iter().enumerate() {
            assert_eq!(agent.id, agent_id(2, index));
            assert_eq!(agent.friends.len(), graph.neighbours(index).count());
            for (friend, &weight) in &agent.friends {
                assert!(ids.contains(friend));
                assert!(weight > 0.0);
            }
            let self_looped = graph.has_edge(index, index);
            assert_eq!(agent.friends.contains_key(&agent.id), self_looped);
        }
    }

    #[test]
    fn test_performance_is_private_resample() {
        let (beliefs, _, population) = build(0, 2, 8);

        let belief = beliefs.get(BeliefKind::HealthConscious);
        let a = &population.agents()[0].performance_relationships[&BeliefKind::HealthConscious];
        let b = &population.agents()[1].performance_relationships[&BeliefKind::HealthConscious];
        assert_ne!(a, &belief.perceptions);
        assert_ne!(a, b);
    }

    #[test]
    fn test_records_keyed_by_identifiers() {
        let (beliefs, _, population) = build(1, 10, 4);
        let behaviours = BehaviourCatalog::new();
        let records = population.to_records(&beliefs, &behaviours);

        assert_eq!(records.len(), 10);
        for record in &records {
            assert_eq!(record.activations.len(), 1);
            assert!(record.actions.is_empty());
            assert_eq!(record.performance_cell_count(), 36);
            for belief in beliefs.beliefs() {
                assert!(record.deltas.contains_key(&belief.id));
                assert!(record.activations[0].contains_key(&belief.id));
            }
        }
    }

    #[test]
    fn test_empty_population() {
        let (beliefs, _, population) = build(0, 0, 1);
        assert!(population.is_empty());
        assert_eq!(beliefs.len(), 9);
    }
}
