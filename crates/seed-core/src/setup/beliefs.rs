//! Belief Catalog Generation
//!
//! Samples the perception and relationship vectors of the nine beliefs for
//! one run.

use rand::Rng;
use std::collections::BTreeMap;
use uuid::Uuid;

use seed_records::BeliefRecord;

use crate::catalog::{Behaviour, BehaviourCatalog, BeliefKind};
use crate::config::{BeliefConfig, PerceptionTable, RelationshipTemplate};
use crate::identity::{derive, Category};
use crate::sampling::{truncated_normal, Gaussian};
use crate::GenerationError;

/// Number of beliefs in every catalog
pub const BELIEF_COUNT: usize = BeliefKind::ALL.len();

/// Valid range of a perceived effect
pub const PERCEPTION_BOUNDS: (f64, f64) = (-1.0, 1.0);

/// Relationship draws are truncated at absolute zero regardless of the sign
/// of the template mean, so negative template entries yield small
/// non-negative weights.
pub const RELATIONSHIP_BOUNDS: (f64, f64) = (0.0, f64::INFINITY);

/// Parameter tables shared by every run
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefParameters {
    pub perceptions: PerceptionTable,
    pub relationships: RelationshipTemplate,
    pub relationship_noise_sd: f64,
}

impl BeliefParameters {
    pub fn from_config(config: &BeliefConfig) -> Self {
        Self {
            perceptions: config.perception_table(),
            relationships: config.relationship_template(),
            relationship_noise_sd: config.relationship_noise_sd,
        }
    }

    /// Perception distribution of `belief` on `behaviour`
    pub fn perception(
        &self,
        belief: BeliefKind,
        behaviour: Behaviour,
    ) -> Result<Gaussian, GenerationError> {
        self.perceptions
            .get(&belief)
            .and_then(|row| row.get(&behaviour))
            .copied()
            .ok_or(GenerationError::MissingPerception { belief, behaviour })
    }

    /// Template mean of the influence of `from` on `to` (0 when unlisted)
    pub fn relationship_mean(&self, from: BeliefKind, to: BeliefKind) -> f64 {
        self.relationships.get(&(from, to)).copied().unwrap_or(0.0)
    }

    /// One bounded draw per behaviour from the perception distribution
    pub fn sample_perceptions<R: Rng + ?Sized>(
        &self,
        belief: BeliefKind,
        rng: &mut R,
    ) -> Result<BTreeMap<Behaviour, f64>, GenerationError> {
        let (lower, upper) = PERCEPTION_BOUNDS;
        Behaviour::ALL
            .iter()
            .map(|&behaviour| -> Result<(Behaviour, f64), GenerationError> {
                let value = self
                    .perception(belief, behaviour)?
                    .sample_truncated(rng, lower, upper)?;
                Ok((behaviour, value))
            })
            .collect()
    }
}

/// A belief with its sampled vectors
#[derive(Debug, Clone, PartialEq)]
pub struct Belief {
    pub kind: BeliefKind,
    pub id: Uuid,
    pub perceptions: BTreeMap<Behaviour, f64>,
    /// Influence on every belief, itself included
    pub relationships: BTreeMap<BeliefKind, f64>,
}

/// The nine beliefs of one run
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefCatalog {
    run: u32,
    beliefs: Vec<Belief>,
}

impl BeliefCatalog {
    pub fn run(&self) -> u32 {
        self.run
    }

    pub fn beliefs(&self) -> &[Belief] {
        &self.beliefs
    }

    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    pub fn get(&self, kind: BeliefKind) -> &Belief {
        // beliefs follow BeliefKind::ALL order
        &self.beliefs[kind as usize]
    }

    pub fn id(&self, kind: BeliefKind) -> Uuid {
        self.get(kind).id
    }

    pub fn to_records(&self, behaviours: &BehaviourCatalog) -> Vec<BeliefRecord> {
        self.beliefs
            .iter()
            .map(|belief| {
                let mut record = BeliefRecord::new(belief.kind.name(), belief.id);
                record.perceptions = belief
                    .perceptions
                    .iter()
                    .map(|(&b, &v)| (behaviours.id(b), v))
                    .collect();
                record.relationships = belief
                    .relationships
                    .iter()
                    .map(|(&k, &v)| (self.id(k), v))
                    .collect();
                record
            })
            .collect()
    }
}

/// Run-scoped identifier of a belief
pub fn belief_id(run: u32, kind: BeliefKind) -> Uuid {
    derive(Category::Beliefs, Some(run), kind.name())
}

/// Generate the belief catalog for `run`.
///
/// All perceptions are drawn first, then the full relationship matrix in
/// row-major order.
pub fn generate_beliefs<R: Rng + ?Sized>(
    run: u32,
    params: &BeliefParameters,
    rng: &mut R,
) -> Result<BeliefCatalog, GenerationError> {
    let mut perceptions = Vec::with_capacity(BELIEF_COUNT);
    for kind in BeliefKind::ALL {
        perceptions.push(params.sample_perceptions(kind, rng)?);
    }

    let (lower, upper) = RELATIONSHIP_BOUNDS;
    let mut beliefs = Vec::with_capacity(BELIEF_COUNT);
    for (kind, perceptions) in BeliefKind::ALL.into_iter().zip(perceptions) {
        let mut relationships = BTreeMap::new();
        for other in BeliefKind::ALL {
            let mean = params.relationship_mean(kind, other);
            let value = truncated_normal(rng, mean, params.relationship_noise_sd, lower, upper)?;
            relationships.insert(other, value);
        }

        beliefs.push(Belief {
            kind,
            id: belief_id(run, kind),
            perceptions,
            relationships,
        });
    }

    tracing::debug!(run, beliefs = beliefs.len(), "Generated belief catalog");
    Ok(BeliefCatalog { run, beliefs })
}
