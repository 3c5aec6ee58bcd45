//! Configuration System
//!
//! Loads generation parameters from `generation.toml` so tables can be
//! tuned without recompiling. Every section falls back to built-in defaults
//! when absent.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::{Behaviour, BeliefKind};
use crate::sampling::Gaussian;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "generation.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub beliefs: BeliefConfig,
    #[serde(default)]
    pub social: SocialConfig,
}

/// Run-level parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of independent runs to generate
    pub runs: u32,
    /// Index of the first run (lets one invocation regenerate a single run)
    pub start_run: u32,
    /// Agents per run
    pub population: usize,
    /// Base seed; unseeded runs draw from OS entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Directory in which the timestamped output directory is created
    pub output_root: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            start_run: 0,
            population: 1000,
            seed: None,
            output_root: PathBuf::from("."),
        }
    }
}

/// Perception distribution of one belief over the four behaviours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionEntry {
    pub belief: BeliefKind,
    #[serde(rename = "Cycle")]
    pub cycle: Gaussian,
    #[serde(rename = "Walk")]
    pub walk: Gaussian,
    #[serde(rename = "PT")]
    pub public_transport: Gaussian,
    #[serde(rename = "Drive")]
    pub drive: Gaussian,
}

impl PerceptionEntry {
    fn new(belief: BeliefKind, params: [(f64, f64); 4]) -> Self {
        let g = |i: usize| Gaussian::new(params[i].0, params[i].1);
        Self {
            belief,
            cycle: g(0),
            walk: g(1),
            public_transport: g(2),
            drive: g(3),
        }
    }

    pub fn gaussian(&self, behaviour: Behaviour) -> Gaussian {
        match behaviour {
            Behaviour::Cycle => self.cycle,
            Behaviour::Walk => self.walk,
            Behaviour::PublicTransport => self.public_transport,
            Behaviour::Drive => self.drive,
        }
    }
}

/// Template mean for the influence of `from` on `to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEntry {
    pub from: BeliefKind,
    pub to: BeliefKind,
    pub mean: f64,
}

impl RelationshipEntry {
    fn new(from: BeliefKind, to: BeliefKind, mean: f64) -> Self {
        Self { from, to, mean }
    }
}

/// Belief parameter tables, shared by every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeliefConfig {
    /// Multiplier applied to every perception standard deviation
    pub perception_sd_scale: f64,
    /// Standard deviation of the noise added to relationship template means
    pub relationship_noise_sd: f64,
    pub perceptions: Vec<PerceptionEntry>,
    /// Pairs not listed here have a template mean of 0
    pub relationships: Vec<RelationshipEntry>,
}

/// Resolved perception table: belief -> behaviour -> distribution
pub type PerceptionTable = BTreeMap<BeliefKind, BTreeMap<Behaviour, Gaussian>>;

/// Resolved relationship template: (from, to) -> mean
pub type RelationshipTemplate = BTreeMap<(BeliefKind, BeliefKind), f64>;

impl BeliefConfig {
    /// Perception table with `perception_sd_scale` applied
    pub fn perception_table(&self) -> PerceptionTable {
        self.perceptions
            .iter()
            .map(|entry| {
                let row = Behaviour::ALL
                    .iter()
                    .map(|&b| (b, entry.gaussian(b).scaled(self.perception_sd_scale)))
                    .collect();
                (entry.belief, row)
            })
            .collect()
    }

    pub fn relationship_template(&self) -> RelationshipTemplate {
        self.relationships
            .iter()
            .map(|r| ((r.from, r.to), r.mean))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.perception_sd_scale.is_finite() && self.perception_sd_scale > 0.0) {
            return Err(ConfigError::invalid(format!(
                "beliefs.perception_sd_scale must be positive, got {}",
                self.perception_sd_scale
            )));
        }
        if !(self.relationship_noise_sd.is_finite() && self.relationship_noise_sd > 0.0) {
            return Err(ConfigError::invalid(format!(
                "beliefs.relationship_noise_sd must be positive, got {}",
                self.relationship_noise_sd
            )));
        }

        let mut seen = BTreeSet::new();
        for entry in &self.perceptions {
            if !seen.insert(entry.belief) {
                return Err(ConfigError::invalid(format!(
                    "duplicate perception entry for {}",
                    entry.belief
                )));
            }
            for behaviour in Behaviour::ALL {
                let g = entry.gaussian(behaviour);
                if !g.mean.is_finite() || !(g.sd.is_finite() && g.sd > 0.0) {
                    return Err(ConfigError::invalid(format!(
                        "perception {}/{} needs a finite mean and positive sd, got mean {} sd {}",
                        entry.belief, behaviour, g.mean, g.sd
                    )));
                }
            }
        }
        if let Some(missing) = BeliefKind::ALL.iter().find(|b| !seen.contains(b)) {
            return Err(ConfigError::invalid(format!(
                "no perception entry for {}",
                missing
            )));
        }

        let mut pairs = BTreeSet::new();
        for r in &self.relationships {
            if !pairs.insert((r.from, r.to)) {
                return Err(ConfigError::invalid(format!(
                    "duplicate relationship {} -> {}",
                    r.from, r.to
                )));
            }
            if !r.mean.is_finite() {
                return Err(ConfigError::invalid(format!(
                    "relationship {} -> {} has non-finite mean",
                    r.from, r.to
                )));
            }
        }
        Ok(())
    }
}

impl Default for BeliefConfig {
    fn default() -> Self {
        use BeliefKind::*;

        let perceptions = vec![
            PerceptionEntry::new(Environmentalist, [(0.5, 0.2), (0.4, 0.2), (0.3, 0.2), (-0.5, 0.2)]),
            PerceptionEntry::new(ClimateSceptic, [(-0.2, 0.2), (-0.1, 0.2), (-0.2, 0.2), (0.4, 0.2)]),
            PerceptionEntry::new(HealthConscious, [(0.6, 0.2), (0.5, 0.2), (0.0, 0.2), (-0.3, 0.2)]),
            PerceptionEntry::new(PhysicallyLimited, [(-0.6, 0.2), (-0.4, 0.2), (0.1, 0.2), (0.5, 0.2)]),
            PerceptionEntry::new(TimePressured, [(-0.1, 0.3), (-0.5, 0.2), (-0.2, 0.3), (0.5, 0.2)]),
            PerceptionEntry::new(CostConscious, [(0.4, 0.2), (0.4, 0.2), (0.2, 0.2), (-0.4, 0.2)]),
            PerceptionEntry::new(Affluent, [(0.0, 0.3), (0.0, 0.3), (-0.3, 0.2), (0.5, 0.2)]),
            PerceptionEntry::new(TrafficAnxious, [(-0.6, 0.2), (-0.2, 0.2), (0.2, 0.2), (0.1, 0.3)]),
            PerceptionEntry::new(SecurityAnxious, [(-0.2, 0.2), (-0.4, 0.2), (-0.5, 0.2), (0.4, 0.2)]),
        ];

        let relationships = vec![
            // Opposing beliefs within a group suppress each other
            RelationshipEntry::new(Environmentalist, ClimateSceptic, -0.5),
            RelationshipEntry::new(ClimateSceptic, Environmentalist, -0.5),
            RelationshipEntry::new(HealthConscious, PhysicallyLimited, -0.5),
            RelationshipEntry::new(PhysicallyLimited, HealthConscious, -0.5),
            RelationshipEntry::new(CostConscious, Affluent, -0.5),
            RelationshipEntry::new(Affluent, CostConscious, -0.5),
            // Same-polarity group reinforces itself
            RelationshipEntry::new(TrafficAnxious, SecurityAnxious, 0.3),
            RelationshipEntry::new(SecurityAnxious, TrafficAnxious, 0.3),
            // Cross-group links
            RelationshipEntry::new(Environmentalist, HealthConscious, 0.2),
            RelationshipEntry::new(HealthConscious, Environmentalist, 0.2),
            RelationshipEntry::new(Environmentalist, CostConscious, 0.1),
            RelationshipEntry::new(ClimateSceptic, Affluent, 0.1),
            RelationshipEntry::new(TimePressured, Affluent, 0.2),
            RelationshipEntry::new(Affluent, TimePressured, 0.2),
            RelationshipEntry::new(PhysicallyLimited, TrafficAnxious, 0.2),
        ];

        Self {
            perception_sd_scale: 1.0,
            relationship_noise_sd: 0.1,
            perceptions,
            relationships,
        }
    }
}

/// Social graph parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Each node starts connected to its `degree` nearest ring neighbours
    pub degree: usize,
    pub rewiring_probability: f64,
    pub self_loop_probability: f64,
    /// Log-normal shape parameter of edge weights
    pub weight_shape: f64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            degree: 6,
            rewiring_probability: 0.1,
            self_loop_probability: 0.5,
            weight_shape: 1.0,
        }
    }
}

impl SocialConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, p) in [
            ("social.rewiring_probability", self.rewiring_probability),
            ("social.self_loop_probability", self.self_loop_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if !(self.weight_shape.is_finite() && self.weight_shape > 0.0) {
            return Err(ConfigError::invalid(format!(
                "social.weight_shape must be positive, got {}",
                self.weight_shape
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load configuration from `path` if it exists, otherwise use defaults.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every parameter that sampling relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.beliefs.validate()?;
        self.social.validate()
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(message: String) -> Self {
        ConfigError::Invalid(message)
    }
}
