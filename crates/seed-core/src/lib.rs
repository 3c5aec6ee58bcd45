//! Initial-condition generator for agent-based travel-mode simulations.
//!
//! Produces, per run, a catalog of nine beliefs with perception and
//! relationship vectors and a population of agents connected by a
//! small-world social graph. Identifiers are derived deterministically from
//! names; sampled values come from a per-run random source that can be
//! seeded for replay.
//!
//! # Modules
//!
//! - [`identity`]: name-based identifiers
//! - [`sampling`]: truncated-normal and log-normal draws
//! - [`catalog`]: behaviours and belief names
//! - [`setup`]: belief, social graph and agent generation
//! - [`orchestrator`]: the run loop
//! - [`output`]: sinks that persist runs
//! - [`config`]: TOML configuration

pub mod catalog;
pub mod config;
pub mod identity;
pub mod orchestrator;
pub mod output;
pub mod sampling;
pub mod setup;

pub use catalog::{Behaviour, BehaviourCatalog, BeliefKind, Polarity};
pub use config::{Config, ConfigError};
pub use orchestrator::{generate_run, run_rng, GeneratedRun, RunOrchestrator, RunStats};
pub use output::{DirectorySink, MemorySink, RunSink, SinkError};
pub use sampling::{Gaussian, SamplingError};
pub use setup::{AgentPopulation, BeliefCatalog, BeliefParameters, SocialGraph};

use thiserror::Error;

/// Errors that can occur while generating runs
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("sampling error: {0}")]
    Sampling(#[from] SamplingError),
    #[error("no perception parameters for {belief}/{behaviour}")]
    MissingPerception {
        belief: BeliefKind,
        behaviour: Behaviour,
    },
    #[error("output error: {0}")]
    Sink(#[from] SinkError),
}
