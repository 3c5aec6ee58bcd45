//! Run Output
//!
//! The sink interface runs are emitted through, an in-memory sink for tests
//! and a directory sink writing JSON and gzip-compressed JSON files.

pub mod directory;

pub use directory::{read_compressed_records, read_manifest, read_records, DirectorySink};

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use seed_records::{AgentRecord, BehaviourRecord, BeliefRecord, RunManifest};

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output path already exists: {}", .0.display())]
    OutputPathExists(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for generated artifacts
pub trait RunSink {
    /// Behaviour catalog, written once per invocation
    fn write_behaviours(&mut self, behaviours: &[BehaviourRecord]) -> Result<(), SinkError>;

    /// Belief catalog and agent population of one run
    fn write_run(
        &mut self,
        run: u32,
        beliefs: &[BeliefRecord],
        agents: &[AgentRecord],
    ) -> Result<(), SinkError>;

    /// Summary after the last run
    fn finish(&mut self, manifest: &RunManifest) -> Result<(), SinkError>;
}

/// Artifacts of one run held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedRun {
    pub beliefs: Vec<BeliefRecord>,
    pub agents: Vec<AgentRecord>,
}

/// Sink that keeps everything in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub behaviours: Vec<BehaviourRecord>,
    pub runs: BTreeMap<u32, CapturedRun>,
    pub manifest: Option<RunManifest>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self, run: u32) -> Option<&CapturedRun> {
        self.runs.get(&run)
    }
}

impl RunSink for MemorySink {
    fn write_behaviours(&mut self, behaviours: &[BehaviourRecord]) -> Result<(), SinkError> {
        self.behaviours = behaviours.to_vec();
        Ok(())
    }

    fn write_run(
        &mut self,
        run: u32,
        beliefs: &[BeliefRecord],
        agents: &[AgentRecord],
    ) -> Result<(), SinkError> {
        self.runs.insert(
            run,
            CapturedRun {
                beliefs: beliefs.to_vec(),
                agents: agents.to_vec(),
            },
        );
        Ok(())
    }

    fn finish(&mut self, manifest: &RunManifest) -> Result<(), SinkError> {
        self.manifest = Some(manifest.clone());
        Ok(())
    }
}
