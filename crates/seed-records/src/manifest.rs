//! Run Manifest
//!
//! Summary written next to the generated artifacts so a reader knows which
//! runs exist and how they were produced.

use serde::{Deserialize, Serialize};

/// File names used for each artifact inside an output directory.
pub mod artifact_names {
    pub const BEHAVIOURS: &str = "behaviours.json";
    pub const MANIFEST: &str = "manifest.json";

    /// Belief catalog file for a run
    pub fn beliefs(run: u32) -> String {
        format!("beliefs_{}.json", run)
    }

    /// Compressed agent population file for a run
    pub fn agents(run: u32) -> String {
        format!("agents_{}.json.gz", run)
    }
}

/// Per-run summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRun {
    pub run: u32,
    pub belief_count: usize,
    pub agent_count: usize,
    pub edge_count: usize,
    pub self_loop_count: usize,
    pub mean_degree: f64,
    pub beliefs_file: String,
    pub agents_file: String,
}

/// Summary of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub population: usize,
    pub behaviour_count: usize,
    pub runs: Vec<ManifestRun>,
}

impl RunManifest {
    pub fn new(generated_at: impl Into<String>, seed: Option<u64>, population: usize) -> Self {
        Self {
            generated_at: generated_at.into(),
            seed,
            population,
            behaviour_count: 0,
            runs: Vec::new(),
        }
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}
