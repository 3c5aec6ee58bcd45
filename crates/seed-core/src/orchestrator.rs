//! Run Orchestration
//!
//! Drives independent runs: each gets its own random source, a fresh belief
//! catalog, social graph and agent population, and is handed to the sink
//! before the next run starts. The first failure aborts the invocation;
//! runs already written stay where they are.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use seed_records::{artifact_names, ManifestRun, RunManifest};

use crate::catalog::BehaviourCatalog;
use crate::config::{Config, SocialConfig};
use crate::output::RunSink;
use crate::setup::{
    generate_agents, generate_beliefs, AgentPopulation, BeliefCatalog, BeliefParameters,
    SocialGraph,
};
use crate::GenerationError;

/// Seed of run `run` derived from the invocation's base seed
pub fn run_seed(base: u64, run: u32) -> u64 {
    base ^ (u64::from(run) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Random source for one run; unseeded invocations use OS entropy
pub fn run_rng(seed: Option<u64>, run: u32) -> SmallRng {
    match seed {
        Some(base) => SmallRng::seed_from_u64(run_seed(base, run)),
        None => SmallRng::from_entropy(),
    }
}

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct GeneratedRun {
    pub run: u32,
    pub beliefs: BeliefCatalog,
    pub graph: SocialGraph,
    pub agents: AgentPopulation,
}

impl GeneratedRun {
    pub fn stats(&self) -> RunStats {
        RunStats {
            run: self.run,
            belief_count: self.beliefs.len(),
            agent_count: self.agents.len(),
            edge_count: self.graph.edge_count(),
            self_loop_count: self.graph.self_loop_count(),
            mean_degree: self.graph.mean_degree(),
        }
    }
}

/// Summary statistics of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub run: u32,
    pub belief_count: usize,
    pub agent_count: usize,
    pub edge_count: usize,
    pub self_loop_count: usize,
    pub mean_degree: f64,
}

impl From<RunStats> for ManifestRun {
    fn from(stats: RunStats) -> Self {
        ManifestRun {
            run: stats.run,
            belief_count: stats.belief_count,
            agent_count: stats.agent_count,
            edge_count: stats.edge_count,
            self_loop_count: stats.self_loop_count,
            mean_degree: stats.mean_degree,
            beliefs_file: artifact_names::beliefs(stats.run),
            agents_file: artifact_names::agents(stats.run),
        }
    }
}

/// Generate one run: beliefs, then the social graph, then agents
pub fn generate_run(
    run: u32,
    population: usize,
    params: &BeliefParameters,
    social: &SocialConfig,
    rng: &mut SmallRng,
) -> Result<GeneratedRun, GenerationError> {
    let beliefs = generate_beliefs(run, params, rng)?;
    let graph = SocialGraph::build(population, social, rng)?;
    let agents = generate_agents(run, params, &graph, rng)?;

    Ok(GeneratedRun {
        run,
        beliefs,
        graph,
        agents,
    })
}

/// Drives all runs of one invocation
#[derive(Debug, Clone)]
pub struct RunOrchestrator {
    config: Config,
    behaviours: BehaviourCatalog,
    params: BeliefParameters,
}

impl RunOrchestrator {
    /// Validate `config` and prepare the shared catalogs
    pub fn new(config: Config) -> Result<Self, GenerationError> {
        config.validate()?;
        let params = BeliefParameters::from_config(&config.beliefs);
        Ok(Self {
            config,
            behaviours: BehaviourCatalog::new(),
            params,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn behaviours(&self) -> &BehaviourCatalog {
        &self.behaviours
    }

    /// Generate a single run without emitting it
    pub fn generate(&self, run: u32) -> Result<GeneratedRun, GenerationError> {
        let generation = &self.config.generation;
        let mut rng = run_rng(generation.seed, run);
        generate_run(
            run,
            generation.population,
            &self.params,
            &self.config.social,
            &mut rng,
        )
    }

    /// Generate every configured run and emit it through `sink`
    pub fn run<S: RunSink + ?Sized>(&self, sink: &mut S) -> Result<RunManifest, GenerationError> {
        let generation = &self.config.generation;
        let generated_at = chrono::Local::now().to_rfc3339();
        let mut manifest = RunManifest::new(generated_at, generation.seed, generation.population);
        manifest.behaviour_count = self.behaviours.len();

        sink.write_behaviours(&self.behaviours.to_records())?;

        let first = generation.start_run;
        let last = first.saturating_add(generation.runs);
        tracing::info!(
            runs = generation.runs,
            population = generation.population,
            seeded = generation.seed.is_some(),
            "Starting generation"
        );

        for run in first..last {
            let generated = self.generate(run)?;
            let stats = generated.stats();

            let beliefs = generated.beliefs.to_records(&self.behaviours);
            let agents = generated
                .agents
                .to_records(&generated.beliefs, &self.behaviours);
            sink.write_run(run, &beliefs, &agents)?;

            tracing::info!(
                run,
                agents = stats.agent_count,
                edges = stats.edge_count,
                self_loops = stats.self_loop_count,
                mean_degree = stats.mean_degree,
                "Run {} written",
                run
            );
            manifest.runs.push(stats.into());
        }

        sink.finish(&manifest)?;
        tracing::info!("Generation complete: {} runs", manifest.run_count());
        Ok(manifest)
    }
}
