//! Social Graph Construction
//!
//! Watts-Strogatz small-world graph over agent positions, followed by an
//! independent self-loop pass and log-normal edge weights.

use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::SocialConfig;
use crate::sampling::{log_normal, SamplingError};

/// Undirected weighted graph over positions `0..n`, self-loops allowed
#[derive(Debug, Clone, PartialEq)]
pub struct SocialGraph {
    adjacency: Vec<BTreeSet<usize>>,
    /// Keyed by `(min, max)` endpoint
    weights: BTreeMap<(usize, usize), f64>,
}

fn edge_key(u: usize, v: usize) -> (usize, usize) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

impl SocialGraph {
    /// Build the graph for a population of `n` agents
    pub fn build<R: Rng + ?Sized>(
        n: usize,
        config: &SocialConfig,
        rng: &mut R,
    ) -> Result<Self, SamplingError> {
        for p in [config.rewiring_probability, config.self_loop_probability] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SamplingError::InvalidProbability(p));
            }
        }

        let mut adjacency = small_world(n, config.degree, config.rewiring_probability, rng);

        for (u, neighbours) in adjacency.iter_mut().enumerate() {
            if rng.gen_bool(config.self_loop_probability) {
                neighbours.insert(u);
            }
        }

        let mut weights = BTreeMap::new();
        for (u, neighbours) in adjacency.iter().enumerate() {
            for &v in neighbours.range(u..) {
                weights.insert((u, v), log_normal(rng, config.weight_shape)?);
            }
        }

        let graph = Self { adjacency, weights };
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            self_loops = graph.self_loop_count(),
            "Built social graph"
        );
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges, self-loops included
    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn self_loop_count(&self) -> usize {
        self.weights.keys().filter(|(u, v)| u == v).count()
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.weights.contains_key(&edge_key(u, v))
    }

    pub fn weight(&self, u: usize, v: usize) -> Option<f64> {
        self.weights.get(&edge_key(u, v)).copied()
    }

    /// Every incident edge of `u` as `(other endpoint, weight)`, including a
    /// self-loop if present
    pub fn neighbours(&self, u: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency[u]
            .iter()
            .map(move |&v| (v, self.weights[&edge_key(u, v)]))
    }

    /// Average degree ignoring self-loops
    pub fn mean_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        let links = self.edge_count() - self.self_loop_count();
        2.0 * links as f64 / self.node_count() as f64
    }
}

/// Ring lattice of `k` nearest neighbours with each edge rewired with
/// probability `p`. A degree of `n` or more yields the complete graph.
fn small_world<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    p: f64,
    rng: &mut R,
) -> Vec<BTreeSet<usize>> {
    let mut adjacency = vec![BTreeSet::new(); n];

    if k >= n {
        if k > n {
            tracing::warn!(degree = k, population = n, "Degree exceeds population, using complete graph");
        }
        for u in 0..n {
            for v in (u + 1)..n {
                adjacency[u].insert(v);
                adjacency[v].insert(u);
            }
        }
        return adjacency;
    }

    let half = k / 2;
    for u in 0..n {
        for j in 1..=half {
            let v = (u + j) % n;
            adjacency[u].insert(v);
            adjacency[v].insert(u);
        }
    }

    for j in 1..=half {
        for u in 0..n {
            if rng.gen::<f64>() >= p {
                continue;
            }
            let v = (u + j) % n;
            if adjacency[u].len() >= n - 1 {
                continue;
            }
            let mut w = rng.gen_range(0..n);
            while w == u || adjacency[u].contains(&w) {
                w = rng.gen_range(0..n);
            }
            adjacency[u].remove(&v);
            adjacency[v].remove(&u);
            adjacency[u].insert(w);
            adjacency[w].insert(u);
        }
    }

    adjacency
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn config(degree: usize, rewiring: f64, self_loop: f64) -> SocialConfig {
        SocialConfig {
            degree,
            rewiring_probability: rewiring,
            self_loop_probability: self_loop,
            weight_shape: 1.0,
        }
    }

    #[test]
    fn test_ring_lattice_without_rewiring() {
        let mut rng = SmallRng::seed_from_u64(12345);
        let graph = SocialGraph::build(10, &config(4, 0.0, 0.0), &mut rng).unwrap();

        assert_eq!(graph.node_count(), 10);
        assert_eq!(graph.edge_count(), 20);
        assert!(graph.has_edge(0, 1));
        assert!(graph.has_edge(0, 2));
        assert!(graph.has_edge(9, 0));
        assert!(!graph.has_edge(0, 3));
        assert_eq!(graph.mean_degree(), 4.0);
    }

    #[test]
    fn test_rewiring_preserves_edge_count() {
        let mut rng = SmallRng::seed_from_u64(7);
        let graph = SocialGraph::build(200, &config(6, 0.3, 0.0), &mut rng).unwrap();

        assert_eq!(graph.edge_count(), 600);
        assert_eq!(graph.self_loop_count(), 0);
        assert!((graph.mean_degree() - 6.0).abs() < 1e-9);
        for u in 0..200 {
            assert!(graph.neighbours(u).all(|(v, _)| v != u));
        }
    }

    #[test]
    fn test_full_rewiring_changes_topology() {
        let mut rng = SmallRng::seed_from_u64(7);
        let graph = SocialGraph::build(100, &config(4, 1.0, 0.0), &mut rng).unwrap();

        let lattice_edges = (0..100).filter(|&u| graph.has_edge(u, (u + 1) % 100)).count();
        assert!(lattice_edges < 50);
    }

    #[test]
    fn test_self_loops_added() {
        let mut rng = SmallRng::seed_from_u64(3);
        let graph = SocialGraph::build(50, &config(4, 0.1, 1.0), &mut rng).unwrap();

        assert_eq!(graph.self_loop_count(), 50);
        assert_eq!(graph.edge_count(), 100 + 50);
        // Self-loops do not count towards the mean degree
        assert_eq!(graph.mean_degree(), 4.0);
        assert!(graph.neighbours(0).any(|(v, _)| v == 0));
    }

    #[test]
    fn test_weights_positive_and_symmetric() {
        let mut rng = SmallRng::seed_from_u64(11);
        let graph = SocialGraph::build(30, &config(6, 0.2, 0.5), &mut rng).unwrap();

        for u in 0..30 {
            for (v, w) in graph.neighbours(u) {
                assert!(w > 0.0);
                assert_eq!(graph.weight(v, u), Some(w));
            }
        }
    }

    #[test]
    fn test_degree_larger_than_population() {
        let mut rng = SmallRng::seed_from_u64(1);
        let graph = SocialGraph::build(5, &config(10, 0.5, 0.0), &mut rng).unwrap();

        assert_eq!(graph.edge_count(), 10);
        assert_eq!(graph.mean_degree(), 4.0);
    }

    #[test]
    fn test_empty_and_single_node() {
        let mut rng = SmallRng::seed_from_u64(1);

        let empty = SocialGraph::build(0, &config(6, 0.1, 0.5), &mut rng).unwrap();
        assert_eq!(empty.node_count(), 0);
        assert_eq!(empty.edge_count(), 0);
        assert_eq!(empty.mean_degree(), 0.0);

        let single = SocialGraph::build(1, &config(6, 0.1, 1.0), &mut rng).unwrap();
        assert_eq!(single.node_count(), 1);
        assert_eq!(single.edge_count(), 1);
        assert!(single.has_edge(0, 0));
    }

    #[test]
    fn test_seeded_build_reproducible() {
        let a = SocialGraph::build(100, &config(6, 0.2, 0.5), &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = SocialGraph::build(100, &config(6, 0.2, 0.5), &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_probability() {
        let mut rng = SmallRng::seed_from_u64(1);
        let result = SocialGraph::build(10, &config(4, -0.1, 0.0), &mut rng);
        assert_eq!(result, Err(SamplingError::InvalidProbability(-0.1)));
    }
}
