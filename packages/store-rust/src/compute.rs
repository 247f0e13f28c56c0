//! Graph compute engines used by analytic handlers.

use std::collections::HashMap;

use graphops_core::{GraphFrame, PageRank};

/// When a page-rank computation stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageRankLimit {
    /// Run exactly this many iterations.
    MaxIterations(u32),
    /// Run until no score changes by more than this amount.
    Tolerance(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankParams {
    pub limit: PageRankLimit,
    pub reset_probability: f64,
}

impl PageRankParams {
    /// Reads the parameters of a validated operation.
    ///
    /// Returns `None` unless exactly one limit is set.
    #[must_use]
    pub fn from_operation(op: &PageRank) -> Option<Self> {
        let limit = match (op.max_iterations(), op.tolerance()) {
            (Some(n), None) => PageRankLimit::MaxIterations(n),
            (None, Some(t)) => PageRankLimit::Tolerance(t),
            _ => return None,
        };
        Some(Self {
            limit,
            reset_probability: op.reset_probability(),
        })
    }
}

/// Engine running whole-graph algorithms over a [`GraphFrame`].
pub trait GraphComputeEngine: Send + Sync + 'static {
    /// Returns a copy of `frame` with `page_rank` set on every vertex row.
    fn page_rank(&self, frame: &GraphFrame, params: &PageRankParams) -> anyhow::Result<GraphFrame>;
}

/// Single-threaded power iteration.
///
/// Scores start at 1.0 and follow `PR(v) = r + (1 - r) * sum(PR(u) / out(u))`
/// over the in-neighbours `u` of `v`. Vertices referenced only by edges take
/// part in the computation.
#[derive(Debug, Clone)]
pub struct InMemoryComputeEngine {
    /// Iteration cap applied in tolerance mode.
    pub max_tolerance_iterations: u32,
}

impl Default for InMemoryComputeEngine {
    fn default() -> Self {
        Self {
            max_tolerance_iterations: 1_000,
        }
    }
}

impl GraphComputeEngine for InMemoryComputeEngine {
    fn page_rank(&self, frame: &GraphFrame, params: &PageRankParams) -> anyhow::Result<GraphFrame> {
        let reset = params.reset_probability;
        anyhow::ensure!(
            (0.0..=1.0).contains(&reset),
            "reset probability must be between 0 and 1, was {reset}"
        );

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut intern = |key: String| {
            let next = index.len();
            *index.entry(key).or_insert(next)
        };
        for vertex in &frame.vertices {
            intern(vertex.id.canonical_key());
        }
        let edges: Vec<(usize, usize)> = frame
            .edges
            .iter()
            .map(|e| (intern(e.src.canonical_key()), intern(e.dst.canonical_key())))
            .collect();
        let n = index.len();

        let mut out_degree = vec![0_u32; n];
        for &(src, _) in &edges {
            out_degree[src] += 1;
        }

        let (max_iterations, tolerance) = match params.limit {
            PageRankLimit::MaxIterations(limit) => (limit, None),
            PageRankLimit::Tolerance(t) => (self.max_tolerance_iterations, Some(t)),
        };

        let mut ranks = vec![1.0_f64; n];
        for _ in 0..max_iterations {
            let mut incoming = vec![0.0_f64; n];
            for &(src, dst) in &edges {
                incoming[dst] += ranks[src] / f64::from(out_degree[src]);
            }
            let next: Vec<f64> = incoming
                .into_iter()
                .map(|sum| reset + (1.0 - reset) * sum)
                .collect();
            let delta = ranks
                .iter()
                .zip(&next)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f64, f64::max);
            ranks = next;
            if tolerance.is_some_and(|t| delta <= t) {
                break;
            }
        }

        let mut result = frame.clone();
        for vertex in &mut result.vertices {
            let rank = index.get(&vertex.id.canonical_key()).map(|&i| ranks[i]);
            vertex.page_rank = rank;
        }
        Ok(result)
    }
}
