#![deny(unsafe_code)]
//! Dielectric-breakdown growth engine for Lichtenberg figures.
//!
//! A run starts from a single seed cell and repeatedly commits one frontier
//! cell at a time, chosen by a seeded weighted draw over the potential field
//! (see [`select`]). Each commit produces one [`Segment`]. Work is handed out
//! in bounded batches by [`RunState::step`] so a host can animate the figure
//! one frame at a time.
//!
//! ```
//! use lichtenberg_core::{Domain, GridPos};
//! use lichtenberg_growth::{GrowthConfig, RunState};
//!
//! let domain = Domain::new(64, 64).unwrap();
//! let config = GrowthConfig { max_nodes: 100, ..GrowthConfig::default() };
//! let mut run = RunState::start(domain, GridPos::new(32, 0), config).unwrap();
//! let mut drawn = 0;
//! while !run.is_terminated() {
//!     drawn += run.step().unwrap().len();
//! }
//! assert_eq!(drawn, 99);
//! ```

pub mod config;
pub mod frontier;
pub mod select;
pub mod tree;

use std::sync::Arc;

use lichtenberg_core::{CounterRng, Domain, GridPos, LichtenbergError, PotentialField, Termination};

pub use config::GrowthConfig;
pub use frontier::{Candidate, Frontier};
pub use tree::{GrowthNode, GrowthTree, NodeId, Segment};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Active,
    Terminated(Termination),
}

/// Per-invocation growth state. Owned by whichever caller drives the run.
#[derive(Debug, Clone)]
pub struct RunState {
    domain: Domain,
    field: Arc<PotentialField>,
    config: GrowthConfig,
    rng: CounterRng,
    tree: GrowthTree,
    frontier: Frontier,
    draws: u64,
    status: RunStatus,
}

impl RunState {
    /// Validates the inputs, builds the potential field and plants the root.
    ///
    /// Returns `LichtenbergError::InvalidConfig` before creating any state if
    /// the config is out of range or `seed` lies outside `domain`. A run whose
    /// limit is already met (`max_nodes == 1`) or whose root has no
    /// neighbours starts terminated.
    pub fn start(
        domain: Domain,
        seed: GridPos,
        config: GrowthConfig,
    ) -> Result<Self, LichtenbergError> {
        config.validate()?;
        if !domain.contains(seed.x as i64, seed.y as i64) {
            return Err(LichtenbergError::InvalidConfig(format!(
                "seed position ({}, {}) is outside the {}x{} domain",
                seed.x,
                seed.y,
                domain.width(),
                domain.height()
            )));
        }

        let field = PotentialField::initialize(domain, seed, &config.field, config.random_seed)?;
        let tree = GrowthTree::new(domain, seed);
        let mut frontier = Frontier::default();
        for n in domain.neighbours(seed) {
            frontier.propose(n, 0);
        }

        let mut run = Self {
            domain,
            field: Arc::new(field),
            config,
            rng: CounterRng::new(config.random_seed),
            tree,
            frontier,
            draws: 0,
            status: RunStatus::Active,
        };
        tracing::debug!(
            width = domain.width(),
            height = domain.height(),
            seed_x = seed.x,
            seed_y = seed.y,
            max_nodes = config.max_nodes,
            random_seed = config.random_seed,
            "growth run started"
        );
        if let Some(end) = run.natural_end() {
            run.finish(end);
        }
        Ok(run)
    }

    /// Commits up to `step_budget_per_call` nodes and returns their segments
    /// in commit order.
    ///
    /// An active run always emits at least one segment. The run is marked
    /// terminated as soon as a stopping condition holds, including right
    /// after the last commit of this call. Returns
    /// `LichtenbergError::RunTerminated` if the run had already ended.
    pub fn step(&mut self) -> Result<Vec<Segment>, LichtenbergError> {
        if let RunStatus::Terminated(end) = self.status {
            return Err(LichtenbergError::RunTerminated(end));
        }

        let budget = self.config.step_budget_per_call;
        let mut segments = Vec::with_capacity(budget.min(self.remaining()));
        loop {
            if let Some(end) = self.natural_end() {
                self.finish(end);
                break;
            }
            if segments.len() == budget {
                break;
            }
            match self.commit_next() {
                Some(segment) => segments.push(segment),
                None => {
                    self.finish(Termination::Exhausted);
                    break;
                }
            }
        }
        Ok(segments)
    }

    /// Ends the run with `Termination::Cancelled`.
    ///
    /// Takes effect immediately; the next `step` fails. Returns
    /// `LichtenbergError::RunTerminated` if the run had already ended.
    pub fn cancel(&mut self) -> Result<(), LichtenbergError> {
        if let RunStatus::Terminated(end) = self.status {
            return Err(LichtenbergError::RunTerminated(end));
        }
        tracing::info!(nodes = self.tree.len(), "growth run cancelled");
        self.status = RunStatus::Terminated(Termination::Cancelled);
        Ok(())
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.status, RunStatus::Terminated(_))
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// The terminal state, if the run has ended.
    pub fn termination(&self) -> Option<Termination> {
        match self.status {
            RunStatus::Active => None,
            RunStatus::Terminated(end) => Some(end),
        }
    }

    /// A lazy iterator that drives `step` and yields segments one at a time
    /// until the run terminates. Once drained it yields nothing more.
    pub fn grow(&mut self) -> Grow<'_> {
        Grow {
            run: self,
            pending: Vec::new().into_iter(),
        }
    }

    /// Drains the run and returns every remaining segment.
    ///
    /// Returns `LichtenbergError::RunTerminated` if the run had already ended.
    pub fn run_to_end(&mut self) -> Result<Vec<Segment>, LichtenbergError> {
        if let RunStatus::Terminated(end) = self.status {
            return Err(LichtenbergError::RunTerminated(end));
        }
        Ok(self.grow().collect())
    }

    /// All segments committed so far, re-derived from the retained tree.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.tree.segments()
    }

    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn tree(&self) -> &GrowthTree {
        &self.tree
    }

    /// Shared handle to the immutable potential field.
    pub fn field(&self) -> Arc<PotentialField> {
        Arc::clone(&self.field)
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    fn remaining(&self) -> usize {
        self.config.max_nodes.saturating_sub(self.tree.len())
    }

    /// First matching stopping condition, limit before exhaustion.
    fn natural_end(&self) -> Option<Termination> {
        if self.tree.len() >= self.config.max_nodes {
            Some(Termination::Completed)
        } else if self.frontier.is_empty() {
            Some(Termination::Exhausted)
        } else {
            None
        }
    }

    fn finish(&mut self, end: Termination) {
        tracing::debug!(
            status = %end,
            nodes = self.tree.len(),
            draws = self.draws,
            "growth run terminated"
        );
        self.status = RunStatus::Terminated(end);
    }

    /// Selects, then commits one candidate. Nothing is mutated unless a
    /// candidate was selected.
    fn commit_next(&mut self) -> Option<Segment> {
        let slot = select::select(
            &self.frontier,
            &self.tree,
            &self.field,
            &self.rng,
            self.draws,
            self.config.branching_factor,
        )?;

        let candidate = self.frontier.take(slot);
        let segment = self.tree.attach(candidate.proposer, candidate.pos);
        self.draws += 1;
        for n in self.domain.neighbours(candidate.pos) {
            if !self.tree.is_occupied(n) {
                self.frontier.propose(n, segment.node);
            }
        }
        Some(segment)
    }
}

/// Lazy, finite, non-restartable segment sequence over a run.
///
/// Obtaining the segments again requires [`RunState::segments`], which
/// re-traverses the retained tree.
pub struct Grow<'a> {
    run: &'a mut RunState,
    pending: std::vec::IntoIter<Segment>,
}

impl Iterator for Grow<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        loop {
            if let Some(segment) = self.pending.next() {
                return Some(segment);
            }
            if self.run.is_terminated() {
                return None;
            }
            self.pending = self.run.step().ok()?.into_iter();
        }
    }
}

impl std::iter::FusedIterator for Grow<'_> {}
