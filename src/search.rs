use std::time::Duration;

use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Gamma};

use crate::clock::{Clock, SystemClock};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::oracle::{OracleError, PolicyValueOracle};
use crate::policy::extract_policy_vector;
use crate::state::PositionState;
use crate::tree::{NodeId, Tree};

/// Lifecycle of a [`SearchEngine`] across one `search` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No search started, or the last one failed.
    Idle,
    /// Fresh root created, not yet primed by the oracle.
    Rooted,
    /// Root primed, simulations in progress.
    Running,
    /// Budget spent and a move chosen; the tree stays available for inspection.
    Done,
}

/// Summary of a finished search.
#[derive(Clone, Debug)]
pub struct SearchReport<M> {
    pub best_move: M,
    /// Completed simulations after priming.
    pub simulations: u64,
    pub elapsed: Duration,
    /// Nodes in the tree, root included.
    pub nodes: usize,
    /// Mean backed-up value at the root, from the side to move there.
    pub root_value: f64,
}

/// PUCT tree search over a [`PolicyValueOracle`], bounded by a time budget.
///
/// Each call to [`search`](Self::search) builds a new tree; nothing is reused
/// between moves.
pub struct SearchEngine<S: PositionState, O, C = SystemClock> {
    oracle: O,
    clock: C,
    config: SearchConfig,
    rng: SmallRng,
    tree: Option<Tree<S>>,
    state: EngineState,
    report: Option<SearchReport<S::Move>>,
}

impl<S, O> SearchEngine<S, O, SystemClock>
where
    S: PositionState,
    O: PolicyValueOracle<S>,
{
    pub fn new(oracle: O, config: SearchConfig) -> Self {
        Self::with_clock(oracle, config, SystemClock::new())
    }
}

impl<S, O, C> SearchEngine<S, O, C>
where
    S: PositionState,
    O: PolicyValueOracle<S>,
    C: Clock,
{
    pub fn with_clock(oracle: O, config: SearchConfig, clock: C) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self { oracle, clock, config, rng, tree: None, state: EngineState::Idle, report: None }
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn state(&self) -> EngineState { self.state }

    /// Tree of the last successful search.
    pub fn tree(&self) -> Option<&Tree<S>> { self.tree.as_ref() }

    pub fn report(&self) -> Option<&SearchReport<S::Move>> { self.report.as_ref() }

    pub fn oracle_mut(&mut self) -> &mut O { &mut self.oracle }

    /// Root visit distribution of the last successful search.
    pub fn policy_vector(&self) -> Result<Vec<f32>, SearchError> {
        self.tree.as_ref().ok_or(SearchError::NotSearched).and_then(extract_policy_vector)
    }

    /// Search with the budget from the engine's config.
    pub fn best_move(&mut self, position: &S) -> Result<S::Move, SearchError> {
        self.config.validate()?;
        let budget = self.config.time_budget();
        self.search(position, budget)
    }

    /// Run simulations from `position` until `time_budget` has elapsed and
    /// return the most visited root move.
    ///
    /// The budget is only checked between simulations, so a slow oracle call
    /// can overrun it. Any oracle or codec error aborts the search.
    pub fn search(&mut self, position: &S, time_budget: Duration) -> Result<S::Move, SearchError> {
        self.tree = None;
        self.report = None;
        if position.is_terminal() {
            self.transition(EngineState::Idle);
            return Err(SearchError::NoLegalMoves);
        }

        let mut tree = Tree::new(position.clone());
        self.transition(EngineState::Rooted);
        match self.run(&mut tree, time_budget) {
            Ok(report) => {
                let best = report.best_move;
                debug!(
                    "search done: best={} sims={} nodes={} elapsed={:?} root_q={:.3}",
                    best, report.simulations, report.nodes, report.elapsed, report.root_value
                );
                self.report = Some(report);
                self.tree = Some(tree);
                self.transition(EngineState::Done);
                Ok(best)
            }
            Err(e) => {
                debug!("search aborted: {e}");
                self.transition(EngineState::Idle);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: EngineState) {
        trace!("engine {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn run(&mut self, tree: &mut Tree<S>, time_budget: Duration) -> Result<SearchReport<S::Move>, SearchError> {
        let root = tree.root();
        self.prime(tree)?;
        self.transition(EngineState::Running);

        let start = self.clock.now();
        let mut simulations = 0u64;
        let elapsed = loop {
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= time_budget {
                break elapsed;
            }
            self.simulate(tree)?;
            simulations += 1;
        };

        let (best_move, _) = tree.most_visited_child(root).ok_or(SearchError::NoLegalMoves)?;
        Ok(SearchReport {
            best_move,
            simulations,
            elapsed,
            nodes: tree.len(),
            root_value: tree.get(root).mean_value(),
        })
    }

    fn prime(&mut self, tree: &mut Tree<S>) -> Result<(), SearchError> {
        let root = tree.root();
        let eval = self.oracle.evaluate(tree.get(root).position())?;
        if tree.expand(root, &eval.policy)? == 0 {
            return Err(SearchError::NoLegalMoves);
        }
        if self.config.dirichlet_epsilon > 0.0 {
            self.add_root_noise(tree, root);
        }
        Ok(())
    }

    fn add_root_noise(&mut self, tree: &mut Tree<S>, root: NodeId) {
        let n = tree.get(root).children().len();
        if let Some(noise) = dirichlet_noise(n, self.config.dirichlet_alpha, &mut self.rng) {
            tree.mix_child_priors(root, &noise, self.config.dirichlet_epsilon);
        }
    }

    /// One select / evaluate / backpropagate pass.
    fn simulate(&mut self, tree: &mut Tree<S>) -> Result<(), SearchError> {
        let c_puct = self.config.c_puct;
        let mut node = tree.root();
        loop {
            let current = tree.get(node);
            if !current.is_expanded() || current.position().is_terminal() {
                break;
            }
            match tree.select_child(node, c_puct) {
                Some((_, child)) => node = child,
                None => break,
            }
        }

        let position = tree.get(node).position();
        let value = if position.is_terminal() {
            position.outcome().ok_or(SearchError::MissingOutcome)?.value()
        } else {
            let eval = self.oracle.evaluate(position)?;
            if !eval.value.is_finite() {
                return Err(OracleError::EvaluationFailed(format!("non-finite value {}", eval.value)).into());
            }
            let value = (eval.value as f64).clamp(-1.0, 1.0);
            tree.expand(node, &eval.policy)?;
            value
        };
        tree.backpropagate(node, value);
        Ok(())
    }
}

/// Normalised Dirichlet(alpha) sample of length `n`.
fn dirichlet_noise(n: usize, alpha: f64, rng: &mut SmallRng) -> Option<Vec<f64>> {
    let gamma = Gamma::new(alpha, 1.0).ok()?;
    let mut samples: Vec<f64> = (0..n).map(|_| gamma.sample(rng)).collect();
    let sum: f64 = samples.iter().sum();
    if !(sum > 0.0) {
        return None;
    }
    for s in &mut samples { *s /= sum; }
    Some(samples)
}
