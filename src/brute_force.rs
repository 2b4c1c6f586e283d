//! Exhaustive exploration by simulation.
//!
//! Every state is simulated under all `2^k` assignments of the `k` free
//! inputs. Assignments are grouped by the destination they lead to, and each
//! group becomes the condition of one edge. Each assignment lands in exactly
//! one group, so the conditions of a source are disjoint without any solving.
//! There is no time budget: the run either completes or is rejected up front
//! when `k` is too large.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use log::{debug, info};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::graph::{Condition, TransitionGraph};
use crate::next_state::NextStateFunctions;
use crate::reference::Ref;
use crate::state::State;

/// Assignments of the free inputs, bit `i` holding input `i`.
type Assignment = u64;

#[derive(Debug, Clone)]
pub struct BruteForceConfig {
    /// Largest number of free inputs accepted (default: 20).
    pub max_inputs: usize,
    /// Initial capacity of the decision diagram manager used to build
    /// conditions, as a power of two.
    pub storage_bits: usize,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            max_inputs: 20,
            storage_bits: 16,
        }
    }
}

pub struct BruteForceExplorer<'a> {
    functions: &'a NextStateFunctions,
    config: BruteForceConfig,
}

impl<'a> BruteForceExplorer<'a> {
    pub fn new(functions: &'a NextStateFunctions, config: BruteForceConfig) -> Self {
        Self { functions, config }
    }

    pub fn explore(&self, initial: State) -> Result<TransitionGraph> {
        let num_inputs = self.functions.num_inputs();
        let limit = self.config.max_inputs.min(Assignment::BITS as usize - 1);
        if num_inputs > limit {
            return Err(Error::InfeasibleInputSpace {
                inputs: num_inputs,
                limit,
            });
        }

        let start = Instant::now();
        info!(
            "Starting brute-force exploration from state {} ({} state bits, {} input assignments per state)",
            initial,
            self.functions.width(),
            1u64 << num_inputs
        );

        let bdd = Bdd::new(self.config.storage_bits);
        let mut graph = TransitionGraph::new(self.functions.width(), self.functions.input_names.clone());
        let mut seen = HashSet::from([initial]);
        let mut frontier = vec![initial];

        while !frontier.is_empty() {
            debug!("Simulating a frontier of {} states", frontier.len());

            #[cfg(feature = "rayon")]
            let iter = frontier.par_iter();
            #[cfg(not(feature = "rayon"))]
            let iter = frontier.iter();

            let successors: Vec<_> = iter.map(|&s| (s, self.successors(s))).collect();

            let mut next_frontier = Vec::new();
            for (source, groups) in successors {
                graph.insert_state(source);
                for (destination, assignments) in groups {
                    let f = minterms_to_bdd(&bdd, &assignments, 0, num_inputs);
                    let condition = Condition::from_bdd(&bdd, f);
                    debug!(
                        "{} -> {} when {} ({} input assignments)",
                        source,
                        destination,
                        graph.condition_to_string(&condition),
                        assignments.len()
                    );
                    graph.insert_edge(source, destination, condition);
                    if seen.insert(destination) {
                        next_frontier.push(destination);
                    }
                }
            }
            frontier = next_frontier;
        }

        info!(
            "Brute-force exploration finished in {:?}: {} states, {} edges",
            start.elapsed(),
            graph.num_states(),
            graph.num_edges()
        );
        Ok(graph)
    }

    /// All input assignments of `state`, grouped by destination.
    fn successors(&self, state: State) -> BTreeMap<State, Vec<Assignment>> {
        let mut scratch = Vec::new();
        let mut groups: BTreeMap<State, Vec<Assignment>> = BTreeMap::new();
        for a in 0..1u64 << self.functions.num_inputs() {
            let destination = self.functions.step(state, |i| a >> i & 1 != 0, &mut scratch);
            groups.entry(destination).or_default().push(a);
        }
        groups
    }
}

/// Diagram of the set of `assignments`, splitting on input `i` (variable
/// `i + 1`) at each level.
fn minterms_to_bdd(bdd: &Bdd, assignments: &[Assignment], i: usize, num_inputs: usize) -> Ref {
    if assignments.is_empty() {
        return bdd.zero;
    }
    if i == num_inputs {
        return bdd.one;
    }
    let (high, low): (Vec<Assignment>, Vec<Assignment>) = assignments.iter().copied().partition(|&a| a >> i & 1 != 0);
    let low = minterms_to_bdd(bdd, &low, i + 1, num_inputs);
    let high = minterms_to_bdd(bdd, &high, i + 1, num_inputs);
    bdd.mk_node(i as u32 + 1, low, high)
}
