//! Symbolic exploration of the state space.
//!
//! For each visited state the next-state functions are cofactored by the
//! state bits, leaving one diagram per bit over the free inputs only. The
//! outgoing edges are then enumerated with a query/generalize/block loop:
//!
//! 1. pick any input assignment not covered by the edges found so far,
//! 2. compute the destination `d` it leads to,
//! 3. generalize to the whole region of inputs leading to `d`,
//! 4. record the edge and block the region.
//!
//! Blocked regions are removed from the search space, so the conditions of
//! one source are pairwise disjoint and, once the loop ends, cover every
//! input assignment.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::graph::{Condition, TransitionGraph};
use crate::next_state::NextStateFunctions;
use crate::reference::Ref;
use crate::state::{bit, State};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(600_000);

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget of a whole exploration (default: 10 minutes).
    pub timeout: Duration,
    /// Size limit of the decision diagram manager. Exceeding it aborts the
    /// run with [`Error::Solver`].
    pub max_nodes: usize,
    /// Initial capacity of the manager, as a power of two.
    pub storage_bits: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_nodes: 1 << 24,
            storage_bits: 20,
        }
    }
}

pub struct SatExplorer<'a> {
    functions: &'a NextStateFunctions,
    config: SolverConfig,
}

impl<'a> SatExplorer<'a> {
    pub fn new(functions: &'a NextStateFunctions, config: SolverConfig) -> Self {
        Self { functions, config }
    }

    /// Explore every state reachable from `initial`.
    ///
    /// Running out of time is not an error: the states finished so far are
    /// returned, marked [`Partial`][crate::graph::Completeness::Partial].
    /// A state whose edges were still being enumerated is left out, so every
    /// state present has its complete set of outgoing edges.
    pub fn explore(&self, initial: State) -> Result<TransitionGraph> {
        // An unrepresentable deadline is as good as none.
        let deadline = Instant::now().checked_add(self.config.timeout);
        self.explore_until(initial, || deadline.is_some_and(|d| Instant::now() >= d))
    }

    /// Explore from `initial`, asking `expired` before every model query.
    fn explore_until(&self, initial: State, expired: impl Fn() -> bool) -> Result<TransitionGraph> {
        let start = Instant::now();
        let functions = self.functions;
        let width = functions.width();
        let num_inputs = functions.num_inputs();
        info!(
            "Starting SAT exploration from state {} ({} state bits, {} free inputs, timeout {:?})",
            initial, width, num_inputs, self.config.timeout
        );

        let bdd = Bdd::new(self.config.storage_bits);
        let next = functions.to_bdd(&bdd);
        self.check_size(&bdd)?;

        let mut graph = TransitionGraph::new(width, functions.input_names.clone());
        let mut seen = HashSet::from([initial]);
        let mut queue = VecDeque::from([initial]);

        'states: while let Some(source) = queue.pop_front() {
            debug!("Exploring state {}", source);

            let bits = self.cofactor(&bdd, &next, source);
            let mut remaining = bdd.one;
            // Edges of a source are committed together, once they cover every input.
            let mut edges = Vec::new();

            while !bdd.is_zero(remaining) {
                if expired() {
                    warn!(
                        "Timeout after {:?}: {} states finished, state {} dropped after {} edges, {} still queued",
                        start.elapsed(),
                        graph.num_states(),
                        source,
                        edges.len(),
                        queue.len()
                    );
                    graph.mark_partial();
                    break 'states;
                }

                let Some(model) = bdd.one_sat(remaining) else {
                    break;
                };
                // Variables missing from the model are don't-cares.
                let mut inputs = vec![false; num_inputs];
                for lit in model {
                    inputs[lit.var() as usize - 1] = lit.is_positive();
                }
                let destination = bits.iter().enumerate().fold(0, |acc, (b, &g)| {
                    if bdd.evaluate(g, |v| inputs[v as usize - 1]) {
                        acc | 1 << b
                    } else {
                        acc
                    }
                });

                let region = bdd.apply_and_many(
                    bits.iter()
                        .enumerate()
                        .map(|(b, &g)| bdd.apply_eq(g, bdd.constant(bit(destination, b)))),
                );
                let condition = Condition::from_bdd(&bdd, region);
                debug!(
                    "{} -> {} when {} ({} input assignments, {} nodes)",
                    source,
                    destination,
                    graph.condition_to_string(&condition),
                    bdd.sat_count(region, num_inputs),
                    bdd.size(region)
                );
                edges.push((destination, condition));
                remaining = bdd.apply_and(remaining, -region);
                self.check_size(&bdd)?;
            }

            graph.insert_state(source);
            for (destination, condition) in edges {
                graph.insert_edge(source, destination, condition);
                if seen.insert(destination) {
                    queue.push_back(destination);
                }
            }
        }

        info!(
            "SAT exploration finished in {:?}: {} states, {} edges, {} diagram nodes{}",
            start.elapsed(),
            graph.num_states(),
            graph.num_edges(),
            bdd.num_nodes(),
            if graph.is_complete() { "" } else { " (partial)" }
        );
        Ok(graph)
    }

    /// Next-state diagrams with the state bits fixed to `state`.
    fn cofactor(&self, bdd: &Bdd, next: &[Ref], state: State) -> Vec<Ref> {
        let values: HashMap<u32, bool> = (0..self.functions.width())
            .map(|b| (self.functions.state_var(b), bit(state, b)))
            .collect();
        next.iter().map(|&f| bdd.restrict(f, &values)).collect()
    }

    fn check_size(&self, bdd: &Bdd) -> Result<()> {
        if bdd.num_nodes() > self.config.max_nodes {
            return Err(Error::Solver(format!(
                "decision diagram grew to {} nodes, limit is {}",
                bdd.num_nodes(),
                self.config.max_nodes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use num_bigint::BigUint;

    use super::*;
    use crate::graph::Completeness;
    use crate::netlist::{GateId, GateKind, NaryType, Netlist};
    use crate::state::StateRegister;
    use test_log::test;

    /// 2-bit counter `r1 r0` that increments when `en` is high.
    fn counter() -> NextStateFunctions {
        let mut nl = Netlist::new();
        let en = nl.add_global_input("en");
        let d0 = nl.add_net("d0");
        let d1 = nl.add_net("d1");
        let r0 = nl.add_dff("r0", d0).unwrap();
        let r1 = nl.add_dff("r1", d1).unwrap();
        let q0 = nl.gate(r0).output();
        let q1 = nl.gate(r1).output();

        let mut logic: Vec<GateId> = Vec::new();
        let carry = nl.add_logic("carry", GateKind::Nary(NaryType::And), &[q0, en]).unwrap();
        logic.push(nl.driver(carry).unwrap().0);
        logic.push(nl.add_gate("x0", GateKind::Nary(NaryType::Xor), &[q0, en], &[d0]).unwrap());
        logic.push(nl.add_gate("x1", GateKind::Nary(NaryType::Xor), &[q1, carry], &[d1]).unwrap());

        let reg = StateRegister::new(&nl, &[r0, r1]).unwrap();
        NextStateFunctions::build(&nl, &reg, &logic).unwrap()
    }

    #[test]
    fn test_counter() {
        let functions = counter();
        let graph = SatExplorer::new(&functions, SolverConfig::default()).explore(0).unwrap();

        assert!(graph.is_complete());
        assert_eq!(graph.states().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(graph.num_edges(), 8);
        for s in 0..4 {
            let edges = graph.successors(s).unwrap();
            assert_eq!(graph.condition_to_string(&edges[&s]), "!en");
            assert_eq!(graph.condition_to_string(&edges[&((s + 1) % 4)]), "en");
        }
    }

    #[test]
    fn test_initial_state_other_than_zero() {
        let functions = counter();
        let graph = SatExplorer::new(&functions, SolverConfig::default()).explore(2).unwrap();
        assert_eq!(graph.num_states(), 4);
    }

    #[test]
    fn test_zero_timeout_is_partial() {
        let functions = counter();
        let config = SolverConfig {
            timeout: Duration::ZERO,
            ..SolverConfig::default()
        };
        let graph = SatExplorer::new(&functions, config).explore(0).unwrap();
        assert_eq!(graph.completeness(), Completeness::Partial);
        // The initial state was interrupted before any edge was found.
        assert_eq!(graph.num_states(), 0);
        assert_eq!(graph.num_edges(), 0);
    }

    /// Deadline that expires after `budget` model queries.
    fn after_queries(budget: usize) -> impl Fn() -> bool {
        let queries = Cell::new(0);
        move || {
            queries.set(queries.get() + 1);
            queries.get() > budget
        }
    }

    #[test]
    fn test_interrupted_state_is_dropped() {
        let functions = counter();
        // State 0 takes two queries, state 1 is cut after its first edge.
        let graph = SatExplorer::new(&functions, SolverConfig::default())
            .explore_until(0, after_queries(3))
            .unwrap();
        assert!(!graph.is_complete());
        assert_eq!(graph.states().collect::<Vec<_>>(), vec![0]);
        assert_eq!(graph.successors(0).unwrap().len(), 2);
        assert!(!graph.contains_state(1));
        for condition in graph.successors(0).unwrap().values() {
            assert_eq!(condition.num_assignments(1), BigUint::from(1u8));
        }
    }

    #[test]
    fn test_deadline_after_last_query_is_complete() {
        let functions = counter();
        // Four states with two edges each; no query is left after the last one.
        let graph = SatExplorer::new(&functions, SolverConfig::default())
            .explore_until(0, after_queries(8))
            .unwrap();
        assert!(graph.is_complete());
        assert_eq!(graph.num_edges(), 8);
    }

    #[test]
    fn test_node_limit() {
        let functions = counter();
        let config = SolverConfig {
            max_nodes: 2,
            ..SolverConfig::default()
        };
        let err = SatExplorer::new(&functions, config).explore(0).unwrap_err();
        assert!(matches!(err, Error::Solver(_)));
    }
}
