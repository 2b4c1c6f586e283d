//! Entry points operating directly on a netlist.
//!
//! [`SolveFsmPlugin`] wires the pieces together: it validates the state
//! register, extracts the next-state functions from the transition logic,
//! explores the state space and optionally writes the resulting graph in
//! DOT format.
//!
//! ```
//! use std::collections::HashMap;
//!
//! use solve_fsm::netlist::{GateKind, NaryType, Netlist};
//! use solve_fsm::plugin::{SolveFsmPlugin, DEFAULT_TIMEOUT};
//!
//! // 1-bit register toggled by input X.
//! let mut nl = Netlist::new();
//! let x = nl.add_global_input("X");
//! let d = nl.add_net("d");
//! let r = nl.add_dff("R0", d)?;
//! let q = nl.gate(r).output();
//! let xor = nl.add_gate("xor", GateKind::Nary(NaryType::Xor), &[q, x], &[d])?;
//!
//! let graph = SolveFsmPlugin::solve_fsm(&nl, &[r], &[xor], &HashMap::new(), None, DEFAULT_TIMEOUT)?;
//! assert!(graph.is_complete());
//! assert_eq!(graph.num_states(), 2);
//! # Ok::<(), solve_fsm::error::Error>(())
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use log::info;

use crate::brute_force::{BruteForceConfig, BruteForceExplorer};
use crate::dot::{self, DotConfig};
use crate::error::{Error, Result};
use crate::graph::TransitionGraph;
use crate::netlist::{GateId, Netlist};
use crate::next_state::NextStateFunctions;
use crate::solver::{SatExplorer, SolverConfig};
use crate::state::StateRegister;

pub use crate::dot::{DEFAULT_BASE, DEFAULT_MAX_CONDITION_LENGTH};
pub use crate::solver::DEFAULT_TIMEOUT;

pub struct SolveFsmPlugin;

impl SolveFsmPlugin {
    pub const NAME: &'static str = "solve_fsm";
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    /// Recover the transition graph reachable from `initial_state` using
    /// symbolic exploration.
    ///
    /// Register elements missing from `initial_state` start at 0. If the
    /// timeout expires, the graph found so far is returned and
    /// [`TransitionGraph::is_complete`] is `false`.
    pub fn solve_fsm(
        netlist: &Netlist,
        state_reg: &[GateId],
        transition_logic: &[GateId],
        initial_state: &HashMap<GateId, bool>,
        graph_path: Option<&Path>,
        timeout: Duration,
    ) -> Result<TransitionGraph> {
        let config = SolverConfig {
            timeout,
            ..SolverConfig::default()
        };
        Self::solve_fsm_with_config(netlist, state_reg, transition_logic, initial_state, graph_path, config)
    }

    pub fn solve_fsm_with_config(
        netlist: &Netlist,
        state_reg: &[GateId],
        transition_logic: &[GateId],
        initial_state: &HashMap<GateId, bool>,
        graph_path: Option<&Path>,
        config: SolverConfig,
    ) -> Result<TransitionGraph> {
        let register = StateRegister::new(netlist, state_reg)?;
        let initial = register.initial_state(netlist, initial_state)?;
        let functions = NextStateFunctions::build(netlist, &register, transition_logic)?;

        let graph = SatExplorer::new(&functions, config).explore(initial)?;
        if let Some(path) = output_path(graph_path) {
            write_graph(path, &graph.to_dot()?)?;
        }
        Ok(graph)
    }

    /// Recover the transition graph reachable from state 0 by simulating
    /// every input assignment in every state.
    pub fn solve_fsm_brute_force(
        netlist: &Netlist,
        state_reg: &[GateId],
        transition_logic: &[GateId],
        graph_path: Option<&Path>,
    ) -> Result<TransitionGraph> {
        let register = StateRegister::new(netlist, state_reg)?;
        let functions = NextStateFunctions::build(netlist, &register, transition_logic)?;

        let graph = BruteForceExplorer::new(&functions, BruteForceConfig::default()).explore(0)?;
        if let Some(path) = output_path(graph_path) {
            write_graph(path, &graph.to_dot()?)?;
        }
        Ok(graph)
    }

    /// Render `transitions` in DOT format, with states formatted for a
    /// register of `state_reg.len()` bits.
    pub fn generate_dot_graph(
        state_reg: &[GateId],
        transitions: &TransitionGraph,
        graph_path: Option<&Path>,
        max_condition_length: usize,
        base: u32,
    ) -> Result<String> {
        let config = DotConfig {
            base,
            max_condition_length,
            ..DotConfig::default()
        };
        let text = dot::render(transitions, state_reg.len(), &config)?;
        if let Some(path) = output_path(graph_path) {
            write_graph(path, &text)?;
        }
        Ok(text)
    }
}

/// An empty path means no output, like a missing one.
fn output_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn write_graph(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote transition graph to '{}'", path.display());
    Ok(())
}
