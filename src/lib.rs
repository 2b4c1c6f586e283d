//! # solve-fsm: state machine recovery from gate-level netlists
//!
//! **`solve-fsm`** reconstructs the state-transition graph of a finite state machine
//! buried in a flattened netlist. Given the flip-flops forming the state register and the
//! combinational gates computing its next value, it enumerates every state reachable from
//! an initial state, together with the exact condition on the free inputs under which each
//! transition fires.
//!
//! ## How it works
//!
//! 1. **Extraction**: the D input of every register element is traced back through the
//!    transition logic into a hash-consed expression DAG ([`next_state`]). Register outputs
//!    become state variables; every other signal entering the logic becomes a free input.
//! 2. **Exploration**: starting from the initial state, a worklist of states is drained.
//!    The symbolic explorer ([`solver`]) enumerates the outgoing edges of a state with a
//!    query/generalize/block loop over Binary Decision Diagrams. The brute-force explorer
//!    ([`brute_force`]) simulates all input assignments instead and serves as a reference.
//! 3. **Rendering**: the resulting [`TransitionGraph`][crate::graph::TransitionGraph] can be
//!    written in DOT format ([`dot`]).
//!
//! Conditions leaving the same state are pairwise disjoint, and both explorers produce
//! identical graphs for the same logic.
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use solve_fsm::netlist::{GateKind, NaryType, Netlist};
//! use solve_fsm::plugin::{SolveFsmPlugin, DEFAULT_TIMEOUT};
//!
//! // A 1-bit register R0 with next = R0 XOR X.
//! let mut nl = Netlist::new();
//! let x = nl.add_global_input("X");
//! let d = nl.add_net("d");
//! let r0 = nl.add_dff("R0", d)?;
//! let q = nl.gate(r0).output();
//! let xor = nl.add_gate("xor", GateKind::Nary(NaryType::Xor), &[q, x], &[d])?;
//!
//! let graph = SolveFsmPlugin::solve_fsm(&nl, &[r0], &[xor], &HashMap::new(), None, DEFAULT_TIMEOUT)?;
//! let from_zero = graph.successors(0).unwrap();
//! assert_eq!(graph.condition_to_string(&from_zero[&0]), "!X");
//! assert_eq!(graph.condition_to_string(&from_zero[&1]), "X");
//! # Ok::<(), solve_fsm::error::Error>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`plugin`]**: Entry points working on a [`Netlist`][crate::netlist::Netlist].
//! - **[`solver`]** and **[`brute_force`]**: The two exploration strategies.
//! - **[`bdd`]**: The decision diagram manager behind symbolic exploration.
//! - **[`graph`]**: Transition graphs and edge conditions.

pub mod bdd;
pub mod brute_force;
pub mod cache;
pub mod dot;
pub mod error;
pub mod expr;
pub mod graph;
pub mod netlist;
pub mod next_state;
pub mod paths;
pub mod plugin;
pub mod reference;
pub mod sat;
pub mod solver;
pub mod state;
pub mod table;
pub mod types;
pub mod utils;
