//! Transition graph to DOT (Graphviz) conversion.
//!
//! States are rendered as unsigned integers in a configurable base, all
//! zero-padded to the number of digits of the largest state the register
//! can hold. Edges are labeled with their conditions, truncated to a maximum
//! length with an explicit marker so a clipped label never reads as a
//! different, complete condition.
//!
//! # Examples
//!
//! ```
//! use solve_fsm::dot::DotConfig;
//! use solve_fsm::graph::{Condition, TransitionGraph};
//!
//! let mut graph = TransitionGraph::new(2, vec!["en".to_string()]);
//! graph.insert_state(0);
//! graph.insert_edge(0, 1, Condition::always());
//!
//! let config = DotConfig { base: 2, ..DotConfig::default() };
//! let dot = graph.to_dot_with_config(&config).unwrap();
//! assert!(dot.contains("\"00\" -> \"01\" [label=\"1\"];"));
//! ```

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::graph::TransitionGraph;
use crate::state::{State, MAX_WIDTH};

pub const DEFAULT_BASE: u32 = 10;
pub const DEFAULT_MAX_CONDITION_LENGTH: usize = 128;

#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Numeric base of state labels, in `2..=36` (default: 10)
    pub base: u32,
    /// Longest edge label kept verbatim, in characters (default: 128)
    pub max_condition_length: usize,
    /// Appended to truncated labels (default: "...")
    pub truncation_marker: &'static str,
    /// Shape for state nodes (default: "circle")
    pub node_shape: &'static str,
    /// Whether edges carry their conditions (default: true)
    pub show_conditions: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            max_condition_length: DEFAULT_MAX_CONDITION_LENGTH,
            truncation_marker: "...",
            node_shape: "circle",
            show_conditions: true,
        }
    }
}

fn check_base(base: u32) -> Result<()> {
    if !(2..=36).contains(&base) {
        return Err(Error::InvalidBase { base });
    }
    Ok(())
}

fn check_width(width: usize) -> Result<()> {
    if width > MAX_WIDTH {
        return Err(Error::RegisterTooWide { width });
    }
    Ok(())
}

/// Number of base-`base` digits needed for any state of a `width`-bit register,
/// with `width <= MAX_WIDTH`.
fn num_digits(width: usize, base: u32) -> usize {
    let mut max = (1u128 << width) - 1;
    let mut digits = 1;
    while max >= base as u128 {
        max /= base as u128;
        digits += 1;
    }
    digits
}

/// `state` in the given base, zero-padded for a `width`-bit register.
pub fn format_state(state: State, width: usize, base: u32) -> Result<String> {
    check_base(base)?;
    check_width(width)?;
    let mut digits = Vec::new();
    let mut rest = state;
    while rest > 0 {
        let d = (rest % base as u64) as u32;
        digits.push(std::char::from_digit(d, base).unwrap_or('?'));
        rest /= base as u64;
    }
    if state == 0 {
        digits.push('0');
    }
    let padding = num_digits(width, base).saturating_sub(digits.len());
    digits.extend(std::iter::repeat_n('0', padding));
    Ok(digits.iter().rev().collect())
}

/// Keep the first `max_len` characters of `text`, followed by `marker` if
/// anything was cut.
pub fn truncate(text: &str, max_len: usize, marker: &str) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{}", &text[..cut], marker),
        None => text.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl TransitionGraph {
    pub fn to_dot(&self) -> Result<String> {
        self.to_dot_with_config(&DotConfig::default())
    }

    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String> {
        render(self, self.width(), config)
    }
}

/// Render `graph` with state labels sized for a `width`-bit register.
///
/// Every visited state becomes a node. Destinations that were never
/// visited, which only happens in partial graphs, get a node as well.
///
/// # Errors
///
/// [`Error::InvalidBase`] if `config.base` is not in `2..=36`, and
/// [`Error::RegisterTooWide`] if `width` exceeds [`MAX_WIDTH`].
pub fn render(graph: &TransitionGraph, width: usize, config: &DotConfig) -> Result<String> {
    use std::fmt::Write as _;

    check_base(config.base)?;
    check_width(width)?;
    let name = |s: State| format_state(s, width, config.base);

    let mut dot = String::new();
    writeln!(dot, "digraph {{")?;
    writeln!(dot, "node [shape={}];", config.node_shape)?;

    let nodes: BTreeSet<State> = graph.states().chain(graph.edges().map(|(_, d, _)| d)).collect();
    for &state in nodes.iter() {
        let label = name(state)?;
        writeln!(dot, "\"{}\" [label=\"{}\"];", label, label)?;
    }

    for (source, destination, condition) in graph.edges() {
        let (source, destination) = (name(source)?, name(destination)?);
        if config.show_conditions {
            let text = graph.condition_to_string(condition);
            let label = truncate(&text, config.max_condition_length, config.truncation_marker);
            writeln!(dot, "\"{}\" -> \"{}\" [label=\"{}\"];", source, destination, escape(&label))?;
        } else {
            writeln!(dot, "\"{}\" -> \"{}\";", source, destination)?;
        }
    }

    writeln!(dot, "}}")?;
    Ok(dot)
}
