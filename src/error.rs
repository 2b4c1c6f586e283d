use std::path::PathBuf;

/// Everything that can go wrong while extracting or rendering a state machine.
///
/// Running out of time is not an error: an explorer that exhausts its budget
/// returns the graph built so far, marked
/// [`Completeness::Partial`][crate::graph::Completeness::Partial].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The next value of a register element cannot be computed from the
    /// supplied transition logic.
    #[error("incomplete transition logic: net '{net}' {reason}")]
    IncompleteCone { net: String, reason: &'static str },

    /// The backward walk reached a net that is still being resolved.
    #[error("combinational loop through net '{net}'")]
    CombinationalLoop { net: String },

    /// The symbolic backend gave up; the partial graph cannot be trusted.
    #[error("solver error: {0}")]
    Solver(String),

    #[error("invalid numeric base {base}, expected a value in 2..=36")]
    InvalidBase { base: u32 },

    #[error("failed to write graph to '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("gate '{gate}' is not a flip-flop and cannot be part of a state register")]
    InvalidRegister { gate: String },

    #[error("gate '{gate}' is not part of the state register")]
    NotInRegister { gate: String },

    #[error("state register has {width} elements, at most 64 are supported")]
    RegisterTooWide { width: usize },

    #[error("{inputs} free input bits exceed the brute-force limit of {limit}")]
    InfeasibleInputSpace { inputs: usize, limit: usize },

    #[error("net '{net}' already has a driver")]
    MultipleDrivers { net: String },

    #[error("gate '{gate}' expects {expected} {what}, got {found}")]
    Arity {
        gate: String,
        what: &'static str,
        expected: String,
        found: usize,
    },

    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
