use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use solve_fsm::netlist::{GateId, GateKind, NaryType, Netlist};
use solve_fsm::plugin::SolveFsmPlugin;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Width of the counter register.
    #[arg(value_name = "INT", default_value = "3")]
    width: usize,

    /// Simulate every input assignment instead of solving.
    #[clap(long)]
    brute_force: bool,

    /// Exploration budget, in milliseconds.
    #[clap(long, value_name = "MS", default_value = "600000")]
    timeout_ms: u64,

    /// Numeric base for state labels.
    #[clap(long, value_name = "INT", default_value = "2")]
    base: u32,

    /// Maximum length of edge labels.
    #[clap(long, value_name = "INT", default_value = "128")]
    max_condition_length: usize,

    /// Write the DOT graph to this file.
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Counter with enable `en` and synchronous reset `rst`.
///
/// Returns the netlist, the register gates (LSB first) and the transition logic.
fn counter(width: usize) -> color_eyre::Result<(Netlist, Vec<GateId>, Vec<GateId>)> {
    let mut nl = Netlist::new();
    let en = nl.add_global_input("en");
    let rst = nl.add_global_input("rst");

    let mut logic = Vec::new();
    let zero = nl.add_logic("zero", GateKind::Const(false), &[])?;
    logic.extend(nl.driver(zero).map(|(g, _)| g));

    let mut register = Vec::new();
    let mut carry = en;
    for i in 0..width {
        let d = nl.add_net(format!("d{}", i));
        let r = nl.add_dff(format!("R{}", i), d)?;
        let q = nl.gate(r).output();
        register.push(r);

        let sum = nl.add_logic(format!("sum{}", i), GateKind::Nary(NaryType::Xor), &[q, carry])?;
        let next_carry = nl.add_logic(format!("carry{}", i + 1), GateKind::Nary(NaryType::And), &[q, carry])?;
        logic.extend(nl.driver(sum).map(|(g, _)| g));
        logic.extend(nl.driver(next_carry).map(|(g, _)| g));
        logic.push(nl.add_gate(format!("mux{}", i), GateKind::Mux, &[rst, sum, zero], &[d])?);
        carry = next_carry;
    }

    Ok((nl, register, logic))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);
    println!("{} v{}", SolveFsmPlugin::NAME, SolveFsmPlugin::VERSION);

    let (nl, register, logic) = counter(args.width)?;
    println!("netlist: {} gates, {} nets", nl.num_gates(), nl.num_nets());

    let graph = if args.brute_force {
        SolveFsmPlugin::solve_fsm_brute_force(&nl, &register, &logic, None)?
    } else {
        SolveFsmPlugin::solve_fsm(
            &nl,
            &register,
            &logic,
            &HashMap::new(),
            None,
            Duration::from_millis(args.timeout_ms),
        )?
    };
    println!(
        "states: {}, edges: {}, complete: {}",
        graph.num_states(),
        graph.num_edges(),
        graph.is_complete()
    );

    let dot = SolveFsmPlugin::generate_dot_graph(
        &register,
        &graph,
        args.output.as_deref(),
        args.max_condition_length,
        args.base,
    )?;
    if args.output.is_none() {
        println!("{}", dot);
    }

    println!("Done in {:.2} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
