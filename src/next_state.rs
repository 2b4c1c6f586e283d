//! Extraction of next-state functions from the transition logic.
//!
//! Each register element's D net is traced backwards through the supplied
//! combinational gates. The walk stops at register outputs, which become
//! state variables, and at nets coming from outside the gate set, which
//! become free inputs. Every net is resolved once; the result is memoized,
//! so logic shared between bits ends up as shared nodes of one [`ExprArena`].

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::expr::{ExprArena, Idx};
use crate::netlist::{GateId, GateKind, NaryType, NetId, Netlist};
use crate::reference::Ref;
use crate::state::{bit, State, StateRegister};

/// Leaf of a next-state expression.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Term {
    /// Current value of register element `i`.
    State(usize),
    /// Free input number `i`, in discovery order.
    Input(usize),
}

#[derive(Debug, Clone)]
pub struct NextStateFunctions {
    pub arena: ExprArena<Term>,
    /// Next value of register element `i`.
    pub roots: Vec<Idx>,
    pub inputs: Vec<NetId>,
    pub input_names: Vec<String>,
    pub state_names: Vec<String>,
}

impl NextStateFunctions {
    pub fn build(netlist: &Netlist, register: &StateRegister, logic: &[GateId]) -> Result<Self> {
        let mut builder = Builder::new(netlist, register, logic);
        let mut roots = Vec::with_capacity(register.width());
        for i in 0..register.width() {
            let root = builder.resolve_root(register.d_net(i))?;
            debug!(
                "next({}): cone of {} expression nodes",
                register.name(i),
                builder.arena.cone_size(root)
            );
            roots.push(root);
        }

        let functions = Self {
            input_names: builder.inputs.iter().map(|&n| netlist.net_name(n).to_string()).collect(),
            state_names: (0..register.width()).map(|i| register.name(i).to_string()).collect(),
            arena: builder.arena,
            roots,
            inputs: builder.inputs,
        };
        info!(
            "Extracted next-state functions: {} state bits, {} free inputs, {} expression nodes",
            functions.width(),
            functions.num_inputs(),
            functions.arena.len()
        );
        Ok(functions)
    }

    pub fn width(&self) -> usize {
        self.roots.len()
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Diagram variable of free input `i`.
    pub fn input_var(&self, i: usize) -> u32 {
        i as u32 + 1
    }

    /// Diagram variable of state bit `b`. State variables come after all
    /// inputs, so conditions only ever mention variables `1..=num_inputs`.
    pub fn state_var(&self, b: usize) -> u32 {
        (self.num_inputs() + b) as u32 + 1
    }

    pub fn term_var(&self, term: Term) -> u32 {
        match term {
            Term::Input(i) => self.input_var(i),
            Term::State(b) => self.state_var(b),
        }
    }

    pub fn to_bdd(&self, bdd: &Bdd) -> Vec<Ref> {
        self.arena.to_bdd(bdd, &self.roots, |&t| self.term_var(t))
    }

    /// Successor of `state` under the given free input values.
    ///
    /// `values` is scratch storage reused across calls.
    pub fn step(&self, state: State, input: impl Fn(usize) -> bool, values: &mut Vec<bool>) -> State {
        self.arena.evaluate_into(values, |t| match *t {
            Term::State(b) => bit(state, b),
            Term::Input(i) => input(i),
        });
        self.roots
            .iter()
            .enumerate()
            .fold(0, |acc, (b, r)| if values[r.index()] { acc | 1 << b } else { acc })
    }

    fn term_name(&self, term: &Term) -> String {
        match *term {
            Term::State(b) => self.state_names[b].clone(),
            Term::Input(i) => self.input_names[i].clone(),
        }
    }

    /// Infix rendering of the next-state function of bit `b`.
    pub fn describe(&self, b: usize) -> String {
        self.arena.to_infix_string(self.roots[b], &|t| self.term_name(t))
    }
}

#[derive(Debug, Copy, Clone)]
enum Resolution {
    InProgress,
    Done(Idx),
}

/// What a net is, as far as the walk is concerned.
#[derive(Debug, Copy, Clone)]
enum Source {
    StateBit { bit: usize, inverted: bool },
    FreeInput,
    GateOutput(GateId),
}

enum Visit {
    Enter(NetId),
    Exit(NetId, GateId),
}

struct Builder<'a> {
    netlist: &'a Netlist,
    register: &'a StateRegister,
    logic: HashSet<GateId>,
    arena: ExprArena<Term>,
    memo: HashMap<NetId, Resolution>,
    inputs: Vec<NetId>,
    input_index: HashMap<NetId, usize>,
}

impl<'a> Builder<'a> {
    fn new(netlist: &'a Netlist, register: &'a StateRegister, logic: &[GateId]) -> Self {
        Self {
            netlist,
            register,
            logic: logic.iter().copied().collect(),
            arena: ExprArena::new(),
            memo: HashMap::new(),
            inputs: Vec::new(),
            input_index: HashMap::new(),
        }
    }

    fn classify(&self, net: NetId) -> Result<Source> {
        if let Some((bit, inverted)) = self.register.output_bit(net) {
            return Ok(Source::StateBit { bit, inverted });
        }
        match self.netlist.driver(net) {
            Some((gate, _)) if self.logic.contains(&gate) && !self.netlist.gate(gate).kind().is_sequential() => {
                Ok(Source::GateOutput(gate))
            }
            Some(_) => Ok(Source::FreeInput),
            None if self.netlist.is_global_input(net) => Ok(Source::FreeInput),
            None => Err(Error::IncompleteCone {
                net: self.netlist.net_name(net).to_string(),
                reason: "has no driver",
            }),
        }
    }

    fn free_input(&mut self, net: NetId) -> Idx {
        let i = match self.input_index.get(&net) {
            Some(&i) => i,
            None => {
                let i = self.inputs.len();
                self.inputs.push(net);
                self.input_index.insert(net, i);
                i
            }
        };
        self.arena.term(Term::Input(i))
    }

    fn done(&self, net: NetId) -> Idx {
        match self.memo[&net] {
            Resolution::Done(idx) => idx,
            Resolution::InProgress => unreachable!("net {} is still being resolved", net),
        }
    }

    /// A D net must come out of the transition logic itself, or be a register output.
    fn resolve_root(&mut self, d: NetId) -> Result<Idx> {
        if let Source::FreeInput = self.classify(d)? {
            return Err(Error::IncompleteCone {
                net: self.netlist.net_name(d).to_string(),
                reason: "feeds a register element but is not driven by the transition logic",
            });
        }
        self.resolve(d)
    }

    fn resolve(&mut self, root: NetId) -> Result<Idx> {
        let mut stack = vec![Visit::Enter(root)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(net) => {
                    match self.memo.get(&net) {
                        Some(Resolution::Done(_)) => continue,
                        Some(Resolution::InProgress) => {
                            return Err(Error::CombinationalLoop {
                                net: self.netlist.net_name(net).to_string(),
                            })
                        }
                        None => {}
                    }
                    match self.classify(net)? {
                        Source::StateBit { bit, inverted } => {
                            let mut idx = self.arena.term(Term::State(bit));
                            if inverted {
                                idx = self.arena.not(idx);
                            }
                            self.memo.insert(net, Resolution::Done(idx));
                        }
                        Source::FreeInput => {
                            let idx = self.free_input(net);
                            self.memo.insert(net, Resolution::Done(idx));
                        }
                        Source::GateOutput(gate) => {
                            self.memo.insert(net, Resolution::InProgress);
                            stack.push(Visit::Exit(net, gate));
                            // Reversed so that inputs are discovered in pin order.
                            for &input in self.netlist.gate(gate).inputs().iter().rev() {
                                stack.push(Visit::Enter(input));
                            }
                        }
                    }
                }
                Visit::Exit(net, gate) => {
                    let gate = self.netlist.gate(gate);
                    let args: Vec<Idx> = gate.inputs().iter().map(|&n| self.done(n)).collect();
                    let idx = self.gate_function(gate.kind(), &args);
                    self.memo.insert(net, Resolution::Done(idx));
                }
            }
        }

        Ok(self.done(root))
    }

    fn gate_function(&mut self, kind: GateKind, args: &[Idx]) -> Idx {
        let arena = &mut self.arena;
        match kind {
            GateKind::Const(b) => arena.constant(b),
            GateKind::Buf => args[0],
            GateKind::Not => arena.not(args[0]),
            GateKind::Nary(op) => {
                let (res, inverted) = match op {
                    NaryType::And => (arena.and_many(args.iter().copied()), false),
                    NaryType::Or => (arena.or_many(args.iter().copied()), false),
                    NaryType::Xor => (arena.xor_many(args.iter().copied()), false),
                    NaryType::Nand => (arena.and_many(args.iter().copied()), true),
                    NaryType::Nor => (arena.or_many(args.iter().copied()), true),
                    NaryType::Xnor => (arena.xor_many(args.iter().copied()), true),
                };
                if inverted {
                    arena.not(res)
                } else {
                    res
                }
            }
            GateKind::Mux => arena.ite(args[0], args[2], args[1]),
            GateKind::Lut { init } => {
                // Shannon expansion from the most significant input down.
                let mut table: Vec<Idx> = (0..1usize << args.len())
                    .map(|p| arena.constant(init >> p & 1 != 0))
                    .collect();
                for &sel in args.iter().rev() {
                    let half = table.len() / 2;
                    table = (0..half).map(|p| arena.ite(sel, table[p + half], table[p])).collect();
                }
                table[0]
            }
            GateKind::Dff => unreachable!("flip-flops are never walked through"),
        }
    }
}
