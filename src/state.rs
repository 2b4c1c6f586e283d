//! State register and the integer encoding of its states.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::netlist::{GateId, NetId, Netlist};

/// Register contents, bit `i` holding the value of register element `i`.
pub type State = u64;

pub const MAX_WIDTH: usize = 64;

#[derive(Debug, Clone)]
struct Element {
    gate: GateId,
    name: String,
    d: NetId,
    q: NetId,
    qn: Option<NetId>,
}

/// Ordered flip-flops forming the state of the machine.
///
/// Element `i` is bit `i` of a [`State`], so the first element is the least
/// significant bit.
#[derive(Debug, Clone)]
pub struct StateRegister {
    elements: Vec<Element>,
}

impl StateRegister {
    pub fn new(netlist: &Netlist, gates: &[GateId]) -> Result<Self> {
        if gates.len() > MAX_WIDTH {
            return Err(Error::RegisterTooWide { width: gates.len() });
        }
        let mut elements = Vec::with_capacity(gates.len());
        for &id in gates {
            let gate = netlist.gate(id);
            if !gate.kind().is_sequential() {
                return Err(Error::InvalidRegister {
                    gate: gate.name().to_string(),
                });
            }
            elements.push(Element {
                gate: id,
                name: gate.name().to_string(),
                d: gate.inputs()[0],
                q: gate.outputs()[0],
                qn: gate.outputs().get(1).copied(),
            });
        }
        Ok(Self { elements })
    }

    pub fn width(&self) -> usize {
        self.elements.len()
    }

    pub fn gates(&self) -> impl Iterator<Item = GateId> + '_ {
        self.elements.iter().map(|e| e.gate)
    }

    pub fn name(&self, bit: usize) -> &str {
        &self.elements[bit].name
    }

    /// Net feeding the next value of element `bit`.
    pub fn d_net(&self, bit: usize) -> NetId {
        self.elements[bit].d
    }

    /// Bit position of `gate`, if it belongs to the register.
    pub fn position(&self, gate: GateId) -> Option<usize> {
        self.elements.iter().position(|e| e.gate == gate)
    }

    /// If `net` is an output of a register element, returns its bit and
    /// whether the output is the inverted one.
    pub fn output_bit(&self, net: NetId) -> Option<(usize, bool)> {
        self.elements.iter().enumerate().find_map(|(i, e)| {
            if e.q == net {
                Some((i, false))
            } else if e.qn == Some(net) {
                Some((i, true))
            } else {
                None
            }
        })
    }

    /// Encode an initial assignment; elements not mentioned are 0.
    pub fn initial_state(&self, netlist: &Netlist, values: &HashMap<GateId, bool>) -> Result<State> {
        let mut state = 0;
        for (&gate, &value) in values {
            let bit = self.position(gate).ok_or_else(|| Error::NotInRegister {
                gate: netlist.gate(gate).name().to_string(),
            })?;
            if value {
                state |= 1 << bit;
            }
        }
        Ok(state)
    }
}

pub fn bit(state: State, i: usize) -> bool {
    state >> i & 1 != 0
}

pub fn encode(bits: &[bool]) -> State {
    debug_assert!(bits.len() <= MAX_WIDTH);
    bits.iter()
        .enumerate()
        .fold(0, |acc, (i, &b)| if b { acc | 1 << i } else { acc })
}

pub fn decode(state: State, width: usize) -> Vec<bool> {
    (0..width).map(|i| bit(state, i)).collect()
}
