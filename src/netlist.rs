//! Gate-level netlist model.
//!
//! A [`Netlist`] is a set of gates connected by nets. Every gate has ordered
//! input pins and output pins, each attached to one net. A net has at most
//! one driver: either an output pin of a gate or, for global inputs, the
//! environment.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NetId(u32);

impl NetId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GateId(u32);

impl GateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for GateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NaryType {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GateKind {
    /// Constant driver, no inputs.
    Const(bool),
    Buf,
    Not,
    Nary(NaryType),
    /// Inputs `[sel, a, b]`, output `sel ? b : a`.
    Mux,
    /// Look-up table with up to 6 inputs. Bit `i` of `init` is the output
    /// for the input pattern `i`, input 0 being the least significant bit.
    Lut { init: u64 },
    /// Flip-flop: input 0 is D, output 0 is Q, optional output 1 is QN.
    Dff,
}

impl GateKind {
    pub fn is_sequential(&self) -> bool {
        matches!(self, GateKind::Dff)
    }

    /// Inclusive range of accepted input pin counts.
    fn inputs(&self) -> (usize, usize) {
        match self {
            GateKind::Const(_) => (0, 0),
            GateKind::Buf | GateKind::Not | GateKind::Dff => (1, 1),
            GateKind::Nary(_) => (2, usize::MAX),
            GateKind::Mux => (3, 3),
            GateKind::Lut { .. } => (1, 6),
        }
    }

    /// Inclusive range of accepted output pin counts.
    fn outputs(&self) -> (usize, usize) {
        match self {
            GateKind::Dff => (1, 2),
            _ => (1, 1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Net {
    name: String,
}

impl Net {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    name: String,
    kind: GateKind,
    inputs: Vec<NetId>,
    outputs: Vec<NetId>,
}

impl Gate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn inputs(&self) -> &[NetId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NetId] {
        &self.outputs
    }

    /// The first output pin (Q for flip-flops).
    pub fn output(&self) -> NetId {
        self.outputs[0]
    }
}

#[derive(Debug, Default)]
pub struct Netlist {
    nets: Vec<Net>,
    gates: Vec<Gate>,
    drivers: HashMap<NetId, (GateId, usize)>,
    global_inputs: HashSet<NetId>,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    pub fn net_name(&self, id: NetId) -> &str {
        self.net(id).name()
    }

    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id.index()]
    }

    pub fn gates(&self) -> impl Iterator<Item = (GateId, &Gate)> {
        self.gates.iter().enumerate().map(|(i, g)| (GateId(i as u32), g))
    }

    pub fn find_gate(&self, name: &str) -> Option<GateId> {
        self.gates().find(|(_, g)| g.name == name).map(|(id, _)| id)
    }

    /// The gate and output pin index driving `net`, if any.
    pub fn driver(&self, net: NetId) -> Option<(GateId, usize)> {
        self.drivers.get(&net).copied()
    }

    pub fn is_global_input(&self, net: NetId) -> bool {
        self.global_inputs.contains(&net)
    }

    pub fn add_net(&mut self, name: impl Into<String>) -> NetId {
        let id = NetId(self.nets.len() as u32);
        self.nets.push(Net { name: name.into() });
        id
    }

    pub fn add_global_input(&mut self, name: impl Into<String>) -> NetId {
        let id = self.add_net(name);
        self.global_inputs.insert(id);
        id
    }

    pub fn add_gate(
        &mut self,
        name: impl Into<String>,
        kind: GateKind,
        inputs: &[NetId],
        outputs: &[NetId],
    ) -> Result<GateId> {
        let name = name.into();

        let check = |what: &'static str, (min, max): (usize, usize), found: usize| {
            if found < min || found > max {
                let expected = if min == max {
                    min.to_string()
                } else if max == usize::MAX {
                    format!("at least {}", min)
                } else {
                    format!("{}..={}", min, max)
                };
                return Err(Error::Arity {
                    gate: name.clone(),
                    what,
                    expected,
                    found,
                });
            }
            Ok(())
        };
        check("inputs", kind.inputs(), inputs.len())?;
        check("outputs", kind.outputs(), outputs.len())?;

        for &net in outputs {
            if self.drivers.contains_key(&net) || self.is_global_input(net) {
                return Err(Error::MultipleDrivers {
                    net: self.net_name(net).to_string(),
                });
            }
        }

        let id = GateId(self.gates.len() as u32);
        for (pin, &net) in outputs.iter().enumerate() {
            self.drivers.insert(net, (id, pin));
        }
        self.gates.push(Gate {
            name,
            kind,
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        });
        Ok(id)
    }

    /// Add a single-output gate whose output net is named after the gate.
    pub fn add_logic(&mut self, name: impl Into<String>, kind: GateKind, inputs: &[NetId]) -> Result<NetId> {
        let name = name.into();
        let output = self.add_net(name.clone());
        self.add_gate(name, kind, inputs, &[output])?;
        Ok(output)
    }

    /// Add a flip-flop whose Q net is named after the gate.
    pub fn add_dff(&mut self, name: impl Into<String>, d: NetId) -> Result<GateId> {
        let name = name.into();
        let q = self.add_net(name.clone());
        self.add_gate(name, GateKind::Dff, &[d], &[q])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_logic() {
        let mut nl = Netlist::new();
        let a = nl.add_global_input("a");
        let b = nl.add_global_input("b");
        let y = nl.add_logic("y", GateKind::Nary(NaryType::And), &[a, b]).unwrap();

        assert_eq!(nl.num_nets(), 3);
        assert_eq!(nl.num_gates(), 1);
        assert_eq!(nl.net_name(y), "y");
        let (gate, pin) = nl.driver(y).unwrap();
        assert_eq!(pin, 0);
        assert_eq!(nl.gate(gate).inputs(), &[a, b]);
        assert_eq!(nl.gate(gate).output(), y);
        assert!(nl.is_global_input(a));
        assert!(nl.driver(a).is_none());
        assert_eq!(nl.find_gate("y"), Some(gate));
    }

    #[test]
    fn test_arity() {
        let mut nl = Netlist::new();
        let a = nl.add_global_input("a");
        let err = nl.add_logic("y", GateKind::Nary(NaryType::Or), &[a]).unwrap_err();
        assert!(matches!(err, Error::Arity { found: 1, .. }));
        assert_eq!(err.to_string(), "gate 'y' expects at least 2 inputs, got 1");

        let err = nl.add_logic("m", GateKind::Mux, &[a, a]).unwrap_err();
        assert!(matches!(err, Error::Arity { what: "inputs", .. }));
    }

    #[test]
    fn test_multiple_drivers() {
        let mut nl = Netlist::new();
        let a = nl.add_global_input("a");
        let y = nl.add_net("y");
        nl.add_gate("g1", GateKind::Not, &[a], &[y]).unwrap();
        let err = nl.add_gate("g2", GateKind::Buf, &[a], &[y]).unwrap_err();
        assert!(matches!(err, Error::MultipleDrivers { .. }));

        let err = nl.add_gate("g3", GateKind::Buf, &[y], &[a]).unwrap_err();
        assert!(matches!(err, Error::MultipleDrivers { .. }));
    }

    #[test]
    fn test_dff_with_inverted_output() {
        let mut nl = Netlist::new();
        let d = nl.add_net("d");
        let q = nl.add_net("q");
        let qn = nl.add_net("qn");
        let ff = nl.add_gate("ff", GateKind::Dff, &[d], &[q, qn]).unwrap();
        assert!(nl.gate(ff).kind().is_sequential());
        assert_eq!(nl.driver(qn), Some((ff, 1)));
    }
}
