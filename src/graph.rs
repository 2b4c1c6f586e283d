//! Recovered state-transition graphs and their edge conditions.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::state::State;
use crate::types::Lit;

/// Whether an exploration ran to the end.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Completeness {
    /// Every reachable state has been visited and all its edges recorded.
    Complete,
    /// The budget ran out. Every edge present is exact, but some reachable
    /// states may be missing, and destinations may lack their own entry.
    Partial,
}

/// Condition under which a transition fires, as a cover of pairwise
/// disjoint cubes over the free inputs.
///
/// Literal variable `i` refers to free input `i - 1`. The cover does not
/// depend on the diagram manager it was extracted from, so graphs outlive
/// the exploration that produced them.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Condition {
    cubes: Vec<Vec<Lit>>,
}

impl Condition {
    pub fn new(cubes: Vec<Vec<Lit>>) -> Self {
        Self { cubes }
    }

    pub fn always() -> Self {
        Self { cubes: vec![Vec::new()] }
    }

    pub fn never() -> Self {
        Self { cubes: Vec::new() }
    }

    /// Disjoint cubes of `f`, one per path to the TRUE terminal.
    pub fn from_bdd(bdd: &Bdd, f: Ref) -> Self {
        Self::new(bdd.paths(f).collect())
    }

    pub fn cubes(&self) -> &[Vec<Lit>] {
        &self.cubes
    }

    pub fn is_true(&self) -> bool {
        self.cubes.iter().any(|c| c.is_empty())
    }

    pub fn is_false(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Value of the condition, `inputs[i]` being the value of free input `i`.
    pub fn evaluate(&self, inputs: &[bool]) -> bool {
        self.cubes.iter().any(|cube| {
            cube.iter()
                .all(|lit| inputs[lit.var() as usize - 1] == lit.is_positive())
        })
    }

    /// Number of assignments of `num_inputs` free inputs satisfying the condition.
    ///
    /// A cube with more literals than `num_inputs` counts as one assignment.
    pub fn num_assignments(&self, num_inputs: usize) -> BigUint {
        self.cubes
            .iter()
            .map(|cube| BigUint::from(1u8) << num_inputs.saturating_sub(cube.len()))
            .sum()
    }

    pub fn to_bdd(&self, bdd: &Bdd) -> Ref {
        bdd.apply_or_many(self.cubes.iter().map(|cube| bdd.mk_cube(cube.iter().copied())))
    }

    /// Textual form using `names[i]` for free input `i`.
    ///
    /// Literals are `NAME` or `!NAME`, joined by ` & ` within a cube and by
    /// ` | ` between cubes. The constants are `1` and `0`.
    pub fn to_string_with(&self, names: &[String]) -> String {
        if self.is_false() {
            return "0".to_string();
        }
        if self.is_true() {
            return "1".to_string();
        }
        let parenthesize = self.cubes.len() > 1;
        self.cubes
            .iter()
            .map(|cube| {
                let lits = cube
                    .iter()
                    .map(|lit| {
                        let name = &names[lit.var() as usize - 1];
                        if lit.is_positive() {
                            name.clone()
                        } else {
                            format!("!{}", name)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" & ");
                if parenthesize && cube.len() > 1 {
                    format!("({})", lits)
                } else {
                    lits
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Mapping from source state to destination state to the condition of the
/// edge between them.
///
/// Visited states are keys even when they have no outgoing edges. States and
/// edges are only ever added.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionGraph {
    width: usize,
    inputs: Vec<String>,
    transitions: BTreeMap<State, BTreeMap<State, Condition>>,
    completeness: Completeness,
}

impl TransitionGraph {
    pub fn new(width: usize, inputs: Vec<String>) -> Self {
        Self {
            width,
            inputs,
            transitions: BTreeMap::new(),
            completeness: Completeness::Complete,
        }
    }

    /// Width of the state register, in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Names of the free inputs conditions are expressed over.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn transitions(&self) -> &BTreeMap<State, BTreeMap<State, Condition>> {
        &self.transitions
    }

    /// Returns `true` if the state was not present yet.
    pub fn insert_state(&mut self, state: State) -> bool {
        match self.transitions.entry(state) {
            Entry::Vacant(e) => {
                e.insert(BTreeMap::new());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// # Panics
    ///
    /// Panics if the edge is already present: edges are never overwritten.
    pub fn insert_edge(&mut self, source: State, destination: State, condition: Condition) {
        let edges = self.transitions.entry(source).or_default();
        let previous = edges.insert(destination, condition);
        assert!(previous.is_none(), "edge {} -> {} recorded twice", source, destination);
    }

    pub fn contains_state(&self, state: State) -> bool {
        self.transitions.contains_key(&state)
    }

    /// Visited states, in increasing order.
    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.transitions.keys().copied()
    }

    pub fn successors(&self, state: State) -> Option<&BTreeMap<State, Condition>> {
        self.transitions.get(&state)
    }

    pub fn edges(&self) -> impl Iterator<Item = (State, State, &Condition)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&s, edges)| edges.iter().map(move |(&d, c)| (s, d, c)))
    }

    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    pub fn num_edges(&self) -> usize {
        self.transitions.values().map(|e| e.len()).sum()
    }

    pub fn completeness(&self) -> Completeness {
        self.completeness
    }

    pub fn is_complete(&self) -> bool {
        self.completeness == Completeness::Complete
    }

    pub(crate) fn mark_partial(&mut self) {
        self.completeness = Completeness::Partial;
    }

    pub fn condition_to_string(&self, condition: &Condition) -> String {
        condition.to_string_with(&self.inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    fn cond(cubes: &[&[i32]]) -> Condition {
        Condition::new(cubes.iter().map(|c| c.iter().map(|&l| Lit::from(l)).collect()).collect())
    }

    #[test]
    fn test_condition_text() {
        let n = names(&["X", "Y", "Z"]);
        assert_eq!(Condition::always().to_string_with(&n), "1");
        assert_eq!(Condition::never().to_string_with(&n), "0");
        assert_eq!(cond(&[&[-1]]).to_string_with(&n), "!X");
        assert_eq!(cond(&[&[1, -2]]).to_string_with(&n), "X & !Y");
        assert_eq!(cond(&[&[1, -2], &[-1, 3]]).to_string_with(&n), "(X & !Y) | (!X & Z)");
        assert_eq!(cond(&[&[1], &[-1, 2]]).to_string_with(&n), "X | (!X & Y)");
    }

    #[test]
    fn test_condition_evaluate_and_count() {
        let c = cond(&[&[1], &[-1, 2]]);
        assert!(c.evaluate(&[true, false]));
        assert!(c.evaluate(&[false, true]));
        assert!(!c.evaluate(&[false, false]));
        assert_eq!(c.num_assignments(2), BigUint::from(3u32));
        assert_eq!(c.num_assignments(3), BigUint::from(6u32));
        assert_eq!(Condition::always().num_assignments(4), BigUint::from(16u32));
        assert_eq!(Condition::never().num_assignments(4), BigUint::ZERO);
        // Too few inputs for the second cube.
        assert_eq!(c.num_assignments(1), BigUint::from(2u32));
        assert_eq!(c.num_assignments(0), BigUint::from(2u32));
    }

    #[test]
    fn test_condition_bdd_round_trip() {
        let bdd = Bdd::default();
        let f = bdd.apply_or(bdd.mk_var(1), bdd.apply_and(bdd.mk_var(2), bdd.mk_var(3)));
        let c = Condition::from_bdd(&bdd, f);
        assert_eq!(c.to_bdd(&bdd), f);
        assert!(Condition::from_bdd(&bdd, bdd.one).is_true());
        assert!(Condition::from_bdd(&bdd, bdd.zero).is_false());
    }

    #[test]
    fn test_graph_bookkeeping() {
        let mut g = TransitionGraph::new(2, names(&["X"]));
        assert!(g.insert_state(0));
        assert!(!g.insert_state(0));
        g.insert_edge(0, 1, cond(&[&[1]]));
        g.insert_edge(0, 0, cond(&[&[-1]]));
        assert!(g.insert_state(1));

        assert_eq!(g.num_states(), 2);
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.states().collect::<Vec<_>>(), vec![0, 1]);
        assert!(g.successors(1).unwrap().is_empty());
        assert!(g.successors(3).is_none());
        assert_eq!(g.edges().map(|(s, d, _)| (s, d)).collect::<Vec<_>>(), vec![(0, 0), (0, 1)]);
        assert!(g.is_complete());
        g.mark_partial();
        assert_eq!(g.completeness(), Completeness::Partial);
    }

    #[test]
    #[should_panic(expected = "recorded twice")]
    fn test_edge_is_never_overwritten() {
        let mut g = TransitionGraph::new(1, names(&["X"]));
        g.insert_edge(0, 1, cond(&[&[1]]));
        g.insert_edge(0, 1, cond(&[&[-1]]));
    }
}
