//! Decision-diagram manager used as the symbolic backend of the explorers.
//!
//! Every Boolean function handled during an extraction run lives in one
//! [`Bdd`] manager: next-state functions, their restrictions to a concrete
//! state, and the transition conditions. Nodes are hash-consed, so two
//! [`Ref`]s of the same manager are equal iff they denote the same function.
//! Negation is a complement edge and costs nothing.
//!
//! Variables are ordered by their id: variable 1 is at the top.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;

use log::debug;

use crate::cache::Cache;
use crate::reference::Ref;
use crate::table::Table;
use crate::types::Lit;
use crate::utils::{pairing3, MyHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            variable: 0,
            low: Ref::positive(0),
            high: Ref::positive(0),
        }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(
            self.variable as u64,
            self.low.unsigned() as u64,
            self.high.unsigned() as u64,
        )
    }
}

pub struct Bdd {
    storage: RefCell<Table<Node>>,
    cache: RefCell<Cache<(Ref, Ref, Ref), Ref>>,
    pub zero: Ref,
    pub one: Ref,
}

impl Bdd {
    pub fn new(storage_bits: usize) -> Self {
        assert!(storage_bits <= 31, "Storage bits should be in the range 0..=31");

        let cache_bits = storage_bits.min(16);

        let mut storage = Table::new(storage_bits);

        // Allocate the terminal node:
        let one = storage.add(Node::default());
        assert_eq!(one, 1); // Make sure the terminal node is (1).
        let one = Ref::positive(one as u32);

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(cache_bits)),
            zero: -one,
            one,
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(20)
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("Bdd")
            .field("nodes", &self.num_nodes())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl Bdd {
    pub fn zero(&self) -> Ref {
        self.zero
    }
    pub fn one(&self) -> Ref {
        self.one
    }
    pub fn constant(&self, value: bool) -> Ref {
        if value {
            self.one
        } else {
            self.zero
        }
    }

    /// Number of nodes allocated so far, including the terminal.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().len()
    }

    pub fn variable(&self, index: u32) -> u32 {
        self.storage.borrow().value(index as usize).variable
    }
    pub fn low(&self, index: u32) -> Ref {
        self.storage.borrow().value(index as usize).low
    }
    pub fn high(&self, index: u32) -> Ref {
        self.storage.borrow().value(index as usize).high
    }

    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node.index());
        if node.is_negated() {
            -low
        } else {
            low
        }
    }
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node.index());
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        node.index() == self.one.index()
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");

        // High edges are never complemented.
        if high.is_negated() {
            return -self.mk_node(v, -low, -high);
        }

        if low == high {
            return low;
        }

        let i = self.storage.borrow_mut().put(Node {
            variable: v,
            low,
            high,
        });
        Ref::positive(i as u32)
    }

    pub fn mk_var(&self, v: u32) -> Ref {
        self.mk_node(v, self.zero, self.one)
    }

    /// Conjunction of the given literals.
    ///
    /// # Panics
    ///
    /// Panics if a variable appears with both polarities.
    pub fn mk_cube(&self, literals: impl IntoIterator<Item = Lit>) -> Ref {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_by_key(|lit| std::cmp::Reverse(lit.var()));
        literals.dedup();
        let mut current = self.one;
        let mut previous: Option<u32> = None;
        for lit in literals {
            assert_ne!(previous, Some(lit.var()), "Contradicting literals in cube");
            previous = Some(lit.var());
            current = if lit.is_positive() {
                self.mk_node(lit.var(), self.zero, current)
            } else {
                self.mk_node(lit.var(), current, self.zero)
            };
        }
        current
    }

    fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        if self.is_terminal(node) || v < self.variable(node.index()) {
            return (node, node);
        }
        (self.low_node(node), self.high_node(node))
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(x, y, z) = (x ∧ y) ∨ (¬x ∧ z)
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,G,~F) => ite(F,G,1)
        let g = if g == f {
            self.one
        } else if g == -f {
            self.zero
        } else {
            g
        };
        let h = if h == f {
            self.zero
        } else if h == -f {
            self.one
        } else {
            h
        };
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // ite(~F,G,H) => ite(F,H,G)
        let (f, g, h) = if f.is_negated() { (-f, h, g) } else { (f, g, h) };
        // ite(F,~G,H) => ~ite(F,G,~H)
        let (g, h, n) = if g.is_negated() { (-g, -h, true) } else { (g, h, false) };

        let key = (f, g, h);
        if let Some(&res) = self.cache.borrow().get(&key) {
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let m = [g, h]
            .into_iter()
            .filter(|&x| !self.is_terminal(x))
            .map(|x| self.variable(x.index()))
            .fold(self.variable(f.index()), u32::min);

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);

        let res = self.mk_node(m, e, t);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
    }

    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, self.one, v)
    }

    pub fn apply_xor(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, -v, v)
    }

    pub fn apply_eq(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, -v)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.one;
        for node in nodes {
            res = self.apply_and(res, node);
            if self.is_zero(res) {
                break;
            }
        }
        res
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.zero;
        for node in nodes {
            res = self.apply_or(res, node);
            if self.is_one(res) {
                break;
            }
        }
        res
    }

    /// Assign constants to several variables at once: `f|values`.
    pub fn restrict(&self, f: Ref, values: &HashMap<u32, bool>) -> Ref {
        debug!("restrict(f = {}, values = {:?})", f, values);
        let mut cache = HashMap::new();
        self.restrict_(f, values, &mut cache)
    }

    fn restrict_(&self, f: Ref, values: &HashMap<u32, bool>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) || values.is_empty() {
            return f;
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let i = self.variable(f.index());
        let res = match values.get(&i) {
            Some(true) => self.restrict_(self.high_node(f), values, cache),
            Some(false) => self.restrict_(self.low_node(f), values, cache),
            None => {
                let low = self.restrict_(self.low_node(f), values, cache);
                let high = self.restrict_(self.high_node(f), values, cache);
                self.mk_node(i, low, high)
            }
        };
        cache.insert(f, res);
        res
    }

    /// Value of `f` under a total assignment of its variables.
    pub fn evaluate(&self, f: Ref, assignment: impl Fn(u32) -> bool) -> bool {
        let mut node = f;
        while !self.is_terminal(node) {
            let v = self.variable(node.index());
            node = if assignment(v) {
                self.high_node(node)
            } else {
                self.low_node(node)
            };
        }
        self.is_one(node)
    }

    /// Indices of all nodes reachable from `nodes`, including the terminal.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<u32> {
        let mut visited = HashSet::new();
        visited.insert(self.one.index());
        let mut queue = VecDeque::from_iter(nodes);

        while let Some(node) = queue.pop_front() {
            let i = node.index();
            if visited.insert(i) {
                queue.push_back(self.low(i));
                queue.push_back(self.high(i));
            }
        }

        visited
    }

    pub fn size(&self, f: Ref) -> usize {
        self.descendants([f]).len()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn cube(bdd: &Bdd, lits: impl IntoIterator<Item = i32>) -> Ref {
        bdd.mk_cube(lits.into_iter().map(Lit::from))
    }

    #[test]
    fn test_var() {
        let bdd = Bdd::default();

        let x = bdd.mk_var(1);

        assert_eq!(bdd.variable(x.index()), 1);
        assert_eq!(bdd.high_node(x), bdd.one);
        assert_eq!(bdd.low_node(x), bdd.zero);
        assert_eq!(bdd.high_node(-x), bdd.zero);
        assert_eq!(bdd.low_node(-x), bdd.one);
    }

    #[test]
    fn test_terminal() {
        let bdd = Bdd::default();

        assert!(bdd.is_terminal(bdd.zero));
        assert!(bdd.is_terminal(bdd.one));
        assert!(bdd.is_zero(bdd.zero));
        assert!(!bdd.is_one(bdd.zero));
        assert_eq!(bdd.constant(true), bdd.one);
        assert_eq!(bdd.num_nodes(), 1);
    }

    #[test]
    fn test_hash_consing() {
        let bdd = Bdd::default();
        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);

        let f = bdd.apply_and(x1, x2);
        let g = bdd.apply_and(x2, x1);
        assert_eq!(f, g);
        assert_eq!(bdd.apply_or(x1, x2), bdd.apply_or(x2, x1));
    }

    #[test]
    fn test_cube() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);

        let f = bdd.apply_and_many([x1, -x2, -x3]);
        assert_eq!(f, cube(&bdd, [1, -2, -3]));
        assert_eq!(cube(&bdd, [3, 1]), bdd.apply_and(x1, x3));
        assert_eq!(cube(&bdd, []), bdd.one);
    }

    #[test]
    #[should_panic(expected = "Contradicting literals in cube")]
    fn test_cube_contradiction() {
        let bdd = Bdd::default();
        cube(&bdd, [1, -1]);
    }

    #[test]
    fn test_de_morgan() {
        let bdd = Bdd::default();

        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);

        assert_eq!(-bdd.apply_and(x, y), bdd.apply_or(-x, -y));
        assert_eq!(-bdd.apply_or(x, y), bdd.apply_and(-x, -y));
    }

    #[test]
    fn test_xor_eq() {
        let bdd = Bdd::default();

        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        let f = bdd.apply_and(x, y);

        assert_eq!(bdd.apply_xor(f, f), bdd.zero);
        assert_eq!(bdd.apply_xor(f, -f), bdd.one);
        assert_eq!(bdd.apply_eq(x, y), -bdd.apply_xor(x, y));
    }

    #[test]
    fn test_apply_ite() {
        let bdd = Bdd::default();

        let f = bdd.mk_var(1);
        let g = bdd.mk_var(2);
        let h = bdd.mk_var(3);

        assert_eq!(bdd.apply_ite(bdd.one, g, h), g);
        assert_eq!(bdd.apply_ite(bdd.zero, g, h), h);
        assert_eq!(bdd.apply_ite(f, g, g), g);
        assert_eq!(bdd.apply_ite(f, f, h), bdd.apply_or(f, h));
        assert_eq!(bdd.apply_ite(f, g, f), bdd.apply_and(f, g));

        let ite = bdd.apply_ite(f, g, h);
        let expected = bdd.apply_or(bdd.apply_and(f, g), bdd.apply_and(-f, h));
        assert_eq!(ite, expected);
        assert_eq!(bdd.apply_ite(-f, -g, -h), -bdd.apply_ite(f, h, g));
    }

    #[test]
    fn test_restrict() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);
        let x4 = bdd.mk_var(4);

        let f = bdd.apply_and_many([-x1, x2, x3, -x4]);
        let values = HashMap::from([(2, true), (4, false)]);
        assert_eq!(bdd.restrict(f, &values), bdd.apply_and(-x1, x3));

        let g = bdd.apply_or(bdd.apply_eq(x1, x2), x3);
        let values = HashMap::from([(2, false)]);
        assert_eq!(bdd.restrict(g, &values), bdd.apply_or(-x1, x3));
    }

    #[test]
    fn test_evaluate() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let f = bdd.apply_xor(x1, x2);

        for a in 0..4u32 {
            let v1 = a & 1 != 0;
            let v2 = a & 2 != 0;
            let value = bdd.evaluate(f, |v| if v == 1 { v1 } else { v2 });
            assert_eq!(value, v1 ^ v2);
            assert_eq!(bdd.evaluate(-f, |v| if v == 1 { v1 } else { v2 }), !(v1 ^ v2));
        }
    }

    #[test]
    fn test_size() {
        let bdd = Bdd::default();
        let f = cube(&bdd, [1, 2, 3]);
        // Three decision nodes plus the terminal.
        assert_eq!(bdd.size(f), 4);
        assert_eq!(bdd.size(bdd.one), 1);
    }
}
