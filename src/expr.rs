//! Hash-consed Boolean expression DAG.
//!
//! The next-state functions extracted from a netlist are stored here before
//! they are handed to an explorer. Structurally equal sub-expressions are
//! stored once, so logic shared by several register bits is not duplicated.
//! Every node only refers to nodes created before it, which makes the arena
//! a topological order: bottom-up passes are a single forward scan.

use std::collections::HashMap;
use std::hash::Hash;

use crate::bdd::Bdd;
use crate::reference::Ref;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Idx(u32);

impl Idx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Expr<T, I = Idx> {
    Const(bool),
    Term(T),
    Not(I),
    And(I, I),
    Or(I, I),
    Xor(I, I),
    Ite(I, I, I),
}

impl<T, A> Expr<T, A> {
    #[inline(always)]
    pub fn fmap_ref<B, F>(&self, mut f: F) -> Expr<&T, B>
    where
        F: FnMut(&A) -> B,
    {
        match self {
            Expr::Const(b) => Expr::Const(*b),
            Expr::Term(a) => Expr::Term(a),
            Expr::Not(a) => Expr::Not(f(a)),
            Expr::And(a, b) => Expr::And(f(a), f(b)),
            Expr::Or(a, b) => Expr::Or(f(a), f(b)),
            Expr::Xor(a, b) => Expr::Xor(f(a), f(b)),
            Expr::Ite(a, b, c) => Expr::Ite(f(a), f(b), f(c)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExprArena<T> {
    exprs: Vec<Expr<T>>,
    index: HashMap<Expr<T>, Idx>,
}

impl<T> Default for ExprArena<T> {
    fn default() -> Self {
        Self {
            exprs: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> ExprArena<T> {
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn get(&self, idx: Idx) -> &Expr<T> {
        &self.exprs[idx.index()]
    }

    fn as_const(&self, idx: Idx) -> Option<bool> {
        match self.get(idx) {
            Expr::Const(b) => Some(*b),
            _ => None,
        }
    }

    /// `Some(a)` if `idx` is `Not(a)`.
    fn as_not(&self, idx: Idx) -> Option<Idx> {
        match self.get(idx) {
            Expr::Not(a) => Some(*a),
            _ => None,
        }
    }

    fn complementary(&self, a: Idx, b: Idx) -> bool {
        self.as_not(a) == Some(b) || self.as_not(b) == Some(a)
    }
}

impl<T> ExprArena<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, expr: Expr<T>) -> Idx {
        if let Some(&idx) = self.index.get(&expr) {
            return idx;
        }
        let idx = Idx(self.exprs.len() as u32);
        self.exprs.push(expr.clone());
        self.index.insert(expr, idx);
        idx
    }

    pub fn constant(&mut self, value: bool) -> Idx {
        self.intern(Expr::Const(value))
    }

    pub fn term(&mut self, term: T) -> Idx {
        self.intern(Expr::Term(term))
    }

    pub fn not(&mut self, a: Idx) -> Idx {
        if let Some(b) = self.as_const(a) {
            return self.constant(!b);
        }
        if let Some(inner) = self.as_not(a) {
            return inner;
        }
        self.intern(Expr::Not(a))
    }

    pub fn and(&mut self, a: Idx, b: Idx) -> Idx {
        match (self.as_const(a), self.as_const(b)) {
            (Some(false), _) | (_, Some(false)) => return self.constant(false),
            (Some(true), _) => return b,
            (_, Some(true)) => return a,
            _ => {}
        }
        if a == b {
            return a;
        }
        if self.complementary(a, b) {
            return self.constant(false);
        }
        self.intern(Expr::And(a.min(b), a.max(b)))
    }

    pub fn or(&mut self, a: Idx, b: Idx) -> Idx {
        match (self.as_const(a), self.as_const(b)) {
            (Some(true), _) | (_, Some(true)) => return self.constant(true),
            (Some(false), _) => return b,
            (_, Some(false)) => return a,
            _ => {}
        }
        if a == b {
            return a;
        }
        if self.complementary(a, b) {
            return self.constant(true);
        }
        self.intern(Expr::Or(a.min(b), a.max(b)))
    }

    pub fn xor(&mut self, a: Idx, b: Idx) -> Idx {
        match (self.as_const(a), self.as_const(b)) {
            (Some(x), Some(y)) => return self.constant(x ^ y),
            (Some(false), _) => return b,
            (_, Some(false)) => return a,
            (Some(true), _) => return self.not(b),
            (_, Some(true)) => return self.not(a),
            _ => {}
        }
        if a == b {
            return self.constant(false);
        }
        if self.complementary(a, b) {
            return self.constant(true);
        }
        self.intern(Expr::Xor(a.min(b), a.max(b)))
    }

    /// `cond ? then : else_`
    pub fn ite(&mut self, cond: Idx, then: Idx, else_: Idx) -> Idx {
        match self.as_const(cond) {
            Some(true) => return then,
            Some(false) => return else_,
            None => {}
        }
        if then == else_ {
            return then;
        }
        match (self.as_const(then), self.as_const(else_)) {
            (Some(true), Some(false)) => return cond,
            (Some(false), Some(true)) => return self.not(cond),
            _ => {}
        }
        self.intern(Expr::Ite(cond, then, else_))
    }

    pub fn and_many(&mut self, items: impl IntoIterator<Item = Idx>) -> Idx {
        let init = self.constant(true);
        items.into_iter().fold(init, |acc, x| self.and(acc, x))
    }

    pub fn or_many(&mut self, items: impl IntoIterator<Item = Idx>) -> Idx {
        let init = self.constant(false);
        items.into_iter().fold(init, |acc, x| self.or(acc, x))
    }

    pub fn xor_many(&mut self, items: impl IntoIterator<Item = Idx>) -> Idx {
        let init = self.constant(false);
        items.into_iter().fold(init, |acc, x| self.xor(acc, x))
    }
}

impl<T> ExprArena<T> {
    /// Bottom-up pass over the whole arena, reusing `results` as storage.
    /// After the call, `results[i]` holds the value computed for node `i`.
    fn collapse_into<R, F>(&self, results: &mut Vec<R>, mut collapse: F)
    where
        R: Copy,
        F: FnMut(Expr<&T, R>) -> R,
    {
        results.clear();
        results.reserve(self.exprs.len());
        for expr in self.exprs.iter() {
            let expr = expr.fmap_ref(|idx| results[idx.index()]);
            let result = collapse(expr);
            results.push(result);
        }
    }

    /// Value of every node under the given term assignment.
    pub fn evaluate_into(&self, values: &mut Vec<bool>, assign: impl Fn(&T) -> bool) {
        self.collapse_into(values, |expr| match expr {
            Expr::Const(b) => b,
            Expr::Term(t) => assign(t),
            Expr::Not(a) => !a,
            Expr::And(a, b) => a && b,
            Expr::Or(a, b) => a || b,
            Expr::Xor(a, b) => a ^ b,
            Expr::Ite(c, t, e) => {
                if c {
                    t
                } else {
                    e
                }
            }
        });
    }

    pub fn evaluate(&self, roots: &[Idx], assign: impl Fn(&T) -> bool) -> Vec<bool> {
        let mut values = Vec::new();
        self.evaluate_into(&mut values, assign);
        roots.iter().map(|r| values[r.index()]).collect()
    }

    /// Build the decision diagrams of `roots`, mapping each term to a variable.
    pub fn to_bdd(&self, bdd: &Bdd, roots: &[Idx], var: impl Fn(&T) -> u32) -> Vec<Ref> {
        let mut nodes = Vec::new();
        self.collapse_into(&mut nodes, |expr| match expr {
            Expr::Const(b) => bdd.constant(b),
            Expr::Term(t) => bdd.mk_var(var(t)),
            Expr::Not(a) => bdd.apply_not(a),
            Expr::And(a, b) => bdd.apply_and(a, b),
            Expr::Or(a, b) => bdd.apply_or(a, b),
            Expr::Xor(a, b) => bdd.apply_xor(a, b),
            Expr::Ite(c, t, e) => bdd.apply_ite(c, t, e),
        });
        roots.iter().map(|r| nodes[r.index()]).collect()
    }

    /// Number of distinct nodes reachable from `idx`, itself included.
    pub fn cone_size(&self, idx: Idx) -> usize {
        let mut reached = vec![false; idx.index() + 1];
        reached[idx.index()] = true;
        let mut size = 0;
        // Children precede their parents, so one backward scan suffices.
        for i in (0..=idx.index()).rev() {
            if reached[i] {
                size += 1;
                self.exprs[i].fmap_ref(|c: &Idx| reached[c.index()] = true);
            }
        }
        size
    }

    /// Infix rendering of the expression rooted at `idx`.
    ///
    /// Shared sub-expressions are spelled out at every use, so the text can
    /// be exponentially larger than [`cone_size`][Self::cone_size].
    pub fn to_infix_string(&self, idx: Idx, term: &impl Fn(&T) -> String) -> String {
        match self.get(idx) {
            Expr::Const(b) => (*b as u8).to_string(),
            Expr::Term(t) => term(t),
            Expr::Not(a) => format!("!{}", self.to_infix_string(*a, term)),
            Expr::And(a, b) => format!(
                "({} & {})",
                self.to_infix_string(*a, term),
                self.to_infix_string(*b, term)
            ),
            Expr::Or(a, b) => format!(
                "({} | {})",
                self.to_infix_string(*a, term),
                self.to_infix_string(*b, term)
            ),
            Expr::Xor(a, b) => format!(
                "({} ^ {})",
                self.to_infix_string(*a, term),
                self.to_infix_string(*b, term)
            ),
            Expr::Ite(c, t, e) => format!(
                "({} ? {} : {})",
                self.to_infix_string(*c, term),
                self.to_infix_string(*t, term),
                self.to_infix_string(*e, term)
            ),
        }
    }
}
