//! Iterator over satisfying paths in a BDD.
//!
//! Each path is a cube (a conjunction of literals) ending in the TRUE
//! terminal. Two different paths of the same BDD disagree on at least one
//! variable, so the cubes are pairwise disjoint and their disjunction is
//! exactly the function. This is how transition conditions are turned into
//! a readable sum-of-products without losing the disjointness guarantee.
//!
//! ```
//! use solve_fsm::bdd::Bdd;
//!
//! let bdd = Bdd::default();
//! let x = bdd.mk_var(1);
//! let y = bdd.mk_var(2);
//!
//! let f = bdd.apply_xor(x, y);
//! assert_eq!(bdd.paths(f).count(), 2);
//! ```

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::Lit;

impl Bdd {
    /// Returns an iterator over all paths to TRUE, high branches first.
    pub fn paths(&self, f: Ref) -> BddPaths<'_> {
        BddPaths::new(self, f)
    }
}

#[derive(Debug, Clone, Copy)]
enum Branch {
    High,
    Low,
}

#[derive(Debug)]
struct StackFrame {
    node: Ref,
    /// Which branch to explore next (None if both explored)
    next_branch: Option<Branch>,
}

/// Depth-first traversal with backtracking; the current path is kept in a
/// single vector that grows and shrinks with the stack.
pub struct BddPaths<'a> {
    bdd: &'a Bdd,
    stack: Vec<StackFrame>,
    current_path: Vec<Lit>,
}

impl<'a> BddPaths<'a> {
    pub fn new(bdd: &'a Bdd, f: Ref) -> Self {
        BddPaths {
            bdd,
            stack: vec![StackFrame {
                node: f,
                next_branch: Some(Branch::High),
            }],
            current_path: Vec::new(),
        }
    }

    fn backtrack(&mut self) {
        self.stack.pop();
        // Pop the literal that led us here (unless we're at root)
        if !self.stack.is_empty() {
            self.current_path.pop();
        }
    }
}

impl Iterator for BddPaths<'_> {
    type Item = Vec<Lit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;
            let next_branch = frame.next_branch;

            if self.bdd.is_one(node) {
                let result = self.current_path.clone();
                self.backtrack();
                return Some(result);
            }

            if self.bdd.is_zero(node) {
                self.backtrack();
                continue;
            }

            let var = self.bdd.variable(node.index());

            match next_branch {
                Some(Branch::High) => {
                    frame.next_branch = Some(Branch::Low);
                    self.current_path.push(Lit::pos(var));
                    self.stack.push(StackFrame {
                        node: self.bdd.high_node(node),
                        next_branch: Some(Branch::High),
                    });
                }
                Some(Branch::Low) => {
                    frame.next_branch = None;
                    self.current_path.push(Lit::neg(var));
                    self.stack.push(StackFrame {
                        node: self.bdd.low_node(node),
                        next_branch: Some(Branch::High),
                    });
                }
                None => self.backtrack(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_path(lits: impl IntoIterator<Item = i32>) -> Vec<Lit> {
        lits.into_iter().map(Lit::from).collect()
    }

    #[test]
    fn test_paths_single_cube() {
        let bdd = Bdd::default();
        let f = bdd.mk_cube(mk_path([1, -2, 3]));

        let paths: Vec<_> = bdd.paths(f).collect();
        assert_eq!(paths, vec![mk_path([1, -2, 3])]);
    }

    #[test]
    fn test_paths_constants() {
        let bdd = Bdd::default();

        let paths: Vec<_> = bdd.paths(bdd.one).collect();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].is_empty());

        assert_eq!(bdd.paths(bdd.zero).count(), 0);
    }

    #[test]
    fn test_paths_or() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        let or = bdd.apply_or(x, y);

        // x=T covers both values of y, so only two paths.
        let paths: Vec<_> = bdd.paths(or).collect();
        assert_eq!(paths, vec![mk_path([1]), mk_path([-1, 2])]);
    }

    #[test]
    fn test_paths_are_disjoint_cover() {
        let bdd = Bdd::default();
        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);
        let f = bdd.apply_or(bdd.apply_and(x1, -x2), bdd.apply_xor(x2, x3));

        let cubes: Vec<Ref> = bdd.paths(f).map(|p| bdd.mk_cube(p)).collect();
        for (i, &a) in cubes.iter().enumerate() {
            for &b in &cubes[i + 1..] {
                assert!(bdd.is_zero(bdd.apply_and(a, b)));
            }
        }
        assert_eq!(bdd.apply_or_many(cubes), f);
    }

    #[test]
    fn test_paths_negated_function() {
        let bdd = Bdd::default();
        let f = bdd.mk_cube(mk_path([-1, -2, -3]));

        assert_eq!(bdd.paths(f).count(), 1);
        // NOT f = x1 | x2 | x3: three BDD paths
        assert_eq!(bdd.paths(-f).count(), 3);
    }
}
