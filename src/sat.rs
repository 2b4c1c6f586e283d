use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::Lit;

impl Bdd {
    /// Returns one satisfying assignment for the BDD, if any exists.
    ///
    /// The assignment is a path to the terminal, so variables not on the path
    /// are don't-cares: any value for them satisfies `node` as well.
    ///
    /// Returns `None` if the BDD represents the constant false function.
    pub fn one_sat(&self, node: Ref) -> Option<Vec<Lit>> {
        if self.is_zero(node) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = node;

        // Walk down the BDD, always picking a satisfying branch.
        // A non-zero node always has at least one non-zero child.
        while !self.is_one(current) {
            let var = self.variable(current.index());
            let high = self.high_node(current);
            let low = self.low_node(current);

            if !self.is_zero(high) {
                path.push(Lit::pos(var));
                current = high;
            } else {
                path.push(Lit::neg(var));
                current = low;
            }
        }

        Some(path)
    }

    /// Number of satisfying assignments of `node` over variables `1..=num_vars`.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let mut cache = HashMap::new();
        let max = BigUint::from(1u8) << num_vars;
        self.sat_count_(node, &max, &mut cache)
    }

    fn sat_count_(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let low = self.low_node(node);
        let high = self.high_node(node);

        // Each branch fixes the variable, so it covers half of its own count.
        let count: BigUint = (self.sat_count_(low, max, cache) + self.sat_count_(high, max, cache)) >> 1;

        cache.insert(node, count.clone());
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(bdd: &Bdd, lits: impl IntoIterator<Item = i32>) -> Ref {
        bdd.mk_cube(lits.into_iter().map(Lit::from))
    }

    #[test]
    fn test_one_sat() {
        let bdd = Bdd::default();

        let f = cube(&bdd, [1, -2, -3]);
        let model = bdd.one_sat(f);
        let expected: Vec<Lit> = vec![1, -2, -3].into_iter().map(Lit::from_dimacs).collect();
        assert_eq!(model, Some(expected));

        // Blocking the only model leaves nothing.
        let g = bdd.apply_and(f, -bdd.mk_cube(model.unwrap()));
        assert_eq!(bdd.one_sat(g), None);
    }

    #[test]
    fn test_one_sat_blocking_loop() {
        let bdd = Bdd::default();
        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);

        // x1 | (x2 & x3) has 5 models over 3 variables.
        let mut f = bdd.apply_or(x1, bdd.apply_and(x2, x3));
        let mut covered = BigUint::ZERO;
        let mut rounds = 0;
        while let Some(model) = bdd.one_sat(f) {
            let region = bdd.mk_cube(model);
            covered += bdd.sat_count(region, 3);
            f = bdd.apply_and(f, -region);
            rounds += 1;
        }
        assert_eq!(covered, BigUint::from(5u32));
        assert!(rounds <= 5);
    }

    #[test]
    fn test_sat_count_terminal() {
        let bdd = Bdd::default();

        assert_eq!(bdd.sat_count(bdd.zero, 3), BigUint::ZERO);
        assert_eq!(bdd.sat_count(bdd.one, 0), BigUint::from(1u32));
        assert_eq!(bdd.sat_count(bdd.one, 3), BigUint::from(8u32));
    }

    #[test]
    fn test_sat_count_functions() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        assert_eq!(bdd.sat_count(x1, 1), BigUint::from(1u32));
        assert_eq!(bdd.sat_count(x2, 3), BigUint::from(4u32));

        let f = cube(&bdd, [1, 2]);
        assert_eq!(bdd.sat_count(f, 2), BigUint::from(1u32));
        assert_eq!(bdd.sat_count(-f, 2), BigUint::from(3u32));
        assert_eq!(bdd.sat_count(bdd.apply_xor(x1, x2), 4), BigUint::from(8u32));
    }
}
