//! Operation-count estimation for multiplication kernels.
//!
//! A cheap syntactic metric over the unsimplified projected expression: a
//! sum of `n` terms costs `n - 1` additions, and a term with `m` rendered
//! multiplicative factors costs `m - 1` multiplications. No
//! common-subexpression credit is given, so published counts stay
//! comparable across configurations.

use crate::poly::PolyExpr;
use std::ops::AddAssign;

/// Addition and multiplication counts for one generated formula.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCount {
    pub num_sum: u64,
    pub num_prod: u64,
}

impl AddAssign for OpCount {
    fn add_assign(&mut self, rhs: Self) {
        self.num_sum += rhs.num_sum;
        self.num_prod += rhs.num_prod;
    }
}

/// Count the additions and multiplications in a rendered expression.
pub fn total_op(expr: &PolyExpr) -> OpCount {
    let terms = expr.terms();
    OpCount {
        num_sum: (terms.len() as u64).saturating_sub(1),
        num_prod: terms.iter().map(|t| t.factor_count() - 1).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coeff::Coefficient;

    #[test]
    fn test_single_product_term() {
        // 0.5*f[0]*g[0]: no sums, two products.
        let e = PolyExpr::sym(1, "f", 0)
            .mul(&PolyExpr::sym(1, "g", 0))
            .scale(&Coefficient::rational(1, 2));
        assert_eq!(total_op(&e), OpCount { num_sum: 0, num_prod: 2 });
    }

    #[test]
    fn test_sum_of_terms() {
        // 0.5*f[0]*g[1] + 0.5*f[1]*g[0]: one sum, four products.
        let a = PolyExpr::sym(1, "f", 0).mul(&PolyExpr::sym(1, "g", 1));
        let b = PolyExpr::sym(1, "f", 1).mul(&PolyExpr::sym(1, "g", 0));
        let e = a.add(&b).scale(&Coefficient::rational(1, 2));
        assert_eq!(total_op(&e), OpCount { num_sum: 1, num_prod: 4 });
    }

    #[test]
    fn test_zero_expression() {
        let e = PolyExpr::zero(1);
        assert_eq!(total_op(&e), OpCount::default());
    }

    #[test]
    fn test_reproducible() {
        let e = PolyExpr::sym(2, "f", 0)
            .mul(&PolyExpr::var(2, 1))
            .scale(&Coefficient::rational(3, 4));
        assert_eq!(total_op(&e), total_op(&e));
    }
}
