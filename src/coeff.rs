//! Exact scalar arithmetic for basis coefficients.
//!
//! Orthonormalizing a polynomial basis over the cube introduces exactly one
//! square root per basis function (the norm), so every coefficient the
//! pipeline manipulates has the form `q * sqrt(r)` with `q` rational and `r`
//! a squarefree positive integer. Keeping that form exact means
//! orthogonality cancellations produce structural zeros instead of float
//! residue, and the reflection-sign check can compare expressions exactly.
//!
//! Arithmetic uses checked i64 operations and demotes to an f64
//! approximation on overflow.

use ordered_float::OrderedFloat;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Greatest common divisor using the Euclidean algorithm.
fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Split `n >= 1` into `(s, r)` with `n = s*s*r` and `r` squarefree.
fn extract_square(mut n: i64) -> (i64, i64) {
    let mut s = 1i64;
    let mut d = 2i64;
    while d * d <= n {
        while n % (d * d) == 0 {
            n /= d * d;
            s *= d;
        }
        d += 1;
    }
    (s, n)
}

/// A coefficient value: exact `num/den * sqrt(rad)`, or a float fallback.
///
/// Invariants for the exact form: `den > 0`, `gcd(num, den) == 1`,
/// `rad >= 1` squarefree, and `rad == 1` whenever `num == 0`.
#[derive(Debug, Clone, Eq, Hash)]
pub enum Coefficient {
    Exact { num: i64, den: i64, rad: i64 },
    Float(OrderedFloat<f64>),
}

impl Coefficient {
    /// Integer coefficient.
    pub fn int(n: i64) -> Self {
        Coefficient::Exact {
            num: n,
            den: 1,
            rad: 1,
        }
    }

    /// Rational coefficient, reduced to canonical form.
    pub fn rational(num: i64, den: i64) -> Self {
        Self::surd(num, den, 1)
    }

    /// Canonicalized `num/den * sqrt(rad)`.
    pub fn surd(num: i64, den: i64, rad: i64) -> Self {
        if den == 0 || rad < 0 {
            return Coefficient::Float(OrderedFloat(f64::NAN));
        }
        if num == 0 {
            return Coefficient::int(0);
        }
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let (s, r) = extract_square(rad);
        match num.checked_mul(s) {
            Some(num) => {
                let g = gcd(num, den);
                Coefficient::Exact {
                    num: num / g,
                    den: den / g,
                    rad: r,
                }
            }
            None => Coefficient::Float(OrderedFloat(
                num as f64 / den as f64 * (rad as f64).sqrt(),
            )),
        }
    }

    /// Floating-point coefficient.
    pub fn float(f: f64) -> Self {
        Coefficient::Float(OrderedFloat(f))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Coefficient::Exact { num, .. } => *num == 0,
            Coefficient::Float(f) => f.0 == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Coefficient::Exact { num: 1, den: 1, rad: 1 })
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Coefficient::Exact { num, .. } => *num < 0,
            Coefficient::Float(f) => f.0 < 0.0,
        }
    }

    /// Numeric value for rendering.
    pub fn to_f64(&self) -> f64 {
        match self {
            Coefficient::Exact { num, den, rad } => {
                *num as f64 / *den as f64 * (*rad as f64).sqrt()
            }
            Coefficient::Float(f) => f.0,
        }
    }

    /// Principal square root. Exact when the value is a nonnegative
    /// rational; otherwise falls back to a float.
    pub fn sqrt(&self) -> Self {
        match self {
            Coefficient::Exact { num, den, rad: 1 } if *num >= 0 => {
                // sqrt(n/d) = sqrt(n*d)/d
                match num.checked_mul(*den) {
                    Some(nd) => {
                        let (s, r) = extract_square(nd);
                        Coefficient::surd(s, *den, r)
                    }
                    None => Coefficient::Float(OrderedFloat(self.to_f64().sqrt())),
                }
            }
            _ => Coefficient::Float(OrderedFloat(self.to_f64().sqrt())),
        }
    }

    /// Multiplicative inverse.
    pub fn recip(&self) -> Self {
        match self {
            // 1/(n/d * sqrt(r)) = d/(n*r) * sqrt(r)
            Coefficient::Exact { num, den, rad } if *num != 0 => match num.checked_mul(*rad) {
                Some(nr) => Coefficient::surd(*den, nr, *rad),
                None => Coefficient::Float(OrderedFloat(1.0 / self.to_f64())),
            },
            _ => Coefficient::Float(OrderedFloat(1.0 / self.to_f64())),
        }
    }
}

impl Default for Coefficient {
    fn default() -> Self {
        Coefficient::int(0)
    }
}

impl PartialEq for Coefficient {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Coefficient::Exact { num: n1, den: d1, rad: r1 },
                Coefficient::Exact { num: n2, den: d2, rad: r2 },
            ) => n1 == n2 && d1 == d2 && r1 == r2,
            _ => (self.to_f64() - other.to_f64()).abs() < 1e-12,
        }
    }
}

impl Neg for Coefficient {
    type Output = Coefficient;

    fn neg(self) -> Self::Output {
        match self {
            Coefficient::Exact { num, den, rad } => Coefficient::Exact { num: -num, den, rad },
            Coefficient::Float(f) => Coefficient::Float(OrderedFloat(-f.0)),
        }
    }
}

impl Add for Coefficient {
    type Output = Coefficient;

    fn add(self, rhs: Self) -> Self::Output {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        match (&self, &rhs) {
            (
                Coefficient::Exact { num: n1, den: d1, rad: r1 },
                Coefficient::Exact { num: n2, den: d2, rad: r2 },
            ) if r1 == r2 => {
                // n1/d1 + n2/d2 = (n1*d2 + n2*d1) / (d1*d2)
                if let (Some(a), Some(b), Some(dd)) =
                    (n1.checked_mul(*d2), n2.checked_mul(*d1), d1.checked_mul(*d2))
                {
                    if let Some(num) = a.checked_add(b) {
                        return Coefficient::surd(num, dd, *r1);
                    }
                }
                Coefficient::Float(OrderedFloat(self.to_f64() + rhs.to_f64()))
            }
            // Unequal radicands do not combine exactly.
            _ => Coefficient::Float(OrderedFloat(self.to_f64() + rhs.to_f64())),
        }
    }
}

impl Sub for Coefficient {
    type Output = Coefficient;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Mul for Coefficient {
    type Output = Coefficient;

    fn mul(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (
                Coefficient::Exact { num: n1, den: d1, rad: r1 },
                Coefficient::Exact { num: n2, den: d2, rad: r2 },
            ) => {
                // sqrt(r1)*sqrt(r2) = g*sqrt((r1/g)*(r2/g)) with g = gcd(r1, r2);
                // both factors squarefree and coprime, so the product stays
                // squarefree.
                let g = gcd(*r1, *r2);
                // Cross-reduce the rationals before multiplying.
                let ga = gcd(*n1, *d2);
                let gb = gcd(*n2, *d1);
                let (n1, d2) = (n1 / ga, d2 / ga);
                let (n2, d1) = (n2 / gb, d1 / gb);
                if let (Some(num), Some(den), Some(rad)) = (
                    n1.checked_mul(n2).and_then(|x| x.checked_mul(g)),
                    d1.checked_mul(d2),
                    (r1 / g).checked_mul(r2 / g),
                ) {
                    Coefficient::surd(num, den, rad)
                } else {
                    Coefficient::Float(OrderedFloat(self.to_f64() * rhs.to_f64()))
                }
            }
            _ => Coefficient::Float(OrderedFloat(self.to_f64() * rhs.to_f64())),
        }
    }
}

impl Div for Coefficient {
    type Output = Coefficient;

    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.recip()
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficient::Exact { num, den, rad } => {
                if *den == 1 {
                    write!(f, "{}", num)?;
                } else {
                    write!(f, "{}/{}", num, den)?;
                }
                if *rad != 1 {
                    write!(f, "*sqrt({})", rad)?;
                }
                Ok(())
            }
            Coefficient::Float(v) => write!(f, "{}", v.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_arithmetic() {
        let a = Coefficient::rational(1, 2);
        let b = Coefficient::rational(1, 3);

        assert_eq!(a.clone() + b.clone(), Coefficient::rational(5, 6));
        assert_eq!(a.clone() * b.clone(), Coefficient::rational(1, 6));
        assert_eq!(a / b, Coefficient::rational(3, 2));
    }

    #[test]
    fn test_reduction() {
        assert_eq!(Coefficient::rational(4, 6), Coefficient::rational(2, 3));
        assert_eq!(Coefficient::rational(2, -4), Coefficient::rational(-1, 2));
    }

    #[test]
    fn test_surd_canonicalization() {
        // sqrt(8) = 2*sqrt(2)
        assert_eq!(
            Coefficient::surd(1, 1, 8),
            Coefficient::Exact { num: 2, den: 1, rad: 2 }
        );
        // sqrt(9) = 3
        assert_eq!(Coefficient::surd(1, 1, 9), Coefficient::int(3));
    }

    #[test]
    fn test_surd_product() {
        let r2 = Coefficient::surd(1, 1, 2);
        let r6 = Coefficient::surd(1, 1, 6);
        // sqrt(2)*sqrt(6) = 2*sqrt(3)
        assert_eq!(
            r2 * r6,
            Coefficient::Exact { num: 2, den: 1, rad: 3 }
        );
    }

    #[test]
    fn test_sqrt_and_recip() {
        let half = Coefficient::rational(1, 2);
        // sqrt(1/2) = 1/2 * sqrt(2)
        let s = half.sqrt();
        assert_eq!(s, Coefficient::Exact { num: 1, den: 2, rad: 2 });
        // (1/2*sqrt(2)) * recip = 1
        assert!((s.clone() * s.recip()).is_one());
        assert!((s.to_f64() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-15);
    }

    #[test]
    fn test_mixed_radicand_addition_falls_back() {
        let r2 = Coefficient::surd(1, 1, 2);
        let r3 = Coefficient::surd(1, 1, 3);
        let sum = r2 + r3;
        assert!(matches!(sum, Coefficient::Float(_)));
        assert!((sum.to_f64() - (2.0f64.sqrt() + 3.0f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_zero_and_sign() {
        assert!(Coefficient::int(0).is_zero());
        assert!(Coefficient::rational(-3, 4).is_negative());
        let z = Coefficient::rational(1, 2) - Coefficient::rational(1, 2);
        assert!(z.is_zero());
        assert_eq!(z, Coefficient::int(0));
    }
}
