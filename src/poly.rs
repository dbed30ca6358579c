//! Sparse symbolic expressions for kernel derivation.
//!
//! An expression is a canonical sum of monomial terms over two symbol
//! kinds: coordinate variables `z0..z5` (indexed, with integer exponents)
//! and coefficient-array symbols like `f[3]` (an expansion coefficient).
//! Canonical form keeps terms sorted by a fixed total order, merges like
//! terms, and drops zeros, so structurally equal expressions compare equal
//! and rendering is deterministic.

use crate::coeff::Coefficient;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write;
use std::rc::Rc;

/// Index of a coordinate variable (`z0` is variable 0).
pub type VarId = usize;

/// A coefficient-array symbol occurrence, e.g. `f[3]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArraySym {
    pub array: Rc<str>,
    pub index: usize,
}

impl ArraySym {
    pub fn new(array: impl Into<Rc<str>>, index: usize) -> Self {
        ArraySym {
            array: array.into(),
            index,
        }
    }
}

impl fmt::Display for ArraySym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.array, self.index)
    }
}

/// One monomial term: coefficient times variable powers times symbol powers.
#[derive(Clone, Debug, PartialEq)]
pub struct Mono {
    pub coeff: Coefficient,
    /// Exponent per coordinate variable; length equals the expression's
    /// variable count.
    pub powers: Vec<u32>,
    /// Array-symbol factors, sorted, exponents >= 1.
    pub syms: Vec<(ArraySym, u32)>,
}

impl Mono {
    /// Total degree in the coordinate variables.
    fn degree(&self) -> u32 {
        self.powers.iter().sum()
    }

    /// Number of multiplicative factors as rendered: the numeric
    /// coefficient plus one per symbol or variable power.
    pub fn factor_count(&self) -> u64 {
        let sym_factors: u32 = self.syms.iter().map(|(_, e)| *e).sum();
        1 + sym_factors as u64 + self.degree() as u64
    }

    /// Fixed total order on term keys: symbols first, then graded-lex on
    /// variable powers.
    fn key_cmp(&self, other: &Mono) -> Ordering {
        self.syms
            .cmp(&other.syms)
            .then_with(|| self.degree().cmp(&other.degree()))
            .then_with(|| self.powers.cmp(&other.powers))
    }

    fn same_key(&self, other: &Mono) -> bool {
        self.syms == other.syms && self.powers == other.powers
    }
}

/// A canonical sparse sum of monomial terms.
#[derive(Clone, Debug, PartialEq)]
pub struct PolyExpr {
    nvars: usize,
    terms: Vec<Mono>,
}

impl PolyExpr {
    /// The zero expression over `nvars` coordinate variables.
    pub fn zero(nvars: usize) -> Self {
        PolyExpr {
            nvars,
            terms: Vec::new(),
        }
    }

    /// A constant expression.
    pub fn constant(nvars: usize, c: Coefficient) -> Self {
        let mut e = PolyExpr::zero(nvars);
        if !c.is_zero() {
            e.terms.push(Mono {
                coeff: c,
                powers: vec![0; nvars],
                syms: Vec::new(),
            });
        }
        e
    }

    /// The coordinate variable `z{d}`.
    pub fn var(nvars: usize, d: VarId) -> Self {
        assert!(d < nvars);
        let mut powers = vec![0; nvars];
        powers[d] = 1;
        PolyExpr {
            nvars,
            terms: vec![Mono {
                coeff: Coefficient::int(1),
                powers,
                syms: Vec::new(),
            }],
        }
    }

    /// A monomial with the given exponent vector.
    pub fn monomial(powers: Vec<u32>) -> Self {
        PolyExpr {
            nvars: powers.len(),
            terms: vec![Mono {
                coeff: Coefficient::int(1),
                powers,
                syms: Vec::new(),
            }],
        }
    }

    /// The array symbol `array[index]` as an expression.
    pub fn sym(nvars: usize, array: impl Into<Rc<str>>, index: usize) -> Self {
        PolyExpr {
            nvars,
            terms: vec![Mono {
                coeff: Coefficient::int(1),
                powers: vec![0; nvars],
                syms: vec![(ArraySym::new(array, index), 1)],
            }],
        }
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Mono] {
        &self.terms
    }

    /// The value of a constant expression (no variables, no symbols).
    /// Returns zero for the empty expression, None if non-constant.
    pub fn constant_value(&self) -> Option<Coefficient> {
        match self.terms.len() {
            0 => Some(Coefficient::int(0)),
            1 => {
                let t = &self.terms[0];
                if t.syms.is_empty() && t.degree() == 0 {
                    Some(t.coeff.clone())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Restore canonical form: sort, merge like terms, drop zeros.
    fn normalize(mut self) -> Self {
        self.terms.sort_by(|a, b| a.key_cmp(b));
        let mut out: Vec<Mono> = Vec::with_capacity(self.terms.len());
        for t in self.terms {
            match out.last_mut() {
                Some(last) if last.same_key(&t) => {
                    last.coeff = last.coeff.clone() + t.coeff;
                }
                _ => out.push(t),
            }
        }
        out.retain(|t| !t.coeff.is_zero());
        PolyExpr {
            nvars: self.nvars,
            terms: out,
        }
    }

    pub fn add(&self, other: &PolyExpr) -> PolyExpr {
        assert_eq!(self.nvars, other.nvars);
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().cloned());
        PolyExpr {
            nvars: self.nvars,
            terms,
        }
        .normalize()
    }

    pub fn sub(&self, other: &PolyExpr) -> PolyExpr {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> PolyExpr {
        PolyExpr {
            nvars: self.nvars,
            terms: self
                .terms
                .iter()
                .map(|t| Mono {
                    coeff: -t.coeff.clone(),
                    powers: t.powers.clone(),
                    syms: t.syms.clone(),
                })
                .collect(),
        }
    }

    pub fn scale(&self, c: &Coefficient) -> PolyExpr {
        if c.is_zero() {
            return PolyExpr::zero(self.nvars);
        }
        PolyExpr {
            nvars: self.nvars,
            terms: self
                .terms
                .iter()
                .map(|t| Mono {
                    coeff: t.coeff.clone() * c.clone(),
                    powers: t.powers.clone(),
                    syms: t.syms.clone(),
                })
                .collect(),
        }
        .normalize()
    }

    pub fn mul(&self, other: &PolyExpr) -> PolyExpr {
        assert_eq!(self.nvars, other.nvars);
        let mut terms = Vec::with_capacity(self.terms.len() * other.terms.len());
        for a in &self.terms {
            for b in &other.terms {
                let powers: Vec<u32> = a
                    .powers
                    .iter()
                    .zip(&b.powers)
                    .map(|(x, y)| x + y)
                    .collect();
                terms.push(Mono {
                    coeff: a.coeff.clone() * b.coeff.clone(),
                    powers,
                    syms: merge_syms(&a.syms, &b.syms),
                });
            }
        }
        PolyExpr {
            nvars: self.nvars,
            terms,
        }
        .normalize()
    }

    pub fn pow(&self, k: u32) -> PolyExpr {
        let mut out = PolyExpr::constant(self.nvars, Coefficient::int(1));
        for _ in 0..k {
            out = out.mul(self);
        }
        out
    }

    /// Partial derivative with respect to coordinate variable `d`.
    pub fn diff(&self, d: VarId) -> PolyExpr {
        assert!(d < self.nvars);
        let mut terms = Vec::new();
        for t in &self.terms {
            let e = t.powers[d];
            if e == 0 {
                continue;
            }
            let mut powers = t.powers.clone();
            powers[d] = e - 1;
            terms.push(Mono {
                coeff: t.coeff.clone() * Coefficient::int(e as i64),
                powers,
                syms: t.syms.clone(),
            });
        }
        PolyExpr {
            nvars: self.nvars,
            terms,
        }
        .normalize()
    }

    /// Substitute an expression for coordinate variable `d`.
    pub fn substitute(&self, d: VarId, rep: &PolyExpr) -> PolyExpr {
        assert!(d < self.nvars);
        assert_eq!(self.nvars, rep.nvars);
        let mut out = PolyExpr::zero(self.nvars);
        for t in &self.terms {
            let e = t.powers[d];
            let mut powers = t.powers.clone();
            powers[d] = 0;
            let base = PolyExpr {
                nvars: self.nvars,
                terms: vec![Mono {
                    coeff: t.coeff.clone(),
                    powers,
                    syms: t.syms.clone(),
                }],
            };
            out = out.add(&base.mul(&rep.pow(e)));
        }
        out
    }

    /// Integrate out every coordinate variable over `[-1,1]^nvars`.
    /// Array symbols survive; each monomial with any odd power vanishes.
    pub fn integrate_cube(&self) -> PolyExpr {
        let mut terms = Vec::new();
        'term: for t in &self.terms {
            let mut c = t.coeff.clone();
            for &e in &t.powers {
                if e % 2 == 1 {
                    continue 'term;
                }
                c = c * Coefficient::rational(2, e as i64 + 1);
            }
            terms.push(Mono {
                coeff: c,
                powers: vec![0; self.nvars],
                syms: t.syms.clone(),
            });
        }
        PolyExpr {
            nvars: self.nvars,
            terms,
        }
        .normalize()
    }

    /// Render as literal C arithmetic. Deterministic for a given
    /// expression; the empty expression renders as `0.0`.
    pub fn render(&self) -> String {
        if self.terms.is_empty() {
            return "0.0".to_string();
        }
        let mut out = String::new();
        for (i, t) in self.terms.iter().enumerate() {
            if t.coeff.is_negative() {
                out.push('-');
            } else if i > 0 {
                out.push('+');
            }
            out.push_str(&fmt_f64(t.coeff.to_f64().abs()));
            for (s, e) in &t.syms {
                for _ in 0..*e {
                    write!(out, "*{}", s).unwrap();
                }
            }
            for (d, &e) in t.powers.iter().enumerate() {
                for _ in 0..e {
                    write!(out, "*z{}", d).unwrap();
                }
            }
        }
        out
    }
}

impl fmt::Display for PolyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Format an f64 as a C double literal (shortest round-trip digits, with a
/// decimal point forced onto integral values).
pub fn fmt_f64(x: f64) -> String {
    let s = format!("{}", x);
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

fn merge_syms(a: &[(ArraySym, u32)], b: &[(ArraySym, u32)]) -> Vec<(ArraySym, u32)> {
    let mut out: Vec<(ArraySym, u32)> = a.to_vec();
    for (s, e) in b {
        match out.iter_mut().find(|(t, _)| t == s) {
            Some((_, oe)) => *oe += e,
            None => out.push((s.clone(), *e)),
        }
    }
    out.sort();
    out
}
