//! Modal basis families and the symbolic basis provider.
//!
//! A provider supplies, for one configuration, the ordered basis-function
//! list and the few symbolic capabilities the emitters need: building a
//! coefficient expansion and taking inner products over the reference cube
//! `[-1,1]^ndim`. Differentiation, substitution, and rendering live on
//! [`PolyExpr`] itself.
//!
//! `ModalBasis` is the in-crate provider: it selects the family's monomials
//! in a fixed graded-lex order and orthonormalizes them with exact
//! Gram-Schmidt, so every basis function carries a single surd
//! normalization factor and orthogonality cancellations are exact.

use crate::coeff::Coefficient;
use crate::error::{GenError, Result};
use crate::poly::PolyExpr;
use std::fmt;

/// One of the four supported modal basis families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasisFamily {
    Serendipity,
    Tensor,
    Hybrid,
    GkHybrid,
}

impl BasisFamily {
    /// Short tag used in kernel names.
    pub fn tag(&self) -> &'static str {
        match self {
            BasisFamily::Serendipity => "ser",
            BasisFamily::Tensor => "tensor",
            BasisFamily::Hybrid => "hyb",
            BasisFamily::GkHybrid => "gkhyb",
        }
    }

    /// Hybrid families split dimensions into configuration and velocity.
    pub fn is_hybrid(&self) -> bool {
        matches!(self, BasisFamily::Hybrid | BasisFamily::GkHybrid)
    }

    pub const ALL: [BasisFamily; 4] = [
        BasisFamily::Serendipity,
        BasisFamily::Tensor,
        BasisFamily::Hybrid,
        BasisFamily::GkHybrid,
    ];
}

impl fmt::Display for BasisFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One concrete configuration to generate kernels for.
///
/// `vdim` is zero for non-hybrid families. For hybrid families `ndim`
/// counts all dimensions and `cdim = ndim - vdim` is derived for naming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BasisKey {
    pub family: BasisFamily,
    pub ndim: usize,
    pub vdim: usize,
    pub poly_order: usize,
}

impl BasisKey {
    pub fn new(family: BasisFamily, ndim: usize, vdim: usize, poly_order: usize) -> Self {
        BasisKey {
            family,
            ndim,
            vdim,
            poly_order,
        }
    }

    /// Configuration-space dimension.
    pub fn cdim(&self) -> usize {
        self.ndim - self.vdim
    }

    /// The dimension token used in kernel names: `3d`, or `1x2v` for
    /// hybrid families.
    pub fn dim_token(&self) -> String {
        if self.vdim == 0 {
            format!("{}d", self.ndim)
        } else {
            format!("{}x{}v", self.cdim(), self.vdim)
        }
    }

    /// Whether this key is inside the provider's supported ranges.
    pub fn is_supported(&self) -> bool {
        let p = self.poly_order;
        match self.family {
            BasisFamily::Serendipity => {
                self.vdim == 0
                    && (1..=6).contains(&self.ndim)
                    && p <= if self.ndim == 6 { 2 } else { 3 }
            }
            BasisFamily::Tensor => self.vdim == 0 && (2..=5).contains(&self.ndim) && p <= 2,
            BasisFamily::Hybrid => {
                (1..=3).contains(&self.vdim) && (1..=3).contains(&self.cdim()) && p == 1
            }
            BasisFamily::GkHybrid => {
                let cd = self.cdim();
                (1..=3).contains(&cd)
                    && self.vdim >= cd.min(2)
                    && self.vdim <= 2
                    && p == 1
            }
        }
    }
}

impl fmt::Display for BasisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} p{}", self.family, self.dim_token(), self.poly_order)
    }
}

/// Capability surface the kernel emitters consume.
///
/// The basis-function order is stable: every call returns the identical
/// sequence, and all emitted kernels index their arrays by it.
pub trait BasisProvider {
    fn key(&self) -> &BasisKey;

    /// The ordered, orthonormal basis-function list.
    fn basis_functions(&self) -> &[PolyExpr];

    fn num_basis(&self) -> usize {
        self.basis_functions().len()
    }

    fn ndim(&self) -> usize {
        self.key().ndim
    }

    fn poly_order(&self) -> usize {
        self.key().poly_order
    }

    /// Build the expansion `sum_i array[i] * b_i`.
    fn expand(&self, array: &str) -> PolyExpr {
        let nvars = self.ndim();
        let mut out = PolyExpr::zero(nvars);
        for (i, b) in self.basis_functions().iter().enumerate() {
            out = out.add(&PolyExpr::sym(nvars, array, i).mul(b));
        }
        out
    }

    /// Galerkin inner product over the reference cube. Array symbols in
    /// either operand survive into the result.
    fn inner_product(&self, a: &PolyExpr, b: &PolyExpr) -> PolyExpr {
        a.mul(b).integrate_cube()
    }
}

/// In-crate symbolic basis provider: exact orthonormal modal bases.
pub struct ModalBasis {
    key: BasisKey,
    basis: Vec<PolyExpr>,
}

impl ModalBasis {
    /// Construct the basis for a configuration, or fail with
    /// `UnsupportedConfig`/`BasisDerivation`.
    pub fn new(key: BasisKey) -> Result<Self> {
        if !key.is_supported() {
            return Err(GenError::UnsupportedConfig { key });
        }
        let monos = family_monomials(&key);
        let basis = gram_schmidt(&monos, key.ndim)
            .map_err(|reason| GenError::BasisDerivation { key, reason })?;
        Ok(ModalBasis { key, basis })
    }
}

impl BasisProvider for ModalBasis {
    fn key(&self) -> &BasisKey {
        &self.key
    }

    fn basis_functions(&self) -> &[PolyExpr] {
        &self.basis
    }
}

/// Superlinear degree: the sum of exponents that are at least 2.
fn superlinear_degree(e: &[u32]) -> u32 {
    e.iter().filter(|&&x| x >= 2).sum()
}

/// Per-variable exponent caps for a family.
fn exponent_caps(key: &BasisKey) -> Vec<u32> {
    let p = key.poly_order as u32;
    match key.family {
        BasisFamily::Serendipity | BasisFamily::Tensor => vec![p; key.ndim],
        BasisFamily::Hybrid => {
            let mut caps = vec![1; key.ndim];
            for c in caps.iter_mut().skip(key.cdim()) {
                *c = 2;
            }
            caps
        }
        BasisFamily::GkHybrid => {
            // Only the parallel-velocity coordinate (the first velocity
            // variable) reaches order 2.
            let mut caps = vec![1; key.ndim];
            caps[key.cdim()] = 2;
            caps
        }
    }
}

/// Whether an exponent vector belongs to the family's monomial space.
fn admits(key: &BasisKey, e: &[u32]) -> bool {
    match key.family {
        BasisFamily::Serendipity => superlinear_degree(e) <= key.poly_order as u32,
        BasisFamily::Tensor | BasisFamily::GkHybrid => true,
        BasisFamily::Hybrid => {
            // At most one velocity variable squared.
            e[key.cdim()..].iter().filter(|&&x| x == 2).count() <= 1
        }
    }
}

/// The family's monomial exponent vectors in graded-lex order.
fn family_monomials(key: &BasisKey) -> Vec<Vec<u32>> {
    let caps = exponent_caps(key);
    let mut out = Vec::new();
    let mut e = vec![0u32; key.ndim];
    loop {
        if admits(key, &e) {
            out.push(e.clone());
        }
        // Odometer over the capped exponent ranges.
        let mut d = 0;
        loop {
            if d == key.ndim {
                out.sort_by(|a, b| {
                    let da: u32 = a.iter().sum();
                    let db: u32 = b.iter().sum();
                    da.cmp(&db).then_with(|| a.cmp(b))
                });
                return out;
            }
            if e[d] < caps[d] {
                e[d] += 1;
                break;
            }
            e[d] = 0;
            d += 1;
        }
    }
}

fn cube_ip(a: &PolyExpr, b: &PolyExpr) -> std::result::Result<Coefficient, String> {
    a.mul(b)
        .integrate_cube()
        .constant_value()
        .ok_or_else(|| "inner product did not reduce to a constant".to_string())
}

/// Orthonormalize the monomial list over `[-1,1]^ndim`.
fn gram_schmidt(
    monos: &[Vec<u32>],
    _ndim: usize,
) -> std::result::Result<Vec<PolyExpr>, String> {
    let mut ortho: Vec<PolyExpr> = Vec::with_capacity(monos.len());
    let mut norms: Vec<Coefficient> = Vec::with_capacity(monos.len());
    for e in monos {
        let mut q = PolyExpr::monomial(e.clone());
        for (prev, n) in ortho.iter().zip(&norms) {
            let c = cube_ip(&q, prev)? / n.clone();
            if !c.is_zero() {
                q = q.sub(&prev.scale(&c));
            }
        }
        let n = cube_ip(&q, &q)?;
        if n.is_zero() || n.is_negative() {
            return Err(format!("degenerate basis function for exponents {:?}", e));
        }
        ortho.push(q);
        norms.push(n);
    }
    Ok(ortho
        .into_iter()
        .zip(&norms)
        .map(|(q, n)| q.scale(&n.sqrt().recip()))
        .collect())
}
