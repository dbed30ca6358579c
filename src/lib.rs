//! modalgen: closed-form kernel generation for modal orthonormal bases.
//!
//! This crate provides:
//! - Exact coefficient arithmetic over rationals and square roots
//! - Sparse multivariate polynomials with symbolic array references
//! - Orthonormal basis construction for four element families
//! - Emitters for evaluation, gradient, sign-flip, and Galerkin
//!   multiplication kernels as C source text
//! - Output routing into per-family and per-configuration units

pub mod basis;
pub mod codegen;
pub mod coeff;
pub mod enumerate;
pub mod error;
pub mod names;
pub mod poly;

// Re-exports for convenience
pub use basis::{BasisFamily, BasisKey, BasisProvider, ModalBasis};
pub use codegen::{
    generate_all, generate_binop, generate_family, total_op, BinopUnits, FamilyUnit,
    GeneratedKernel, OpCount, Routing, RunReport,
};
pub use coeff::Coefficient;
pub use enumerate::{binop_configurations, family_configurations};
pub use error::{GenError, Result};
pub use names::{kernel_name, op_count_name, NameRegistry, OpKind};
pub use poly::{ArraySym, Mono, PolyExpr};
