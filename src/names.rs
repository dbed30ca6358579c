//! Kernel name derivation and the global uniqueness registry.

use crate::basis::BasisKey;
use crate::error::{GenError, Result};
use rustc_hash::FxHashSet;

/// The operation kinds a configuration generates kernels for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Eval,
    EvalExpand,
    EvalGradExpand,
    FlipOddSign,
    FlipEvenSign,
    NodeCoords,
    NodalToModal,
    BinopMul,
}

impl OpKind {
    /// Name prefix for the emitted routine.
    pub fn prefix(&self) -> &'static str {
        match self {
            OpKind::Eval => "eval",
            OpKind::EvalExpand => "eval_expand",
            OpKind::EvalGradExpand => "eval_grad_expand",
            OpKind::FlipOddSign => "flip_odd_sign",
            OpKind::FlipEvenSign => "flip_even_sign",
            OpKind::NodeCoords => "node_coords",
            OpKind::NodalToModal => "nodal_to_modal",
            OpKind::BinopMul => "binop_mul",
        }
    }

    /// The per-family basis operations, in emission order.
    pub const BASIS_OPS: [OpKind; 7] = [
        OpKind::Eval,
        OpKind::EvalExpand,
        OpKind::EvalGradExpand,
        OpKind::FlipOddSign,
        OpKind::FlipEvenSign,
        OpKind::NodeCoords,
        OpKind::NodalToModal,
    ];
}

/// Derive the external symbol name for a configuration and operation.
///
/// Multiplication kernels carry no family tag: only one family's
/// multiplication table exists, and the projected products are indexed
/// purely by dimension and order.
pub fn kernel_name(key: &BasisKey, op: OpKind) -> String {
    match op {
        OpKind::BinopMul => format!("{}_{}_p{}", op.prefix(), key.dim_token(), key.poly_order),
        _ => format!(
            "{}_{}_{}_p{}",
            op.prefix(),
            key.dim_token(),
            key.family.tag(),
            key.poly_order
        ),
    }
}

/// Name of the routine returning a multiplication kernel's op counts.
pub fn op_count_name(key: &BasisKey) -> String {
    format!("op_count_{}", kernel_name(key, OpKind::BinopMul))
}

/// Process-wide uniqueness set for derived names, threaded explicitly
/// through the pipeline. Each name is write-once: a repeat claim is a
/// fatal generator defect, not a condition to resolve.
#[derive(Debug, Default)]
pub struct NameRegistry {
    seen: FxHashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        NameRegistry::default()
    }

    /// Claim a name, failing on any repeat.
    pub fn claim(&mut self, name: &str) -> Result<()> {
        if !self.seen.insert(name.to_string()) {
            return Err(GenError::NameCollision {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{BasisFamily, BasisKey};
    use crate::enumerate::{binop_configurations, family_configurations};

    #[test]
    fn test_name_shapes() {
        let ser = BasisKey::new(BasisFamily::Serendipity, 3, 0, 2);
        assert_eq!(kernel_name(&ser, OpKind::Eval), "eval_3d_ser_p2");
        assert_eq!(
            kernel_name(&ser, OpKind::FlipOddSign),
            "flip_odd_sign_3d_ser_p2"
        );

        let hyb = BasisKey::new(BasisFamily::Hybrid, 3, 2, 1);
        assert_eq!(kernel_name(&hyb, OpKind::Eval), "eval_1x2v_hyb_p1");

        let gk = BasisKey::new(BasisFamily::GkHybrid, 4, 2, 1);
        assert_eq!(
            kernel_name(&gk, OpKind::NodalToModal),
            "nodal_to_modal_2x2v_gkhyb_p1"
        );
    }

    #[test]
    fn test_binop_names_have_no_family_tag() {
        let key = BasisKey::new(BasisFamily::Serendipity, 2, 0, 3);
        assert_eq!(kernel_name(&key, OpKind::BinopMul), "binop_mul_2d_p3");
        assert_eq!(op_count_name(&key), "op_count_binop_mul_2d_p3");
    }

    #[test]
    fn test_full_cross_product_is_collision_free() {
        let mut reg = NameRegistry::new();
        for family in BasisFamily::ALL {
            for key in family_configurations(family) {
                for op in OpKind::BASIS_OPS {
                    reg.claim(&kernel_name(&key, op)).unwrap();
                }
            }
        }
        for key in binop_configurations() {
            reg.claim(&kernel_name(&key, OpKind::BinopMul)).unwrap();
            reg.claim(&op_count_name(&key)).unwrap();
        }
        assert!(reg.len() > 0);
    }

    #[test]
    fn test_collision_is_fatal() {
        let mut reg = NameRegistry::new();
        reg.claim("eval_1d_ser_p0").unwrap();
        let err = reg.claim("eval_1d_ser_p0").unwrap_err();
        assert!(err.is_fatal());
    }
}
