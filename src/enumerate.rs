//! Configuration enumeration tables.
//!
//! Each family has a fixed table of supported dimensions and polynomial
//! orders; enumeration walks it in a fixed nested order (outer over
//! dimension, inner over order) so aggregated outputs receive kernels in a
//! reproducible order and reruns produce stable diffs.

use crate::basis::{BasisFamily, BasisKey};

/// Dimension entry: orders `min_order..=max_order` are enumerated.
struct DimEntry {
    ndim: usize,
    min_order: usize,
    max_order: usize,
}

/// The full, ordered configuration sequence for one family.
pub fn family_configurations(family: BasisFamily) -> Vec<BasisKey> {
    match family {
        BasisFamily::Serendipity => dim_table(
            family,
            &[
                DimEntry { ndim: 1, min_order: 0, max_order: 3 },
                DimEntry { ndim: 2, min_order: 0, max_order: 3 },
                DimEntry { ndim: 3, min_order: 0, max_order: 3 },
                DimEntry { ndim: 4, min_order: 0, max_order: 3 },
                DimEntry { ndim: 5, min_order: 0, max_order: 3 },
                DimEntry { ndim: 6, min_order: 0, max_order: 2 },
            ],
        ),
        // Tensor orders 0 and 1 coincide with the serendipity space, so
        // the table starts at order 2.
        BasisFamily::Tensor => dim_table(
            family,
            &[
                DimEntry { ndim: 2, min_order: 2, max_order: 2 },
                DimEntry { ndim: 3, min_order: 2, max_order: 2 },
                DimEntry { ndim: 4, min_order: 2, max_order: 2 },
                DimEntry { ndim: 5, min_order: 2, max_order: 2 },
            ],
        ),
        BasisFamily::Hybrid => {
            let mut out = Vec::new();
            for cdim in 1..=3 {
                for vdim in 1..=3 {
                    out.push(BasisKey::new(family, cdim + vdim, vdim, 1));
                }
            }
            out
        }
        BasisFamily::GkHybrid => {
            let mut out = Vec::new();
            for cdim in 1..=3usize {
                for vdim in cdim.min(2)..=2 {
                    out.push(BasisKey::new(family, cdim + vdim, vdim, 1));
                }
            }
            out
        }
    }
}

/// Configurations for the binary-multiplication operator. Only the
/// serendipity family's multiplication table is generated.
pub fn binop_configurations() -> Vec<BasisKey> {
    dim_table(
        BasisFamily::Serendipity,
        &[
            DimEntry { ndim: 1, min_order: 0, max_order: 3 },
            DimEntry { ndim: 2, min_order: 0, max_order: 3 },
            DimEntry { ndim: 3, min_order: 0, max_order: 3 },
        ],
    )
}

fn dim_table(family: BasisFamily, entries: &[DimEntry]) -> Vec<BasisKey> {
    let mut out = Vec::new();
    for e in entries {
        for p in e.min_order..=e.max_order {
            out.push(BasisKey::new(family, e.ndim, 0, p));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_serendipity_table() {
        let keys = family_configurations(BasisFamily::Serendipity);
        // 5 dims * 4 orders + 1 dim * 3 orders
        assert_eq!(keys.len(), 23);
        assert_eq!(keys[0], BasisKey::new(BasisFamily::Serendipity, 1, 0, 0));
        assert_eq!(
            *keys.last().unwrap(),
            BasisKey::new(BasisFamily::Serendipity, 6, 0, 2)
        );
    }

    #[test]
    fn test_tensor_table_starts_at_order_two() {
        let keys = family_configurations(BasisFamily::Tensor);
        assert_eq!(keys.len(), 4);
        assert!(keys.iter().all(|k| k.poly_order == 2));
    }

    #[test]
    fn test_hybrid_tables() {
        assert_eq!(family_configurations(BasisFamily::Hybrid).len(), 9);
        let gk = family_configurations(BasisFamily::GkHybrid);
        // cdim 1: vdim 1,2; cdim 2: vdim 2; cdim 3: vdim 2
        assert_eq!(gk.len(), 4);
        assert!(gk.iter().all(|k| k.vdim >= k.cdim().min(2)));
    }

    #[test]
    fn test_no_duplicate_keys() {
        let mut seen = FxHashSet::default();
        for family in BasisFamily::ALL {
            for k in family_configurations(family) {
                assert!(seen.insert(k), "duplicate key {}", k);
            }
        }
    }

    #[test]
    fn test_all_enumerated_keys_supported() {
        for family in BasisFamily::ALL {
            for k in family_configurations(family) {
                assert!(k.is_supported(), "{}", k);
            }
        }
        for k in binop_configurations() {
            assert!(k.is_supported(), "{}", k);
        }
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        for family in BasisFamily::ALL {
            assert_eq!(
                family_configurations(family),
                family_configurations(family)
            );
        }
    }
}
