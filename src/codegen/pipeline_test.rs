//! End-to-end pipeline tests: full runs over the built-in configuration
//! tables, checking determinism, name uniqueness, and routing.

use crate::basis::BasisFamily;
use crate::codegen::{generate_all, generate_binop, generate_family};
use crate::error::GenError;
use crate::names::NameRegistry;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn read_tree(dir: &Path) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().into_string().unwrap();
        out.insert(name, fs::read_to_string(entry.path()).unwrap());
    }
    out
}

#[test]
fn full_run_succeeds_with_expected_counts() {
    let dir = tempfile::tempdir().unwrap();
    let report = generate_all(dir.path()).unwrap();
    assert!(report.is_success());
    // 23 ser + 4 tensor + 9 hyb + 4 gkhyb configurations, plus 12
    // multiplication configurations.
    assert_eq!(report.configurations, 40 + 12);
    // Seven basis kernels per configuration, one multiplication kernel
    // per binop configuration.
    assert_eq!(report.kernels, 40 * 7 + 12);
}

#[test]
fn full_run_is_byte_deterministic() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    generate_all(a.path()).unwrap();
    generate_all(b.path()).unwrap();
    assert_eq!(read_tree(a.path()), read_tree(b.path()));
}

#[test]
fn output_tree_has_expected_files() {
    let dir = tempfile::tempdir().unwrap();
    generate_all(dir.path()).unwrap();
    let tree = read_tree(dir.path());
    for tag in ["ser", "tensor", "hyb", "gkhyb"] {
        assert!(tree.contains_key(&format!("mgen_basis_{}_kernels.h", tag)));
        assert!(tree.contains_key(&format!("mgen_basis_{}_kernels.c", tag)));
    }
    assert!(tree.contains_key("mgen_binop_mul.h"));
    assert!(tree.contains_key("binop_mul_1d_p0.c"));
    assert!(tree.contains_key("binop_mul_3d_p3.c"));
    // 8 family units + 1 binop header + 12 per-configuration units.
    assert_eq!(tree.len(), 8 + 1 + 12);
}

#[test]
fn family_header_lists_configurations_in_table_order() {
    let mut names = NameRegistry::new();
    let (unit, report) = generate_family(BasisFamily::Serendipity, &mut names).unwrap();
    assert!(report.is_success());
    let header = &unit.files()[0].1;
    let p0 = header.find("eval_1d_ser_p0(").unwrap();
    let p3 = header.find("eval_1d_ser_p3(").unwrap();
    let d2 = header.find("eval_2d_ser_p0(").unwrap();
    assert!(p0 < p3 && p3 < d2);
}

#[test]
fn rerun_against_same_registry_is_a_fatal_collision() {
    let mut names = NameRegistry::new();
    generate_binop(&mut names).unwrap();
    let err = generate_binop(&mut names).unwrap_err();
    assert!(matches!(err, GenError::NameCollision { .. }));
}

#[test]
fn binop_units_each_carry_one_kernel() {
    let mut names = NameRegistry::new();
    let (units, report) = generate_binop(&mut names).unwrap();
    assert_eq!(report.kernels, 12);
    let files = units.files();
    let (name, unit) = files
        .iter()
        .find(|(n, _)| n == "binop_mul_2d_p1.c")
        .unwrap();
    assert_eq!(name, "binop_mul_2d_p1.c");
    assert!(unit.contains("#include <mgen_binop_mul.h>"));
    assert!(unit.contains("binop_mul_2d_p1(const double *f"));
    assert!(!unit.contains("binop_mul_2d_p2("));
}
