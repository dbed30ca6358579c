//! Benchmark of basis derivation and kernel emission.
//!
//! Run with: cargo bench --bench gen_bench

use std::time::Instant;

use modalgen::codegen::emit;
use modalgen::{BasisFamily, BasisKey, BasisProvider, ModalBasis, NameRegistry};

fn bench_basis(key: BasisKey, repeats: usize) -> (f64, usize) {
    let start = Instant::now();
    let mut num_basis = 0;
    for _ in 0..repeats {
        let basis = ModalBasis::new(key).unwrap();
        num_basis = basis.num_basis();
    }
    (start.elapsed().as_secs_f64() * 1000.0 / repeats as f64, num_basis)
}

fn bench_binop_mul(key: BasisKey, repeats: usize) -> (f64, u64) {
    let basis = ModalBasis::new(key).unwrap();
    let start = Instant::now();
    let mut num_prod = 0;
    for _ in 0..repeats {
        let mut names = NameRegistry::new();
        let kernel = emit::gen_binop_mul(&basis, &mut names).unwrap();
        num_prod = kernel.op_count.unwrap().num_prod;
    }
    (start.elapsed().as_secs_f64() * 1000.0 / repeats as f64, num_prod)
}

fn main() {
    println!("=======================================================================");
    println!("Kernel Generation Micro-benchmarks");
    println!("=======================================================================");
    println!();

    println!("1. Orthonormal Basis Derivation (avg over 10 runs)");
    for (key, label) in [
        (BasisKey::new(BasisFamily::Serendipity, 2, 0, 2), "ser 2d p2"),
        (BasisKey::new(BasisFamily::Serendipity, 3, 0, 2), "ser 3d p2"),
        (BasisKey::new(BasisFamily::Tensor, 3, 0, 2), "tensor 3d p2"),
        (BasisKey::new(BasisFamily::Hybrid, 3, 2, 1), "hyb 1x2v p1"),
    ] {
        let (ms, n) = bench_basis(key, 10);
        println!("   {:<14} {:>8.2} ms  ({} basis functions)", label, ms, n);
    }
    println!();

    println!("2. Galerkin Multiplication Emission (avg over 10 runs)");
    for (key, label) in [
        (BasisKey::new(BasisFamily::Serendipity, 2, 0, 2), "ser 2d p2"),
        (BasisKey::new(BasisFamily::Serendipity, 3, 0, 1), "ser 3d p1"),
        (BasisKey::new(BasisFamily::Serendipity, 3, 0, 2), "ser 3d p2"),
    ] {
        let (ms, prods) = bench_binop_mul(key, 10);
        println!("   {:<14} {:>8.2} ms  ({} products emitted)", label, ms, prods);
    }
    println!();

    println!("=======================================================================");
}
