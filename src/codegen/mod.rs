//! Kernel generation pipeline.
//!
//! For each basis family the driver enumerates its configurations in
//! table order, builds the symbolic basis, runs every emitter, and
//! routes the results: basis kernels aggregate into per-family
//! declaration/definition units, multiplication kernels get one unit per
//! configuration.
//!
//! ```text
//! tables ──► BasisKey ──► ModalBasis ──► emitters ──► router ──► files
//!                │                          │
//!                └── NameRegistry ◄─────────┘   (write-once names)
//! ```
//!
//! A failure in one configuration is logged and collected without
//! touching the output of any other configuration; a name collision
//! aborts the whole run.

pub mod emit;
pub mod opcount;
pub mod router;

#[cfg(test)]
mod pipeline_test;

pub use emit::GeneratedKernel;
pub use opcount::{total_op, OpCount};
pub use router::{BinopUnits, FamilyUnit, Routing};

use crate::basis::{BasisFamily, BasisKey, ModalBasis};
use crate::enumerate::{binop_configurations, family_configurations};
use crate::error::{GenError, Result};
use crate::names::NameRegistry;
use log::{debug, info, warn};
use std::path::Path;

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub configurations: usize,
    pub kernels: usize,
    /// Configurations that failed, with their errors. The rest of the
    /// run's output is unaffected, but the run as a whole is a failure.
    pub failures: Vec<(BasisKey, GenError)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, other: RunReport) {
        self.configurations += other.configurations;
        self.kernels += other.kernels;
        self.failures.extend(other.failures);
    }
}

/// Record a per-configuration failure, or abort the run on a fatal one.
fn note_failure(report: &mut RunReport, key: BasisKey, err: GenError) -> Result<()> {
    if err.is_fatal() {
        return Err(err);
    }
    warn!("skipping {}: {}", key, err);
    report.failures.push((key, err));
    Ok(())
}

/// Generate all basis kernels for one family into an aggregated unit.
pub fn generate_family(
    family: BasisFamily,
    names: &mut NameRegistry,
) -> Result<(FamilyUnit, RunReport)> {
    let mut unit = FamilyUnit::new(family);
    let mut report = RunReport::default();
    for key in family_configurations(family) {
        report.configurations += 1;
        debug!("deriving {}", key);
        // Emit the whole configuration before touching the aggregate, so
        // a failed configuration leaves no partial kernels behind.
        let kernels =
            ModalBasis::new(key).and_then(|basis| emit::basis_kernels(&basis, names));
        match kernels {
            Ok(kernels) => {
                for k in &kernels {
                    unit.push(k);
                }
                report.kernels += kernels.len();
            }
            Err(err) => note_failure(&mut report, key, err)?,
        }
    }
    info!(
        "{}: {} kernels across {} configurations",
        family.tag(),
        report.kernels,
        report.configurations
    );
    Ok((unit, report))
}

/// Generate the binary-multiplication kernels, one unit per configuration.
pub fn generate_binop(names: &mut NameRegistry) -> Result<(BinopUnits, RunReport)> {
    let mut units = BinopUnits::new();
    let mut report = RunReport::default();
    for key in binop_configurations() {
        report.configurations += 1;
        debug!("deriving {} multiplication", key);
        let kernel =
            ModalBasis::new(key).and_then(|basis| emit::gen_binop_mul(&basis, names));
        match kernel {
            Ok(k) => {
                units.push(&k);
                report.kernels += 1;
            }
            Err(err) => note_failure(&mut report, key, err)?,
        }
    }
    info!(
        "binop_mul: {} kernels across {} configurations",
        report.kernels, report.configurations
    );
    Ok((units, report))
}

/// Generate every family and the multiplication tables into `out_dir`.
pub fn generate_all(out_dir: &Path) -> Result<RunReport> {
    let mut names = NameRegistry::new();
    let mut report = RunReport::default();
    for family in BasisFamily::ALL {
        let (unit, rep) = generate_family(family, &mut names)?;
        unit.write(out_dir)?;
        report.merge(rep);
    }
    let (units, rep) = generate_binop(&mut names)?;
    units.write(out_dir)?;
    report.merge(rep);
    Ok(report)
}
