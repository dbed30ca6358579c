//! Output routing for generated kernels.
//!
//! Two strategies, selected by operation kind: the per-family basis
//! kernels aggregate into one declarations unit and one definitions unit
//! (the family compiles as a single translation unit), while
//! multiplication kernels get one definition unit per configuration so
//! those expensive units can be compiled independently and in parallel.
//! Declarations are wrapped in a C-linkage block with a dual host/device
//! marker so names stay stable when consumed from other languages.

use crate::basis::BasisFamily;
use crate::codegen::emit::GeneratedKernel;
use crate::error::Result;
use crate::names::OpKind;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// How an operation kind's output is grouped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routing {
    /// All configurations of one family share a declarations and a
    /// definitions unit, filled in enumeration order.
    FamilyAggregate,
    /// Each configuration gets its own definition unit.
    PerConfiguration,
}

impl OpKind {
    pub fn routing(&self) -> Routing {
        match self {
            OpKind::BinopMul => Routing::PerConfiguration,
            _ => Routing::FamilyAggregate,
        }
    }
}

const BANNER: &str = "// Generated by modalgen. Do not edit.\n";

fn header_prologue(out: &mut String) {
    out.push_str(BANNER);
    out.push_str("#pragma once\n");
    out.push_str("#include <mgen_util.h>\n");
    out.push_str("MGEN_EXTERN_C_BEG\n\n");
}

/// Aggregated declaration/definition units for one basis family.
#[derive(Clone, Debug)]
pub struct FamilyUnit {
    family: BasisFamily,
    header: String,
    defs: String,
}

impl FamilyUnit {
    pub fn new(family: BasisFamily) -> Self {
        let mut header = String::new();
        header_prologue(&mut header);
        let mut defs = String::new();
        defs.push_str(BANNER);
        writeln!(defs, "#include <{}>", Self::header_name_for(family)).unwrap();
        defs.push('\n');
        FamilyUnit {
            family,
            header,
            defs,
        }
    }

    fn header_name_for(family: BasisFamily) -> String {
        format!("mgen_basis_{}_kernels.h", family.tag())
    }

    pub fn header_name(&self) -> String {
        Self::header_name_for(self.family)
    }

    pub fn defs_name(&self) -> String {
        format!("mgen_basis_{}_kernels.c", self.family.tag())
    }

    /// Append one kernel. Declaration-only stubs contribute no
    /// definition text.
    pub fn push(&mut self, k: &GeneratedKernel) {
        self.header.push_str(&k.decl);
        self.header.push('\n');
        if !k.defn.is_empty() {
            self.defs.push_str(&k.defn);
            self.defs.push('\n');
        }
    }

    /// The finished (filename, contents) pairs.
    pub fn files(&self) -> Vec<(String, String)> {
        let mut header = self.header.clone();
        header.push_str("\nMGEN_EXTERN_C_END\n");
        vec![(self.header_name(), header), (self.defs_name(), self.defs.clone())]
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        write_files(dir, &self.files())
    }
}

/// One shared declarations unit plus one definition unit per
/// configuration, for the multiplication kernels.
#[derive(Clone, Debug, Default)]
pub struct BinopUnits {
    header: String,
    units: Vec<(String, String)>,
}

impl BinopUnits {
    pub fn new() -> Self {
        let mut header = String::new();
        header_prologue(&mut header);
        BinopUnits {
            header,
            units: Vec::new(),
        }
    }

    pub fn header_name(&self) -> &'static str {
        "mgen_binop_mul.h"
    }

    pub fn push(&mut self, k: &GeneratedKernel) {
        self.header.push_str(&k.decl);
        self.header.push('\n');
        let mut unit = String::new();
        unit.push_str(BANNER);
        writeln!(unit, "#include <{}>", self.header_name()).unwrap();
        unit.push('\n');
        unit.push_str(&k.defn);
        self.units.push((format!("{}.c", k.name), unit));
    }

    pub fn files(&self) -> Vec<(String, String)> {
        let mut header = self.header.clone();
        header.push_str("\nMGEN_EXTERN_C_END\n");
        let mut out = vec![(self.header_name().to_string(), header)];
        out.extend(self.units.iter().cloned());
        out
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        write_files(dir, &self.files())
    }
}

fn write_files(dir: &Path, files: &[(String, String)]) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (name, contents) in files {
        fs::write(dir.join(name), contents)?;
    }
    Ok(())
}
