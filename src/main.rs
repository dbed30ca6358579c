//! Command-line driver for the kernel generator.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use modalgen::{
    generate_all, generate_binop, generate_family, BasisFamily, NameRegistry, RunReport,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "modalgen", about = "Generate modal basis kernels as C source")]
struct Cli {
    /// Directory the generated sources are written to.
    #[arg(short, long, default_value = "kernels", global = true)]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the per-family basis kernels.
    Basis {
        #[arg(long, value_enum, default_value_t = FamilyArg::All)]
        family: FamilyArg,
    },
    /// Generate the binary multiplication kernels.
    Binop,
    /// Generate everything.
    All,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FamilyArg {
    Ser,
    Tensor,
    Hyb,
    Gkhyb,
    All,
}

impl FamilyArg {
    fn families(self) -> Vec<BasisFamily> {
        match self {
            FamilyArg::Ser => vec![BasisFamily::Serendipity],
            FamilyArg::Tensor => vec![BasisFamily::Tensor],
            FamilyArg::Hyb => vec![BasisFamily::Hybrid],
            FamilyArg::Gkhyb => vec![BasisFamily::GkHybrid],
            FamilyArg::All => BasisFamily::ALL.to_vec(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();
    let cli = Cli::parse();
    let start = Instant::now();

    let report = match cli.command {
        Command::Basis { family } => {
            let mut names = NameRegistry::new();
            let mut report = RunReport::default();
            for fam in family.families() {
                let (unit, rep) = generate_family(fam, &mut names)?;
                unit.write(&cli.out)
                    .with_context(|| format!("writing {} units", fam))?;
                report.configurations += rep.configurations;
                report.kernels += rep.kernels;
                report.failures.extend(rep.failures);
            }
            report
        }
        Command::Binop => {
            let mut names = NameRegistry::new();
            let (units, report) = generate_binop(&mut names)?;
            units.write(&cli.out).context("writing binop units")?;
            report
        }
        Command::All => generate_all(&cli.out).context("generating kernels")?,
    };

    info!(
        "generated {} kernels from {} configurations in {:.1?}",
        report.kernels,
        report.configurations,
        start.elapsed()
    );
    if !report.is_success() {
        for (key, err) in &report.failures {
            log::error!("{}: {}", key, err);
        }
        bail!("{} configuration(s) failed", report.failures.len());
    }
    Ok(())
}
