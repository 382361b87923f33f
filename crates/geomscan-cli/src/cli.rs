use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "gscan - generate batches of perturbed molecular structures for quantum-chemistry scan jobs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep a bond length over a grid, writing one Gaussian input per point.
    Scan(ScanArgs),
    /// Apply a single geometric edit to a structure and write the result.
    Set(SetArgs),
    /// Print a summary of a structure file.
    Info(InfoArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to the Gaussian input template (.gjf) with connectivity.
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory the per-point .gjf files are written into.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// 1-based number of the anchor atom (its side stays fixed).
    #[arg(long, value_name = "NUM")]
    pub from: usize,

    /// 1-based number of the moving atom (its side is translated).
    #[arg(long, value_name = "NUM")]
    pub to: usize,

    /// First bond length on the grid, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub start: f64,

    /// Last bond length on the grid, in Angstroms (inclusive).
    #[arg(long, value_name = "FLOAT")]
    pub stop: f64,

    /// Grid spacing, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub step: f64,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Path to the Gaussian input file (.gjf) to edit.
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the edited Gaussian input file.
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    #[command(subcommand)]
    pub edit: EditCommand,
}

#[derive(Subcommand, Debug)]
pub enum EditCommand {
    /// Set the A-B bond length; atom numbers are 1-based.
    Distance {
        a: usize,
        b: usize,
        /// Target length in Angstroms.
        target: f64,
    },
    /// Set the A-B-C bend angle at B; atom numbers are 1-based.
    Angle {
        a: usize,
        b: usize,
        c: usize,
        /// Target angle in degrees.
        target: f64,
    },
    /// Set the A-B-C-D dihedral; atom numbers are 1-based.
    Dihedral {
        a: usize,
        b: usize,
        c: usize,
        d: usize,
        /// Target dihedral in degrees, in (-180, 180].
        theta: f64,
    },
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to a .gjf or Tinker .xyz structure file.
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,
}
