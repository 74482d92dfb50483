use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod case;
mod report;

use case::{CaseFile, CaseResult};
use report::RunReport;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "poreflow CLI - steady transport on pore networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a case file: parse, build the network and validate settings
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Solve a case and print the solution
    Run {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn main() -> CaseResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Run { case_path, format } => cmd_run(&case_path, format),
    }
}

fn cmd_validate(case_path: &Path) -> CaseResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = CaseFile::load(case_path)?;
    let project = case.build_project()?;
    let alg = case.build_algorithm(&project)?;
    let transport = alg.transport();
    transport.validate_settings(&project)?;
    transport.validate_topology(&project)?;
    case.solver.build()?;
    println!(
        "✓ Case is valid ({} pores, {} throats, quantity {})",
        project.network().num_pores(),
        project.network().num_throats(),
        transport.settings().quantity
    );
    Ok(())
}

fn cmd_run(case_path: &Path, format: Format) -> CaseResult<()> {
    let case = CaseFile::load(case_path)?;
    let mut project = case.build_project()?;
    let mut alg = case.build_algorithm(&project)?;
    let solver = case.solver.build()?;

    let soln = alg.run(&mut project, solver.as_ref(), case.initial_guess.as_deref())?;
    let report = RunReport::new(alg.transport(), &project, &soln)?;
    match format {
        Format::Table => print!("{}", report.to_table()),
        Format::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
