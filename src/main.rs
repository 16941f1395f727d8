use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Compare two XML files for structural equivalence.
///
/// Insignificant whitespace, comments, attribute order and namespace
/// prefixes are ignored; element order and content are not.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Subject document.
    subject: PathBuf,

    /// Reference document to compare against.
    reference: PathBuf,

    /// Suppress the verdict line; rely on the exit code only.
    #[arg(short, long)]
    quiet: bool,
}

fn read_file(path: &PathBuf) -> Result<Vec<u8>, ExitCode> {
    std::fs::read(path).map_err(|e| {
        eprintln!("error: {}: {e}", path.display());
        ExitCode::from(2)
    })
}

fn run(cli: Cli) -> Result<ExitCode, ExitCode> {
    let subject = read_file(&cli.subject)?;
    let reference = read_file(&cli.reference)?;

    let verdict = xmlequiv::equivalent(&subject, &reference).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(2)
    })?;

    if !cli.quiet {
        println!("{}", if verdict { "equivalent" } else { "different" });
    }
    Ok(if verdict {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(code) => code,
    }
}
