use std::path::{Path, PathBuf};
use std::process::ExitCode;

use abq2ops_io::{
    ConvertError, ConvertOptions, FileStatus, batch_convert_with_progress, collect_inp_files,
    format_summary_details, format_summary_table, summary_json,
};
use abq2ops_model::ModelSummary;
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Translate Abaqus .inp decks into OpenSeesPy scripts.
#[derive(Debug, Parser)]
#[command(name = "abq2ops", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert one .inp file to a .py script
    Convert {
        input: PathBuf,
        /// Output script path (defaults to the input with a .py extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        overwrite: bool,
        /// Parse and report model statistics without writing a script
        #[arg(long)]
        dry_run: bool,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show what a .inp file contains
    Info {
        input: PathBuf,
        #[arg(long)]
        json: bool,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Convert every .inp file in a directory
    Batch {
        dir: PathBuf,
        /// Directory for the generated scripts (defaults to next to each input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        overwrite: bool,
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Command {
    fn verbose(&self) -> bool {
        match self {
            Command::Convert { verbose, .. }
            | Command::Info { verbose, .. }
            | Command::Batch { verbose, .. } => *verbose,
        }
    }
}

/// Log to stderr at `warn`, or `debug` with `-v`. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &ModelSummary, verbose: bool) {
    print!("{}", format_summary_table(summary));
    if verbose {
        print!("{}", format_summary_details(summary));
    }
}

fn run_convert(
    input: &Path,
    output: Option<PathBuf>,
    overwrite: bool,
    dry_run: bool,
    verbose: bool,
) -> Result<(), ConvertError> {
    if dry_run {
        let model = abq2ops_io::parse_file(input)?;
        println!("Analyzing: {}", input.display());
        print_summary(&ModelSummary::from_model(&model), verbose);
        return Ok(());
    }

    let options = ConvertOptions {
        output,
        overwrite,
        ..ConvertOptions::default()
    };
    let converted = abq2ops_io::convert_file(input, &options)?;
    println!(
        "Converted {} -> {}",
        converted.input.display(),
        converted.output.display()
    );
    if verbose {
        print_summary(&converted.summary, false);
        if converted.stats.dropped_sections > 0 {
            println!(
                "Dropped sections: {} (material not found)",
                converted.stats.dropped_sections
            );
        }
    }
    if converted.skipped_rows > 0 {
        eprintln!("warning: {} malformed rows skipped", converted.skipped_rows);
    }
    Ok(())
}

fn run_info(input: &Path, json: bool, verbose: bool) -> Result<(), ConvertError> {
    let model = abq2ops_io::parse_file(input)?;
    let summary = ModelSummary::from_model(&model);
    if json {
        println!("{}", summary_json(&summary)?);
    } else {
        println!("{}", input.display());
        print_summary(&summary, verbose);
    }
    Ok(())
}

fn run_batch(
    dir: &Path,
    output_dir: Option<&Path>,
    overwrite: bool,
) -> Result<bool, ConvertError> {
    let total = collect_inp_files(dir)?.len();
    if total == 0 {
        println!("No .inp files found in {}", dir.display());
        return Ok(true);
    }

    let bar = ProgressBar::new(total as u64);
    let report = batch_convert_with_progress(dir, output_dir, overwrite, |_| bar.inc(1))?;
    bar.finish_and_clear();

    for outcome in &report.outcomes {
        match outcome.status {
            FileStatus::Converted => debug!("{}: {}", outcome.input.display(), outcome.message),
            FileStatus::Failed => eprintln!(
                "{} {}: {}",
                outcome.status.as_str(),
                outcome.input.display(),
                outcome.message
            ),
        }
    }
    println!(
        "Converted {} of {} files ({} failed)",
        report.converted(),
        report.outcomes.len(),
        report.failed()
    );
    Ok(report.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.command.verbose());

    let result = match cli.command {
        Command::Convert {
            input,
            output,
            overwrite,
            dry_run,
            verbose,
        } => run_convert(&input, output, overwrite, dry_run, verbose).map(|()| true),
        Command::Info {
            input,
            json,
            verbose,
        } => run_info(&input, json, verbose).map(|()| true),
        Command::Batch {
            dir,
            output_dir,
            overwrite,
            ..
        } => run_batch(&dir, output_dir.as_deref(), overwrite),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_convert_flags() {
        let cli = Cli::try_parse_from([
            "abq2ops", "convert", "plate.inp", "-o", "out.py", "--overwrite", "--dry-run", "-v",
        ])
        .expect("parse");
        match cli.command {
            Command::Convert {
                input,
                output,
                overwrite,
                dry_run,
                verbose,
            } => {
                assert_eq!(input, PathBuf::from("plate.inp"));
                assert_eq!(output, Some(PathBuf::from("out.py")));
                assert!(overwrite && dry_run && verbose);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_batch_output_dir() {
        let cli = Cli::try_parse_from(["abq2ops", "batch", "decks", "--output-dir", "scripts"])
            .expect("parse");
        assert!(!cli.command.verbose());
        match cli.command {
            Command::Batch {
                dir, output_dir, ..
            } => {
                assert_eq!(dir, PathBuf::from("decks"));
                assert_eq!(output_dir, Some(PathBuf::from("scripts")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn dry_run_parses_without_writing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("bar.inp");
        std::fs::write(&input, "*NODE\n1, 0.0, 0.0, 0.0\n").expect("write deck");

        run_convert(&input, None, false, true, true).expect("dry run");
        assert!(!dir.path().join("bar.py").exists());

        let missing = run_convert(&dir.path().join("nope.inp"), None, false, true, false);
        assert!(missing.is_err());
    }

    #[test]
    fn info_requires_input() {
        assert!(Cli::try_parse_from(["abq2ops", "info"]).is_err());
    }
}
