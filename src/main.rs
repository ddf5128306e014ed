/*!
 * Command-line interface for codemerge
 */

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use chrono::Local;
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use codemerge::config::{Args, Config};
use codemerge::report::{Reporter, RunReport};
use codemerge::runner::RunCoordinator;
use codemerge::utils::default_output_name;
use codemerge::MergeError;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "codemerge", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let config = Config::from_args(args);
    init_logging(config.verbose);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error ({}): {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(config: &Config) -> Result<(), MergeError> {
    config.validate()?;

    // Configure thread pool
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        warn!("Failed to set thread pool size: {}", e);
    }

    let output_file = config
        .output_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_name(&config.target_dir, Local::now())));

    let progress = ProgressBar::new(100);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}% ⏱️  {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_prefix("📊 Processing");
    progress.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut coordinator =
        RunCoordinator::new(config.traversal.clone()).with_threads(config.num_threads);
    if let Some(ignore_file) = &config.ignore_file {
        coordinator = coordinator.with_ignore_file(ignore_file);
    }

    let start_time = Instant::now();
    let outcome = coordinator.run_to_file(&config.target_dir, &output_file, &mut |percent: u8| {
        progress.set_position(u64::from(percent))
    });
    progress.finish_and_clear();
    let result = outcome?;

    let report = RunReport {
        output_file: output_file
            .canonicalize()
            .unwrap_or_else(|_| output_file.clone())
            .display()
            .to_string(),
        duration: start_time.elapsed(),
        result,
    };
    Reporter::new(config.report_format).print_report(&report);

    Ok(())
}
