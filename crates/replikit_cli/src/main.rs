mod cli;
mod progress;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use replikit_io_fs::{
    CopyTreeError, SpecCopyOptions, SpecExtensionExclusions, TracingObserver, replicate_tree,
};
use replikit_log::init_logging;

use crate::cli::Cli;
use crate::progress::ProgressObserver;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let spec_run = {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut stdout = io::stdout();
        let spec_paths = cli
            .resolve_paths(&mut reader, &mut stdout)
            .context("failed to read input")?;
        if !spec_paths.path_dir_src.is_dir() {
            println!("Source directory does not exist.");
            return Ok(ExitCode::FAILURE);
        }
        cli.resolve(spec_paths, &mut reader, &mut stdout)
            .context("failed to read input")?
    };

    let spec_exclusions = SpecExtensionExclusions::from_raw(&spec_run.l_exclusions)?;
    if let Some(spec_log) = &spec_run.spec_log {
        init_logging(spec_log).context("failed to set up logging")?;
    }

    let spec_cp_options = SpecCopyOptions {
        spec_exclusions,
        rule_total_count: spec_run.rule_total_count,
        ..SpecCopyOptions::default()
    };
    let mut observer = (
        TracingObserver::new(),
        ProgressObserver::new(spec_run.if_progress),
    );

    println!(
        "Starting copy from {} to {} (excluding hidden files and folders)...",
        spec_run.path_dir_src.display(),
        spec_run.path_dir_dst.display()
    );
    let report = match replicate_tree(
        &spec_run.path_dir_src,
        &spec_run.path_dir_dst,
        &spec_cp_options,
        &mut observer,
    ) {
        Ok(v) => v,
        Err(CopyTreeError::SourceNotFound { path, message }) => {
            tracing::error!("Source directory does not exist: {} ({message})", path.display());
            println!("Source directory does not exist.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    match &spec_run.spec_log {
        Some(spec_log) => println!(
            "{}. Check '{}' for details.",
            report.format_summary(),
            spec_log.path_log_file.display()
        ),
        None => println!("{}.", report.format_summary()),
    }
    println!("Copy operation completed.");
    Ok(ExitCode::SUCCESS)
}
