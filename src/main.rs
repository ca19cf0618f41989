//! wordfreq-walker - Parallel word frequency scanner
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wordfreq_walker::config::{CliArgs, WalkConfig};
use wordfreq_walker::progress::{print_header, print_summary, print_top_words, ProgressReporter};
use wordfreq_walker::walker::WordCountCoordinator;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let mut args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Ask for the root if it was not given
    if args.root.is_none() {
        args.root = Some(prompt_root().context("Failed to read root path")?);
    }

    // Validate and create config
    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            &config.root.display().to_string(),
            config.worker_count,
            config.top_k,
        );
    }

    // Create progress reporter
    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    // Print the ranking as soon as the last worker finishes
    let coordinator =
        WordCountCoordinator::new(config.clone()).context("Failed to initialize walker")?;
    let tracker = coordinator.tracker();
    let reporter = progress.clone();
    let coordinator = coordinator.on_complete(move || {
        let top = tracker.snapshot_top_k();
        match reporter {
            Some(ref p) => p.suspend(|| print_top_words(&top)),
            None => print_top_words(&top),
        }
    });

    // Setup signal handler for graceful shutdown
    let shutdown_flag = coordinator.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    if let Some(ref p) = progress {
        p.set_status("Searching for text files...");
    }

    // Run the count
    let result = coordinator
        .run_with_progress(|snapshot| {
            if let Some(ref p) = progress {
                p.update(snapshot);
            }
        })
        .context("Word count failed")?;

    // Finish progress
    if let Some(ref p) = progress {
        if result.completed {
            p.finish("Word count completed");
        } else {
            p.finish("Word count interrupted");
        }
    }

    if config.show_progress {
        print_summary(&result);
    }

    if !result.completed {
        info!("Run was interrupted before completion");
    }

    if result.files_skipped > 0 {
        info!(skipped = result.files_skipped, "Run completed with skipped files");
    }

    Ok(())
}

/// Read a root path from stdin
fn prompt_root() -> Result<PathBuf> {
    print!("Please enter a path to search: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("wordfreq_walker=debug,warn")
    } else {
        EnvFilter::new("wordfreq_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(verbose)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr)
        .init();

    Ok(())
}
