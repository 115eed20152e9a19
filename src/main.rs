//! VA Pipeline CLI
//!
//! Command-line interface for the voice-line session pipeline.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::info;

use va_pipeline::cli::{commands, Cli, Commands, SkipStages};
use va_pipeline::VaError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("VA Pipeline v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("VA Pipeline v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Run {
            project,
            source,
            skip_import,
            skip_sort,
            skip_glue,
            yes,
        } => {
            let skip = SkipStages {
                import: skip_import,
                sort: skip_sort,
                glue: skip_glue,
            };
            commands::run(&project, &source, skip, yes)?
        }
        Commands::Preview { project, source } => commands::preview(&project, &source)?,
        Commands::Tracks { project } => commands::show_tracks(&project)?,
        Commands::Markers { project } => commands::show_markers(&project)?,
        Commands::Undo { project } => commands::undo(&project)?,
        Commands::Redo { project } => commands::redo(&project)?,
        Commands::History { project } => commands::show_history(&project)?,
    }
    Ok(())
}

/// Print the error the way the user sees a blocking dialog
fn report(err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);
    if let Some(va_err) = err.downcast_ref::<VaError>() {
        eprintln!("  [{}]", va_err.error_code());
        for suggestion in va_err.recovery_suggestions() {
            eprintln!("  - {}", suggestion);
        }
    }
}
