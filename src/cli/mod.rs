//! CLI Module
//!
//! Command-line interface for the VA pipeline.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// VA Pipeline - import, loudness-sort and glue voice lines
#[derive(Parser, Debug)]
#[command(name = "va-pipeline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the voice lines live
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory holding the VA folder (defaults to the project directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Name of the VA folder
    #[arg(long)]
    pub va_folder: Option<String>,

    /// Pipeline configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Stages turned off from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipStages {
    pub import: bool,
    pub sort: bool,
    pub glue: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the import, sort and glue stages
    #[command(name = "run")]
    Run {
        /// Project directory (session is created on first run)
        project: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Skip importing voice lines
        #[arg(long)]
        skip_import: bool,

        /// Skip sorting clips by loudness
        #[arg(long)]
        skip_sort: bool,

        /// Skip gluing clips and adding markers
        #[arg(long)]
        skip_glue: bool,

        /// Commit the import without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Count the voice lines an import would add
    #[command(name = "preview")]
    Preview {
        /// Project directory
        project: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// List tracks and clips
    #[command(name = "tracks")]
    Tracks {
        /// Project directory
        project: PathBuf,
    },

    /// List markers
    #[command(name = "markers")]
    Markers {
        /// Project directory
        project: PathBuf,
    },

    /// Undo the last stage
    #[command(name = "undo")]
    Undo {
        /// Project directory
        project: PathBuf,
    },

    /// Redo the last undone stage
    #[command(name = "redo")]
    Redo {
        /// Project directory
        project: PathBuf,
    },

    /// Show action history
    #[command(name = "history")]
    History {
        /// Project directory
        project: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::parse_from([
            "va-pipeline",
            "run",
            "proj",
            "--skip-glue",
            "--va-folder",
            "lines",
            "-y",
        ]);
        match cli.command {
            Some(Commands::Run {
                project,
                source,
                skip_import,
                skip_glue,
                yes,
                ..
            }) => {
                assert_eq!(project, PathBuf::from("proj"));
                assert_eq!(source.va_folder.as_deref(), Some("lines"));
                assert!(!skip_import);
                assert!(skip_glue);
                assert!(yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
