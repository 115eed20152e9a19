//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::io::{self, BufRead, Write};
use std::path::Path;

use log::info;

use crate::cli::{SkipStages, SourceArgs};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::host::LocalFs;
use crate::pipeline::{find_va_folder, preview_import, run_pipeline};
use crate::session::Session;

/// Build the configuration for one invocation: file first, then flags.
pub fn build_config(source: &SourceArgs, skip: SkipStages) -> Result<PipelineConfig> {
    let mut config = match &source.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(folder) = &source.va_folder {
        config.import.va_folder = folder.clone();
    }
    config.stages.import &= !skip.import;
    config.stages.sort &= !skip.sort;
    config.stages.glue &= !skip.glue;

    config.validate()?;
    Ok(config)
}

/// Ask on stdin whether to commit the import
fn confirm_on_stdin(root: &Path, count: usize) -> bool {
    print!(
        "Import {} voice lines from {}? [y/N] ",
        count,
        root.display()
    );
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Run the enabled stages against the project session.
pub fn run(
    project: &Path,
    source: &SourceArgs,
    skip: SkipStages,
    assume_yes: bool,
) -> Result<()> {
    let config = build_config(source, skip)?;
    let root = source.root.clone().unwrap_or_else(|| project.to_path_buf());
    info!(
        "Running pipeline on {} (voice lines under {})",
        project.display(),
        root.display()
    );

    // No project is created when the VA folder is missing
    if config.stages.import {
        find_va_folder(&LocalFs, &root, &config.import.va_folder)?;
    }
    let mut session = Session::open_or_create(project)?;
    let outcome = run_pipeline(&mut session, &LocalFs, &root, &config, |count| {
        assume_yes || confirm_on_stdin(&root, count)
    });
    // Completed stages stay in the session even when a later one fails
    session.save()?;
    let report = outcome?;

    if let Some(count) = report.imported {
        println!("Imported {} voice lines", count);
    } else if report.import_declined {
        println!("Import skipped");
    }
    if let Some(tracks) = report.ranked_tracks {
        println!("Sorted {} tracks by loudness", tracks);
    }
    if let Some(markers) = report.markers {
        println!("Glued clips and added {} markers", markers);
    }

    Ok(())
}

/// Print how many voice lines an import would add.
pub fn preview(project: &Path, source: &SourceArgs) -> Result<()> {
    let config = build_config(source, SkipStages::default())?;
    let root = source.root.clone().unwrap_or_else(|| project.to_path_buf());

    let count = preview_import(&LocalFs, &root, &config.import)?;
    println!(
        "{} voice lines would be imported from {}",
        count,
        root.join(&config.import.va_folder).display()
    );

    Ok(())
}

/// List tracks and their clips.
pub fn show_tracks(project: &Path) -> Result<()> {
    let session = Session::load(project)?;

    if session.tracks().is_empty() {
        println!("No tracks.");
        return Ok(());
    }

    for (i, track) in session.tracks().iter().enumerate() {
        println!("{:>3}  {} ({} clips)", i + 1, track.name, track.clips.len());
        for clip in &track.clips {
            println!(
                "       {:>10.3}s  {:>8.3}s  {}",
                clip.position,
                clip.length,
                clip.take.name.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

/// List markers in creation order.
pub fn show_markers(project: &Path) -> Result<()> {
    let session = Session::load(project)?;

    if session.markers().is_empty() {
        println!("No markers.");
        return Ok(());
    }

    for marker in session.markers() {
        println!(
            "{:>4}  {:>10.3}s - {:>10.3}s  {}",
            marker.index, marker.start, marker.end, marker.name
        );
    }

    Ok(())
}

/// Undo the last action.
pub fn undo(project: &Path) -> Result<()> {
    info!("Undoing last action in: {}", project.display());

    let mut session = Session::load(project)?;
    let action = session.undo()?;
    session.save()?;

    println!("Undone: {}", action.description);

    Ok(())
}

/// Redo the last undone action.
pub fn redo(project: &Path) -> Result<()> {
    info!("Redoing last undone action in: {}", project.display());

    let mut session = Session::load(project)?;
    let action = session.redo()?;
    session.save()?;

    println!("Redone: {}", action.description);

    Ok(())
}

/// Show action history.
pub fn show_history(project: &Path) -> Result<()> {
    let session = Session::load(project)?;
    let history = session.history();

    if history.get_history().is_empty() {
        println!("No actions in history.");
        return Ok(());
    }

    println!("Action History:");
    println!("{:-<60}", "");
    for action in history.get_history() {
        println!(
            "    {}: {} ({})",
            action.id,
            action.description,
            action.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("{:-<60}", "");
    println!(
        "Undo stack: {} | Redo stack: {}",
        history.undo_count(),
        history.redo_count()
    );

    Ok(())
}
