//! Pipeline Module
//!
//! The three stages and the driver that runs them in order:
//! - Import: voice-line folders to tracks
//! - Sort: clips quietest to loudest
//! - Glue: merge each track, marking the original clip boundaries
//!
//! Stages talk to each other only through the session.

pub mod glue;
pub mod import;
pub mod rank;

use std::path::Path;

use log::{info, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::host::{Host, MediaFs};

pub use glue::{glue_and_mark, record_boundaries, BoundaryRecord};
pub use import::{find_va_folder, import, preview_import, ImportMode};
pub use rank::{loudness_score, rank_by_loudness, rank_track, sort_entries, LoudnessEntry};

/// Undo labels, one per stage
pub const IMPORT_UNDO_LABEL: &str = "Import voice lines";
pub const SORT_UNDO_LABEL: &str = "Sort clips by loudness";
pub const GLUE_UNDO_LABEL: &str = "Glue clips and mark boundaries";

/// Run `f` inside one undo block.
///
/// The block is closed whether or not `f` succeeds. Closing labels what
/// `f` changed; it never rolls anything back. An error from `f` wins over
/// an error from closing the block.
pub fn with_undo_block<H, T, F>(host: &mut H, label: &str, f: F) -> Result<T>
where
    H: Host + ?Sized,
    F: FnOnce(&mut H) -> Result<T>,
{
    host.begin_undo_block()?;
    let result = f(&mut *host);
    let closed = host.end_undo_block(label);
    let value = result?;
    closed?;
    Ok(value)
}

/// What a pipeline run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Lines the dry run found, when import was enabled
    pub previewed: Option<usize>,
    /// Lines actually imported; `None` when import was off or declined
    pub imported: Option<usize>,
    pub import_declined: bool,
    /// Tracks the ranker walked
    pub ranked_tracks: Option<usize>,
    /// Markers the glue stage emitted
    pub markers: Option<usize>,
}

/// Run the enabled stages in order against `host`.
///
/// `confirm_import` sees the previewed line count and decides whether the
/// import is committed. A missing VA folder aborts the whole run before
/// anything changes.
pub fn run_pipeline<H, F, C>(
    host: &mut H,
    fs: &F,
    root: &Path,
    config: &PipelineConfig,
    mut confirm_import: C,
) -> Result<PipelineReport>
where
    H: Host + ?Sized,
    F: MediaFs + ?Sized,
    C: FnMut(usize) -> bool,
{
    config.validate()?;
    let mut report = PipelineReport::default();

    if config.stages.import {
        let count = preview_import(fs, root, &config.import)?;
        report.previewed = Some(count);
        if confirm_import(count) {
            let imported = with_undo_block(host, IMPORT_UNDO_LABEL, |h| {
                import(h, fs, root, &config.import, ImportMode::Commit)
            })?;
            report.imported = Some(imported);
        } else {
            warn!("Import of {} voice lines declined", count);
            report.import_declined = true;
        }
    }

    if config.stages.sort {
        let tracks = with_undo_block(host, SORT_UNDO_LABEL, |h| {
            rank_by_loudness(h)?;
            Ok(h.track_count())
        })?;
        report.ranked_tracks = Some(tracks);
    }

    if config.stages.glue {
        let markers = with_undo_block(host, GLUE_UNDO_LABEL, |h| {
            if config.select_all_before_glue {
                h.select_all_clips();
            }
            let selected = h.selected_clips();
            glue_and_mark(h, &selected)?;
            Ok(selected.len())
        })?;
        report.markers = Some(markers);
    }

    info!("Pipeline finished: {:?}", report);
    Ok(report)
}
