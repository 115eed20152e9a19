//! Importer
//!
//! Turns `<root>/<va_folder>/<character>/<line>.wav` into one track per
//! character holding that character's lines.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::ImportConfig;
use crate::error::{Result, VaError};
use crate::host::{Host, MediaFs};

/// Whether the importer touches the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Enumerate and count only
    DryRun,
    /// Create tracks and clips
    Commit,
}

/// Find the voice-line folder among the immediate children of `root`
pub fn find_va_folder<F: MediaFs + ?Sized>(fs: &F, root: &Path, folder: &str) -> Result<PathBuf> {
    let not_found = || VaError::NotFound {
        folder: folder.to_string(),
        root: root.to_path_buf(),
    };
    let found = fs
        .list_subdirectories(root)
        .map_err(|e| match e {
            VaError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => not_found(),
            other => other,
        })?
        .into_iter()
        .any(|name| name.as_os_str() == OsStr::new(folder));

    if !found {
        return Err(not_found());
    }
    Ok(root.join(folder))
}

enum Visit<'a> {
    Character(&'a OsStr),
    Line(&'a Path),
}

/// Walk the VA folder in enumeration order, reporting each character
/// folder before its lines. Returns the number of lines seen.
fn walk<F, V>(fs: &F, root: &Path, config: &ImportConfig, mut visit: V) -> Result<usize>
where
    F: MediaFs + ?Sized,
    V: FnMut(Visit<'_>) -> Result<()>,
{
    let va_dir = find_va_folder(fs, root, &config.va_folder)?;
    let mut count = 0;

    for character in fs.list_subdirectories(&va_dir)? {
        visit(Visit::Character(&character))?;

        let character_dir = va_dir.join(&character);
        for file in fs.list_files(&character_dir)? {
            let line = character_dir.join(&file);
            if !config.is_waveform(&line) {
                debug!("Skipping {}", line.display());
                continue;
            }
            visit(Visit::Line(&line))?;
            count += 1;
        }
    }

    Ok(count)
}

/// Count the lines an import would create, without a host
pub fn preview_import<F: MediaFs + ?Sized>(
    fs: &F,
    root: &Path,
    config: &ImportConfig,
) -> Result<usize> {
    walk(fs, root, config, |_| Ok(()))
}

/// Import the VA folder under `root` and return the number of lines.
///
/// In [`ImportMode::Commit`] the edit cursor is reset to 0 first, then
/// each character folder becomes a new selected track and every waveform
/// file directly inside it is inserted at the edit cursor. The host
/// advances the cursor after each insert, so lines sit back to back and
/// each track continues where the previous one ended.
///
/// Track names are the folder names as text; a folder name that is not
/// valid UTF-8 gets replacement characters in the track name only.
pub fn import<H, F>(
    host: &mut H,
    fs: &F,
    root: &Path,
    config: &ImportConfig,
    mode: ImportMode,
) -> Result<usize>
where
    H: Host + ?Sized,
    F: MediaFs + ?Sized,
{
    if mode == ImportMode::DryRun {
        return preview_import(fs, root, config);
    }

    // Locate the folder before touching the session
    find_va_folder(fs, root, &config.va_folder)?;
    host.set_edit_cursor(0.0);

    let count = walk(fs, root, config, |visit| {
        match visit {
            Visit::Character(folder) => {
                let name = folder.to_string_lossy();
                let track = host.insert_track(&name)?;
                host.select_only_track(track)?;
                debug!("Created track {} '{}'", track, name);
            }
            Visit::Line(path) => {
                host.insert_media(path)?;
            }
        }
        Ok(())
    })?;

    info!("Imported {} voice lines from {}", count, root.display());
    Ok(count)
}
