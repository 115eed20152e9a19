//! Session Host
//!
//! A persisted project session that implements [`Host`] on top of real
//! WAV files. This is the host the CLI drives.
//!
//! # Directory Structure
//! ```text
//! project_dir/
//!   session.json     # tracks, clips, markers, edit cursor
//!   history/         # undo stack, redo stack, action log
//!   audio/           # glued renders
//! ```

pub mod model;
pub mod undo;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use uuid::Uuid;

use crate::engine::{self, GluePart};
use crate::error::{Result, VaError};
use crate::host::{ClipId, Host, MediaSource};

pub use model::{Clip, Marker, SessionState, Take, Track};
pub use undo::{UndoAction, UndoManager};

pub const SESSION_FILE: &str = "session.json";
pub const HISTORY_DIR: &str = "history";
pub const AUDIO_DIR: &str = "audio";

/// Suffix appended to the take name of a glued clip
const GLUED_SUFFIX: &str = "-glued";

/// Project session bound to a directory on disk
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    project_dir: PathBuf,
    history: UndoManager,
    /// Snapshot taken when the outermost undo block opened
    block_snapshot: Option<serde_json::Value>,
    block_depth: usize,
}

impl Session {
    /// Create an empty session in `project_dir` (created if missing)
    pub fn create(project_dir: &Path) -> Result<Self> {
        fs::create_dir_all(project_dir.join(AUDIO_DIR))?;
        let session = Self {
            state: SessionState::default(),
            project_dir: project_dir.to_path_buf(),
            history: UndoManager::default(),
            block_snapshot: None,
            block_depth: 0,
        };
        session.save()?;
        Ok(session)
    }

    /// Load an existing session
    pub fn load(project_dir: &Path) -> Result<Self> {
        let session_path = project_dir.join(SESSION_FILE);
        if !session_path.exists() {
            return Err(VaError::SessionNotFound { path: session_path });
        }

        let content = fs::read_to_string(&session_path)?;
        let state: SessionState = serde_json::from_str(&content)?;
        let history = UndoManager::load(&project_dir.join(HISTORY_DIR))?;

        Ok(Self {
            state,
            project_dir: project_dir.to_path_buf(),
            history,
            block_snapshot: None,
            block_depth: 0,
        })
    }

    /// Load the session in `project_dir`, creating it on first use
    pub fn open_or_create(project_dir: &Path) -> Result<Self> {
        if project_dir.join(SESSION_FILE).exists() {
            Self::load(project_dir)
        } else {
            Self::create(project_dir)
        }
    }

    /// Write session state and history to disk
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.state)?;
        fs::write(self.project_dir.join(SESSION_FILE), content)?;
        self.history.save(&self.project_dir.join(HISTORY_DIR))?;
        Ok(())
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tracks(&self) -> &[Track] {
        &self.state.tracks
    }

    pub fn markers(&self) -> &[Marker] {
        &self.state.markers
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    /// Revert the most recent undo block
    pub fn undo(&mut self) -> Result<UndoAction> {
        self.history.undo(&mut self.state)
    }

    /// Re-apply the most recently undone block
    pub fn redo(&mut self) -> Result<UndoAction> {
        self.history.redo(&mut self.state)
    }

    fn track_ref(&self, track: usize) -> Result<&Track> {
        self.state
            .tracks
            .get(track)
            .ok_or_else(|| VaError::host("track", format!("no track at index {}", track)))
    }

    fn clip_ref(&self, clip: ClipId) -> Result<&Clip> {
        self.state
            .clip(clip)
            .ok_or_else(|| VaError::host("clip", format!("{} does not exist", clip)))
    }

    fn snapshot(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }

    fn render_path(&self) -> PathBuf {
        self.project_dir
            .join(AUDIO_DIR)
            .join(format!("glued_{}.wav", Uuid::new_v4().simple()))
    }
}

/// A track's selected clips rendered and ready to swap in
struct PendingGlue {
    track: usize,
    consumed: Vec<ClipId>,
    clip: Clip,
}

impl Host for Session {
    fn track_count(&self) -> usize {
        self.state.tracks.len()
    }

    fn track_name(&self, track: usize) -> Result<String> {
        Ok(self.track_ref(track)?.name.clone())
    }

    fn insert_track(&mut self, name: &str) -> Result<usize> {
        self.state.tracks.push(Track::new(name));
        Ok(self.state.tracks.len() - 1)
    }

    fn select_only_track(&mut self, track: usize) -> Result<()> {
        self.track_ref(track)?;
        for (i, t) in self.state.tracks.iter_mut().enumerate() {
            t.selected = i == track;
        }
        Ok(())
    }

    fn edit_cursor(&self) -> f64 {
        self.state.edit_cursor
    }

    fn set_edit_cursor(&mut self, position: f64) {
        self.state.edit_cursor = position.max(0.0);
    }

    fn insert_media(&mut self, path: &Path) -> Result<ClipId> {
        let track = self
            .state
            .tracks
            .iter()
            .position(|t| t.selected)
            .ok_or_else(|| VaError::host("insert_media", "no track selected"))?;
        let info = engine::probe_wav(path)?;
        let length = info.duration_secs();

        let id = self.state.allocate_clip_id();
        let position = self.state.edit_cursor;
        let name = path.file_name().map(|n| n.to_string_lossy().to_string());

        for t in self.state.tracks.iter_mut() {
            for c in t.clips.iter_mut() {
                c.selected = false;
            }
        }

        let target = &mut self.state.tracks[track];
        target.clips.push(Clip {
            id,
            position,
            length,
            selected: true,
            take: Take {
                name,
                source: MediaSource::new(path),
            },
        });
        target.sort_clips();

        self.state.edit_cursor = position + length;
        debug!("Inserted {} at {:.3}s ({:.3}s) as {}", path.display(), position, length, id);

        Ok(id)
    }

    fn clip_count(&self, track: usize) -> Result<usize> {
        Ok(self.track_ref(track)?.clips.len())
    }

    fn clip_at(&self, track: usize, index: usize) -> Result<ClipId> {
        self.track_ref(track)?
            .clips
            .get(index)
            .map(|c| c.id)
            .ok_or_else(|| {
                VaError::host("clip_at", format!("no clip {} on track {}", index, track))
            })
    }

    fn clip_position(&self, clip: ClipId) -> Result<f64> {
        Ok(self.clip_ref(clip)?.position)
    }

    fn set_clip_position(&mut self, clip: ClipId, position: f64) -> Result<()> {
        let (track, index) = self
            .state
            .locate(clip)
            .ok_or_else(|| VaError::host("set_clip_position", format!("{} does not exist", clip)))?;
        let target = &mut self.state.tracks[track];
        target.clips[index].position = position;
        target.sort_clips();
        Ok(())
    }

    fn clip_length(&self, clip: ClipId) -> Result<f64> {
        Ok(self.clip_ref(clip)?.length)
    }

    fn take_name(&self, clip: ClipId) -> Result<Option<String>> {
        Ok(self.clip_ref(clip)?.take.name.clone())
    }

    fn set_take_name(&mut self, clip: ClipId, name: &str) -> Result<()> {
        let target = self
            .state
            .clip_mut(clip)
            .ok_or_else(|| VaError::host("set_take_name", format!("{} does not exist", clip)))?;
        target.take.name = Some(name.to_string());
        Ok(())
    }

    fn active_source(&self, clip: ClipId) -> Result<MediaSource> {
        Ok(self.clip_ref(clip)?.take.source.clone())
    }

    fn measure(&self, source: &MediaSource) -> Result<f64> {
        let decoded = engine::read_wav(&source.path)?;
        Ok(engine::normalization_gain(&decoded.samples))
    }

    fn selected_clips(&self) -> Vec<ClipId> {
        self.state
            .tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .filter(|c| c.selected)
            .map(|c| c.id)
            .collect()
    }

    fn select_all_clips(&mut self) {
        for t in self.state.tracks.iter_mut() {
            for c in t.clips.iter_mut() {
                c.selected = true;
            }
        }
    }

    /// Glue the selected clips of each track into one clip per track.
    ///
    /// All renders finish before the session changes, so a failed render
    /// leaves every track as it was.
    fn glue_selection(&mut self) -> Result<()> {
        let mut by_track: BTreeMap<usize, Vec<&Clip>> = BTreeMap::new();
        for (t, track) in self.state.tracks.iter().enumerate() {
            for clip in track.clips.iter().filter(|c| c.selected) {
                by_track.entry(t).or_default().push(clip);
            }
        }

        let mut pending = Vec::with_capacity(by_track.len());
        let mut next_id = self.state.next_clip_id;
        for (track, clips) in by_track {
            let start = clips.iter().map(|c| c.position).fold(f64::INFINITY, f64::min);
            let end = clips.iter().map(|c| c.end()).fold(f64::NEG_INFINITY, f64::max);
            let parts: Vec<GluePart> = clips
                .iter()
                .map(|c| GluePart {
                    path: c.take.source.path.clone(),
                    offset_secs: c.position - start,
                })
                .collect();

            let out_path = self.render_path();
            engine::render_glued(&parts, end - start, &out_path)?;

            let base = clips[0].take.name.clone().unwrap_or_default();
            next_id += 1;
            pending.push(PendingGlue {
                track,
                consumed: clips.iter().map(|c| c.id).collect(),
                clip: Clip {
                    id: ClipId(next_id),
                    position: start,
                    length: end - start,
                    selected: true,
                    take: Take {
                        name: Some(format!("{}{}", base, GLUED_SUFFIX)),
                        source: MediaSource::new(out_path),
                    },
                },
            });
        }

        self.state.next_clip_id = next_id;
        for glue in pending {
            debug!(
                "Glued {} clips on track {} into {} [{:.3}, {:.3})",
                glue.consumed.len(),
                glue.track,
                glue.clip.id,
                glue.clip.position,
                glue.clip.end()
            );
            let target = &mut self.state.tracks[glue.track];
            target.clips.retain(|c| !glue.consumed.contains(&c.id));
            target.clips.push(glue.clip);
            target.sort_clips();
        }

        Ok(())
    }

    fn add_marker(&mut self, start: f64, end: f64, name: &str) -> Result<()> {
        let index = self.state.markers.len() + 1;
        self.state.markers.push(Marker {
            index,
            start,
            end,
            name: name.to_string(),
        });
        Ok(())
    }

    fn begin_undo_block(&mut self) -> Result<()> {
        if self.block_depth == 0 {
            self.block_snapshot = Some(self.snapshot()?);
        }
        self.block_depth += 1;
        Ok(())
    }

    fn end_undo_block(&mut self, label: &str) -> Result<()> {
        if self.block_depth == 0 {
            return Err(VaError::host("end_undo_block", "no undo block is open"));
        }
        self.block_depth -= 1;
        if self.block_depth > 0 {
            return Ok(());
        }

        let before = match self.block_snapshot.take() {
            Some(before) => before,
            None => return Ok(()),
        };
        let after = self.snapshot()?;
        if before != after {
            self.history.push(UndoAction::new(label, before, after));
        } else {
            debug!("Undo block '{}' changed nothing", label);
        }
        Ok(())
    }
}
