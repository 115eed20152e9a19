//! Host Interface Module
//!
//! The pipeline never owns the session. It drives a host (a DAW session,
//! or the bundled [`crate::session::Session`]) through the [`Host`] trait
//! and reads the filesystem through [`MediaFs`].

pub mod fs;
pub mod iter;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use fs::{LocalFs, MediaFs};
pub use iter::{ClipIter, TrackIter};

/// Opaque clip handle issued by the host.
///
/// Handles stay valid across repositioning but not across a glue: the
/// clips a glue consumes are gone afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Audio source behind a take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    #[serde(with = "source_path")]
    pub path: PathBuf,
}

impl MediaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MediaSource { path: path.into() }
    }
}

/// Source paths are stored as text when they are UTF-8 and as raw bytes
/// otherwise, so a session can point at any file the importer found.
mod source_path {
    use std::path::{Path, PathBuf};

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Text(String),
        Bytes(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
        match path.to_str() {
            Some(text) => Stored::Text(text.to_string()),
            None => raw(path),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
        Ok(match Stored::deserialize(deserializer)? {
            Stored::Text(text) => PathBuf::from(text),
            Stored::Bytes(bytes) => from_raw(bytes),
        })
    }

    #[cfg(unix)]
    fn raw(path: &Path) -> Stored {
        use std::os::unix::ffi::OsStrExt;
        Stored::Bytes(path.as_os_str().as_bytes().to_vec())
    }

    #[cfg(not(unix))]
    fn raw(path: &Path) -> Stored {
        Stored::Text(path.to_string_lossy().into_owned())
    }

    #[cfg(unix)]
    fn from_raw(bytes: Vec<u8>) -> PathBuf {
        use std::os::unix::ffi::OsStringExt;
        PathBuf::from(std::ffi::OsString::from_vec(bytes))
    }

    #[cfg(not(unix))]
    fn from_raw(bytes: Vec<u8>) -> PathBuf {
        PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Session primitives the pipeline stages call into.
///
/// Track indices are positions in the session's track list. Clip indices
/// are positions within a track and may change whenever clips move; use
/// the returned [`ClipId`] to hold on to a clip.
pub trait Host {
    // Tracks

    fn track_count(&self) -> usize;

    fn track_name(&self, track: usize) -> Result<String>;

    /// Append a new track and return its index
    fn insert_track(&mut self, name: &str) -> Result<usize>;

    /// Make `track` the only selected track (the target of media inserts)
    fn select_only_track(&mut self, track: usize) -> Result<()>;

    // Edit cursor

    fn edit_cursor(&self) -> f64;

    fn set_edit_cursor(&mut self, position: f64);

    /// Insert a media file as a new clip on the selected track at the edit
    /// cursor.
    ///
    /// Post-condition: the edit cursor sits at the end of the inserted clip,
    /// so consecutive inserts land back to back.
    fn insert_media(&mut self, path: &Path) -> Result<ClipId>;

    // Clips

    fn clip_count(&self, track: usize) -> Result<usize>;

    fn clip_at(&self, track: usize, index: usize) -> Result<ClipId>;

    fn clip_position(&self, clip: ClipId) -> Result<f64>;

    fn set_clip_position(&mut self, clip: ClipId, position: f64) -> Result<()>;

    fn clip_length(&self, clip: ClipId) -> Result<f64>;

    /// Display name of the clip's active take, `None` when unset
    fn take_name(&self, clip: ClipId) -> Result<Option<String>>;

    fn set_take_name(&mut self, clip: ClipId, name: &str) -> Result<()>;

    fn active_source(&self, clip: ClipId) -> Result<MediaSource>;

    /// Gain that would normalize `source` to full-scale RMS
    fn measure(&self, source: &MediaSource) -> Result<f64>;

    // Selection and merge

    /// Selected clips in the host's selection enumeration order
    fn selected_clips(&self) -> Vec<ClipId>;

    fn select_all_clips(&mut self);

    /// Destructively merge the current selection
    fn glue_selection(&mut self) -> Result<()>;

    // Markers

    fn add_marker(&mut self, start: f64, end: f64, name: &str) -> Result<()>;

    // Undo

    fn begin_undo_block(&mut self) -> Result<()>;

    /// Close the block opened by [`Host::begin_undo_block`]. Must be
    /// called even when the work inside the block failed.
    fn end_undo_block(&mut self, label: &str) -> Result<()>;
}

/// Scripted host used by unit tests across the crate
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::path::Path;

    use super::{ClipId, Host, MediaSource};
    use crate::error::{Result, VaError};

    #[derive(Debug, Clone, PartialEq)]
    pub struct FakeClip {
        pub id: ClipId,
        pub position: f64,
        pub length: f64,
        pub name: Option<String>,
        pub source: MediaSource,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        BeginUndo,
        EndUndo(String),
        Glue(Vec<ClipId>),
        Marker(f64, f64, String),
        Measure(MediaSource),
    }

    /// Host whose loudness is a lookup table keyed by source path
    #[derive(Debug, Default)]
    pub struct FakeHost {
        pub tracks: Vec<(String, Vec<FakeClip>)>,
        pub selected_track: Option<usize>,
        pub selection: Vec<ClipId>,
        pub cursor: f64,
        pub gains: HashMap<std::path::PathBuf, f64>,
        pub media_lengths: HashMap<std::path::PathBuf, f64>,
        pub fail_glue: bool,
        /// Number of clips each glue leaves behind per call
        pub glue_result_count: usize,
        pub markers: Vec<(f64, f64, String)>,
        pub calls: std::cell::RefCell<Vec<Call>>,
        next_id: u64,
    }

    impl FakeHost {
        pub fn new() -> Self {
            FakeHost {
                glue_result_count: 1,
                ..Default::default()
            }
        }

        pub fn add_clip(
            &mut self,
            track: usize,
            position: f64,
            length: f64,
            name: &str,
            gain: f64,
        ) -> ClipId {
            while self.tracks.len() <= track {
                self.tracks.push((format!("Track {}", self.tracks.len() + 1), Vec::new()));
            }
            self.next_id += 1;
            let id = ClipId(self.next_id);
            let source = MediaSource::new(format!("{}.wav", name));
            self.gains.insert(source.path.clone(), gain);
            self.tracks[track].1.push(FakeClip {
                id,
                position,
                length,
                name: if name.is_empty() { None } else { Some(name.to_string()) },
                source,
            });
            id
        }

        pub fn clip(&self, id: ClipId) -> Result<&FakeClip> {
            self.tracks
                .iter()
                .flat_map(|(_, clips)| clips.iter())
                .find(|c| c.id == id)
                .ok_or_else(|| VaError::host("clip", format!("unknown {}", id)))
        }

        fn clip_mut(&mut self, id: ClipId) -> Result<&mut FakeClip> {
            self.tracks
                .iter_mut()
                .flat_map(|(_, clips)| clips.iter_mut())
                .find(|c| c.id == id)
                .ok_or_else(|| VaError::host("clip", format!("unknown {}", id)))
        }

        /// Clips of a track in position order
        pub fn layout(&self, track: usize) -> Vec<FakeClip> {
            let mut clips = self.tracks[track].1.clone();
            clips.sort_by(|a, b| a.position.total_cmp(&b.position));
            clips
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl Host for FakeHost {
        fn track_count(&self) -> usize {
            self.tracks.len()
        }

        fn track_name(&self, track: usize) -> Result<String> {
            self.tracks
                .get(track)
                .map(|(name, _)| name.clone())
                .ok_or_else(|| VaError::host("track_name", "no such track"))
        }

        fn insert_track(&mut self, name: &str) -> Result<usize> {
            self.tracks.push((name.to_string(), Vec::new()));
            Ok(self.tracks.len() - 1)
        }

        fn select_only_track(&mut self, track: usize) -> Result<()> {
            self.selected_track = Some(track);
            Ok(())
        }

        fn edit_cursor(&self) -> f64 {
            self.cursor
        }

        fn set_edit_cursor(&mut self, position: f64) {
            self.cursor = position;
        }

        fn insert_media(&mut self, path: &Path) -> Result<ClipId> {
            let track = self
                .selected_track
                .ok_or_else(|| VaError::host("insert_media", "no track selected"))?;
            let length = self.media_lengths.get(path).copied().unwrap_or(1.0);
            self.next_id += 1;
            let id = ClipId(self.next_id);
            let name = path.file_name().map(|n| n.to_string_lossy().to_string());
            self.tracks[track].1.push(FakeClip {
                id,
                position: self.cursor,
                length,
                name,
                source: MediaSource::new(path),
            });
            self.cursor += length;
            Ok(id)
        }

        fn clip_count(&self, track: usize) -> Result<usize> {
            self.tracks
                .get(track)
                .map(|(_, clips)| clips.len())
                .ok_or_else(|| VaError::host("clip_count", "no such track"))
        }

        fn clip_at(&self, track: usize, index: usize) -> Result<ClipId> {
            self.tracks
                .get(track)
                .and_then(|(_, clips)| clips.get(index))
                .map(|c| c.id)
                .ok_or_else(|| VaError::host("clip_at", "index out of range"))
        }

        fn clip_position(&self, clip: ClipId) -> Result<f64> {
            Ok(self.clip(clip)?.position)
        }

        fn set_clip_position(&mut self, clip: ClipId, position: f64) -> Result<()> {
            self.clip_mut(clip)?.position = position;
            Ok(())
        }

        fn clip_length(&self, clip: ClipId) -> Result<f64> {
            Ok(self.clip(clip)?.length)
        }

        fn take_name(&self, clip: ClipId) -> Result<Option<String>> {
            Ok(self.clip(clip)?.name.clone())
        }

        fn set_take_name(&mut self, clip: ClipId, name: &str) -> Result<()> {
            self.clip_mut(clip)?.name = Some(name.to_string());
            Ok(())
        }

        fn active_source(&self, clip: ClipId) -> Result<MediaSource> {
            Ok(self.clip(clip)?.source.clone())
        }

        fn measure(&self, source: &MediaSource) -> Result<f64> {
            self.calls.borrow_mut().push(Call::Measure(source.clone()));
            self.gains
                .get(&source.path)
                .copied()
                .ok_or_else(|| {
                    VaError::host("measure", format!("cannot load {}", source.path.display()))
                })
        }

        fn selected_clips(&self) -> Vec<ClipId> {
            self.selection.clone()
        }

        fn select_all_clips(&mut self) {
            let selection: Vec<ClipId> = (0..self.tracks.len())
                .flat_map(|t| self.layout(t).into_iter().map(|c| c.id))
                .collect();
            self.selection = selection;
        }

        fn glue_selection(&mut self) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(Call::Glue(self.selection.clone()));
            if self.fail_glue {
                return Err(VaError::host("glue", "render failed"));
            }
            let selected = std::mem::take(&mut self.selection);
            let mut start = f64::INFINITY;
            let mut end = f64::NEG_INFINITY;
            let mut track_index = 0;
            for (t, (_, clips)) in self.tracks.iter_mut().enumerate() {
                clips.retain(|c| {
                    if selected.contains(&c.id) {
                        start = start.min(c.position);
                        end = end.max(c.position + c.length);
                        track_index = t;
                        false
                    } else {
                        true
                    }
                });
            }
            if selected.is_empty() {
                return Ok(());
            }
            // Pieces of the merged span; more than one models a host that
            // splits its render.
            let pieces = self.glue_result_count.max(1);
            let piece = (end - start) / pieces as f64;
            for i in 0..pieces {
                self.next_id += 1;
                let id = ClipId(self.next_id);
                self.tracks[track_index].1.push(FakeClip {
                    id,
                    position: start + piece * i as f64,
                    length: piece,
                    name: Some("glued".to_string()),
                    source: MediaSource::new("glued.wav"),
                });
                self.selection.push(id);
            }
            Ok(())
        }

        fn add_marker(&mut self, start: f64, end: f64, name: &str) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(Call::Marker(start, end, name.to_string()));
            self.markers.push((start, end, name.to_string()));
            Ok(())
        }

        fn begin_undo_block(&mut self) -> Result<()> {
            self.calls.borrow_mut().push(Call::BeginUndo);
            Ok(())
        }

        fn end_undo_block(&mut self, label: &str) -> Result<()> {
            self.calls.borrow_mut().push(Call::EndUndo(label.to_string()));
            Ok(())
        }
    }
}
