//! Session State Schema
//!
//! Everything in here is serialized to `session.json` and snapshotted by
//! undo blocks.

use serde::{Deserialize, Serialize};

use crate::host::{ClipId, MediaSource};

/// Active audio source and display name of a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Take {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source: MediaSource,
}

/// A placed unit of audio on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    /// Start time in seconds
    pub position: f64,
    /// Length in seconds
    pub length: f64,
    #[serde(default)]
    pub selected: bool,
    pub take: Take,
}

impl Clip {
    pub fn end(&self) -> f64 {
        self.position + self.length
    }
}

/// Named lane of clips, kept in position order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Track {
            name: name.into(),
            selected: false,
            clips: Vec::new(),
        }
    }

    /// Restore position order. Stable, so clips sharing a position keep
    /// their relative order.
    pub fn sort_clips(&mut self) {
        self.clips.sort_by(|a, b| a.position.total_cmp(&b.position));
    }
}

/// Named region annotation, independent of clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// 1-based display number
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub name: String,
}

/// Serializable session contents
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub edit_cursor: f64,
    /// Next clip id to hand out; ids are never reused
    #[serde(default)]
    pub next_clip_id: u64,
}

impl SessionState {
    pub fn allocate_clip_id(&mut self) -> ClipId {
        self.next_clip_id += 1;
        ClipId(self.next_clip_id)
    }

    /// (track index, clip index) of a clip
    pub fn locate(&self, id: ClipId) -> Option<(usize, usize)> {
        self.tracks.iter().enumerate().find_map(|(t, track)| {
            track
                .clips
                .iter()
                .position(|c| c.id == id)
                .map(|c| (t, c))
        })
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.locate(id).map(|(t, c)| &self.tracks[t].clips[c])
    }

    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        let (t, c) = self.locate(id)?;
        Some(&mut self.tracks[t].clips[c])
    }

    pub fn clip_total(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(id: u64, position: f64) -> Clip {
        Clip {
            id: ClipId(id),
            position,
            length: 1.0,
            selected: false,
            take: Take {
                name: None,
                source: MediaSource::new(format!("{}.wav", id)),
            },
        }
    }

    #[test]
    fn test_sort_clips_is_stable() {
        let mut track = Track::new("Alice");
        track.clips = vec![clip(1, 2.0), clip(2, 0.0), clip(3, 2.0), clip(4, 0.0)];
        track.sort_clips();
        let ids: Vec<u64> = track.clips.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_locate_and_allocate() {
        let mut state = SessionState::default();
        let id = state.allocate_clip_id();
        assert_eq!(id, ClipId(1));
        state.tracks.push(Track::new("A"));
        state.tracks.push(Track::new("B"));
        state.tracks[1].clips.push(clip(1, 0.0));

        assert_eq!(state.locate(ClipId(1)), Some((1, 0)));
        assert!(state.clip(ClipId(9)).is_none());
        assert_eq!(state.clip_total(), 1);
    }

    #[test]
    fn test_unset_take_name_roundtrips_as_absent() {
        let value = serde_json::to_value(clip(7, 1.0)).unwrap();
        assert!(value["take"].get("name").is_none());
        let back: Clip = serde_json::from_value(value).unwrap();
        assert_eq!(back.take.name, None);
    }
}
