//! Loudness Ranker
//!
//! Reorders every track quietest to loudest, packed back to back from
//! where the track's first clip used to start.

use log::{debug, info};

use crate::engine::linear_to_db;
use crate::error::{Result, VaError};
use crate::host::{ClipId, ClipIter, Host, TrackIter};

/// A clip paired with its loudness score. Lower is quieter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessEntry {
    pub clip: ClipId,
    pub score: f64,
}

/// Score a clip: the negated normalization gain of its active source.
///
/// Quiet sources need a large gain, so they get a low score.
pub fn loudness_score<H: Host + ?Sized>(host: &H, clip: ClipId) -> Result<f64> {
    let source = host.active_source(clip)?;
    let gain = host.measure(&source)?;
    if gain.is_nan() {
        return Err(VaError::host(
            "measure",
            format!("no usable loudness for {}", source.path.display()),
        ));
    }
    Ok(-gain)
}

/// Stable ascending sort; equal scores keep their enumeration order
pub fn sort_entries(entries: &mut [LoudnessEntry]) {
    entries.sort_by(|a, b| a.score.total_cmp(&b.score));
}

/// Rank one track in place.
///
/// Tracks with fewer than two clips are left alone without measuring.
pub fn rank_track<H: Host + ?Sized>(host: &mut H, track: usize) -> Result<()> {
    let clips: Vec<ClipId> = ClipIter::new(&*host, track)?.collect::<Result<_>>()?;
    if clips.len() < 2 {
        return Ok(());
    }
    let origin = host.clip_position(clips[0])?;
    let track_name = host.track_name(track)?;

    let mut entries = clips
        .iter()
        .map(|&clip| {
            Ok(LoudnessEntry {
                clip,
                score: loudness_score(&*host, clip)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    sort_entries(&mut entries);

    let mut cursor = origin;
    for entry in &entries {
        debug!(
            "{}: {} needs {:+.1} dB -> {:.3}s",
            track_name,
            entry.clip,
            linear_to_db(-entry.score),
            cursor
        );
        host.set_clip_position(entry.clip, cursor)?;
        cursor += host.clip_length(entry.clip)?;
    }

    Ok(())
}

/// Rank every track present when the pass starts
pub fn rank_by_loudness<H: Host + ?Sized>(host: &mut H) -> Result<()> {
    let tracks = TrackIter::new(&*host);
    let total = tracks.len();
    for track in tracks {
        rank_track(host, track)?;
    }
    info!("Ranked {} tracks by loudness", total);
    Ok(())
}
