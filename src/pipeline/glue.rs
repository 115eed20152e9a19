//! Glue-and-Mark
//!
//! Merges the selection while keeping every original clip boundary as a
//! named marker. The glue destroys the clips, so boundaries are read
//! first and markers are written only from those records.

use log::info;

use crate::error::Result;
use crate::host::{ClipId, Host};

/// Interval and take name of a clip, captured before it is glued away
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRecord {
    pub start: f64,
    pub end: f64,
    pub name: String,
}

/// Snapshot each clip in the given order. An unset take name records as "".
pub fn record_boundaries<H: Host + ?Sized>(
    host: &H,
    clips: &[ClipId],
) -> Result<Vec<BoundaryRecord>> {
    clips
        .iter()
        .map(|&clip| {
            let start = host.clip_position(clip)?;
            let length = host.clip_length(clip)?;
            Ok(BoundaryRecord {
                start,
                end: start + length,
                name: host.take_name(clip)?.unwrap_or_default(),
            })
        })
        .collect()
}

/// Glue the host's current selection and mark where each clip was.
///
/// `selected` must be the host's current selection in its enumeration
/// order. Markers come out in that same order, one per entry, however
/// many clips the glue leaves behind.
pub fn glue_and_mark<H: Host + ?Sized>(host: &mut H, selected: &[ClipId]) -> Result<()> {
    let records = record_boundaries(&*host, selected)?;

    host.glue_selection()?;

    for record in &records {
        host.add_marker(record.start, record.end, &record.name)?;
    }

    info!("Glued {} clips and added {} markers", selected.len(), records.len());
    Ok(())
}
