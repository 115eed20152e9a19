//! Typed iterators over the host's indexed enumeration calls.
//!
//! Both iterators read the count once up front and then walk indices, so
//! they are finite and single-pass. Each `next` issues a host call.

use super::{ClipId, Host};
use crate::error::Result;

/// Yields every track index of the session as it was when created
pub struct TrackIter {
    next: usize,
    count: usize,
}

impl TrackIter {
    pub fn new<H: Host + ?Sized>(host: &H) -> Self {
        TrackIter {
            next: 0,
            count: host.track_count(),
        }
    }
}

impl Iterator for TrackIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.count {
            return None;
        }
        let track = self.next;
        self.next += 1;
        Some(track)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrackIter {}

/// Yields the clips of one track in the host's index order
pub struct ClipIter<'a, H: Host + ?Sized> {
    host: &'a H,
    track: usize,
    next: usize,
    count: usize,
}

impl<'a, H: Host + ?Sized> ClipIter<'a, H> {
    pub fn new(host: &'a H, track: usize) -> Result<Self> {
        let count = host.clip_count(track)?;
        Ok(ClipIter {
            host,
            track,
            next: 0,
            count,
        })
    }
}

impl<'a, H: Host + ?Sized> Iterator for ClipIter<'a, H> {
    type Item = Result<ClipId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.host.clip_at(self.track, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}
