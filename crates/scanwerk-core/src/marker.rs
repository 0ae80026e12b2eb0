// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Sequence-marker protocol.
//
// Markers are out-of-band sentinel values interleaved with ordinary image
// octets.  They carry their own integer codes, all negative, so that no
// marker can ever be mistaken for a count of octets produced (zero and
// positive) or for a data octet promoted to an integer (0..=255).

use serde::{Deserialize, Serialize};

/// Integer code of the smallest marker.  Everything in
/// `MARKER_CODE_MIN..=MARKER_CODE_MAX` is a marker; nothing else is.
pub const MARKER_CODE_MIN: i64 = -6;

/// Integer code of the largest marker (the internal sentinel).
pub const MARKER_CODE_MAX: i64 = -1;

/// Out-of-band boundary values of the streaming protocol.
///
/// The variants form a total order matching their integer codes:
/// `Cancel < EndOfSequence < EndOfImage < BeginOfImage < BeginOfSequence
/// < Pending`.  `Pending` is an internal sentinel used while a device is
/// between observable transitions; it is never returned from a public
/// `read()` or `marker()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Marker {
    /// The sequence terminated in failure or was cancelled.
    Cancel,
    /// The scan sequence is complete.
    EndOfSequence,
    /// The current image is complete.
    EndOfImage,
    /// Image data for a new image follows.
    BeginOfImage,
    /// A new scan sequence has begun.
    BeginOfSequence,
    /// Internal sentinel — never surfaced to callers.
    Pending,
}

impl Marker {
    /// The marker's integer code (always negative).
    pub fn code(self) -> i64 {
        match self {
            Marker::Cancel => -6,
            Marker::EndOfSequence => -5,
            Marker::EndOfImage => -4,
            Marker::BeginOfImage => -3,
            Marker::BeginOfSequence => -2,
            Marker::Pending => -1,
        }
    }

    /// Reconstruct a marker from its integer code.
    pub fn from_code(code: i64) -> Option<Marker> {
        match code {
            -6 => Some(Marker::Cancel),
            -5 => Some(Marker::EndOfSequence),
            -4 => Some(Marker::EndOfImage),
            -3 => Some(Marker::BeginOfImage),
            -2 => Some(Marker::BeginOfSequence),
            -1 => Some(Marker::Pending),
            _ => None,
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Marker::Cancel => "CANCEL",
            Marker::EndOfSequence => "END_OF_SEQUENCE",
            Marker::EndOfImage => "END_OF_IMAGE",
            Marker::BeginOfImage => "BEGIN_OF_IMAGE",
            Marker::BeginOfSequence => "BEGIN_OF_SEQUENCE",
            Marker::Pending => "PENDING",
        };
        f.write_str(name)
    }
}

/// Whether an integer code denotes a marker.
pub fn is_marker(code: i64) -> bool {
    (MARKER_CODE_MIN..=MARKER_CODE_MAX).contains(&code)
}

/// Identity on non-marker codes; marker codes collapse to a guaranteed
/// non-marker value (zero).
pub fn not_marker(code: i64) -> i64 {
    if is_marker(code) { 0 } else { code }
}

/// Promote a data octet to the integer domain markers live in.
pub fn octet_code(octet: u8) -> i64 {
    i64::from(octet)
}

/// What a producer's `read()` yields: either a count of octets written
/// into the caller's buffer, or a sequence marker.  Counts and markers
/// live in separate variants, so the distinctness invariant of the
/// integer-code protocol holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamItem {
    /// `n` octets of image data were written (`0 <= n <= buf.len()`).
    Data(usize),
    /// A sequence boundary; no octets were written.
    Marker(Marker),
}

// -- Tests --------------------------------------------------------------------
