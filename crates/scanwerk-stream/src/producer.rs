// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — The producer half of the streaming interface.

use scanwerk_core::config::DEFAULT_BUFFER_SIZE;
use scanwerk_core::context::Context;
use scanwerk_core::error::Result;
use scanwerk_core::marker::{Marker, StreamItem};

/// Yields image octets and sequence markers.
///
/// While inside image data, `read` fills the caller's buffer and returns
/// the octet count; at boundaries it returns the marker instead.
/// Cancellation is cooperative: `cancel` only requests, and the effect is
/// observable solely through a later `read`/`marker` yielding
/// `Marker::Cancel` (or `Marker::EndOfSequence` when the sequence beat
/// the request to completion).
pub trait Producer: Send {
    /// Produce up to `buf.len()` octets or report a boundary.
    fn read(&mut self, buf: &mut [u8]) -> Result<StreamItem>;

    /// Zero-length read: report (mid-image) or consume (at a boundary)
    /// the current marker without advancing any data.
    fn marker(&mut self) -> Result<Marker>;

    /// Request cancellation of the sequence in progress, if any.
    fn cancel(&mut self);

    /// Geometry/encoding of the image currently in flight.
    fn context(&self) -> Context;

    /// Preferred transfer size for a single read.
    fn buffer_size(&self) -> usize {
        DEFAULT_BUFFER_SIZE
    }
}
