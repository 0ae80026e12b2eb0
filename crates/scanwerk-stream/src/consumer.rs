// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — The consumer half of the streaming interface.

use scanwerk_core::context::Context;
use scanwerk_core::error::Result;
use scanwerk_core::marker::Marker;

/// Accepts image octets and reacts to sequence markers.
///
/// `write` may consume less than it was offered; `Ok(0)` signals
/// backpressure and the caller retries.  `mark` dispatches to one of five
/// per-boundary hooks, each of which defaults to a no-op so implementors
/// override only what they need.
pub trait Consumer: Send {
    /// Consume up to `data.len()` octets; returns the number consumed.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    fn begin_sequence(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    fn begin_image(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    fn end_image(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    fn end_sequence(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    fn cancel_sequence(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// Dispatch a marker to the matching hook.  Non-boundary values are
    /// ignored.
    fn mark(&mut self, marker: Marker, ctx: &Context) -> Result<()> {
        match marker {
            Marker::BeginOfSequence => self.begin_sequence(ctx),
            Marker::BeginOfImage => self.begin_image(ctx),
            Marker::EndOfImage => self.end_image(ctx),
            Marker::EndOfSequence => self.end_sequence(ctx),
            Marker::Cancel => self.cancel_sequence(ctx),
            Marker::Pending => Ok(()),
        }
    }
}

/// Drive `data` into a consumer until fully consumed, yielding the thread
/// on backpressure.
pub fn write_all(consumer: &mut dyn Consumer, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
        let n = consumer.write(data)?;
        if n == 0 {
            std::thread::yield_now();
            continue;
        }
        data = &data[n..];
    }
    Ok(())
}

// -- Tests --------------------------------------------------------------------
