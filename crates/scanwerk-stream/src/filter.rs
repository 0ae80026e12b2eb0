// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Filters: consumers with a settable downstream.
//
// A filter transforms the octet stream on its way to the terminal device.
// Stream assembly wires each filter to a buffering adapter in front of
// whatever sits below it.

use scanwerk_core::context::Context;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::marker::Marker;

use crate::consumer::{Consumer, write_all};

/// A consumer that forwards (possibly transformed) data to a downstream
/// consumer installed during stream assembly.
pub trait Filter: Consumer {
    /// Install the downstream consumer.
    fn set_downstream(&mut self, downstream: Box<dyn Consumer>);

    /// Surrender the filter as a plain consumer for chaining.
    fn into_consumer(self: Box<Self>) -> Box<dyn Consumer>;
}

fn downstream_missing() -> ScanwerkError {
    ScanwerkError::StreamNotReady("filter has no downstream".to_owned())
}

/// The identity filter: forwards octets and marks untouched.
#[derive(Default)]
pub struct Passthru {
    downstream: Option<Box<dyn Consumer>>,
}

impl Passthru {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Consumer for Passthru {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let downstream = self.downstream.as_mut().ok_or_else(downstream_missing)?;
        downstream.write(data)
    }

    fn mark(&mut self, marker: Marker, ctx: &Context) -> Result<()> {
        let downstream = self.downstream.as_mut().ok_or_else(downstream_missing)?;
        downstream.mark(marker, ctx)
    }
}

impl Filter for Passthru {
    fn set_downstream(&mut self, downstream: Box<dyn Consumer>) {
        self.downstream = Some(downstream);
    }

    fn into_consumer(self: Box<Self>) -> Box<dyn Consumer> {
        self
    }
}

/// Strips per-line and per-image padding octets using the image context,
/// so downstream consumers see payload only.
#[derive(Default)]
pub struct PadStrip {
    downstream: Option<Box<dyn Consumer>>,
    ctx: Context,
    /// Absolute position within the padded image.
    pos: u64,
}

impl PadStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward the payload runs of `data`, skipping padding runs.
    fn strip(&mut self, data: &[u8]) -> Result<()> {
        let payload = self.ctx.payload_line_octets();
        let line = self.ctx.line_octets();
        let body_lines = u64::from(self.ctx.height);

        let downstream = self.downstream.as_mut().ok_or_else(downstream_missing)?;
        if line == 0 || (payload == line && body_lines == 0) {
            // Nothing to strip (or geometry unknown): pass through.
            return write_all(downstream.as_mut(), data);
        }

        let mut offset = 0usize;
        while offset < data.len() {
            let remaining = (data.len() - offset) as u64;
            let current_line = self.pos / line;
            if body_lines > 0 && current_line >= body_lines {
                // Trailing image padding: swallow the rest.
                self.pos += remaining;
                break;
            }
            let line_offset = self.pos % line;
            let run = if line_offset < payload {
                let run = (payload - line_offset).min(remaining) as usize;
                write_all(downstream.as_mut(), &data[offset..offset + run])?;
                run
            } else {
                (line - line_offset).min(remaining) as usize
            };
            self.pos += run as u64;
            offset += run;
        }
        Ok(())
    }
}

impl Consumer for PadStrip {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.strip(data)?;
        Ok(data.len())
    }

    fn mark(&mut self, marker: Marker, ctx: &Context) -> Result<()> {
        if marker == Marker::BeginOfImage {
            self.ctx = ctx.clone();
            self.pos = 0;
        }
        let downstream = self.downstream.as_mut().ok_or_else(downstream_missing)?;
        // Downstream sees an unpadded image.
        let mut stripped = ctx.clone();
        stripped.padding_line = 0;
        stripped.padding_image = 0;
        downstream.mark(marker, &stripped)
    }
}

impl Filter for PadStrip {
    fn set_downstream(&mut self, downstream: Box<dyn Consumer>) {
        self.downstream = Some(downstream);
    }

    fn into_consumer(self: Box<Self>) -> Box<dyn Consumer> {
        self
    }
}

// -- Tests --------------------------------------------------------------------
