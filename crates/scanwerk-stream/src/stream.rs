// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Stream assembly.
//
// A stream is an ordered stack of consumers: the first element pushed
// faces the caller, the last pushed is the terminal device.  Every filter
// reaches whatever sits below it through a buffering adapter.  Pushing
// the device seals the stack and makes the stream usable for I/O.

use tracing::{debug, instrument};

use scanwerk_core::context::Context;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::marker::Marker;

use crate::buffer::Buffered;
use crate::consumer::Consumer;
use crate::filter::Filter;

/// An assembled (or still-assembling) chain of consumers ending in a
/// terminal device.
///
/// The stream is itself a consumer: writes and marks enter at the top of
/// the stack.  It also latches the last marker seen, surfacing marker
/// changes to an optional observer.
#[derive(Default)]
pub struct Stream {
    /// Filters in push order, waiting for the device that seals the
    /// stack.
    pending: Vec<Box<dyn Filter>>,
    /// The assembled chain; present once sealed.
    top: Option<Box<dyn Consumer>>,
    last_marker: Option<Marker>,
    on_marker: Option<Box<dyn FnMut(Marker) + Send>>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal device has been pushed.
    pub fn is_sealed(&self) -> bool {
        self.top.is_some()
    }

    /// The most recent marker to pass through, if any.
    pub fn last_marker(&self) -> Option<Marker> {
        self.last_marker
    }

    /// Observe marker changes (and repeated `CANCEL`s) at the stream
    /// boundary.
    pub fn connect_marker(&mut self, f: impl FnMut(Marker) + Send + 'static) {
        self.on_marker = Some(Box::new(f));
    }

    /// Push a filter onto the stack.
    pub fn push_filter(&mut self, filter: Box<dyn Filter>) -> Result<()> {
        if self.is_sealed() {
            return Err(ScanwerkError::StreamSealed);
        }
        self.pending.push(filter);
        Ok(())
    }

    /// Push the terminal device, wiring every pending filter to its
    /// downstream neighbor through a buffering adapter and sealing the
    /// stack.
    #[instrument(skip_all, fields(filters = self.pending.len()))]
    pub fn push_device(&mut self, device: Box<dyn Consumer>) -> Result<()> {
        if self.is_sealed() {
            return Err(ScanwerkError::StreamSealed);
        }
        let mut below: Box<dyn Consumer> = device;
        for mut filter in self.pending.drain(..).rev() {
            filter.set_downstream(Box::new(Buffered::new(below)));
            below = filter.into_consumer();
        }
        self.top = Some(below);
        debug!("stream sealed");
        Ok(())
    }

    fn top_mut(&mut self) -> Result<&mut Box<dyn Consumer>> {
        self.top
            .as_mut()
            .ok_or_else(|| ScanwerkError::StreamNotReady("no terminal device pushed".to_owned()))
    }
}

impl Consumer for Stream {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.top_mut()?.write(data)
    }

    fn mark(&mut self, marker: Marker, ctx: &Context) -> Result<()> {
        if self.last_marker != Some(marker) || marker == Marker::Cancel {
            if let Some(f) = self.on_marker.as_mut() {
                f(marker);
            }
        }
        self.last_marker = Some(marker);
        self.top_mut()?.mark(marker, ctx)
    }
}

// -- Tests --------------------------------------------------------------------
