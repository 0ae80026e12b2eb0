// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — The scan-device state machine driving a `ScanSource`.
//
// Legal marker transitions:
//
//   END_OF_SEQUENCE -> BEGIN_OF_SEQUENCE -> BEGIN_OF_IMAGE -> (data)*
//     -> END_OF_IMAGE -> { BEGIN_OF_IMAGE | END_OF_SEQUENCE }
//
// with every state able to fall into CANCEL instead of its normal
// successor.  Each `read` performs at most one observable transition.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use scanwerk_core::config::DEFAULT_BUFFER_SIZE;
use scanwerk_core::context::Context;
use scanwerk_core::error::Result;
use scanwerk_core::marker::{Marker, StreamItem};

use crate::producer::Producer;

/// The extension points a concrete acquisition backend supplies.
///
/// Defaults make a source that runs one empty sequence: setup succeeds,
/// one sheet of media is found, and the image is immediately exhausted.
pub trait ScanSource: Send {
    /// Prepare the device for a new scan sequence.
    fn set_up_sequence(&mut self) -> Result<()> {
        Ok(())
    }

    /// Try to obtain media for the next image (e.g. the next ADF sheet).
    fn obtain_media(&mut self) -> bool {
        true
    }

    /// Prepare for the next image.  `false` ends the sequence.
    fn set_up_image(&mut self) -> bool {
        true
    }

    /// Release per-image resources.  Called once per image, whether it
    /// completed, failed, or was cancelled mid-flight.
    fn finish_image(&mut self) {}

    /// Whether more than one image may follow in a single sequence.
    fn is_multi_image(&self) -> bool {
        false
    }

    /// Produce up to `buf.len()` octets of the current image.  `Ok(0)`
    /// ends the image; an error cancels the sequence.
    fn produce(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Ok(0)
    }

    /// Geometry/encoding of the image about to be produced.
    fn context(&self) -> Context {
        Context::default()
    }

    /// Preferred transfer size.
    fn buffer_size(&self) -> usize {
        DEFAULT_BUFFER_SIZE
    }
}

/// Cloneable handle requesting cancellation of a running device from
/// outside the thread that owns it.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Request cancellation.  Returns immediately; the device notices on
    /// its next read.
    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// A producer wrapping a [`ScanSource`] in the legal marker-transition
/// state machine, with cancellation handshake and progress reporting.
pub struct ScanDevice {
    source: Box<dyn ScanSource>,
    ctx: Context,
    state: Marker,
    in_progress: bool,
    cancel_requested: Arc<AtomicBool>,
    images_seen: u32,
    on_marker: Option<Box<dyn FnMut(Marker) + Send>>,
    on_progress: Option<Box<dyn FnMut(u64, Option<u64>) + Send>>,
}

impl ScanDevice {
    pub fn new(source: Box<dyn ScanSource>) -> Self {
        let ctx = source.context();
        Self {
            source,
            ctx,
            state: Marker::EndOfSequence,
            in_progress: false,
            cancel_requested: Arc::new(AtomicBool::new(false)),
            images_seen: 0,
            on_marker: None,
            on_progress: None,
        }
    }

    /// A handle that can cancel this device from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            flag: Arc::clone(&self.cancel_requested),
        }
    }

    /// Observe every marker change (and every repeated `CANCEL`).
    pub fn connect_marker(&mut self, f: impl FnMut(Marker) + Send + 'static) {
        self.on_marker = Some(Box::new(f));
    }

    /// Observe data progress as (octets seen, expected total if known).
    pub fn connect_progress(&mut self, f: impl FnMut(u64, Option<u64>) + Send + 'static) {
        self.on_progress = Some(Box::new(f));
    }

    /// Number of images completed since construction.
    pub fn images_seen(&self) -> u32 {
        self.images_seen
    }

    /// Record a new state, firing the marker signal on every change and
    /// on every recurrence of `CANCEL` so repeated cancellations are not
    /// silently swallowed.
    fn set_state(&mut self, next: Marker) {
        if next != self.state || next == Marker::Cancel {
            if let Some(f) = self.on_marker.as_mut() {
                f(next);
            }
        }
        self.state = next;
    }

    /// Settle into `CANCEL`: clear the handshake flags and notify.
    fn settle_cancelled(&mut self) {
        self.in_progress = false;
        self.cancel_requested.store(false, Ordering::SeqCst);
        self.set_state(Marker::Cancel);
    }

    /// Perform one non-data transition of the state machine.
    fn next_marker(&mut self) -> Marker {
        let mut next = match self.state {
            Marker::EndOfSequence | Marker::Cancel => {
                // Requests made while idle do not carry into this run.
                self.cancel_requested.store(false, Ordering::SeqCst);
                self.in_progress = true;
                if self.source.set_up_sequence().is_ok() && self.source.obtain_media() {
                    Marker::BeginOfSequence
                } else {
                    Marker::Cancel
                }
            }
            Marker::BeginOfSequence => {
                if self.source.set_up_image() {
                    self.begin_image();
                    Marker::BeginOfImage
                } else {
                    Marker::EndOfSequence
                }
            }
            Marker::EndOfImage => {
                if self.source.is_multi_image()
                    && self.source.obtain_media()
                    && self.source.set_up_image()
                {
                    self.begin_image();
                    Marker::BeginOfImage
                } else {
                    Marker::EndOfSequence
                }
            }
            // Data states are handled in read(); Pending never escapes.
            Marker::BeginOfImage | Marker::Pending => Marker::Pending,
        };

        if matches!(next, Marker::EndOfSequence | Marker::Cancel) {
            self.in_progress = false;
            if self.cancel_requested.swap(false, Ordering::SeqCst) {
                next = Marker::Cancel;
            }
        }
        self.set_state(next);
        next
    }

    /// Refresh the context for an image about to start.
    fn begin_image(&mut self) {
        self.ctx = self.source.context();
        self.ctx.octets_seen = 0;
    }
}

impl Producer for ScanDevice {
    fn read(&mut self, buf: &mut [u8]) -> Result<StreamItem> {
        // A pending cancellation takes effect at the next read, whatever
        // the normal successor state would have been.
        if self.in_progress && self.cancel_requested.load(Ordering::SeqCst) {
            debug!("cancellation request honored");
            if self.state == Marker::BeginOfImage {
                self.source.finish_image();
            }
            self.settle_cancelled();
            return Ok(StreamItem::Marker(Marker::Cancel));
        }

        if self.state == Marker::BeginOfImage {
            if buf.is_empty() {
                // Zero-length request: report the current marker only.
                return Ok(StreamItem::Marker(Marker::BeginOfImage));
            }
            return match self.source.produce(buf) {
                Ok(0) => {
                    self.source.finish_image();
                    self.images_seen += 1;
                    self.set_state(Marker::EndOfImage);
                    Ok(StreamItem::Marker(Marker::EndOfImage))
                }
                Ok(n) => {
                    self.ctx.octets_seen += n as u64;
                    if let Some(f) = self.on_progress.as_mut() {
                        f(self.ctx.octets_seen, self.ctx.image_octets());
                    }
                    Ok(StreamItem::Data(n))
                }
                Err(err) => {
                    // Data-source failures are intercepted here: force
                    // CANCEL, clear the handshake, re-raise.
                    warn!(error = %err, "data source failed mid-image");
                    self.source.finish_image();
                    self.settle_cancelled();
                    Err(err)
                }
            };
        }

        Ok(StreamItem::Marker(self.next_marker()))
    }

    fn marker(&mut self) -> Result<Marker> {
        match self.read(&mut [])? {
            StreamItem::Marker(m) => Ok(m),
            StreamItem::Data(_) => Ok(self.state),
        }
    }

    fn cancel(&mut self) {
        // Cancelling an idle device is a no-op; a request only sticks
        // while a sequence is in progress.
        if self.in_progress {
            self.cancel_requested.store(true, Ordering::SeqCst);
        }
    }

    fn context(&self) -> Context {
        self.ctx.clone()
    }

    fn buffer_size(&self) -> usize {
        self.source.buffer_size()
    }
}

// -- Tests --------------------------------------------------------------------
