// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Write-side buffering adapter.
//
// Sits between a filter and its downstream consumer, absorbing short
// bursts of writes into a growable scratch buffer and flushing when the
// buffer fills or an image/sequence boundary arrives.

use tracing::{debug, warn};

use scanwerk_core::config::BufferConfig;
use scanwerk_core::context::Context;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::marker::Marker;

use crate::consumer::Consumer;

/// Buffering decorator around a consumer.
pub struct Buffered {
    downstream: Box<dyn Consumer>,
    buf: Vec<u8>,
    /// Current fill level that triggers a flush.  Grows under sustained
    /// backpressure, resets after boundary flushes.
    limit: usize,
    config: BufferConfig,
}

impl Buffered {
    pub fn new(downstream: Box<dyn Consumer>) -> Self {
        Self::with_config(downstream, BufferConfig::default())
    }

    pub fn with_config(downstream: Box<dyn Consumer>, config: BufferConfig) -> Self {
        Self {
            downstream,
            buf: Vec::with_capacity(config.minimum),
            limit: config.minimum,
            config,
        }
    }

    /// Octets currently retained.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// One flush attempt: push as much retained data downstream as it
    /// will take right now.  Returns the number of octets accepted.
    fn flush_once(&mut self) -> Result<usize> {
        let mut accepted = 0;
        while accepted < self.buf.len() {
            let n = self.downstream.write(&self.buf[accepted..])?;
            if n == 0 {
                break;
            }
            accepted += n;
        }
        self.buf.drain(..accepted);
        Ok(accepted)
    }

    /// Flush until the retained amount drops below the limit, growing the
    /// limit whenever the downstream accepts nothing so a momentarily
    /// stalled consumer cannot wedge the writer.  Sustained zero progress
    /// past the growth ceiling is fatal.
    fn relieve(&mut self) -> Result<()> {
        let mut stalls = 0u32;
        while self.buf.len() >= self.limit {
            if self.flush_once()? > 0 {
                stalls = 0;
                continue;
            }
            if self.limit < self.config.ceiling {
                self.limit = (self.limit * 2).min(self.config.ceiling);
            } else {
                self.limit += self.config.increment;
                stalls += 1;
                if stalls > self.config.max_stalls {
                    return Err(ScanwerkError::PipelineStall(format!(
                        "downstream accepted nothing with {} octets retained",
                        self.buf.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Force-flush everything retained.  Truncation is logged, never
    /// raised: the boundary mark must still propagate.
    fn sync(&mut self) {
        let mut stalls = 0u32;
        while !self.buf.is_empty() {
            match self.flush_once() {
                Ok(0) => {
                    stalls += 1;
                    if stalls > self.config.max_stalls {
                        warn!(
                            dropped = self.buf.len(),
                            "flush could not drain; truncating buffered image data"
                        );
                        self.buf.clear();
                        break;
                    }
                    std::thread::yield_now();
                }
                Ok(_) => stalls = 0,
                Err(err) => {
                    warn!(
                        error = %err,
                        dropped = self.buf.len(),
                        "flush failed; truncating buffered image data"
                    );
                    self.buf.clear();
                    break;
                }
            }
        }
        // Release memory accumulated under pressure.
        if self.buf.capacity() > self.config.minimum {
            self.buf.shrink_to(self.config.minimum);
            debug!(capacity = self.buf.capacity(), "buffer shrunk after flush");
        }
        self.limit = self.config.minimum;
    }
}

impl Consumer for Buffered {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= self.limit {
            self.relieve()?;
        }
        Ok(data.len())
    }

    fn mark(&mut self, marker: Marker, ctx: &Context) -> Result<()> {
        match marker {
            Marker::EndOfImage | Marker::EndOfSequence => self.sync(),
            // A cancelled image's data is of no use downstream.
            Marker::Cancel => self.buf.clear(),
            _ => {}
        }
        self.downstream.mark(marker, ctx)
    }
}

// -- Tests --------------------------------------------------------------------
