// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Streaming pipeline: producer/consumer interfaces, the scan
// device state machine, write-side buffering, filters, stream assembly,
// and the concrete memory/file/transport endpoints.

pub mod buffer;
pub mod consumer;
pub mod device;
pub mod filter;
pub mod producer;
pub mod sinks;
pub mod sources;
pub mod stream;

pub use buffer::Buffered;
pub use consumer::{Consumer, write_all};
pub use device::{CancelToken, ScanDevice, ScanSource};
pub use filter::{Filter, PadStrip, Passthru};
pub use producer::Producer;
pub use sinks::{FileSink, VecSink};
pub use sources::{FileSource, MemorySource, Transport, TransportSource};
pub use stream::Stream;
