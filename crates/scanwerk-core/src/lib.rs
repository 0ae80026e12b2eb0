// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Core types and error definitions shared across all crates.

pub mod config;
pub mod context;
pub mod error;
pub mod marker;

pub use config::{BufferConfig, PumpConfig};
pub use context::{Context, Orientation, PixelType};
pub use error::{Result, ScanwerkError};
pub use marker::{Marker, StreamItem};
