// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — The pump: moves a whole scan sequence from a producer into a
// consumer, inline or via two cooperating worker threads connected by a
// bounded bucket brigade.

pub mod brigade;
pub mod bucket;
pub mod pump;

pub use brigade::Brigade;
pub use bucket::Bucket;
pub use pump::{Pump, Severity};
