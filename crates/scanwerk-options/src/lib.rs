// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Settings engine: typed values, idempotent constraints, and the
// recursive, transactionally-assigned option map.

pub mod constraint;
pub mod descriptor;
pub mod map;
pub mod value;

pub use constraint::{Constraint, Range, Store};
pub use descriptor::{Descriptor, Level};
pub use map::{OptionHandle, OptionMap, ValueMap};
pub use value::{Quantity, Value, ValueKind};
