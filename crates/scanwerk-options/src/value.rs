// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — The closed value union used by every option.

use serde::{Deserialize, Serialize};

/// A numeric setting value: integral (resolutions, counts) or real
/// (gamma, threshold fractions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Quantity {
    Integer(i64),
    Real(f64),
}

impl Quantity {
    /// The quantity widened to `f64` for ordering comparisons.
    pub fn as_f64(self) -> f64 {
        match self {
            Quantity::Integer(i) => i as f64,
            Quantity::Real(r) => r,
        }
    }
}

impl From<i64> for Quantity {
    fn from(i: i64) -> Self {
        Quantity::Integer(i)
    }
}

impl From<i32> for Quantity {
    fn from(i: i32) -> Self {
        Quantity::Integer(i64::from(i))
    }
}

impl From<f64> for Quantity {
    fn from(r: f64) -> Self {
        Quantity::Real(r)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Integer(i) => write!(f, "{i}"),
            Quantity::Real(r) => write!(f, "{r}"),
        }
    }
}

/// Queryable type identity of a `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    None,
    Quantity,
    String,
    Toggle,
}

/// The closed, fixed-size union every option value is drawn from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// No value set.
    #[default]
    None,
    Quantity(Quantity),
    String(String),
    Toggle(bool),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Quantity(_) => ValueKind::Quantity,
            Value::String(_) => ValueKind::String,
            Value::Toggle(_) => ValueKind::Toggle,
        }
    }
}

impl From<Quantity> for Value {
    fn from(q: Quantity) -> Self {
        Value::Quantity(q)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Quantity(Quantity::Integer(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Quantity(Quantity::Integer(i64::from(i)))
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Quantity(Quantity::Real(r))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Toggle(b)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => f.write_str("(none)"),
            Value::Quantity(q) => write!(f, "{q}"),
            Value::String(s) => f.write_str(s),
            Value::Toggle(b) => f.write_str(if *b { "on" } else { "off" }),
        }
    }
}

// -- Tests --------------------------------------------------------------------
