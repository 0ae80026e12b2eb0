// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Constraints: idempotent value-sanitizing functions.
//
// A constraint maps any value to an acceptable one.  Acceptable values map
// to themselves; everything else snaps to the constraint's default.  This
// makes self-application idempotent, which the option map's validation pass
// relies on: a value is valid exactly when the constraint returns it
// unchanged.

use crate::value::{Quantity, Value};

/// An idempotent value-sanitizing function with a designated default.
pub trait Constraint: std::fmt::Debug {
    /// Map `v` to an acceptable value.  Returns `v` unchanged when it is
    /// acceptable; the default otherwise.
    fn apply(&self, v: &Value) -> Value;

    /// The value substituted for unacceptable input.
    fn default_value(&self) -> Value;

    /// Whether exactly one value is acceptable.
    fn is_singular(&self) -> bool {
        false
    }
}

/// Accepts quantities within `[lower, upper]` inclusive.
#[derive(Debug, Clone)]
pub struct Range {
    lower: Quantity,
    upper: Quantity,
    default: Quantity,
}

impl Range {
    /// A range over `[lower, upper]`; the default starts at `lower` until
    /// overridden with [`Range::default`].
    pub fn bounds(lower: impl Into<Quantity>, upper: impl Into<Quantity>) -> Self {
        let lower = lower.into();
        Self {
            lower,
            upper: upper.into(),
            default: lower,
        }
    }

    /// Set the designated default.
    pub fn default(mut self, default: impl Into<Quantity>) -> Self {
        self.default = default.into();
        self
    }

    pub fn lower(&self) -> Quantity {
        self.lower
    }

    pub fn upper(&self) -> Quantity {
        self.upper
    }

    fn contains(&self, q: Quantity) -> bool {
        let v = q.as_f64();
        self.lower.as_f64() <= v && v <= self.upper.as_f64()
    }
}

impl Constraint for Range {
    fn apply(&self, v: &Value) -> Value {
        match v {
            Value::Quantity(q) if self.contains(*q) => v.clone(),
            _ => self.default_value(),
        }
    }

    fn default_value(&self) -> Value {
        Value::Quantity(self.default)
    }

    fn is_singular(&self) -> bool {
        self.lower == self.upper
    }
}

/// Accepts values drawn from an explicit list of alternatives.
#[derive(Debug, Clone, Default)]
pub struct Store {
    alternatives: Vec<Value>,
    default: Value,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an acceptable alternative.
    pub fn alternative(mut self, v: impl Into<Value>) -> Self {
        self.alternatives.push(v.into());
        self
    }

    /// Set the designated default, implicitly adding it to the
    /// alternatives when absent.
    pub fn default_value(mut self, v: impl Into<Value>) -> Self {
        let v = v.into();
        if !self.alternatives.contains(&v) {
            self.alternatives.push(v.clone());
        }
        self.default = v;
        self
    }

    pub fn alternatives(&self) -> &[Value] {
        &self.alternatives
    }
}

impl Constraint for Store {
    fn apply(&self, v: &Value) -> Value {
        if self.alternatives.contains(v) {
            v.clone()
        } else {
            self.default.clone()
        }
    }

    fn default_value(&self) -> Value {
        self.default.clone()
    }

    fn is_singular(&self) -> bool {
        self.alternatives.len() == 1
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_values() -> Vec<Value> {
        vec![
            Value::None,
            Value::from(-300),
            Value::from(25),
            Value::from(50),
            Value::from(600),
            Value::from(1200),
            Value::from(2400),
            Value::from(0.5),
            Value::from("JPEG"),
            Value::from("pdf"),
            Value::from(true),
        ]
    }

    /// `c(c(v)) == c(v)` for both standard constraint shapes over a broad
    /// set of probe values.
    #[test]
    fn constraints_idempotent_under_self_application() {
        let range = Range::bounds(50, 1200).default(300);
        let store = Store::new()
            .alternative("JPEG")
            .alternative("PDF")
            .default_value("PNG");

        for v in probe_values() {
            let once = range.apply(&v);
            assert_eq!(range.apply(&once), once, "range not idempotent on {v}");
            let once = store.apply(&v);
            assert_eq!(store.apply(&once), once, "store not idempotent on {v}");
        }
    }

    /// In-range quantities pass untouched; everything else snaps to the
    /// default.
    #[test]
    fn range_acceptance_and_snap() {
        let range = Range::bounds(50, 1200).default(300);

        for ok in [50, 600, 1200] {
            assert_eq!(range.apply(&Value::from(ok)), Value::from(ok));
        }
        for bad in [25, 2400, -300] {
            assert_eq!(range.apply(&Value::from(bad)), Value::from(300));
        }
        // Wrong-typed input also snaps.
        assert_eq!(range.apply(&Value::from("fast")), Value::from(300));
        assert!(!range.is_singular());
        assert!(Range::bounds(300, 300).is_singular());
    }

    /// Membership is exact (case-sensitive); the default is implicitly a
    /// member.
    #[test]
    fn store_acceptance_and_snap() {
        let store = Store::new()
            .alternative("JPEG")
            .alternative("PDF")
            .default_value("PNG");

        assert_eq!(store.apply(&Value::from("PDF")), Value::from("PDF"));
        assert_eq!(store.apply(&Value::from("PNG")), Value::from("PNG"));
        assert_eq!(store.apply(&Value::from("pdf")), Value::from("PNG"));
        assert_eq!(store.apply(&Value::from("BMP")), Value::from("PNG"));
        assert_eq!(store.alternatives().len(), 3);
        assert!(!store.is_singular());
        assert!(Store::new().default_value("only").is_singular());
    }
}
