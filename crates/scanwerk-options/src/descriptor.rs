// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Option descriptors: user-facing metadata for a setting.

use serde::{Deserialize, Serialize};

/// How prominently a UI should surface an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Level {
    /// Shown in every UI.
    #[default]
    Standard,
    /// Shown on request.
    Extended,
    /// Diagnostic / integration surface only.
    Complete,
}

/// Display metadata and behavioral flags for one option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Descriptor {
    /// Short display name.
    pub name: String,
    /// Longer help text.
    pub text: String,
    /// Free-form grouping tags ("geometry", "enhancement", ...).
    pub tags: Vec<String>,
    /// UI visibility level.
    pub level: Level,
    /// Whether the option currently has effect.
    pub active: bool,
    /// Whether the behavior is emulated in software rather than backed by
    /// the device.
    pub emulated: bool,
    /// Whether assignment is rejected.
    pub read_only: bool,
}

impl Descriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn emulated(mut self) -> Self {
        self.emulated = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
