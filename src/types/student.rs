//! Student record

use serde::{Deserialize, Serialize};

use super::{default_true, default_weight};

/// Lowest weight a mutator will store
pub const MIN_WEIGHT: i32 = 1;
/// Highest weight a mutator will store
pub const MAX_WEIGHT: i32 = 100;

/// Clamp a requested weight into `[MIN_WEIGHT, MAX_WEIGHT]`
pub fn clamp_weight(weight: i32) -> i32 {
    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

/// A student on the roster
///
/// `weight` is signed so that hand-edited documents with a zero or negative
/// weight still load; the selector floors it at draw time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: i32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(rename = "avatarPath", default, skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
}

impl Student {
    /// Create an active student with the default weight
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            weight: default_weight(),
            active: true,
            avatar_path: None,
        }
    }

    /// Builder-style weight setter (clamped)
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    /// Builder-style active flag setter
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Weight used for sampling, never below 1
    pub fn effective_weight(&self) -> u64 {
        self.weight.max(MIN_WEIGHT) as u64
    }

    /// Short label: last two digits of the id followed by the name
    pub fn display_name(&self) -> String {
        let id = self.id.to_string();
        let tail = &id[id.len().saturating_sub(2)..];
        format!("{} {}", tail, self.name)
    }
}

impl std::fmt::Display for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
