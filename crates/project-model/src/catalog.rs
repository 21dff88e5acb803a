//! Effect, transition, and animation catalogs.
//!
//! A catalog maps the human-readable name shown to users onto the
//! resource identifier and default parameters the draft editor expects.
//! Catalogs are constructed once and passed explicitly to the exporter;
//! they are never mutated afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

/// Default duration of transitions without a catalog entry (microseconds).
pub const DEFAULT_TRANSITION_DURATION_MICROS: i64 = 500_000;

/// Default duration of animations without a catalog entry (microseconds).
pub const DEFAULT_ANIMATION_DURATION_MICROS: i64 = 500_000;

/// Which catalog a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Effect,
    Transition,
    Animation,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Effect => "effect",
            Self::Transition => "transition",
            Self::Animation => "animation",
        })
    }
}

/// One numeric adjustment knob of an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustParam {
    pub name: String,
    pub default_value: f64,
    pub value: f64,
}

impl AdjustParam {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            default_value: value,
            value,
        }
    }
}

/// Adjustment knobs used when an effect has no catalog entry.
pub fn default_effect_parameters() -> Vec<AdjustParam> {
    vec![
        AdjustParam::new("effects_adjust_intensity", 1.0),
        AdjustParam::new("effects_adjust_speed", 0.33),
    ]
}

/// Immutable lookup record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Name shown to users.
    pub name: String,

    /// Resource identifier in the draft editor's effect store.
    pub resource_id: String,

    /// Editor category (for animations: the slot, `in`/`out`/`group`).
    #[serde(default)]
    pub category: String,

    /// Adjustment knobs (effects only).
    #[serde(default)]
    pub default_parameters: Vec<AdjustParam>,

    /// Transition draws its time from both neighbouring clips.
    #[serde(default)]
    pub is_overlapping: bool,

    #[serde(default)]
    pub default_duration_micros: i64,
}

/// The three catalogs used by the exporter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogs {
    #[serde(default)]
    pub effects: Vec<CatalogEntry>,

    #[serde(default)]
    pub transitions: Vec<CatalogEntry>,

    #[serde(default)]
    pub animations: Vec<CatalogEntry>,
}

impl Catalogs {
    /// Catalogs bundled with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse catalogs from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalogs: Self = serde_json::from_str(json)?;
        catalogs.check_unique()?;
        Ok(catalogs)
    }

    /// Load catalogs from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let catalogs = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::debug!(
            path = %path.display(),
            effects = catalogs.effects.len(),
            transitions = catalogs.transitions.len(),
            animations = catalogs.animations.len(),
            "Loaded catalogs"
        );
        Ok(catalogs)
    }

    /// All entries of one kind.
    pub fn entries(&self, kind: CatalogKind) -> &[CatalogEntry] {
        match kind {
            CatalogKind::Effect => &self.effects,
            CatalogKind::Transition => &self.transitions,
            CatalogKind::Animation => &self.animations,
        }
    }

    /// Find an entry by its user-facing name (case-insensitive).
    pub fn lookup(&self, kind: CatalogKind, name: &str) -> Option<&CatalogEntry> {
        let name = name.trim();
        self.entries(kind)
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    fn check_unique(&self) -> Result<(), CatalogError> {
        for kind in [
            CatalogKind::Effect,
            CatalogKind::Transition,
            CatalogKind::Animation,
        ] {
            let entries = self.entries(kind);
            for (i, entry) in entries.iter().enumerate() {
                let duplicate = entries[..i]
                    .iter()
                    .any(|other| other.name.eq_ignore_ascii_case(&entry.name));
                if duplicate {
                    return Err(CatalogError::Duplicate {
                        kind,
                        name: entry.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Errors raised while constructing catalogs.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate {kind} entry: {name}")]
    Duplicate { kind: CatalogKind, name: String },
}
