//! Template loading.
//!
//! The base template dictates the document shape and is mandatory. The
//! effect and transition definition documents are optional: when they are
//! missing or unreadable the exporter falls back to catalog defaults.

use std::path::{Path, PathBuf};

use draftforge_common::{DraftError, DraftResult, TemplatePaths};
use draftforge_project_model::{DraftDocument, TransitionMaterial, VideoEffectMaterial};
use tracing::{debug, info, warn};

/// Where to read templates from.
#[derive(Debug, Clone, Default)]
pub struct TemplateSources {
    pub base: PathBuf,
    pub effects: Option<PathBuf>,
    pub transitions: Option<PathBuf>,
}

impl TemplateSources {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            effects: None,
            transitions: None,
        }
    }

    /// Sources from configuration; fails when no base template is configured.
    pub fn from_config(paths: &TemplatePaths) -> DraftResult<Self> {
        let base = paths
            .base
            .clone()
            .ok_or_else(|| DraftError::config("no base template configured"))?;
        Ok(Self {
            base,
            effects: paths.effects.clone(),
            transitions: paths.transitions.clone(),
        })
    }
}

/// Parsed templates for one or more exports. Never mutated by the exporter.
#[derive(Debug, Clone, Default)]
pub struct TemplateBundle {
    /// Skeletal draft every export starts from.
    pub base: DraftDocument,

    /// Effect definitions keyed by `resource_id`.
    pub effect_definitions: Vec<VideoEffectMaterial>,

    /// Transition definitions keyed by `resource_id`.
    pub transition_definitions: Vec<TransitionMaterial>,

    /// Non-fatal problems found while loading optional templates.
    pub notes: Vec<String>,
}

impl TemplateBundle {
    /// Bundle with only a base document.
    pub fn from_base(base: DraftDocument) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Parse a base template from JSON text.
    pub fn from_base_json(json: &str) -> DraftResult<Self> {
        let base = serde_json::from_str(json)
            .map_err(|e| DraftError::template_missing("<inline>", e.to_string()))?;
        Ok(Self::from_base(base))
    }

    pub fn effect_definition(&self, resource_id: &str) -> Option<&VideoEffectMaterial> {
        if resource_id.is_empty() {
            return None;
        }
        self.effect_definitions
            .iter()
            .find(|def| def.resource_id == resource_id || def.effect_id == resource_id)
    }

    pub fn effect_definition_by_name(&self, name: &str) -> Option<&VideoEffectMaterial> {
        self.effect_definitions
            .iter()
            .find(|def| !def.name.is_empty() && def.name.eq_ignore_ascii_case(name))
    }

    pub fn transition_definition(&self, resource_id: &str) -> Option<&TransitionMaterial> {
        if resource_id.is_empty() {
            return None;
        }
        self.transition_definitions
            .iter()
            .find(|def| def.resource_id == resource_id || def.effect_id == resource_id)
    }

    pub fn transition_definition_by_name(&self, name: &str) -> Option<&TransitionMaterial> {
        self.transition_definitions
            .iter()
            .find(|def| !def.name.is_empty() && def.name.eq_ignore_ascii_case(name))
    }
}

/// Load all templates. Reads are issued one at a time.
pub async fn load_templates(sources: &TemplateSources) -> DraftResult<TemplateBundle> {
    let base = read_document(&sources.base)
        .await
        .map_err(|message| DraftError::template_missing(&sources.base, message))?;

    info!(
        path = %sources.base.display(),
        tracks = base.tracks.len(),
        "Loaded base template"
    );

    let mut bundle = TemplateBundle::from_base(base);

    if let Some(path) = &sources.effects {
        match read_document(path).await {
            Ok(doc) => {
                debug!(
                    path = %path.display(),
                    count = doc.materials.video_effects.len(),
                    "Loaded effect definitions"
                );
                bundle.effect_definitions = doc.materials.video_effects;
            }
            Err(message) => {
                warn!(path = %path.display(), %message, "Effect definitions unavailable, using catalog defaults");
                bundle
                    .notes
                    .push(format!("effect definitions {}: {message}", path.display()));
            }
        }
    }

    if let Some(path) = &sources.transitions {
        match read_document(path).await {
            Ok(doc) => {
                debug!(
                    path = %path.display(),
                    count = doc.materials.transitions.len(),
                    "Loaded transition definitions"
                );
                bundle.transition_definitions = doc.materials.transitions;
            }
            Err(message) => {
                warn!(path = %path.display(), %message, "Transition definitions unavailable, using catalog defaults");
                bundle
                    .notes
                    .push(format!("transition definitions {}: {message}", path.display()));
            }
        }
    }

    Ok(bundle)
}

async fn read_document(path: &Path) -> Result<DraftDocument, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("cannot read: {e}"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("cannot parse: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftforge_common::ErrorKind;

    const BASE: &str = r#"{"id": "TPL", "materials": {"videos": []}, "tracks": []}"#;
    const EFFECTS: &str = r#"{"materials": {"video_effects": [
        {"id": "x", "name": "Blur", "resource_id": "7013346592584962562",
         "adjust_params": [{"name": "effects_adjust_blur", "default_value": 0.9, "value": 0.9}]}
    ]}}"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_base_is_fatal() {
        let sources = TemplateSources::new("/no/such/template.json");
        let err = load_templates(&sources).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateMissing);
    }

    #[tokio::test]
    async fn test_unparseable_base_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let sources = TemplateSources::new(write(dir.path(), "base.json", "{ nope"));
        let err = load_templates(&sources).await.unwrap_err();
        assert!(matches!(err, DraftError::TemplateMissing { .. }));
    }

    #[tokio::test]
    async fn test_optional_templates_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = TemplateSources::new(write(dir.path(), "base.json", BASE));
        sources.effects = Some(dir.path().join("missing_effects.json"));
        sources.transitions = Some(write(dir.path(), "transitions.json", "[broken"));

        let bundle = load_templates(&sources).await.unwrap();
        assert_eq!(bundle.base.id, "TPL");
        assert!(bundle.effect_definitions.is_empty());
        assert!(bundle.transition_definitions.is_empty());
        assert_eq!(bundle.notes.len(), 2);
    }

    #[tokio::test]
    async fn test_effect_definitions_indexed_by_resource_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = TemplateSources::new(write(dir.path(), "base.json", BASE));
        sources.effects = Some(write(dir.path(), "effects.json", EFFECTS));

        let bundle = load_templates(&sources).await.unwrap();
        let def = bundle.effect_definition("7013346592584962562").unwrap();
        assert_eq!(def.adjust_params[0].value, 0.9);
        assert!(bundle.effect_definition("").is_none());
        assert!(bundle.effect_definition_by_name("blur").is_some());
    }

    #[test]
    fn test_sources_from_config_require_base() {
        let err = TemplateSources::from_config(&TemplatePaths::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
