//! Synthesize, validate, and persist in one call.

use draftforge_common::{DraftError, ErrorKind};
use draftforge_project_model::{Catalogs, DraftDocument, Timeline};
use tracing::{error, info};

use crate::engine::{export, ExportOptions, ExportWarning};
use crate::sink::{persist, Destination, Persisted, SinkOptions};
use crate::template::TemplateBundle;
use crate::validate::{validate, ValidationReport};

/// Stages reported to an optional progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Synthesizing,
    Validating,
    Persisting,
    Complete,
    Failed,
}

/// Progress callback for [`export_and_persist`].
pub type StageCallback = Box<dyn Fn(ExportStage) + Send + Sync>;

/// Everything one export needs.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub timeline: &'a Timeline,
    pub templates: &'a TemplateBundle,
    pub catalogs: &'a Catalogs,
    pub options: ExportOptions,
    pub destination: Destination,
    pub sink: SinkOptions,
}

/// Successful export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub document: DraftDocument,
    pub warnings: Vec<ExportWarning>,
    pub validation: ValidationReport,
    pub persisted: Persisted,
}

/// Why [`export_and_persist`] failed.
#[derive(Debug, thiserror::Error)]
pub enum ExportFailure {
    /// Nothing usable was produced (bad input or failed validation).
    #[error("{0}")]
    Rejected(DraftError),

    /// The document is valid but could not be delivered; it is handed back
    /// so it can be persisted elsewhere without resynthesis.
    #[error("{error}")]
    NotPersisted {
        error: DraftError,
        document: Box<DraftDocument>,
    },
}

impl ExportFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected(e) => e.kind(),
            Self::NotPersisted { error, .. } => error.kind(),
        }
    }

    /// The synthesized document, when one survived.
    pub fn into_document(self) -> Option<DraftDocument> {
        match self {
            Self::Rejected(_) => None,
            Self::NotPersisted { document, .. } => Some(*document),
        }
    }
}

/// Run the whole export: synthesize, validate, then persist.
///
/// A validation failure discards the document and writes nothing.
pub async fn export_and_persist(
    request: ExportRequest<'_>,
    progress: Option<StageCallback>,
) -> Result<ExportReport, ExportFailure> {
    let report = |stage: ExportStage| {
        if let Some(cb) = &progress {
            cb(stage);
        }
    };

    report(ExportStage::Synthesizing);
    let export = match export(
        request.timeline,
        request.templates,
        request.catalogs,
        &request.options,
    ) {
        Ok(export) => export,
        Err(e) => {
            error!(kind = %e.kind(), error = %e, "Export rejected");
            report(ExportStage::Failed);
            return Err(ExportFailure::Rejected(e));
        }
    };

    report(ExportStage::Validating);
    let validation = validate(&export.document, request.timeline.len());
    if !validation.ok {
        error!(reasons = ?validation.reasons, "Synthesized draft failed validation");
        report(ExportStage::Failed);
        return Err(ExportFailure::Rejected(DraftError::validation(
            validation.reasons,
        )));
    }

    report(ExportStage::Persisting);
    let persisted = match persist(&export.document, &request.destination, request.sink).await {
        Ok(persisted) => persisted,
        Err(e) => {
            error!(kind = %e.kind(), error = %e, "Draft not persisted");
            report(ExportStage::Failed);
            return Err(ExportFailure::NotPersisted {
                error: e,
                document: Box::new(export.document),
            });
        }
    };

    info!(
        destination = %persisted.describe(),
        warnings = export.warnings.len(),
        "Export complete"
    );
    report(ExportStage::Complete);

    Ok(ExportReport {
        document: export.document,
        warnings: export.warnings,
        validation,
        persisted,
    })
}
