//! Output sink: project folder or download payload.

use std::path::{Path, PathBuf};

use draftforge_common::{DraftError, DraftResult};
use draftforge_project_model::{DraftDocument, DraftMetaInfo};
use tracing::{debug, info};

/// Default name of the content file inside a project folder.
pub const DRAFT_CONTENT_FILE: &str = "draft_content.json";

/// Companion metadata file name.
pub const DRAFT_META_FILE: &str = "draft_meta_info.json";

pub const JSON_MIME_TYPE: &str = "application/json";

/// Where a finished draft goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Write into a project folder, creating it as needed.
    ProjectFolder { folder: PathBuf, file_name: String },
    /// No folder context: hand the bytes back for a client-side download.
    Download { file_name: String },
}

impl Destination {
    pub fn project_folder(folder: impl Into<PathBuf>) -> Self {
        Self::ProjectFolder {
            folder: folder.into(),
            file_name: DRAFT_CONTENT_FILE.to_string(),
        }
    }

    pub fn download() -> Self {
        Self::Download {
            file_name: DRAFT_CONTENT_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOptions {
    pub pretty: bool,
    /// Also write `draft_meta_info.json` next to the content file.
    pub write_meta_info: bool,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            write_meta_info: false,
        }
    }
}

/// Bytes offered to the user as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPayload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Result of a successful [`persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    Written {
        path: PathBuf,
        bytes: usize,
        meta_info: Option<PathBuf>,
    },
    Download(DownloadPayload),
}

impl Persisted {
    /// Human-readable destination for notifications.
    pub fn describe(&self) -> String {
        match self {
            Self::Written { path, .. } => path.display().to_string(),
            Self::Download(payload) => format!("download {}", payload.file_name),
        }
    }
}

/// Serialize `document` and deliver it to `destination`.
///
/// Write failures surface as [`DraftError::Persist`]; the document itself is
/// untouched and can be persisted elsewhere.
pub async fn persist(
    document: &DraftDocument,
    destination: &Destination,
    options: SinkOptions,
) -> DraftResult<Persisted> {
    let bytes = serialize(document, options.pretty)?;

    match destination {
        Destination::ProjectFolder { folder, file_name } => {
            create_dir(folder).await?;
            let path = folder.join(file_name);
            write_file(&path, &bytes).await?;
            info!(path = %path.display(), bytes = bytes.len(), "Draft written");

            let meta_info = if options.write_meta_info {
                Some(write_meta_info(document, folder, options.pretty).await?)
            } else {
                None
            };

            Ok(Persisted::Written {
                path,
                bytes: bytes.len(),
                meta_info,
            })
        }
        Destination::Download { file_name } => {
            debug!(file_name = %file_name, bytes = bytes.len(), "Prepared draft download");
            Ok(Persisted::Download(DownloadPayload {
                file_name: file_name.clone(),
                mime_type: JSON_MIME_TYPE,
                bytes,
            }))
        }
    }
}

fn serialize<T: serde::Serialize>(value: &T, pretty: bool) -> DraftResult<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    Ok(bytes)
}

async fn write_meta_info(
    document: &DraftDocument,
    folder: &Path,
    pretty: bool,
) -> DraftResult<PathBuf> {
    let root = folder.parent().unwrap_or(folder);
    let meta = DraftMetaInfo::describe(
        document,
        &folder.display().to_string(),
        &root.display().to_string(),
    );
    let path = folder.join(DRAFT_META_FILE);
    write_file(&path, &serialize(&meta, pretty)?).await?;
    debug!(path = %path.display(), "Draft meta info written");
    Ok(path)
}

async fn create_dir(folder: &Path) -> DraftResult<()> {
    tokio::fs::create_dir_all(folder)
        .await
        .map_err(|source| DraftError::Persist {
            path: folder.to_path_buf(),
            source,
        })
}

async fn write_file(path: &Path, bytes: &[u8]) -> DraftResult<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| DraftError::Persist {
            path: path.to_path_buf(),
            source,
        })
}
