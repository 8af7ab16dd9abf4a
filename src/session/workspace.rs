use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::media::ExportFormat;

/// Accepted extensions for uploaded video clips
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

/// Accepted extensions for the uploaded soundtrack
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3"];

/// Name of the audio-only file written while encoding
const TEMP_AUDIO_NAME: &str = "temp_audio.m4a";

/// An uploaded file: its original name and its bytes
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    name: String,
    bytes: Vec<u8>,
}

impl Upload {
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk as if it had been uploaded
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lower-cased file extension
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// Check the extension against an accepted list
    pub(crate) fn ensure_kind(&self, kind: &'static str, accepted: &[&str]) -> Result<()> {
        match self.extension() {
            Some(ext) if accepted.contains(&ext.as_str()) => Ok(()),
            _ => Err(SessionError::UnsupportedUpload {
                kind,
                name: self.name.clone(),
                expected: accepted.join("/"),
            }
            .into()),
        }
    }

    /// The final path component of the name, safe to join onto a directory
    fn safe_file_name(&self) -> String {
        Path::new(&self.name)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "upload".to_string())
    }
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Per-session scratch directory
///
/// Holds staged uploads while a run is in progress and the rendered outputs
/// until the session ends. The directory and everything in it is removed
/// when the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace in the system temp directory
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("reel-composer-")
            .tempdir()
            .map_err(|e| SessionError::WorkspaceFailed { reason: e.to_string() })?;
        debug!("Created workspace at {:?}", dir.path());
        Ok(Self { dir })
    }

    /// Create a workspace under `parent`
    pub fn new_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        std::fs::create_dir_all(parent.as_ref())?;
        let dir = tempfile::Builder::new()
            .prefix("reel-composer-")
            .tempdir_in(parent)
            .map_err(|e| SessionError::WorkspaceFailed { reason: e.to_string() })?;
        debug!("Created workspace at {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an upload's bytes to a file the toolkit can open
    ///
    /// `slot` keeps uploads that share a name from overwriting each other.
    pub async fn stage(&self, upload: &Upload, slot: &str) -> Result<StagedFile> {
        let path = self
            .path()
            .join(format!("{}_{}", slot, upload.safe_file_name()));
        tokio::fs::write(&path, upload.bytes()).await?;
        debug!("Staged {} ({} bytes) at {:?}", upload.name(), upload.len(), path);
        Ok(StagedFile { path })
    }

    /// Fresh output path, named after the current time
    pub fn output_path(&self, format: ExportFormat) -> PathBuf {
        let timestamp = chrono::Utc::now().timestamp();
        self.path()
            .join(format!("edited_video_{}.{}", timestamp, format.extension()))
    }

    pub fn temp_audio_path(&self) -> PathBuf {
        self.path().join(TEMP_AUDIO_NAME)
    }
}

/// A staged upload, deleted when dropped
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove staged file {:?}: {}", self.path, e);
            }
        }
    }
}

/// A rendered file ready to hand back to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}
