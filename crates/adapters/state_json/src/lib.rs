//! # plugwatch-adapter-state-json
//!
//! Implements the [`StateStore`] port as one pretty-printed JSON file per
//! device, next to its CSV log. The file is meant to be hand-edited
//! (thresholds, display name, extra notes), so:
//!
//! - loading merges with defaults and preserves unknown keys;
//! - a malformed file logs a loud warning and yields the default document
//!   instead of crashing the loop (the stats reset, the file heals on the
//!   next save);
//! - saving strips deprecated keys and replaces the file atomically via a
//!   temp file and rename, so a crash can never leave a torn document.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use plugwatch_app::ports::StateStore;
use plugwatch_domain::error::PlugwatchError;
use plugwatch_domain::state::DeviceDocument;

pub mod error;

use error::StateStoreError;

/// JSON-file document store for one device.
pub struct JsonStateStore {
    path: PathBuf,
    template: DeviceDocument,
}

impl JsonStateStore {
    /// Create a store at `path`. `template` is the document returned when
    /// no file exists yet; the composition root seeds it with the default
    /// notification targets.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, template: DeviceDocument) -> Self {
        Self {
            path: path.into(),
            template,
        }
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_document(&self) -> Result<DeviceDocument, StateStoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(self.template.clone());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str(&content) {
            Ok(doc) => Ok(doc),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "state document unparsable, resetting to defaults"
                );
                Ok(self.template.clone())
            }
        }
    }

    fn save_document(&self, document: &DeviceDocument) -> Result<(), StateStoreError> {
        let mut document = document.clone();
        document.strip_deprecated();
        let json = serde_json::to_string_pretty(&document)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.flush()?;
        temp.persist(&self.path)?;
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<DeviceDocument, PlugwatchError> {
        Ok(self.load_document()?)
    }

    async fn save(&self, document: &DeviceDocument) -> Result<(), PlugwatchError> {
        Ok(self.save_document(document)?)
    }
}
