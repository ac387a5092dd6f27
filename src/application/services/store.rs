//! Dialog file storage service
//!
//! Saves and loads dialogs, choosing the text format by file extension.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::format::{self, DialogFormat, FormatOptions};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{Dialog, Payload};
use crate::infrastructure::traits::FileSystem;

/// Service for persisting dialogs as flat text files.
pub struct DialogStore {
    fs: Arc<dyn FileSystem>,
    options: FormatOptions,
}

impl DialogStore {
    /// Create a new store with default layout options.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_options(fs, FormatOptions::default())
    }

    pub fn with_options(fs: Arc<dyn FileSystem>, options: FormatOptions) -> Self {
        Self { fs, options }
    }

    /// Save a dialog to `path`.
    ///
    /// The extension is checked before anything else and the document is
    /// fully encoded before the file is touched, so a failing save leaves no
    /// partial file behind.
    #[instrument(level = "debug", skip(self, dialog))]
    pub fn save<B, N>(&self, dialog: &Dialog<B, N>, path: &Path) -> ApplicationResult<()>
    where
        B: Serialize,
        N: Serialize,
    {
        let format = DialogFormat::from_path(path)?;
        let text = format::encode(dialog, format, &self.options)?;
        debug!("save: {} bytes as {:?}", text.len(), format);

        self.fs.write(path, &text).with_path_context("write dialog", path)?;
        info!("saved dialog to {}", path.display());
        Ok(())
    }

    /// Load a dialog from `path` with all parent links restored.
    #[instrument(level = "debug", skip(self))]
    pub fn load<B, N>(&self, path: &Path) -> ApplicationResult<Dialog<B, N>>
    where
        B: Payload + DeserializeOwned,
        N: Payload + DeserializeOwned,
    {
        let format = DialogFormat::from_path(path)?;
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read dialog", path)?;

        let dialog = format::decode(&text, format, path)?;
        debug!(
            "load: {} branches from {}",
            dialog.tree().branch_count(),
            path.display()
        );
        Ok(dialog)
    }
}
