//! Batch scripts on disk
//!
//! [`ScriptFile`] ties a [`ScriptDocument`] to a path. Changes stay in
//! memory until [`ScriptFile::save`] is called. Writes are atomic
//! (temp file + rename).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::Config;
use crate::domain::{DumpStyle, ScriptDocument, ScriptError};

#[derive(Debug, Error)]
pub enum ScriptFileError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ScriptError,
    },
}

impl ScriptFileError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads and parses a script, using `default_interpreter` when it has no `#!` line
pub fn read_script(path: &Path, default_interpreter: &str) -> Result<ScriptDocument, ScriptFileError> {
    if !path.exists() {
        return Err(ScriptFileError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| ScriptFileError::io(path, e))?;
    let doc = ScriptDocument::parse_with_default(&content, default_interpreter).map_err(|source| {
        ScriptFileError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!(path = %path.display(), lines = doc.len(), "loaded script");
    Ok(doc)
}

/// Writes a script atomically, optionally creating parent directories
pub fn write_script(
    path: &Path,
    doc: &ScriptDocument,
    style: &DumpStyle,
    mkdir: bool,
) -> Result<(), ScriptFileError> {
    if mkdir {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ScriptFileError::io(parent, e))?;
        }
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, doc.dumps_with(style)).map_err(|e| ScriptFileError::io(&temp_path, e))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ScriptFileError::io(path, e));
    }

    debug!(path = %path.display(), lines = doc.len(), "saved script");
    Ok(())
}

/// A script document bound to a file
#[derive(Debug, Clone)]
pub struct ScriptFile {
    path: PathBuf,
    document: ScriptDocument,
    style: DumpStyle,
}

impl ScriptFile {
    /// Binds a document to a path without touching the disk
    pub fn new(path: impl Into<PathBuf>, document: ScriptDocument) -> Self {
        Self {
            path: path.into(),
            document,
            style: DumpStyle::default(),
        }
    }

    /// Opens an existing script
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ScriptFileError> {
        let path = path.into();
        let document = read_script(&path, crate::domain::DEFAULT_INTERPRETER)?;
        Ok(Self::new(path, document))
    }

    /// Opens a script, treating a missing file as an empty document
    pub fn open_or_default(path: impl Into<PathBuf>) -> Result<Self, ScriptFileError> {
        let mut file = Self::new(path, ScriptDocument::new());
        file.reload(true)?;
        Ok(file)
    }

    /// Opens a script with the configured default interpreter and style.
    ///
    /// With `missing_ok`, a missing file yields an empty document.
    pub fn open_with_config(
        path: impl Into<PathBuf>,
        config: &Config,
        missing_ok: bool,
    ) -> Result<Self, ScriptFileError> {
        let document = ScriptDocument::with_interpreter(config.default_interpreter.as_str());
        let mut file = Self::new(path, document).with_style(config.dump_style());
        file.reload(missing_ok)?;
        Ok(file)
    }

    /// Sets the rendering style used by [`save`](Self::save)
    pub fn with_style(mut self, style: DumpStyle) -> Self {
        self.style = style;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &ScriptDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut ScriptDocument {
        &mut self.document
    }

    pub fn into_document(self) -> ScriptDocument {
        self.document
    }

    /// Re-reads the file, discarding in-memory changes.
    ///
    /// With `missing_ok`, a missing file leaves the document as it is.
    pub fn reload(&mut self, missing_ok: bool) -> Result<(), ScriptFileError> {
        match read_script(&self.path, self.document.interpreter()) {
            Ok(document) => {
                self.document = document;
                Ok(())
            }
            Err(ScriptFileError::NotFound(_)) if missing_ok => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Writes the document to its path
    pub fn save(&self, mkdir: bool) -> Result<(), ScriptFileError> {
        write_script(&self.path, &self.document, &self.style, mkdir)
    }

    /// Writes the document to another path and rebinds to it
    pub fn save_as(&mut self, path: impl Into<PathBuf>, mkdir: bool) -> Result<(), ScriptFileError> {
        let path = path.into();
        write_script(&path, &self.document, &self.style, mkdir)?;
        self.path = path;
        Ok(())
    }
}
