use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::diagnostics::render_diagnostics;
use crate::error::{DefError, DefResult};
use crate::namespace::DefinitionsNamespace;
use crate::parser::read_definitions;
use crate::registry::Definitions;

/// File extension recognized by directory loads.
pub const DEFINITION_EXTENSION: &str = "xml";

impl<C> Definitions<C> {
    /// Read markup text and route its top-level elements.
    ///
    /// `origin` labels the source in error messages.
    pub fn load_source(
        &mut self,
        ctx: &mut C,
        source: &str,
        origin: &str,
        filter: DefinitionsNamespace,
    ) -> DefResult<()> {
        let document = read_definitions(source).map_err(|diagnostics| DefError::Markup {
            origin: origin.to_string(),
            report: render_diagnostics(source, origin, &diagnostics),
            diagnostics,
        })?;
        if !document.warnings.is_empty() {
            warn!(
                "{origin}: {} warning(s)\n{}",
                document.warnings.len(),
                render_diagnostics(source, origin, &document.warnings)
            );
        }
        debug!("{origin}: {} top-level definition(s)", document.root.children.len());
        self.load_document(ctx, document.root, filter)
    }

    /// Read and route a single definition file.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
    /// rejecting the file, and a leading byte order mark is dropped.
    pub fn load_file(&mut self, ctx: &mut C, path: &Path, filter: DefinitionsNamespace) -> DefResult<()> {
        let bytes = fs::read(path).map_err(|source| DefError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = source {
            warn!("{}: invalid UTF-8 replaced", path.display());
        }
        let text = source.strip_prefix('\u{feff}').unwrap_or(&source);
        self.load_source(ctx, text, &path.display().to_string(), filter)
    }

    /// Load every definition file in `dir`, then, if `recursive`, every
    /// sub-directory.
    ///
    /// Only files with the `.xml` extension are read. Entries are visited in
    /// path order so repeated loads route elements identically; callers should
    /// still not rely on cross-file ordering. Returns the number of files
    /// loaded. Stops at the first file that fails.
    pub fn load_directory(
        &mut self,
        ctx: &mut C,
        dir: &Path,
        filter: DefinitionsNamespace,
        recursive: bool,
    ) -> DefResult<usize> {
        let (files, subdirs) = list_directory(dir)?;

        let mut loaded = 0;
        for file in &files {
            self.load_file(ctx, file, filter)?;
            loaded += 1;
        }

        if recursive {
            for sub in &subdirs {
                loaded += self.load_directory(ctx, sub, filter, recursive)?;
            }
        }

        info!("loaded {loaded} definition file(s) from {}", dir.display());
        Ok(loaded)
    }
}

/// Split a directory into sorted definition files and sorted sub-directories.
fn list_directory(dir: &Path) -> DefResult<(Vec<PathBuf>, Vec<PathBuf>)> {
    let io_err = |source| DefError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if entry.file_type().map_err(io_err)?.is_dir() {
            subdirs.push(path);
        } else if path
            .extension()
            .is_some_and(|ext| ext == DEFINITION_EXTENSION)
        {
            files.push(path);
        }
    }

    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}
