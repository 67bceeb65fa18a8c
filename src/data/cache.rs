use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_file;
use super::model::Dataset;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Source identity
// ---------------------------------------------------------------------------

/// What we know about the source file when it was parsed. A change in any
/// field means the cached dataset is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceIdentity {
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceIdentity {
    fn read(path: &Path) -> Result<Self, LoadError> {
        let meta = std::fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(SourceIdentity {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// DatasetCache
// ---------------------------------------------------------------------------

/// Memoizes the parsed [`Dataset`] for one source file.
///
/// The dataset is handed out as a shared read-only handle; callers pass it
/// explicitly to the pipeline instead of reaching for global state.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    entry: Option<(SourceIdentity, Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached dataset, parsing the file only on first use or when
    /// the file changed on disk since the last parse.
    pub fn get(&mut self) -> Result<Arc<Dataset>, LoadError> {
        let identity = SourceIdentity::read(&self.path)?;

        if let Some((cached_identity, dataset)) = &self.entry {
            if *cached_identity == identity {
                log::debug!("Dataset cache hit for {}", self.path.display());
                return Ok(Arc::clone(dataset));
            }
            log::info!("{} changed on disk, reloading", self.path.display());
        }

        let dataset = Arc::new(load_file(&self.path)?);
        self.entry = Some((identity, Arc::clone(&dataset)));
        Ok(dataset)
    }
}
