use super::record::ToolRecord;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Source of tool records.
///
/// Implementations must yield records in a stable order, the match engine
/// relies on it to pick the first matching record deterministically.
pub trait CatalogReader: Send + Sync {
    fn records(&self) -> Box<dyn Iterator<Item = ToolRecord> + '_>;
}

/// Reads one record per `*.json` file of a directory, sorted by file name.
#[derive(Debug, Clone)]
pub struct DirCatalogReader {
    dir: PathBuf,
}

impl DirCatalogReader {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn record_paths(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Cannot list tools directory {:?}: {}", self.dir, err);
                return vec![];
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        paths
    }
}

impl CatalogReader for DirCatalogReader {
    fn records(&self) -> Box<dyn Iterator<Item = ToolRecord> + '_> {
        Box::new(
            self.record_paths()
                .into_iter()
                .filter_map(|path| match parse_record_file(&path) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        debug!("Skipping tool record: {}", err);
                        None
                    }
                }),
        )
    }
}

impl CatalogReader for Vec<ToolRecord> {
    fn records(&self) -> Box<dyn Iterator<Item = ToolRecord> + '_> {
        Box::new(self.iter().cloned())
    }
}

pub fn parse_record_file(path: &Path) -> Result<ToolRecord, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
