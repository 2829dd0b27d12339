use crate::{InvertedIndex, Result};
use serde::Serialize;
use std::fmt;
use std::fs::{self, create_dir_all, File};
use std::io::{BufWriter, ErrorKind, Read};
use std::path::Path;
use tempfile::NamedTempFile;

/// How `load_index` obtained the index it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded,
    InitializedEmpty,
    RecoveredFromCorruption,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            LoadStatus::Loaded => "Loaded successfully",
            LoadStatus::InitializedEmpty => "Initialized empty index",
            LoadStatus::RecoveredFromCorruption => "Failed to load; initialized new index",
        };
        f.write_str(msg)
    }
}

/// Write the index next to `path` and rename it into place, so an interrupted
/// save never leaves a truncated index behind.
pub fn save_index<P: AsRef<Path>>(index: &InvertedIndex, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => {
            create_dir_all(dir)?;
            dir
        }
        None => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    let mut f = BufWriter::new(tmp);
    serde_json::to_writer(&mut f, index)?;
    let tmp = f.into_inner().map_err(|e| e.into_error())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    tracing::info!(path = %path.display(), terms = index.term_count(), "saved index");
    Ok(())
}

/// Load the index at `path`.
///
/// A missing file yields an empty index. A file that does not parse is removed
/// and also yields an empty index. Other read errors propagate.
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<(InvertedIndex, LoadStatus)> {
    let path = path.as_ref();
    let mut f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "index file does not exist; initializing empty index");
            return Ok((InvertedIndex::new(), LoadStatus::InitializedEmpty));
        }
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    drop(f);

    match serde_json::from_slice::<InvertedIndex>(&buf) {
        Ok(index) => {
            tracing::info!(path = %path.display(), terms = index.term_count(), "index loaded");
            Ok((index, LoadStatus::Loaded))
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to decode index; clearing it");
            if let Err(e) = clear_index(path) {
                tracing::warn!(path = %path.display(), error = %e, "could not remove corrupt index file");
            }
            Ok((InvertedIndex::new(), LoadStatus::RecoveredFromCorruption))
        }
    }
}

/// Remove the index file if present.
pub fn clear_index<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "cleared index file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
