//! A filesystem-backed [`DocumentSource`] for the CLI: one document per
//! file, named `<id>.txt`, under a corpus directory. Real deployments plug
//! in a database-backed source instead (see `server::store::OrderStore`);
//! this one exists so `codecheck-rebuild` has something to point at
//! without standing up a database.

use std::fs;
use std::path::{Path, PathBuf};

use rebuild::{DocumentRecord, DocumentSource, RebuildError};

const CURSOR_FILE_NAME: &str = ".codecheck-cursor";

pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn cursor_path(&self) -> PathBuf {
        self.root.join(CURSOR_FILE_NAME)
    }

    /// Persists `id` as the resume cursor for the next `rebuild()` call.
    pub fn save_cursor(&self, id: u64) -> std::io::Result<()> {
        fs::write(self.cursor_path(), id.to_string())
    }

    fn list_ids(&self) -> Result<Vec<u64>, RebuildError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| RebuildError::Source(format!("reading {}: {e}", self.root.display())))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RebuildError::Source(e.to_string()))?;
            if let Some(id) = doc_id_from_path(&entry.path()) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

fn doc_id_from_path(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != "txt" {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

impl DocumentSource for FsDocumentSource {
    fn fetch_batch(
        &self,
        after_id: u64,
        limit: usize,
        upto: Option<u64>,
    ) -> Result<Vec<DocumentRecord>, RebuildError> {
        let ids = self.list_ids()?;
        let mut out = Vec::new();
        for id in ids {
            if id <= after_id || upto.map_or(false, |u| id > u) {
                continue;
            }
            let path = self.root.join(format!("{id}.txt"));
            let code = fs::read_to_string(&path)
                .map_err(|e| RebuildError::Source(format!("reading {}: {e}", path.display())))?;
            out.push(DocumentRecord { id, code });
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }

    fn high_water_mark(&self) -> Result<u64, RebuildError> {
        match fs::read_to_string(self.cursor_path()) {
            Ok(contents) => Ok(contents.trim().parse().unwrap_or(0)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(RebuildError::Source(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_batch_reads_numbered_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2.txt"), "second").unwrap();
        fs::write(dir.path().join("1.txt"), "first").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let source = FsDocumentSource::new(dir.path());
        let batch = source.fetch_batch(0, 10, None).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id, 1);
        assert_eq!(batch[0].code, "first");
        assert_eq!(batch[1].id, 2);
    }

    #[test]
    fn high_water_mark_defaults_to_zero_without_a_cursor_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsDocumentSource::new(dir.path());
        assert_eq!(source.high_water_mark().unwrap(), 0);
    }

    #[test]
    fn save_cursor_round_trips_through_high_water_mark() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsDocumentSource::new(dir.path());
        source.save_cursor(42).unwrap();
        assert_eq!(source.high_water_mark().unwrap(), 42);
    }
}
