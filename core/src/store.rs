//! Report persistence.
//!
//! Reports live under two keys of a string key-value backend: an ordered list
//! of every saved report and an optional marker naming the report currently
//! open for editing. The backend is a trait so the UI shell can keep its own
//! durable storage; [`FileStore`] and [`MemoryStore`] ship with the core.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::report::Report;

/// Key holding the ordered list of saved reports.
pub const REPORTS_KEY: &str = "reports";
/// Key holding the report open for editing, if any.
pub const EDIT_MARKER_KEY: &str = "report_in_edit";

/// Durable string storage addressed by key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend, for tests and embedders without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
///
/// Writes land in a temporary file next to the target and are renamed over
/// it, so a crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|err| io_error(&self.dir, err))?;
        let path = self.path_for(key);

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|err| io_error(&self.dir, err))?;
        tmp.write_all(value.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|err| io_error(tmp.path(), err))?;
        tmp.persist(&path).map_err(|err| io_error(&path, err.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path, err)),
        }
    }
}

/// The report open for editing, annotated with its position in the list.
///
/// Stored as the report's own fields plus an `index` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditMarker {
    #[serde(flatten)]
    pub report: Report,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// How [`ReportStore::upsert`] placed a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Replaced { index: usize },
    Appended { index: usize },
}

impl UpsertOutcome {
    pub fn index(self) -> usize {
        match self {
            UpsertOutcome::Replaced { index } | UpsertOutcome::Appended { index } => index,
        }
    }
}

/// Report list and edit marker on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct ReportStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ReportStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str::<Option<T>>(&raw).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &raw)
    }

    /// Every saved report, in creation order.
    pub fn list(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.read(REPORTS_KEY)?.unwrap_or_default())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    pub fn load(&self, index: usize) -> Result<Report, StoreError> {
        self.list()?
            .into_iter()
            .nth(index)
            .ok_or(StoreError::NoSuchReport(index))
    }

    /// Save a report and clear the edit marker.
    ///
    /// Replaces the entry the marker points at when its index is present and
    /// in range, otherwise appends.
    pub fn upsert(&mut self, report: Report) -> Result<UpsertOutcome, StoreError> {
        let mut reports = self.list()?;
        let target = self
            .edit_marker()?
            .and_then(|marker| marker.index)
            .filter(|&index| index < reports.len());

        let outcome = match target {
            Some(index) => {
                reports[index] = report;
                UpsertOutcome::Replaced { index }
            }
            None => {
                reports.push(report);
                UpsertOutcome::Appended {
                    index: reports.len() - 1,
                }
            }
        };

        self.write(REPORTS_KEY, &reports)?;
        self.backend.remove(EDIT_MARKER_KEY)?;
        info!(?outcome, total = reports.len(), "report saved");
        Ok(outcome)
    }

    /// Mark `report` as open for editing in place of list entry `index`.
    pub fn begin_edit(&mut self, report: &Report, index: usize) -> Result<(), StoreError> {
        let marker = EditMarker {
            report: report.clone(),
            index: Some(index),
        };
        self.write(EDIT_MARKER_KEY, &marker)?;
        info!(index, "report opened for editing");
        Ok(())
    }

    /// Load list entry `index` and mark it as open for editing.
    pub fn edit_existing(&mut self, index: usize) -> Result<Report, StoreError> {
        let report = self.load(index)?;
        self.begin_edit(&report, index)?;
        Ok(report)
    }

    pub fn edit_marker(&self) -> Result<Option<EditMarker>, StoreError> {
        self.read(EDIT_MARKER_KEY)
    }

    /// Drop the edit marker; the list is left untouched.
    pub fn cancel_edit(&mut self) -> Result<(), StoreError> {
        self.backend.remove(EDIT_MARKER_KEY)?;
        debug!("edit marker cleared");
        Ok(())
    }
}
