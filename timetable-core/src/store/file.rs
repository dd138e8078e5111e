//! JSON files in a data directory.
//!
//! Layout:
//! - `subjects.json`: array of subjects
//! - `blocks.json`: array of time blocks in their wire shape
//! - `completions.json`: array of `{blockId, date, done}` records
//!
//! Missing files read as empty. A file that fails to parse fails the whole
//! read; nothing is skipped.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::error::{TimetableError, TimetableResult};
use crate::occurrence::OccurrenceKey;
use crate::store::{poisoned, TableBackend, Tables};

const SUBJECTS_FILE: &str = "subjects.json";
const BLOCKS_FILE: &str = "blocks.json";
const COMPLETIONS_FILE: &str = "completions.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRecord {
    block_id: BlockId,
    date: NaiveDate,
    done: bool,
}

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    // Serializes every load/modify/save cycle in this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> TimetableResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            TimetableError::StoreUnavailable(format!(
                "Could not create data directory {}: {e}",
                dir.display()
            ))
        })?;

        Ok(FileStore {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn load(&self) -> TimetableResult<Tables> {
        let completions: Vec<CompletionRecord> = self.load_file(COMPLETIONS_FILE)?;

        Ok(Tables {
            subjects: self.load_file(SUBJECTS_FILE)?,
            blocks: self.load_file(BLOCKS_FILE)?,
            completions: completions
                .into_iter()
                .map(|r| (OccurrenceKey::new(r.block_id, r.date), r.done))
                .collect(),
        })
    }

    fn load_file<T: DeserializeOwned + Default>(&self, name: &str) -> TimetableResult<T> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(T::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            TimetableError::StoreUnavailable(format!("Could not read {}: {e}", path.display()))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            TimetableError::StoreUnavailable(format!("Corrupt data file {}: {e}", path.display()))
        })
    }

    /// Persist every file that changed between `before` and `after`.
    ///
    /// Every changed file is staged as `*.tmp` before any rename. Renames go
    /// completions, blocks, subjects.
    fn save(&self, before: &Tables, after: &Tables) -> TimetableResult<()> {
        let mut changes: Vec<(&str, String)> = Vec::new();
        if before.completions != after.completions {
            // Sort for deterministic output
            let mut records: Vec<CompletionRecord> = after
                .completions
                .iter()
                .map(|(key, done)| CompletionRecord {
                    block_id: key.block_id,
                    date: key.date,
                    done: *done,
                })
                .collect();
            records.sort_by(|a, b| (a.block_id, a.date).cmp(&(b.block_id, b.date)));
            changes.push((COMPLETIONS_FILE, to_json(&records)?));
        }
        if before.blocks != after.blocks {
            changes.push((BLOCKS_FILE, to_json(&after.blocks)?));
        }
        if before.subjects != after.subjects {
            changes.push((SUBJECTS_FILE, to_json(&after.subjects)?));
        }

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
        for (name, content) in changes {
            let path = self.dir.join(name);
            let temp = self.dir.join(format!("{name}.tmp"));
            if let Err(e) = std::fs::write(&temp, content) {
                discard(&staged);
                return Err(TimetableError::StoreUnavailable(format!(
                    "Could not write {}: {e}",
                    path.display()
                )));
            }
            staged.push((temp, path));
        }

        for (temp, path) in &staged {
            std::fs::rename(temp, path).map_err(|e| {
                TimetableError::StoreUnavailable(format!("Could not write {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> TimetableResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| TimetableError::Serialization(e.to_string()))
}

/// Remove temp files of an aborted save.
fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        if let Err(e) = std::fs::remove_file(temp) {
            tracing::warn!(path = %temp.display(), error = %e, "could not remove temp file");
        }
    }
}

impl TableBackend for FileStore {
    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> TimetableResult<R> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        let tables = self.load()?;
        Ok(f(&tables))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> TimetableResult<R>) -> TimetableResult<R> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        let before = self.load()?;
        let mut after = before.clone();
        let result = f(&mut after)?;
        self.save(&before, &after)?;
        Ok(result)
    }
}
