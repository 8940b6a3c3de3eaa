//! Snapshot file helpers
//!
//! items.json is rewritten whole on every committed mutation. Writes go to a
//! sibling `.tmp` file that is synced and then renamed over the snapshot, so
//! a crash leaves either the old snapshot or the new one on disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LedgerError, LedgerResult};

fn snapshot_error(action: &str, path: &Path, err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// The sibling temp file a snapshot is staged in, e.g. `items.json.tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a snapshot, or the empty value when none has been written yet
pub fn read_snapshot<T>(path: &Path) -> LedgerResult<T>
where
    T: DeserializeOwned + Default,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(snapshot_error("open", path, e)),
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|e| snapshot_error("parse", path, e))
}

/// Replace a snapshot atomically
pub fn write_snapshot<T: Serialize>(path: &Path, data: &T) -> LedgerResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| snapshot_error("create directory for", path, e))?;
    }

    let staging = staging_path(path);
    let result = stage(&staging, data).and_then(|()| {
        fs::rename(&staging, path).map_err(|e| snapshot_error("replace", path, e))
    });

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn stage<T: Serialize>(staging: &Path, data: &T) -> LedgerResult<()> {
    let file = File::create(staging).map_err(|e| snapshot_error("create", staging, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| snapshot_error("encode", staging, e))?;
    writer
        .flush()
        .map_err(|e| snapshot_error("flush", staging, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| snapshot_error("sync", staging, e))
}
