//! Dataset persistence.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pricecmp_core::ComparisonResult;

/// `<stem>_backup_<unix_ts>.<ext>` alongside `path`.
pub(crate) fn backup_path(path: &Path, unix_ts: i64) -> PathBuf {
    numbered_backup_path(path, unix_ts, 0)
}

/// Like [`backup_path`], with `_<n>` after the timestamp when `n > 0`.
fn numbered_backup_path(path: &Path, unix_ts: i64, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tag = if n == 0 {
        unix_ts.to_string()
    } else {
        format!("{unix_ts}_{n}")
    };
    let name = match path.extension() {
        Some(ext) => format!("{stem}_backup_{tag}.{}", ext.to_string_lossy()),
        None => format!("{stem}_backup_{tag}"),
    };
    path.with_file_name(name)
}

/// Moves a previous run's output out of the way. Returns the backup path if
/// there was anything to move. Existing backups are never overwritten: a
/// second backup within the same second gets a `_1`, `_2`, ... suffix.
pub(crate) fn backup_existing(path: &Path, unix_ts: i64) -> anyhow::Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut n = 0;
    let mut backup = backup_path(path, unix_ts);
    while backup.exists() {
        n += 1;
        backup = numbered_backup_path(path, unix_ts, n);
    }
    std::fs::rename(path, &backup).with_context(|| {
        format!(
            "failed to back up {} to {}",
            path.display(),
            backup.display()
        )
    })?;
    tracing::info!(from = %path.display(), to = %backup.display(), "backed up previous output");
    Ok(Some(backup))
}

/// Writes `rows` as CSV with a header row. Prices are raw decimals; absent
/// values are empty fields.
pub(crate) fn write_dataset(path: &Path, rows: &[ComparisonResult]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write row for '{}'", row.product_name))?;
    }
    writer.flush()?;
    Ok(())
}
