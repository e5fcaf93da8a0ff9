use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

/// Reads a `.json` file from `path`.
///
/// ```ignore
/// let output: DesiredType = valu_util::read_json(path).await?;
/// ```
pub async fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    trace!("reading file at path: {}", path.display());
    let file = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let data: T = serde_json::from_slice(&file)
        .with_context(|| format!("failed to deserialize {}", path.display()))?;
    Ok(data)
}

/// Create `path` holding nothing but a header row, unless it already exists.
///
/// Returns `true` when the file was created.
pub fn ensure_csv(path: &Path, headers: &[&str]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(parent_dir(path))?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(headers)?;
    writer.flush()?;
    debug!("created {} with header {headers:?}", path.display());
    Ok(true)
}

/// Deserialize every row of a headed `.csv` file.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    trace!("reading file at path: {}", path.display());
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .with_context(|| format!("malformed row in {}", path.display()))?;
    Ok(rows)
}

/// Replace `path` with `headers` followed by `rows`.
///
/// The table is written to a temporary file in the same directory and renamed over the
/// target, so readers only ever see the old or the new table.
pub fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file());
        writer.write_record(headers)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    debug!("{} rows written to {}", rows.len(), path.display());
    Ok(())
}

/// Append `rows` to the end of an existing headed `.csv` file in a single write.
///
/// Bytes already in the file are never touched.
pub fn append_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {} for appending", path.display()))?;

    let mut buffer = Vec::new();
    if !ends_with_newline(&mut file)? {
        buffer.push(b'\n');
    }
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buffer);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    file.write_all(&buffer)?;
    file.flush()?;

    debug!("{} rows appended to {}", rows.len(), path.display());
    Ok(())
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
