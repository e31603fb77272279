//! Reading and writing state files.

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

/// Like [`read_json`], but a missing file is `None` rather than an error.
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Pretty-print `value` to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    write_text(path, &text)
}

/// Write through a sibling temp file so a crash never leaves a truncated file.
pub fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, text).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename {} to {}", tmp.display(), path.display()))?;
    tracing::debug!(path = %path.display(), "wrote");
    Ok(())
}

pub fn ensure_directory(dir: &Path) -> anyhow::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    if dir.exists() && !dir.is_dir() {
        anyhow::bail!("path exists but is not a directory: {}", dir.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))
}

/// Delete `path` if it exists and is empty.
pub fn rm_if_empty(path: &Path) -> anyhow::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == 0 => {
            fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// File stem for a server or dataset id.
///
/// `%`, path separators and NUL are percent-encoded so distinct ids never
/// share a file. `.`, `..` and the empty id get stems that cannot name a
/// directory entry of their own.
pub fn file_stem(id: &str) -> String {
    match id {
        "" => return "%".to_string(),
        "." => return "%2E".to_string(),
        ".." => return "%2E%2E".to_string(),
        _ => {}
    }
    let mut stem = String::with_capacity(id.len());
    for c in id.chars() {
        match c {
            '%' => stem.push_str("%25"),
            '/' => stem.push_str("%2F"),
            '\\' => stem.push_str("%5C"),
            '\0' => stem.push_str("%00"),
            c => stem.push(c),
        }
    }
    stem
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
