//! Server lists (`abouts.json` and friends) from the servers repository.
//!
//! JSON shape: an array of `/about`-like objects, each carrying at least
//! ```text
//! { "id": "CDAWeb", "x_url": "https://cdaweb.gsfc.nasa.gov/hapi", ... }
//! ```
//! Lists are flattened in file order; ids must be unique across all lists.

use crate::record::Record;
use crate::store;
use anyhow::{Context, bail};
use std::collections::BTreeSet;
use std::path::Path;

pub const URL_KEY: &str = "x_url";

/// Default list files, relative to the servers repository.
pub const ABOUT_FILES: [&str; 3] = ["abouts.json", "abouts-dev.json", "abouts-test.json"];

#[derive(Debug, Clone)]
pub struct ServerEntry {
    pub id: String,
    pub url: String,
    /// The entry as tracked locally.
    pub about: Record,
}

/// Read and validate one list file.
pub fn read_list(path: &Path) -> anyhow::Result<Vec<ServerEntry>> {
    let raw: Vec<Record> = store::read_json(path)?;
    validate(raw).with_context(|| format!("invalid server list {}", path.display()))
}

/// Read several list files and flatten them. Every file must exist.
pub fn read_lists(dir: &Path, files: &[String]) -> anyhow::Result<Vec<ServerEntry>> {
    let mut raw = Vec::new();
    for file in files {
        let path = dir.join(file);
        let list: Vec<Record> = store::read_json(&path)?;
        tracing::info!(path = %path.display(), servers = list.len(), "read server list");
        raw.extend(list);
    }
    validate(raw)
}

/// Check ids and urls and reject duplicates.
pub fn validate(raw: Vec<Record>) -> anyhow::Result<Vec<ServerEntry>> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (idx, about) in raw.into_iter().enumerate() {
        let Some(id) = about.get("id").and_then(|v| v.as_str()) else {
            bail!("entry {} has no string 'id'", idx);
        };
        let Some(url) = about.get(URL_KEY).and_then(|v| v.as_str()) else {
            bail!("server {} has no string '{}'", id, URL_KEY);
        };
        if !seen.insert(id.to_string()) {
            bail!("duplicate server id: {}", id);
        }
        out.push(ServerEntry {
            id: id.to_string(),
            url: url.to_string(),
            about: about.clone(),
        });
    }
    Ok(out)
}
