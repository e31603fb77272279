//! Refresh the about list of the servers repository from each server's `/about`.

use super::{ChangeReport, read_last, run_pool};
use crate::config::Settings;
use crate::fetch::{self, Endpoint, Fetcher};
use crate::merge::{Outcome, Reconciled, reconcile};
use crate::record::{self, Record};
use crate::servers::{self, ServerEntry, URL_KEY};
use crate::store;
use std::path::Path;

pub const JOB: &str = "abouts";

#[derive(Debug, Clone)]
pub struct AboutsOptions {
    /// List to read, relative to the servers directory.
    pub file: String,
    /// Where to write the updated list; defaults to `file`.
    pub out: Option<String>,
}

impl Default for AboutsOptions {
    fn default() -> Self {
        Self {
            file: servers::ABOUT_FILES[0].to_string(),
            out: None,
        }
    }
}

pub fn run(
    settings: &Settings,
    opts: &AboutsOptions,
    fetcher: &dyn Fetcher,
) -> anyhow::Result<ChangeReport> {
    let path_in = settings.servers_dir.join(&opts.file);
    let path_out = settings
        .servers_dir
        .join(opts.out.as_deref().unwrap_or(&opts.file));

    tracing::info!("reading {}", path_in.display());
    let entries = servers::read_list(&path_in)?;

    let results = run_pool(&entries, settings.max_workers, |entry| {
        if !settings.wants_server(&entry.id) {
            return Ok(None);
        }
        refresh(settings, fetcher, entry).map(Some)
    })?;

    let mut report = ChangeReport::new(JOB);
    let mut abouts: Vec<Record> = Vec::with_capacity(entries.len());
    for (entry, result) in entries.iter().zip(results) {
        match result? {
            Some(r) => {
                report.add(&entry.id, Endpoint::About.name(), None, &r);
                abouts.push(r.record);
            }
            None => abouts.push(entry.about.clone()),
        }
    }

    if !report.changed() {
        tracing::info!("no changes to {}; updating only x_ fields", path_in.display());
    }
    tracing::info!("writing {}", path_out.display());
    store::write_json(&path_out, &abouts)?;

    let dir = path_out.parent().unwrap_or(Path::new("."));
    let (all1, all2) = (dir.join("all_.txt"), dir.join("all.txt"));
    if report.changed() {
        store::write_text(&all1, &summary_lines(&abouts))?;
        store::write_text(&all2, &url_lines(&abouts))?;
    } else {
        tracing::info!(
            "no changes; not writing {} or {}",
            all1.display(),
            all2.display()
        );
    }

    report.write(&settings.changes_file(JOB))?;
    Ok(report)
}

fn refresh(
    settings: &Settings,
    fetcher: &dyn Fetcher,
    entry: &ServerEntry,
) -> anyhow::Result<Reconciled> {
    tracing::info!("{}", entry.id);
    let last_path = settings.endpoint_file(Endpoint::About.name(), &entry.id);
    let last = read_last(&last_path);

    let fetched = fetch::fetch_endpoint(fetcher, &entry.url, &Endpoint::About);
    let r = reconcile(Some(&entry.about), last.as_ref(), fetched, &record::utc_now());

    match r.outcome {
        Outcome::Unchanged => tracing::info!("  no difference from {}", entry.url),
        Outcome::Failed => tracing::info!("  keeping local values for {}", entry.id),
        _ => {}
    }
    if r.outcome != Outcome::FailedWithoutPrior {
        store::write_json(&last_path, &r.record)?;
    }
    Ok(r)
}

/// `url, title, id, contact, contactID` per server.
fn summary_lines(abouts: &[Record]) -> String {
    let mut out = String::new();
    for about in abouts {
        out.push_str(&format!(
            "{}, {}, {}, {}, {}\n",
            record::str_field(about, URL_KEY),
            record::str_field(about, "title"),
            record::str_field(about, "id"),
            record::str_field(about, "contact"),
            record::str_field(about, "contactID"),
        ));
    }
    out
}

fn url_lines(abouts: &[Record]) -> String {
    abouts
        .iter()
        .map(|a| format!("{}\n", record::str_field(a, URL_KEY)))
        .collect()
}
