//! Harvest `/catalog`, `/capabilities` and every dataset's `/info`.
//!
//! Output shape of `catalogs.json` / `catalogs-all.json`:
//! ```text
//! {
//!   "<server id>": {
//!     "about":        { ...local about entry... },
//!     "catalog":      { "catalog": [ {"id": ..., "title": ..., "info": {...}}, ... ] },
//!     "capabilities": { "outputFormats": [...] }
//!   },
//!   ...
//! }
//! ```
//! `catalogs.json` is written before the `/info` pass; `catalogs-all.json`
//! additionally embeds each dataset's info.

use super::{ChangeReport, read_last, run_pool};
use crate::config::Settings;
use crate::fetch::{self, Endpoint, Fetcher};
use crate::merge::{Outcome, Reconciled, reconcile};
use crate::record::{self, Record};
use crate::servers::{self, ServerEntry};
use crate::store;
use serde_json::Value;

pub const JOB: &str = "catalogs";

#[derive(Debug, Clone)]
pub struct CatalogsOptions {
    /// Server lists, relative to the servers directory.
    pub about_files: Vec<String>,
    /// Stop after this many `/info` requests per server.
    pub max_infos: Option<usize>,
}

impl Default for CatalogsOptions {
    fn default() -> Self {
        Self {
            about_files: servers::ABOUT_FILES.iter().map(|s| s.to_string()).collect(),
            max_infos: None,
        }
    }
}

pub fn run(
    settings: &Settings,
    opts: &CatalogsOptions,
    fetcher: &dyn Fetcher,
) -> anyhow::Result<ChangeReport> {
    banner("reading abouts");
    let entries: Vec<ServerEntry> = servers::read_lists(&settings.servers_dir, &opts.about_files)?
        .into_iter()
        .filter(|e| {
            let keep = settings.wants_server(&e.id);
            if !keep {
                tracing::info!("{}: skipping, not in --servers", e.id);
            }
            keep
        })
        .collect();

    let mut report = ChangeReport::new(JOB);

    let mut catalogs = Record::new();
    for entry in &entries {
        let mut node = Record::new();
        node.insert("about".into(), Value::Object(entry.about.clone()));
        catalogs.insert(entry.id.clone(), Value::Object(node));
    }

    for endpoint in [Endpoint::Catalog, Endpoint::Capabilities] {
        banner(&format!("starting /{} requests", endpoint.name()));
        let results = run_pool(&entries, settings.max_workers, |entry| {
            harvest_endpoint(settings, fetcher, entry, &endpoint)
        })?;
        for (entry, result) in entries.iter().zip(results) {
            let r = result?;
            report.add(&entry.id, endpoint.name(), None, &r);
            if r.outcome == Outcome::FailedWithoutPrior {
                continue;
            }
            if let Some(Value::Object(node)) = catalogs.get_mut(&entry.id) {
                node.insert(endpoint.name().into(), Value::Object(r.record));
            }
        }
    }

    tracing::info!("writing {}", settings.catalogs_file().display());
    store::write_json(&settings.catalogs_file(), &catalogs)?;

    banner("starting /info requests");
    let with_catalog: Vec<(&ServerEntry, Record)> = entries
        .iter()
        .filter_map(|entry| {
            let catalog = record::get_path(&catalogs, &[entry.id.as_str(), "catalog"])?;
            Some((entry, catalog.as_object()?.clone()))
        })
        .collect();

    let results = run_pool(&with_catalog, settings.max_workers, |(entry, catalog)| {
        harvest_infos(settings, fetcher, entry, catalog.clone(), opts.max_infos)
    })?;
    for ((entry, _), result) in with_catalog.iter().zip(results) {
        let (catalog, server_report) = result?;
        report.merge(server_report);
        if let Some(Value::Object(node)) = catalogs.get_mut(&entry.id) {
            node.insert("catalog".into(), Value::Object(catalog));
        }
    }
    banner("finished /info requests");

    tracing::info!("writing {}", settings.catalogs_all_file().display());
    store::write_json(&settings.catalogs_all_file(), &catalogs)?;

    report.write(&settings.changes_file(JOB))?;
    Ok(report)
}

fn banner(msg: &str) {
    tracing::info!("{}", "-".repeat(40));
    tracing::info!("{}", msg);
    tracing::info!("{}", "-".repeat(40));
}

fn harvest_endpoint(
    settings: &Settings,
    fetcher: &dyn Fetcher,
    entry: &ServerEntry,
    endpoint: &Endpoint,
) -> anyhow::Result<Reconciled> {
    tracing::info!("{}", entry.id);
    let path = settings.endpoint_file(endpoint.name(), &entry.id);
    let last = read_last(&path);

    let fetched = fetch::fetch_endpoint(fetcher, &entry.url, endpoint);
    let r = reconcile(None, last.as_ref(), fetched, &record::utc_now());

    match r.outcome {
        Outcome::FailedWithoutPrior => {
            tracing::info!("  {}: no last successful /{} response", entry.id, endpoint.name());
        }
        Outcome::Failed => {
            tracing::info!("  {}: using last successful /{} response", entry.id, endpoint.name());
            store::write_json(&path, &r.record)?;
        }
        _ => store::write_json(&path, &r.record)?,
    }
    Ok(r)
}

/// Fetch `/info` for the datasets of one server, sequentially.
///
/// Returns the server's catalog record with each dataset's info embedded.
fn harvest_infos(
    settings: &Settings,
    fetcher: &dyn Fetcher,
    entry: &ServerEntry,
    mut catalog: Record,
    max_infos: Option<usize>,
) -> anyhow::Result<(Record, ChangeReport)> {
    let mut report = ChangeReport::new(JOB);

    let Some(Value::Array(datasets)) = catalog.get_mut("catalog") else {
        tracing::info!("skipping {}: no catalog array", entry.id);
        return Ok((catalog, report));
    };

    let mut requested = 0usize;
    for dataset in datasets.iter_mut() {
        if max_infos.is_some_and(|max| requested >= max) {
            tracing::info!("{}: stopping after {} /info requests", entry.id, requested);
            break;
        }
        let Some(dataset) = dataset.as_object_mut() else {
            tracing::error!("{}: catalog entry is not an object", entry.id);
            continue;
        };
        let Some(id) = dataset.get("id").and_then(Value::as_str).map(str::to_string) else {
            tracing::error!("{}: catalog entry without string id", entry.id);
            continue;
        };

        tracing::info!("{}/{}", entry.id, id);
        requested += 1;

        let path = settings.info_file(&entry.id, &id);
        let last = read_last(&path);
        let endpoint = Endpoint::Info(id.clone());
        let fetched = fetch::fetch_endpoint(fetcher, &entry.url, &endpoint);
        let r = reconcile(None, last.as_ref(), fetched, &record::utc_now());
        report.add(&entry.id, endpoint.name(), Some(&id), &r);

        if r.outcome == Outcome::FailedWithoutPrior {
            tracing::info!("  no last successful /info response");
            continue;
        }
        store::write_json(&path, &r.record)?;
        dataset.insert("info".into(), Value::Object(strip_bins(r.record)));
    }

    let path = settings.server_catalog_all_file(&entry.id);
    tracing::info!("writing {}", path.display());
    let list = catalog.get("catalog").cloned().unwrap_or(Value::Array(vec![]));
    store::write_json(&path, &list)?;

    Ok((catalog, report))
}

/// Drop bulky `bins[].centers` and `bins[].ranges` from an info's parameters.
pub fn strip_bins(mut info: Record) -> Record {
    let Some(Value::Array(parameters)) = info.get_mut("parameters") else {
        return info;
    };
    for parameter in parameters.iter_mut() {
        let Some(Value::Array(bins)) = parameter.get_mut("bins") else {
            continue;
        };
        for bin in bins.iter_mut().filter_map(Value::as_object_mut) {
            bin.remove("centers");
            bin.remove("ranges");
        }
    }
    info
}
