//! Dataset availability tables and pages built from `catalogs-all.json`.

pub mod csv;
pub mod model;
pub mod time;

pub use model::{AvailabilityReport, Span, build_report, server_spans};
pub use time::parse_hapi_time;

use crate::config::Settings;
use crate::record::{self, Record};
use crate::render;
use crate::store;
use anyhow::Context;
use serde_json::Value;

pub const CSV_HEADER: [&str; 4] = ["server", "dataset", "start", "stop"];

/// Per-server result of an availability run.
#[derive(Debug, Clone)]
pub struct ServerAvailability {
    pub server: String,
    pub datasets: usize,
    pub skipped: usize,
}

pub fn run(settings: &Settings) -> anyhow::Result<Vec<ServerAvailability>> {
    let path = settings.catalogs_all_file();
    let catalogs: Record = store::read_json(&path).context("run the catalogs job first")?;
    match &settings.servers {
        Some(only) => tracing::info!("generating availability for {:?}", only),
        None => tracing::info!("generating availability for all servers in {}", path.display()),
    }

    let now = chrono::Utc::now().naive_utc();
    let mut out = Vec::new();
    let mut fleet: Vec<[String; 4]> = Vec::new();
    for (server, node) in &catalogs {
        if !settings.wants_server(server) {
            continue;
        }
        let Some(node) = node.as_object() else {
            tracing::error!("{}: not an object in {}", server, path.display());
            continue;
        };
        out.push(write_server(settings, server, node, now, &mut fleet)?);
    }

    let rows: Vec<Vec<&str>> = fleet
        .iter()
        .map(|row| row.iter().map(String::as_str).collect())
        .collect();
    let fleet_path = settings.availabilities_file();
    tracing::info!("writing {}", fleet_path.display());
    store::write_text(&fleet_path, &csv::to_csv_string(&CSV_HEADER, &rows))?;
    Ok(out)
}

fn write_server(
    settings: &Settings,
    server: &str,
    node: &Record,
    now: chrono::NaiveDateTime,
    fleet: &mut Vec<[String; 4]>,
) -> anyhow::Result<ServerAvailability> {
    let (spans, skipped) = server_spans(server, node);
    let dir = settings.availability_dir(server);
    let stem = store::file_stem(server);

    let rows: Vec<Vec<&str>> = spans
        .iter()
        .map(|s| vec![server, s.dataset.as_str(), s.start.as_str(), s.stop.as_str()])
        .collect();
    let csv_path = dir.join(format!("{}.csv", stem));
    tracing::info!("writing {}", csv_path.display());
    store::write_text(&csv_path, &csv::to_csv_string(&CSV_HEADER, &rows))?;
    fleet.extend(spans.iter().map(|s| {
        [server.to_string(), s.dataset.clone(), s.start.clone(), s.stop.clone()]
    }));

    let url = record::get_path(node, &["about", "x_url"])
        .or_else(|| record::get_path(node, &["about", "url"]))
        .and_then(Value::as_str)
        .unwrap_or("");
    let last_update = record::get_path(node, &["catalog", record::LAST_UPDATE]).and_then(Value::as_str);

    let skipped_count = skipped.len();
    let report = build_report(server, url, last_update, &spans, skipped, now)?;
    let html_path = dir.join(format!("{}.html", stem));
    tracing::info!("writing {}", html_path.display());
    store::write_text(&html_path, &render::render_availability_html(&report)?)?;

    Ok(ServerAvailability {
        server: server.to_string(),
        datasets: spans.len(),
        skipped: skipped_count,
    })
}
