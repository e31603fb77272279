//! Availability model: dataset time spans placed on a shared time axis.

use super::time::parse_hapi_time;
use crate::record::{self, Record};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

/// One dataset's advertised time range.
#[derive(Debug, Clone)]
pub struct Span {
    pub dataset: String,
    pub start: String,
    pub stop: String,
    pub start_time: NaiveDateTime,
    pub stop_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarView {
    pub dataset: String,
    pub start: String,
    pub stop: String,
    /// Offset and width as percentages of the axis.
    pub left: f64,
    pub width: f64,
    /// Bar was cut at the start (before 1960) or stop (far future) of the axis.
    pub clipped_start: bool,
    pub clipped_stop: bool,
    pub info_link: String,
    pub plot_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickView {
    pub label: String,
    pub pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    pub server: String,
    pub url: String,
    pub title: String,
    pub bars: Vec<BarView>,
    pub ticks: Vec<TickView>,
    /// Datasets skipped for missing or invalid times.
    pub skipped: Vec<String>,
}

pub const SERVERS_PAGE: &str = "https://hapi-server.org/servers/";
pub const PLOT_PAGE: &str = "https://hapi-server.org/plot/";
pub const AXIS_FIRST_YEAR: i32 = 1960;

/// Extract spans from one server node of `catalogs-all.json`.
///
/// Returns the spans plus ids of datasets that had to be skipped.
pub fn server_spans(server: &str, node: &Record) -> (Vec<Span>, Vec<String>) {
    let mut spans = Vec::new();
    let mut skipped = Vec::new();

    let datasets = record::get_path(node, &["catalog", "catalog"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    tracing::info!("{}: {} datasets", server, datasets.len());

    for dataset in datasets.iter().filter_map(Value::as_object) {
        let id = record::str_field(dataset, "id");
        let Some(info) = dataset.get("info").and_then(Value::as_object) else {
            tracing::error!("{} {}: no 'info' key", server, id);
            skipped.push(id.to_string());
            continue;
        };
        let start = extract_time(server, id, info, "startDate");
        let stop = extract_time(server, id, info, "stopDate");
        match (start, stop) {
            (Some((start, start_time)), Some((stop, stop_time))) => {
                tracing::debug!("{}, {}, {}, {}", server, id, start, stop);
                spans.push(Span {
                    dataset: id.to_string(),
                    start,
                    stop,
                    start_time,
                    stop_time,
                });
            }
            _ => skipped.push(id.to_string()),
        }
    }
    (spans, skipped)
}

fn extract_time(
    server: &str,
    dataset: &str,
    info: &Record,
    key: &str,
) -> Option<(String, NaiveDateTime)> {
    let raw = match info.get(key) {
        None => {
            tracing::error!("{} {}: key '{}' is not in info", server, dataset, key);
            return None;
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            tracing::error!("{} {}: info[{}] is empty", server, dataset, key);
            return None;
        }
        Some(Value::String(s)) => s,
        Some(other) => {
            tracing::error!("{} {}: info[{}] = {} is not a string", server, dataset, key, other);
            return None;
        }
    };
    match parse_hapi_time(raw) {
        Ok(t) => Some((raw.clone(), t)),
        Err(e) => {
            tracing::error!("{} {}: {:#}", server, dataset, e);
            None
        }
    }
}

/// Lay spans out on a 1960..(now + 5 years) axis.
pub fn build_report(
    server: &str,
    url: &str,
    last_update: Option<&str>,
    spans: &[Span],
    skipped: Vec<String>,
    now: NaiveDateTime,
) -> anyhow::Result<AvailabilityReport> {
    let axis_start = NaiveDate::from_ymd_opt(AXIS_FIRST_YEAR, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("bad axis start"))?;
    let axis_stop = now + Duration::days(5 * 365);
    let axis_ms = (axis_stop - axis_start).num_milliseconds() as f64;
    let pct = |t: NaiveDateTime| (t - axis_start).num_milliseconds() as f64 / axis_ms * 100.0;

    let mut bars = Vec::with_capacity(spans.len());
    for span in spans {
        let start = span.start_time.max(axis_start);
        let stop = span.stop_time.min(axis_stop).max(start);
        let plot_link = Url::parse_with_params(
            PLOT_PAGE,
            &[
                ("server", url),
                ("dataset", span.dataset.as_str()),
                ("format", "gallery"),
                ("usecache", "true"),
                ("usedatacache", "true"),
                ("mode", "thumb"),
            ],
        )?;
        bars.push(BarView {
            dataset: span.dataset.clone(),
            start: span.start.clone(),
            stop: span.stop.clone(),
            left: pct(start),
            width: pct(stop) - pct(start),
            clipped_start: span.start_time < axis_start,
            clipped_stop: span.stop_time > axis_stop,
            info_link: format!("{}#server={}&dataset={}", SERVERS_PAGE, server, span.dataset),
            plot_link: plot_link.to_string(),
        });
    }

    let mut ticks = Vec::new();
    let last_year = chrono::Datelike::year(&axis_stop.date());
    for year in (AXIS_FIRST_YEAR..=last_year).step_by(10) {
        if let Some(t) = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)) {
            ticks.push(TickView {
                label: year.to_string(),
                pct: pct(t),
            });
        }
    }

    let mut title = format!("{} | {} | {} datasets", server, url, spans.len());
    if let Some(t) = last_update {
        title.push_str(&format!(" | {}", t));
    }

    Ok(AvailabilityReport {
        server: server.to_string(),
        url: url.to_string(),
        title,
        bars,
        ticks,
        skipped,
    })
}
