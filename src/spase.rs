//! SPASE `NumericalData` documents for harvested datasets.

use crate::config::Settings;
use crate::record::{self, Record};
use crate::store;
use anyhow::Context;
use serde_json::{Value, json};

pub const SCHEMA_URL: &str = "http://www.spase-group.org/data/schema";
pub const VERSION: &str = "2.6.0";
pub const REPOSITORY_ID: &str = "spase://SMWG/Repository/HAPI";

/// Script languages offered by the HAPI server page.
pub const SCRIPT_LANGUAGES: [&str; 7] =
    ["IDL", "Javascript", "MATLAB", "Python", "Autoplot", "curl", "wget"];

/// HAPI dataset path => SPASE `NumericalData` path.
const DATASET_MAP: [(&str, &str); 8] = [
    ("title", "ResourceHeader/ResourceName"),
    ("info/description", "ResourceHeader/Description"),
    ("info/modificationDate", "ResourceHeader/ReleaseDate"),
    ("info/resourceURL", "ResourceHeader/InformationURL/URL"),
    ("info/contact", "ResourceHeader/Contact/PersonID"),
    ("info/startDate", "TemporalDescription/TimeSpan/StartDate"),
    ("info/stopDate", "TemporalDescription/TimeSpan/StopDate"),
    ("info/cadence", "TemporalDescription/Cadence"),
];

/// HAPI parameter key => SPASE `Parameter` path.
const PARAMETER_MAP: [(&str, &str); 6] = [
    ("name", "Name"),
    ("name", "ParameterKey"),
    ("description", "Description"),
    ("units", "Units"),
    ("fill", "FillValue"),
    ("type", "ValueType"),
];

#[derive(Debug, Clone, Default)]
pub struct SpaseOptions {
    /// Read each info from `data/infos/` instead of the copy in `catalogs-all.json`.
    pub reread_info: bool,
}

pub fn run(settings: &Settings, opts: &SpaseOptions) -> anyhow::Result<usize> {
    let path = settings.catalogs_all_file();
    let catalogs: Record = store::read_json(&path).context("run the catalogs job first")?;

    let mut written = 0;
    for (server, node) in &catalogs {
        if !settings.wants_server(server) {
            continue;
        }
        tracing::info!("processing server: {}", server);
        let Some(node) = node.as_object() else {
            continue;
        };
        let formats = record::get_path(node, &["capabilities", "outputFormats"])
            .cloned()
            .unwrap_or_else(|| json!(["csv"]));
        let datasets = record::get_path(node, &["catalog", "catalog"])
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for dataset in datasets {
            let Value::Object(mut dataset) = dataset else {
                continue;
            };
            let id = record::str_field(&dataset, "id").to_string();
            if id.is_empty() {
                tracing::error!("{}: dataset without id", server);
                continue;
            }
            if opts.reread_info {
                let info_path = settings.info_file(server, &id);
                if let Some(info) = store::read_json_opt::<Value>(&info_path)? {
                    tracing::debug!("replacing info with {}", info_path.display());
                    dataset.insert("info".into(), info);
                }
            }

            let doc = build_spase(server, &dataset, &formats);
            store::write_json(&settings.spase_file(server, &id), &doc)?;
            written += 1;
        }
    }
    tracing::info!("wrote {} SPASE documents", written);
    Ok(written)
}

/// Build one SPASE document for `dataset` (a catalog entry with `info`).
pub fn build_spase(server: &str, dataset: &Record, formats: &Value) -> Value {
    let id = record::str_field(dataset, "id");

    let mut numerical = map_fields(dataset, &DATASET_MAP);
    if record::get_path(&numerical, &["ResourceHeader", "ResourceName"]).is_none() {
        set_path(&mut numerical, "ResourceHeader/ResourceName", Value::from(id));
    }
    numerical.insert(
        "AccessInformation".into(),
        access_information(server, id, formats),
    );

    if let Some(doi) = find_doi(dataset) {
        numerical.insert("DOI".into(), Value::String(doi));
    }
    if let Some(mapping) = spatial_mapping(dataset) {
        numerical.insert("SpatialMapping".into(), mapping);
    }

    let parameters: Vec<Value> = record::get_path(dataset, &["info", "parameters"])
        .and_then(Value::as_array)
        .map(|ps| {
            ps.iter()
                .filter_map(Value::as_object)
                .map(|p| Value::Object(map_fields(p, &PARAMETER_MAP)))
                .collect()
        })
        .unwrap_or_default();
    numerical.insert("Parameter".into(), Value::Array(parameters));

    json!({
        "Spase": {
            "xmlns": SCHEMA_URL,
            "xmlns:xsi": "http://www.w3.org/2001/XMLSchema-instance",
            "xsi:schemaLocation": format!("{} {}/spase-{}.xsd", SCHEMA_URL, SCHEMA_URL, VERSION.replace('.', "_")),
            "Version": VERSION,
            "NumericalData": numerical,
        }
    })
}

fn map_fields(src: &Record, map: &[(&str, &str)]) -> Record {
    let mut out = Record::new();
    for (from, to) in map {
        let path: Vec<&str> = from.split('/').collect();
        if let Some(v) = record::get_path(src, &path) {
            if !v.is_null() {
                set_path(&mut out, to, v.clone());
            }
        }
    }
    out
}

fn set_path(target: &mut Record, path: &str, value: Value) {
    let mut parts: Vec<&str> = path.split('/').collect();
    let Some(last) = parts.pop() else {
        return;
    };
    let mut cur = target;
    for part in parts {
        let slot = cur
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Record::new()));
        if !slot.is_object() {
            *slot = Value::Object(Record::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        cur = next;
    }
    cur.insert(last.to_string(), value);
}

fn access_information(server: &str, id: &str, formats: &Value) -> Value {
    let page = format!(
        "https://hapi-server.org/servers/#server={}&dataset={}",
        server, id
    );
    let script_formats: Vec<String> = SCRIPT_LANGUAGES
        .iter()
        .map(|l| format!("x_Script.{}", l))
        .collect();
    json!([
        {
            "RepositoryID": REPOSITORY_ID,
            "AccessURL": {
                "Name": "HAPI",
                "URL": page,
                "ProductKey": id,
                "Description": "Web page with dataset information, data access, and plots."
            },
            "Format": formats,
        },
        {
            "RepositoryID": REPOSITORY_ID,
            "AccessURL": {
                "Name": "Scripts",
                "URL": format!("{}&return=script", page),
                "ProductKey": id,
                "Description": format!("Scripts for accessing the data in {}.", SCRIPT_LANGUAGES.join(", ")),
            },
            "Format": script_formats,
        }
    ])
}

/// DOI from `datasetCitation`, falling back to `resourceID`.
fn find_doi(dataset: &Record) -> Option<String> {
    let citation = record::get_path(dataset, &["info", "datasetCitation"]).and_then(Value::as_str);
    let resource = record::get_path(dataset, &["info", "resourceID"]).and_then(Value::as_str);
    match citation {
        Some(c) => extract_doi(c),
        None => resource.and_then(extract_doi),
    }
}

pub fn extract_doi(s: &str) -> Option<String> {
    let s = s.trim();
    s.strip_prefix("https://doi.org/")
        .or_else(|| s.strip_prefix("doi:"))
        .map(str::to_string)
}

fn spatial_mapping(dataset: &Record) -> Option<Value> {
    let (point, description) = if let Some(geo) =
        record::get_path(dataset, &["info", "geoLocation"]).and_then(Value::as_array)
    {
        (
            geo.clone(),
            Some("Spatial location of the dataset. Latitude, longitude, and elevation are all in WGS 84."),
        )
    } else {
        let system = record::get_path(dataset, &["info", "location", "coordinateSystemName"])
            .and_then(Value::as_str);
        let point = record::get_path(dataset, &["info", "location", "point"]).and_then(Value::as_array)?;
        if system != Some("GEO") {
            return None;
        }
        (point.clone(), None)
    };
    if point.len() < 2 {
        return None;
    }

    let mut mapping = Record::new();
    mapping.insert("centerLongitude".into(), point[0].clone());
    mapping.insert("centerLatitude".into(), point[1].clone());
    if let Some(elevation) = point.get(2) {
        mapping.insert("centerElevation".into(), elevation.clone());
    }
    if let Some(d) = description {
        mapping.insert("Description".into(), Value::from(d));
    }
    Some(Value::Object(mapping))
}
