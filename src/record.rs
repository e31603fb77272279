//! JSON records and their reserved bookkeeping keys.
//!
//! Every metadata document handled here (an `/about` entry, a `/catalog`
//! response, an `/info` response) is a plain JSON object. A few `x_`-prefixed
//! keys are owned by this tool and record when and how a document was last
//! refreshed.

use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

pub const LAST_UPDATE: &str = "x_LastUpdate";
pub const LAST_UPDATE_ATTEMPT: &str = "x_LastUpdateAttempt";
pub const LAST_UPDATE_ERROR: &str = "x_LastUpdateError";
pub const LAST_CHANGE: &str = "x_LastChange";

/// Keys written only by the reconciler.
pub const BOOKKEEPING_KEYS: [&str; 4] =
    [LAST_UPDATE, LAST_UPDATE_ATTEMPT, LAST_UPDATE_ERROR, LAST_CHANGE];

/// Protocol envelope keys present in every HAPI response.
pub const ENVELOPE_KEYS: [&str; 2] = ["HAPI", "status"];

pub fn is_bookkeeping(key: &str) -> bool {
    BOOKKEEPING_KEYS.contains(&key)
}

/// Remove the HAPI envelope and any bookkeeping keys a server might echo back.
pub fn strip_response(mut record: Record) -> Record {
    for key in ENVELOPE_KEYS.iter().chain(BOOKKEEPING_KEYS.iter()) {
        record.remove(*key);
    }
    record
}

/// Copy of `record` without bookkeeping keys, used for change detection.
pub fn content(record: &Record) -> Record {
    record
        .iter()
        .filter(|(k, _)| !is_bookkeeping(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Current UTC time, e.g. `2024-03-01T12:00:00.000Z`.
pub fn utc_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Walk nested objects along `path`.
pub fn get_path<'a>(record: &'a Record, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut cur = record.get(*first)?;
    for key in rest {
        cur = cur.as_object()?.get(*key)?;
    }
    Some(cur)
}

/// String field or empty string.
pub fn str_field<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}
