//! Reconcile a freshly fetched record against what is already known.
//!
//! Precedence is `default < fresh` on success and `default < last` on
//! failure. The last known record is the fallback that keeps good data alive
//! while a server is unreachable; it does not shadow newer server content.

use super::deep::{deep_merge, layered};
use super::diff::{Change, diff};
use crate::record::{self, Record};
use serde::Serialize;
use serde_json::Value;

/// Result of fetching one record.
#[derive(Debug, Clone)]
pub enum Fetched {
    Ok(Record),
    Err(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Fetch succeeded and nothing was known before.
    Created,
    /// Fetch succeeded and content differs from what was known.
    Updated,
    Unchanged,
    /// Fetch failed; the prior record was kept.
    Failed,
    /// Fetch failed and there is nothing to fall back on.
    FailedWithoutPrior,
}

impl Outcome {
    pub fn is_change(self) -> bool {
        matches!(self, Outcome::Created | Outcome::Updated)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Failed | Outcome::FailedWithoutPrior)
    }
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    pub record: Record,
    pub changes: Vec<Change>,
    pub outcome: Outcome,
}

/// Three-way merge of `default`, `last` and a fetch result, stamped at `now`.
pub fn reconcile(
    default: Option<&Record>,
    last: Option<&Record>,
    fetched: Fetched,
    now: &str,
) -> Reconciled {
    let prior = layered([default, last]);
    let had_prior = default.is_some() || last.is_some();

    match fetched {
        Fetched::Err(message) => {
            let mut record = prior;
            record.insert(record::LAST_UPDATE_ATTEMPT.into(), now.into());
            record.insert(record::LAST_UPDATE_ERROR.into(), Value::String(message));
            Reconciled {
                record,
                changes: Vec::new(),
                outcome: if had_prior {
                    Outcome::Failed
                } else {
                    Outcome::FailedWithoutPrior
                },
            }
        }
        Fetched::Ok(fresh) => {
            let fresh = record::strip_response(fresh);

            let mut merged = default.map(record::content).unwrap_or_default();
            deep_merge(&mut merged, &fresh);

            let changes = diff(
                &Value::Object(record::content(&prior)),
                &Value::Object(merged.clone()),
            );

            let outcome = if !had_prior {
                Outcome::Created
            } else if changes.is_empty() {
                Outcome::Unchanged
            } else {
                Outcome::Updated
            };

            let mut record = merged;
            record.insert(record::LAST_UPDATE.into(), now.into());
            let last_change = if outcome.is_change() {
                Some(Value::from(now))
            } else {
                prior.get(record::LAST_CHANGE).cloned()
            };
            if let Some(v) = last_change {
                record.insert(record::LAST_CHANGE.into(), v);
            }

            Reconciled {
                record,
                changes,
                outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const T0: &str = "2024-01-01T00:00:00.000Z";
    const T1: &str = "2024-01-02T00:00:00.000Z";
    const T2: &str = "2024-01-03T00:00:00.000Z";

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn first_successful_fetch_creates() {
        let fresh = rec(json!({"HAPI": "3.2", "status": {"code": 1200}, "id": "S", "title": "T"}));
        let r = reconcile(None, None, Fetched::Ok(fresh), T0);
        assert_eq!(r.outcome, Outcome::Created);
        assert_eq!(
            Value::Object(r.record),
            json!({"id": "S", "title": "T", "x_LastUpdate": T0, "x_LastChange": T0})
        );
        assert_eq!(r.changes.len(), 2);
    }

    #[test]
    fn fresh_overrides_default_and_default_fills_gaps() {
        let default = rec(json!({
            "id": "S",
            "x_url": "https://s.example/hapi",
            "contact": "local",
            "note": "kept"
        }));
        let fresh = rec(json!({"id": "S", "contact": "remote"}));
        let r = reconcile(Some(&default), None, Fetched::Ok(fresh), T0);
        assert_eq!(r.outcome, Outcome::Updated);
        assert_eq!(r.record["contact"], json!("remote"));
        assert_eq!(r.record["note"], json!("kept"));
        assert_eq!(r.record["x_url"], json!("https://s.example/hapi"));
        assert_eq!(r.changes.len(), 1);
        assert_eq!(r.changes[0].path, "/contact");
    }

    #[test]
    fn same_response_twice_is_idempotent() {
        let fresh = rec(json!({"id": "S", "catalog": [{"id": "a"}]}));
        let first = reconcile(None, None, Fetched::Ok(fresh.clone()), T0);
        let second = reconcile(None, Some(&first.record), Fetched::Ok(fresh), T1);

        assert_eq!(second.outcome, Outcome::Unchanged);
        assert!(second.changes.is_empty());
        assert_eq!(record::content(&first.record), record::content(&second.record));
        assert_eq!(second.record[record::LAST_UPDATE], json!(T1));
        assert_eq!(second.record[record::LAST_CHANGE], json!(T0));
    }

    #[test]
    fn failure_keeps_last_good_content() {
        let fresh = rec(json!({"id": "S", "catalog": [{"id": "a"}]}));
        let good = reconcile(None, None, Fetched::Ok(fresh), T0).record;

        let r = reconcile(None, Some(&good), Fetched::Err("timed out".into()), T1);
        assert_eq!(r.outcome, Outcome::Failed);
        assert!(r.changes.is_empty());
        assert_eq!(r.record["catalog"], json!([{"id": "a"}]));
        assert_eq!(r.record[record::LAST_UPDATE], json!(T0));
        assert_eq!(r.record[record::LAST_UPDATE_ATTEMPT], json!(T1));
        assert_eq!(r.record[record::LAST_UPDATE_ERROR], json!("timed out"));
    }

    #[test]
    fn failure_without_prior_is_flagged() {
        let r = reconcile(None, None, Fetched::Err("refused".into()), T0);
        assert_eq!(r.outcome, Outcome::FailedWithoutPrior);
        assert_eq!(
            Value::Object(r.record),
            json!({"x_LastUpdateAttempt": T0, "x_LastUpdateError": "refused"})
        );
    }

    #[test]
    fn recovery_clears_error_fields() {
        let fresh = rec(json!({"id": "S"}));
        let good = reconcile(None, None, Fetched::Ok(fresh.clone()), T0).record;
        let failed = reconcile(None, Some(&good), Fetched::Err("503".into()), T1).record;
        let r = reconcile(None, Some(&failed), Fetched::Ok(fresh), T2);

        assert_eq!(r.outcome, Outcome::Unchanged);
        assert!(!r.record.contains_key(record::LAST_UPDATE_ERROR));
        assert!(!r.record.contains_key(record::LAST_UPDATE_ATTEMPT));
        assert_eq!(r.record[record::LAST_UPDATE], json!(T2));
    }

    #[test]
    fn removed_dataset_shows_up_in_changes() {
        let old = rec(json!({"catalog": [{"id": "a"}, {"id": "b"}]}));
        let good = reconcile(None, None, Fetched::Ok(old), T0).record;
        let new = rec(json!({"catalog": [{"id": "a"}]}));
        let r = reconcile(None, Some(&good), Fetched::Ok(new), T1);

        assert_eq!(r.outcome, Outcome::Updated);
        assert_eq!(r.record["catalog"], json!([{"id": "a"}]));
        assert_eq!(r.changes[0].path, "/catalog/1");
        assert_eq!(r.record[record::LAST_CHANGE], json!(T1));
    }

    #[test]
    fn server_cannot_set_bookkeeping_keys() {
        let fresh = rec(json!({"id": "S", "x_LastChange": "1999", "x_LastUpdateError": "?"}));
        let r = reconcile(None, None, Fetched::Ok(fresh), T0);
        assert_eq!(r.record[record::LAST_CHANGE], json!(T0));
        assert!(!r.record.contains_key(record::LAST_UPDATE_ERROR));
    }
}
