use crate::merge::{Change, Outcome, Reconciled};
use crate::record;
use crate::store;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// One reconciled record worth reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RecordChange {
    pub server: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub changes: Vec<Change>,
}

/// What a job run changed, written to `data/changes/<job>.json`.
#[derive(Debug, Default, Serialize)]
pub struct ChangeReport {
    pub job: String,
    pub time: String,
    pub records: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub entries: Vec<RecordChange>,
}

impl ChangeReport {
    pub fn new(job: &str) -> Self {
        Self {
            job: job.to_string(),
            time: record::utc_now(),
            ..Default::default()
        }
    }

    /// Count `r` and keep it when it changed or failed.
    pub fn add(&mut self, server: &str, endpoint: &str, dataset: Option<&str>, r: &Reconciled) {
        self.records += 1;
        match r.outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Failed | Outcome::FailedWithoutPrior => self.failed += 1,
        }
        if r.outcome == Outcome::Unchanged {
            return;
        }

        let label = match dataset {
            Some(d) => format!("{}/{}", server, d),
            None => server.to_string(),
        };
        for change in &r.changes {
            tracing::info!("  {} /{}: {}", label, endpoint, change);
        }

        self.entries.push(RecordChange {
            server: server.to_string(),
            endpoint: endpoint.to_string(),
            dataset: dataset.map(str::to_string),
            outcome: r.outcome,
            error: r
                .record
                .get(record::LAST_UPDATE_ERROR)
                .and_then(Value::as_str)
                .filter(|_| r.outcome.is_failure())
                .map(str::to_string),
            changes: r.changes.clone(),
        });
    }

    pub fn merge(&mut self, other: ChangeReport) {
        self.records += other.records;
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
        self.entries.extend(other.entries);
    }

    pub fn changed(&self) -> bool {
        self.created + self.updated > 0
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        tracing::info!(
            job = %self.job,
            records = self.records,
            created = self.created,
            updated = self.updated,
            unchanged = self.unchanged,
            failed = self.failed,
            "writing change report {}",
            path.display()
        );
        store::write_json(path, self)
    }
}
