//! Harvest jobs: read local state, query servers, reconcile, write.

pub mod abouts;
pub mod catalogs;
pub mod pool;
pub mod report;

pub use pool::run_pool;
pub use report::{ChangeReport, RecordChange};

use crate::record::Record;
use crate::store;
use std::path::Path;

/// Last known record, or `None` if absent or unreadable.
fn read_last(path: &Path) -> Option<Record> {
    match store::read_json_opt(path) {
        Ok(last) => last,
        Err(e) => {
            tracing::warn!("ignoring last known record: {:#}", e);
            None
        }
    }
}
