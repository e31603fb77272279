//! Settings shared by every job.
//!
//! Values come from the command line, then `HAPIMETA_*` environment variables
//! (a `.env` file is loaded first), then the defaults below.

use crate::store::file_stem;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Directory for harvested state and generated artifacts.
    #[arg(long, global = true, env = "HAPIMETA_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Checkout of the servers repository holding the about lists.
    #[arg(long, global = true, env = "HAPIMETA_SERVERS_DIR", default_value = "servers")]
    pub servers_dir: PathBuf,

    #[arg(long, global = true, env = "HAPIMETA_LOG_DIR", default_value = "log")]
    pub log_dir: PathBuf,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = "HAPIMETA_TIMEOUT", default_value_t = 60)]
    pub timeout: u64,

    /// Retries for transient HTTP failures.
    #[arg(long, global = true, env = "HAPIMETA_RETRIES", default_value_t = 2)]
    pub retries: usize,

    /// Servers processed in parallel; 1 disables the worker pool.
    #[arg(long, global = true, env = "HAPIMETA_MAX_WORKERS", default_value_t = 10)]
    pub max_workers: usize,

    /// Only process these server ids (comma separated).
    #[arg(long, global = true, value_delimiter = ',')]
    pub servers: Option<Vec<String>>,
}

impl Settings {
    pub fn with_dirs(data_dir: impl Into<PathBuf>, servers_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            servers_dir: servers_dir.into(),
            log_dir: PathBuf::from("log"),
            timeout: 60,
            retries: 2,
            max_workers: 10,
            servers: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn wants_server(&self, id: &str) -> bool {
        match &self.servers {
            Some(only) => only.iter().any(|s| s == id),
            None => true,
        }
    }

    /// Last good response of a per-server endpoint, e.g. `data/catalog/<id>.json`.
    pub fn endpoint_file(&self, endpoint: &str, server_id: &str) -> PathBuf {
        self.data_dir
            .join(endpoint)
            .join(format!("{}.json", file_stem(server_id)))
    }

    pub fn info_file(&self, server_id: &str, dataset_id: &str) -> PathBuf {
        self.data_dir
            .join("infos")
            .join(file_stem(server_id))
            .join(format!("{}.json", file_stem(dataset_id)))
    }

    pub fn catalogs_file(&self) -> PathBuf {
        self.data_dir.join("catalogs.json")
    }

    pub fn catalogs_all_file(&self) -> PathBuf {
        self.data_dir.join("catalogs-all.json")
    }

    pub fn server_catalog_all_file(&self, server_id: &str) -> PathBuf {
        self.data_dir
            .join("catalogs")
            .join(format!("{}-all.json", file_stem(server_id)))
    }

    pub fn changes_file(&self, job: &str) -> PathBuf {
        self.data_dir.join("changes").join(format!("{}.json", job))
    }

    /// Availability rows of every processed server in one table.
    pub fn availabilities_file(&self) -> PathBuf {
        self.data_dir.join("availabilities").join("availabilities.csv")
    }

    pub fn availability_dir(&self, server_id: &str) -> PathBuf {
        self.data_dir.join("availabilities").join(file_stem(server_id))
    }

    pub fn spase_file(&self, server_id: &str, dataset_id: &str) -> PathBuf {
        self.data_dir
            .join("spase")
            .join(file_stem(server_id))
            .join(format!("{}.json", file_stem(dataset_id)))
    }
}
