#![allow(dead_code)]

use hapimeta::config::Settings;
use hapimeta::fetch::{FetchError, Fetcher};
use hapimeta::record::Record;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// In-memory HAPI fleet: url => JSON body or HTTP status.
#[derive(Default)]
pub struct FakeFleet {
    responses: Mutex<HashMap<String, Result<Value, u16>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(&self, url: &str, body: Value) -> &Self {
        self.responses.lock().unwrap().insert(url.to_string(), Ok(body));
        self
    }

    pub fn status(&self, url: &str, status: u16) -> &Self {
        self.responses.lock().unwrap().insert(url.to_string(), Err(status));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Fetcher for FakeFleet {
    fn get_json(&self, url: &str) -> Result<Record, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.lock().unwrap().get(url) {
            Some(Ok(Value::Object(map))) => Ok(map.clone()),
            Some(Ok(_)) => Err(FetchError::NotAnObject { url: url.to_string() }),
            Some(Err(status)) => Err(FetchError::HttpStatus {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

/// Temporary data + servers directories.
pub struct TestEnv {
    _tmp: TempDir,
    pub settings: Settings,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let mut settings = Settings::with_dirs(tmp.path().join("data"), tmp.path().join("servers"));
        settings.log_dir = tmp.path().join("log");
        settings.max_workers = 4;
        fs::create_dir_all(&settings.servers_dir).expect("create servers dir");
        Self { _tmp: tmp, settings }
    }

    pub fn write_servers(&self, file: &str, list: Value) {
        let text = serde_json::to_string_pretty(&list).unwrap();
        fs::write(self.settings.servers_dir.join(file), text).unwrap();
    }

    pub fn servers_path(&self, file: &str) -> PathBuf {
        self.settings.servers_dir.join(file)
    }

    pub fn data_path(&self, rel: &str) -> PathBuf {
        self.settings.data_dir.join(rel)
    }

    pub fn read(&self, path: &Path) -> Value {
        let text = fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
        serde_json::from_str(&text).unwrap()
    }
}
