use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn hapimeta(tmp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("hapimeta");
    cmd.current_dir(tmp.path())
        .env_remove("HAPIMETA_DATA_DIR")
        .env_remove("HAPIMETA_SERVERS_DIR")
        .env_remove("HAPIMETA_LOG_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_jobs() {
    let tmp = TempDir::new().unwrap();
    hapimeta(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("abouts")
                .and(predicate::str::contains("catalogs"))
                .and(predicate::str::contains("availability"))
                .and(predicate::str::contains("spase")),
        );
}

#[test]
fn availability_without_catalogs_fails() {
    let tmp = TempDir::new().unwrap();
    hapimeta(&tmp)
        .args(["availability", "--data-dir", "data", "--log-dir", "log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("run the catalogs job first"));

    assert!(tmp.path().join("log/availability.log").exists());
    assert!(tmp.path().join("log/availability.errors.log").exists());
}

#[test]
fn missing_server_list_is_reported() {
    let tmp = TempDir::new().unwrap();
    hapimeta(&tmp)
        .args(["abouts", "--servers-dir", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("abouts.json"));
}

#[test]
fn errors_log_is_removed_when_empty() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("data")).unwrap();
    std::fs::write(tmp.path().join("data/catalogs-all.json"), "{}").unwrap();

    hapimeta(&tmp).arg("availability").assert().success();

    assert!(tmp.path().join("log/availability.log").exists());
    assert!(!tmp.path().join("log/availability.errors.log").exists());
}

#[test]
fn data_dir_from_environment() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("custom")).unwrap();
    std::fs::write(tmp.path().join("custom/catalogs-all.json"), "{}").unwrap();

    hapimeta(&tmp)
        .env("HAPIMETA_DATA_DIR", "custom")
        .arg("availability")
        .assert()
        .success();

    assert!(tmp.path().join("custom/availabilities/availabilities.csv").exists());
    assert!(!tmp.path().join("data").exists());
}

#[test]
fn data_dir_from_dotenv_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("fromfile")).unwrap();
    std::fs::write(tmp.path().join("fromfile/catalogs-all.json"), "{}").unwrap();
    std::fs::write(tmp.path().join(".env"), "HAPIMETA_DATA_DIR=fromfile\n").unwrap();

    hapimeta(&tmp).arg("availability").assert().success();

    assert!(tmp.path().join("fromfile/availabilities/availabilities.csv").exists());
}
