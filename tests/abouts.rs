mod common;

use common::{FakeFleet, TestEnv};
use hapimeta::pipeline::abouts::{self, AboutsOptions};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;

const A_ABOUT: &str = "https://a.example/hapi/about";
const B_ABOUT: &str = "https://b.example/hapi/about";

fn setup() -> (TestEnv, FakeFleet) {
    let env = TestEnv::new();
    env.write_servers(
        "abouts.json",
        json!([
            {"id": "A", "x_url": "https://a.example/hapi", "title": "Old A", "contact": "a@x"},
            {"id": "B", "x_url": "https://b.example/hapi", "title": "B", "contact": "b@x"}
        ]),
    );
    let fleet = FakeFleet::new();
    fleet
        .ok(
            A_ABOUT,
            json!({
                "HAPI": "3.2",
                "status": {"code": 1200, "message": "OK"},
                "id": "A",
                "title": "New A",
                "contact": "a@x",
                "contactID": "orcid:1"
            }),
        )
        .status(B_ABOUT, 503);
    (env, fleet)
}

#[test]
fn updates_changed_servers_and_keeps_failed_ones() {
    let (env, fleet) = setup();
    let report = abouts::run(&env.settings, &AboutsOptions::default(), &fleet).unwrap();

    assert_eq!((report.updated, report.failed), (1, 1));

    let list = env.read(&env.servers_path("abouts.json"));
    let a = &list[0];
    assert_eq!(a["title"], "New A");
    assert_eq!(a["contactID"], "orcid:1");
    assert_eq!(a["x_url"], "https://a.example/hapi");
    assert!(a.get("HAPI").is_none());
    assert!(a.get("status").is_none());
    assert!(a["x_LastUpdate"].is_string());
    assert!(a["x_LastChange"].is_string());

    let b = &list[1];
    assert_eq!(b["title"], "B");
    assert!(b["x_LastUpdateError"].as_str().unwrap().contains("503"));
    assert!(b["x_LastUpdateAttempt"].is_string());
    assert!(b.get("x_LastUpdate").is_none());

    let all = fs::read_to_string(env.servers_path("all.txt")).unwrap();
    assert_eq!(all, "https://a.example/hapi\nhttps://b.example/hapi\n");
    let all_ = fs::read_to_string(env.servers_path("all_.txt")).unwrap();
    assert!(all_.starts_with("https://a.example/hapi, New A, A, a@x, orcid:1\n"));

    assert!(env.data_path("about/A.json").exists());
    let changes = env.read(&env.data_path("changes/abouts.json"));
    assert_eq!(changes["updated"], 1);
    assert_eq!(changes["entries"][0]["changes"][0]["path"], "/title");
}

#[test]
fn second_run_without_changes_only_touches_bookkeeping() {
    let (env, fleet) = setup();
    abouts::run(&env.settings, &AboutsOptions::default(), &fleet).unwrap();
    let first = env.read(&env.servers_path("abouts.json"));
    fs::remove_file(env.servers_path("all.txt")).unwrap();

    let report = abouts::run(&env.settings, &AboutsOptions::default(), &fleet).unwrap();
    assert_eq!((report.unchanged, report.updated, report.failed), (1, 0, 1));
    assert!(!env.servers_path("all.txt").exists());

    let second = env.read(&env.servers_path("abouts.json"));
    assert_eq!(second[0]["title"], first[0]["title"]);
    assert_eq!(second[0]["x_LastChange"], first[0]["x_LastChange"]);
}

#[test]
fn server_filter_leaves_other_entries_alone() {
    let (mut env, fleet) = setup();
    env.settings.servers = Some(vec!["B".into()]);
    abouts::run(&env.settings, &AboutsOptions::default(), &fleet).unwrap();

    assert_eq!(fleet.calls(), vec![B_ABOUT.to_string()]);
    let list = env.read(&env.servers_path("abouts.json"));
    assert_eq!(list[0]["title"], "Old A");
    assert!(list[0].get("x_LastUpdate").is_none());
}

#[test]
fn separate_output_file() {
    let (env, fleet) = setup();
    let opts = AboutsOptions {
        file: "abouts.json".into(),
        out: Some("abouts.updated.json".into()),
    };
    abouts::run(&env.settings, &opts, &fleet).unwrap();

    let original = env.read(&env.servers_path("abouts.json"));
    assert_eq!(original[0]["title"], "Old A");
    let updated = env.read(&env.servers_path("abouts.updated.json"));
    assert_eq!(updated[0]["title"], "New A");
}

#[test]
fn hapi_error_status_is_a_failure() {
    let (env, fleet) = setup();
    fleet.ok(
        A_ABOUT,
        json!({"HAPI": "3.2", "status": {"code": 1500, "message": "Internal server error"}}),
    );
    let report = abouts::run(&env.settings, &AboutsOptions::default(), &fleet).unwrap();
    assert_eq!(report.failed, 2);

    let list = env.read(&env.servers_path("abouts.json"));
    assert_eq!(list[0]["title"], "Old A");
    assert_eq!(list[0]["x_LastUpdateError"], "HAPI status 1500 Internal server error");
}
