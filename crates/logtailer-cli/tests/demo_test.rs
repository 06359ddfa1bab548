use assert_cmd::cargo::cargo_bin_cmd;
use logtailer_testing::{TestWorld, assertions};
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_demo_captures_two_tabs_and_purges_closed_one() {
    let world = TestWorld::new().initialized();

    let demo = world.run(&["demo"]).unwrap();
    assert!(demo.success(), "stderr: {}", demo.stderr());
    assert!(demo.stdout().contains("Captured 9 entries across 2 tabs"));

    let export = world.run(&["export", "-o", "-"]).unwrap().json().unwrap();
    assertions::assert_tab_absent(&export, 3).unwrap();
    assert_eq!(export["1"].as_array().unwrap().len(), 6);
    assert_eq!(export["2"].as_array().unwrap().len(), 3);

    let tabs = world.run_json(&["tabs"]).unwrap().json().unwrap();
    assert_eq!(tabs[0]["title"], json!("Storefront - cart (1)"));
}

#[test]
fn test_demo_serializes_awkward_arguments() {
    let world = TestWorld::new().initialized();
    assert!(world.run(&["demo"]).unwrap().success());

    let debug = world
        .run_json(&["show", "1", "--level", "debug"])
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(
        debug[0]["message"],
        json!([
            "click handler",
            "[Function: onAddToCart]",
            { "items": ["sku-1138"], "owner": "[Circular]" }
        ])
    );

    let errors = world
        .run_json(&["show", "1", "--level", "error"])
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(errors[0]["message"][1]["isError"], json!(true));
    assert_eq!(errors[0]["message"][1]["name"], json!("TypeError"));

    let admin = world.run_json(&["show", "2"]).unwrap().json().unwrap();
    assert_eq!(admin[1]["message"], json!([null, null, true]));
    assert_eq!(
        admin[2]["message"],
        json!(["session handle", "[Unserializable: Symbol(session)]"])
    );
    assert!(
        admin[0]["source"]
            .as_str()
            .unwrap()
            .contains("demo.rs")
    );
}

#[test]
fn test_demo_echo_writes_page_console_to_stderr() {
    let world = TestWorld::new().initialized();

    let mut cmd = cargo_bin_cmd!("logtailer");
    world.configure_command(&mut cmd).arg("demo").arg("--echo");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("[console.error] checkout failed"));
}

#[test]
fn test_memory_backend_does_not_persist() {
    let world = TestWorld::new();
    let init = world.run(&["init", "--backend", "memory"]).unwrap();
    assert!(init.stdout().contains("in-memory"));

    assert!(world.run(&["demo"]).unwrap().success());

    let tabs = world.run(&["tabs"]).unwrap();
    assert!(tabs.stdout().contains("No tabs with logs."));
}

#[test]
fn test_data_dir_from_environment() {
    let world = TestWorld::new();
    let env_dir = world.temp_dir().join("from-env");

    let mut cmd = cargo_bin_cmd!("logtailer");
    cmd.env("LOGTAILER_PATH", &env_dir).arg("init");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("from-env"));

    assert!(env_dir.join("config.toml").exists());
}

#[test]
fn test_no_command_prints_guidance() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("logtailer");
    world.configure_command(&mut cmd);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("logtailer init"));
}

#[test]
fn test_clear_requires_target() {
    let world = TestWorld::new().initialized();

    let mut cmd = cargo_bin_cmd!("logtailer");
    world.configure_command(&mut cmd).arg("clear");
    cmd.assert().failure();
}

#[test]
fn test_second_demo_run_gets_fresh_tabs() {
    let world = TestWorld::new().initialized();
    assert!(world.run(&["demo"]).unwrap().success());

    let second = world.run_json(&["demo"]).unwrap();
    assert!(second.success(), "stderr: {}", second.stderr());
    let ids: Vec<u64> = second.json().unwrap()["tabs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tab| tab["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(second.json().unwrap()["entries"], json!(18));

    let export = world.run(&["export", "-o", "-"]).unwrap().json().unwrap();
    assert_eq!(export["1"].as_array().unwrap().len(), 6);
    assert_eq!(export["3"].as_array().unwrap().len(), 6);
    assert_eq!(export["3"][5]["message"], json!(["cart updated", 1]));
}
