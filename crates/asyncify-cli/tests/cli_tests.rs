//! End-to-end tests for the asyncify command line (argument parsing through
//! driver output).

use asyncify_cli::args::{CliArgs, Command};
use asyncify_cli::driver;
use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROJECT: &str = r#"{
  "modules": [{
    "name": "App",
    "types": [
      { "name": "IRepo", "kind": "interface",
        "methods": [{ "name": "Load", "returns": "int",
                      "params": [{ "name": "id", "type": "int" }] }] },
      { "name": "Repo", "kind": "class", "implements": ["IRepo"],
        "methods": [
          { "name": "Load", "returns": "int", "modifiers": ["public"],
            "params": [{ "name": "id", "type": "int" }],
            "body": [{ "return": { "call": { "target": "Repo.Fetch",
                                             "args": [{ "name": "id" }] } } }] },
          { "name": "Fetch", "returns": "int",
            "params": [{ "name": "id", "type": "int" }] },
          { "name": "FetchAsync", "returns": "Task<int>",
            "params": [{ "name": "id", "type": "int" }] }
        ] },
      { "name": "Client", "kind": "class",
        "methods": [{ "name": "Run",
          "body": [
            { "expr": { "call": { "target": "IRepo.Load", "receiver": { "name": "repo" },
                                  "args": [{ "literal": "7" }] } } }
          ] }] }
    ]
  }]
}"#;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> anyhow::Result<String> {
    let mut argv = vec!["asyncify"];
    argv.extend_from_slice(args);
    let args = CliArgs::try_parse_from(argv).unwrap();
    driver::run(&args)
}

#[test]
fn parses_convert_flags() {
    let args = CliArgs::try_parse_from([
        "asyncify",
        "convert",
        "app.json",
        "-m",
        "Repo.Load",
        "--scope",
        "declaring-module",
        "--counterpart",
        "name-only",
        "--no-rollback",
    ])
    .unwrap();
    let Command::Convert(convert) = args.command else {
        panic!("expected convert subcommand");
    };
    assert_eq!(convert.target.method, "Repo.Load");
    assert!(convert.options.no_rollback);
    let options = driver::load_options(&convert.options).unwrap();
    assert_eq!(
        options.search_scope,
        asyncify_refactor::SearchScope::DeclaringModule
    );
    assert_eq!(
        options.counterpart,
        asyncify_refactor::CounterpartPolicy::NameOnly
    );
    assert!(!options.rollback_on_abort);
}

#[test]
fn convert_prints_rewritten_project() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_file(temp_dir.path(), "app.json", PROJECT);

    let out = run(&["convert", project.to_str().unwrap(), "-m", "Repo.Load"]).unwrap();

    assert!(out.contains("    Task<int> LoadAsync(int id);"), "{out}");
    assert!(
        out.contains("    public async Task<int> LoadAsync(int id)"),
        "{out}"
    );
    assert!(out.contains("return await FetchAsync(id);"), "{out}");
    assert!(out.contains("repo.LoadAsync(7);"), "{out}");
}

#[test]
fn convert_report_is_json() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_file(temp_dir.path(), "app.json", PROJECT);

    let out = run(&[
        "convert",
        project.to_str().unwrap(),
        "-m",
        "Repo.Load",
        "--report",
    ])
    .unwrap();

    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["plan"].as_array().unwrap().len(), 2);
    assert_eq!(report["converted"][0]["old_name"], "Load");
    assert_eq!(report["rewritten"].as_array().unwrap().len(), 2);
}

#[test]
fn config_file_is_overridden_by_flags() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_file(temp_dir.path(), "app.json", PROJECT);
    let config = write_file(
        temp_dir.path(),
        "asyncify.json",
        r#"{ "async_suffix": "Later", "counterpart": "off" }"#,
    );

    let out = run(&[
        "convert",
        project.to_str().unwrap(),
        "-m",
        "Repo.Load",
        "-c",
        config.to_str().unwrap(),
        "--suffix",
        "Deferred",
    ])
    .unwrap();

    assert!(out.contains("LoadDeferred(int id)"), "{out}");
    assert!(!out.contains("LoadLater"), "{out}");
    assert!(out.contains("return Fetch(id);"), "counterpart off: {out}");
}

#[test]
fn plan_lists_conversion_order() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_file(temp_dir.path(), "app.json", PROJECT);

    let out = run(&["plan", project.to_str().unwrap(), "-m", "Repo.Load"]).unwrap();
    assert_eq!(out, "1. IRepo.Load\n2. Repo.Load\n");
}

#[test]
fn check_reports_availability() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_file(temp_dir.path(), "app.json", PROJECT);
    let path = project.to_str().unwrap();

    assert_eq!(
        run(&["check", path, "-m", "Repo.Load"]).unwrap(),
        "Repo.Load: available\n"
    );
    assert_eq!(
        run(&["check", path, "-m", "Repo.FetchAsync"]).unwrap(),
        "Repo.FetchAsync: not available\n"
    );
    let json: serde_json::Value =
        serde_json::from_str(&run(&["check", path, "-m", "Repo.FetchAsync", "--json"]).unwrap())
            .unwrap();
    assert_eq!(json["available"], false);
}

#[test]
fn check_honors_the_configured_task_type() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_file(
        temp_dir.path(),
        "app.json",
        r#"{ "modules": [{ "name": "App", "types": [
              { "name": "Cache", "kind": "class",
                "methods": [{ "name": "Get", "returns": "ValueTask<int>" }] } ] }] }"#,
    );
    let config = write_file(
        temp_dir.path(),
        "asyncify.json",
        r#"{ "task_type": "ValueTask" }"#,
    );
    let path = project.to_str().unwrap();

    assert_eq!(
        run(&["check", path, "-m", "Cache.Get"]).unwrap(),
        "Cache.Get: available\n"
    );
    assert_eq!(
        run(&["check", path, "-m", "Cache.Get", "--task-type", "ValueTask"]).unwrap(),
        "Cache.Get: not available\n"
    );
    assert_eq!(
        run(&["check", path, "-m", "Cache.Get", "-c", config.to_str().unwrap()]).unwrap(),
        "Cache.Get: not available\n"
    );
}

#[test]
fn errors_carry_context() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.json");
    let err = run(&["print", missing.to_str().unwrap()]).unwrap_err();
    assert!(
        format!("{err:#}").contains("failed to read project"),
        "{err:#}"
    );

    let project = write_file(temp_dir.path(), "app.json", PROJECT);
    let err = run(&["convert", project.to_str().unwrap(), "-m", "Repo.Nope"]).unwrap_err();
    assert!(format!("{err:#}").contains("cannot convert `Repo.Nope`"), "{err:#}");

    let err = run(&[
        "convert",
        project.to_str().unwrap(),
        "-m",
        "Repo.FetchAsync",
    ])
    .unwrap_err();
    assert!(format!("{err:#}").contains("already returns"), "{err:#}");
}
