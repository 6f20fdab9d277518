//! End-to-end tests of the `stylist` binary against fake tools

#![cfg(unix)]

mod common;

use common::Sandbox;
use predicates::prelude::*;

const CPP_AND_PYTHON: &str = "tools:\n  clang-format:\n  black:\n";

#[test]
fn test_help_output() {
    let sandbox = Sandbox::new("", &[]);
    sandbox
        .stylist()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("format"))
        .stdout(predicate::str::contains("static-analysis"))
        .stdout(predicate::str::contains("clang-tidy"));
}

#[test]
fn test_selection_scenario() {
    let sandbox = Sandbox::new(
        r#"
tools:
  clang-format:
    include:
      match: ['.*\.cpp$']
    exclude:
      match: ['vendor/.*']
"#,
        &[("a.cpp", "int a;\n"), ("vendor/b.cpp", "int b;\n"), ("c.py", "c = 1\n")],
    );
    sandbox.fake_tool("clang-format", "14.0.6", "exit 0");

    sandbox.stylist().args(["-q", "format"]).assert().code(0);
    assert_eq!(sandbox.calls("clang-format"), vec!["-i a.cpp"]);
}

#[test]
fn test_version_mismatch_names_both_versions() {
    let sandbox = Sandbox::new(
        "tools:\n  clang-format:\n    version: '>=7,<8'\n",
        &[("a.cpp", "int a;\n")],
    );
    sandbox.fake_tool("clang-format", "8.0.1", "exit 0");

    sandbox
        .stylist()
        .args(["-q", "format"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(">=7,<8"))
        .stdout(predicate::str::contains("8.0.1"));
    assert!(sandbox.calls("clang-format").is_empty());
}

#[test]
fn test_one_violating_tool_is_the_only_one_reported() {
    let sandbox = Sandbox::new(
        CPP_AND_PYTHON,
        &[("a.cpp", "int a;\n"), ("b.py", "b = 1   \n")],
    );
    sandbox.fake_tool("clang-format", "14.0.6", "exit 0");
    sandbox.fake_formatter("black", "23.1.0", "--check");

    sandbox
        .stylist()
        .args(["-q", "format", "-n"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("black"))
        .stdout(predicate::str::contains("b.py"))
        .stdout(predicate::str::contains("clang-format").not());
}

#[test]
fn test_check_mode_does_not_modify_files() {
    let sandbox = Sandbox::new(
        "tools:\n  black:\n",
        &[("pkg/a.py", "a = 1  \n"), ("pkg/b.py", "b = 2\n")],
    );
    sandbox.fake_formatter("black", "23.1.0", "--check");

    let before = sandbox.tree_hash();
    sandbox.stylist().args(["-q", "format", "--dry-run"]).assert().code(1);
    assert_eq!(sandbox.tree_hash(), before);
    assert_eq!(sandbox.calls("black"), vec!["--check pkg/a.py pkg/b.py"]);
}

#[test]
fn test_format_is_idempotent() {
    let sandbox = Sandbox::new("tools:\n  black:\n", &[("a.py", "a = 1  \nb = 2\t\n")]);
    sandbox.fake_formatter("black", "23.1.0", "--check");

    sandbox.stylist().args(["-q", "format"]).assert().code(0);
    assert_eq!(sandbox.read("a.py"), "a = 1\nb = 2\n");
    let once = sandbox.tree_hash();

    sandbox.stylist().args(["-q", "format"]).assert().code(0);
    assert_eq!(sandbox.tree_hash(), once);

    // and the result now passes the check
    sandbox.stylist().args(["-q", "format", "-n"]).assert().code(0);
}

#[test]
fn test_disabled_tool_is_never_invoked() {
    let sandbox = Sandbox::new(
        "tools:\n  clang-format:\n  black:\n    enable: false\n",
        &[("a.cpp", "int a;\n"), ("b.py", "b = 1   \n")],
    );
    sandbox.fake_tool("clang-format", "14.0.6", "exit 0");
    sandbox.fake_formatter("black", "23.1.0", "--check");

    let output = sandbox
        .stylist()
        .args(["--json", "format"])
        .assert()
        .code(0)
        .get_output()
        .stdout
        .clone();

    assert!(sandbox.calls("black").is_empty());
    assert_eq!(sandbox.read("b.py"), "b = 1   \n");

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let tools = report["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["tool"], "clang-format");
    assert_eq!(tools[0]["state"], "succeeded");
    assert_eq!(tools[0]["invocations"], 1);
}

#[test]
fn test_json_report_lists_violations() {
    let sandbox = Sandbox::new("tools:\n  flake8:\n", &[("src/m.py", "import os\n")]);
    sandbox.fake_tool("flake8", "6.0.0", "echo \"$@\"; exit 1");

    let output = sandbox
        .stylist()
        .args(["--json", "static-analysis"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["task"], "static-analysis");
    assert_eq!(report["mode"], "check");
    assert_eq!(report["tools"][0]["state"], "violated");
    assert_eq!(report["tools"][0]["violations"][0], "src/m.py");
}

#[test]
fn test_clang_tidy_gets_compilation_database() {
    let sandbox = Sandbox::new("tools:\n  clang-tidy:\n", &[("src/a.cpp", "int a;\n")]);
    std::fs::create_dir_all(sandbox.root().join("build")).unwrap();
    sandbox.fake_tool("clang-tidy", "15.0.7", "exit 0");

    sandbox
        .stylist()
        .args(["-q", "clang-tidy", "-p", "build"])
        .assert()
        .code(0);
    let calls = sandbox.calls("clang-tidy");
    assert_eq!(calls.len(), 1);
    let build = sandbox.root().canonicalize().unwrap().join("build");
    assert_eq!(calls[0], format!("-p {} src/a.cpp", build.display()));
}

#[test]
fn test_paths_restrict_the_run() {
    let sandbox = Sandbox::new(
        "tools:\n  clang-format:\n",
        &[("lib/a.cpp", "int a;\n"), ("app/b.cpp", "int b;\n")],
    );
    sandbox.fake_tool("clang-format", "14.0.6", "exit 0");

    sandbox.stylist().args(["-q", "format", "app"]).assert().code(0);
    assert_eq!(sandbox.calls("clang-format"), vec!["-i app/b.cpp"]);
}

#[test]
fn test_language_filter() {
    let sandbox = Sandbox::new(CPP_AND_PYTHON, &[("a.cpp", "int a;\n"), ("b.py", "b = 1\n")]);
    sandbox.fake_tool("clang-format", "14.0.6", "exit 0");
    sandbox.fake_tool("black", "23.1.0", "exit 0");

    sandbox
        .stylist()
        .args(["-q", "format", "--lang", "python"])
        .assert()
        .code(0);
    assert!(sandbox.calls("clang-format").is_empty());
    assert_eq!(sandbox.calls("black"), vec!["b.py"]);
}

#[test]
fn test_unsupported_language_is_a_usage_error() {
    let sandbox = Sandbox::new(CPP_AND_PYTHON, &[]);
    sandbox
        .stylist()
        .args(["clang-tidy", "--lang", "python"])
        .assert()
        .failure();
    sandbox
        .stylist()
        .args(["static-analysis", "--lang", "cmake"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not support"));
}

#[test]
fn test_invalid_configuration_exits_2() {
    let sandbox = Sandbox::new("tools:\n  black:\n    version: '>=x'\n", &[("a.py", "")]);
    sandbox.fake_tool("black", "23.1.0", "exit 0");
    sandbox
        .stylist()
        .arg("format")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tools.black.version"));
    assert!(sandbox.calls("black").is_empty());
}

#[test]
fn test_missing_configuration_is_a_no_op() {
    let sandbox = Sandbox::new("", &[("a.cpp", "int a;\n")]);
    std::fs::remove_file(sandbox.root().join(".stylist.yaml")).unwrap();
    sandbox.fake_tool("clang-format", "14.0.6", "exit 0");

    sandbox
        .stylist()
        .arg("format")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("no configuration file found"));
    assert!(sandbox.calls("clang-format").is_empty());
}

#[test]
fn test_tools_command() {
    let sandbox = Sandbox::new("tools:\n  black:\n", &[]);
    sandbox.fake_tool("black", "23.1.0", "exit 0");

    let output = sandbox
        .stylist()
        .args(["--json", "tools"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let tools: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let tools = tools.as_array().unwrap();
    assert_eq!(tools.len(), 5);
    let black = tools.iter().find(|t| t["tool"] == "black").unwrap();
    assert_eq!(black["enabled"], true);
    assert_eq!(black["version"], "23.1.0");
    let tidy = tools.iter().find(|t| t["tool"] == "clang-tidy").unwrap();
    assert_eq!(tidy["enabled"], false);
    assert!(tidy["error"].is_string());
}

#[test]
fn test_completion() {
    let sandbox = Sandbox::new("", &[]);
    sandbox
        .stylist()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stylist"));
}
