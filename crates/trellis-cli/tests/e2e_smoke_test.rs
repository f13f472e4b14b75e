use std::fs;

use clap::Parser;

use trellis_cli::{Args, run};

fn args(extra: &[&str]) -> Args {
    let mut argv = vec!["trellis", "--log-level", "off"];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap()
}

#[test]
fn test_renders_every_blueprint_as_dot() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();

    run(&args(&["--format", "dot", "--output-dir", out])).unwrap();

    for file in [
        "mediacms_infrastructure.dot",
        "registration_flow.dot",
        "upload_flow.dot",
        "share_flow.dot",
    ] {
        let content = fs::read_to_string(dir.path().join(file)).unwrap();
        assert!(content.starts_with("digraph "), "{file} is not a DOT graph");
        assert!(content.trim_end().ends_with('}'));
    }
}

#[test]
fn test_renders_only_selected_blueprints() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();

    run(&args(&["upload", "-f", "dot", "-o", out])).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["upload_flow.dot"]);
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("missing.toml");

    let result = run(&args(&["-f", "dot", "-c", config.to_str().unwrap()]));
    assert!(result.is_err());
}

#[test]
fn test_list_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never");

    run(&args(&["--list", "-o", out.to_str().unwrap()])).unwrap();
    assert!(!out.exists());
}
