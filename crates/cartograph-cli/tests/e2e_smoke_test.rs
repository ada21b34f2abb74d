use std::{fs, path::PathBuf};

use tempfile::tempdir;

use cartograph::layout::LayoutAlgorithm;
use cartograph_cli::{Args, run};

/// Workspace-level demos directory
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: &PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.clone(),
        output,
        config: None,
        algorithm: None,
        width: None,
        height: None,
        padding: None,
        no_connectors: false,
        seed: None,
        balance_branches: false,
        compact: false,
        metrics: false,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_json_files(demos_dir());

    assert!(!demos.is_empty(), "No demo specifications found in demos/");

    let mut failed = Vec::new();

    for demo in &demos {
        let output_filename = format!("{}.json", demo.file_stem().unwrap().to_string_lossy());
        let output_path = temp_dir.path().join(output_filename);

        if let Err(e) = run(&args(demo, output_path.clone())) {
            failed.push((demo.clone(), e.to_string()));
            continue;
        }

        let written = fs::read_to_string(&output_path).expect("layout was written");
        let layout: serde_json::Value = serde_json::from_str(&written).expect("layout is JSON");
        if layout["nodes"].as_array().is_none_or(Vec::is_empty) {
            failed.push((demo.clone(), "layout has no nodes".to_string()));
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }

    println!("✅ All {} demos passed", demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_json_files(demos_dir().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo in &error_demos {
        let output_filename = format!("error_{}.json", demo.file_stem().unwrap().to_string_lossy());
        let output_path = temp_dir.path().join(output_filename);

        if run(&args(demo, output_path.clone())).is_ok() {
            unexpectedly_succeeded.push(demo.clone());
        }
        assert!(!output_path.exists(), "{} left an output file", demo.display());
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!("✅ All {} error demos failed as expected", error_demos.len());
}

#[test]
fn e2e_overrides_and_config() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demo = demos_dir().join("flower.json");
    let output_path = temp_dir.path().join("flower.json");

    let mut overridden = args(&demo, output_path.clone());
    overridden.config = Some(demos_dir().join("config.toml"));
    overridden.width = Some(1200.0);
    overridden.algorithm = Some(LayoutAlgorithm::Radial);
    overridden.compact = true;
    let returned = run(&overridden).expect("layout with overrides");

    let written = fs::read_to_string(&output_path).unwrap();
    assert_eq!(written.lines().count(), 1);
    let layout: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(layout["algorithm_used"], "radial");
    assert_eq!(layout["nodes"].as_array().map(Vec::len), Some(13));
    assert_eq!(layout["performance_metrics"]["reserved_slots"], 1);
    assert_eq!(returned.algorithm_used, LayoutAlgorithm::Radial);

    let mut bare = args(&demo, temp_dir.path().join("bare.json"));
    bare.no_connectors = true;
    assert!(run(&bare).expect("layout without connectors").connectors.is_empty());

    let mut negative = args(&demo, temp_dir.path().join("unused.json"));
    negative.padding = Some(-1.0);
    assert!(run(&negative).is_err());

    let mut missing = args(&demo, temp_dir.path().join("unused.json"));
    missing.config = Some(PathBuf::from("no/such/config.toml"));
    assert!(run(&missing).is_err());
    assert!(!temp_dir.path().join("unused.json").exists());
}
