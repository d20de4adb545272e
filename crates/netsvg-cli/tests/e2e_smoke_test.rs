use std::{fs, path::PathBuf};

use tempfile::tempdir;

use netsvg_cli::{Args, run};

/// Collects all .toml files from a directory
fn collect_toml_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml"))
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demo graphs live at the workspace root, not inside the crate
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args_for(input: &PathBuf, output: &PathBuf, config: Option<&PathBuf>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: config.map(|path| path.to_string_lossy().to_string()),
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "").expect("Failed to write config");

    let valid_demos = collect_toml_files(demos_dir());
    assert!(!valid_demos.is_empty(), "No demo graphs found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_path = temp_dir
            .path()
            .join(format!("{}.svg", demo_path.file_stem().unwrap().to_string_lossy()));

        if let Err(e) = run(&args_for(demo_path, &output_path, Some(&config_path))) {
            failed_demos.push((demo_path.clone(), e));
            continue;
        }

        let svg = fs::read_to_string(&output_path).expect("Failed to read output");
        assert!(svg.starts_with("<svg"), "{} produced no SVG", demo_path.display());
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "").expect("Failed to write config");

    let error_demos = collect_toml_files(demos_dir().join("errors"));
    assert!(!error_demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir
            .path()
            .join(format!("error_{}.svg", demo_path.file_stem().unwrap().to_string_lossy()));

        if run(&args_for(demo_path, &output_path, Some(&config_path))).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert!(!output_path.exists(), "{} wrote output despite failing", demo_path.display());
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!("{} error demo(s) succeeded unexpectedly", unexpectedly_succeeded.len());
    }
}

#[test]
fn e2e_directed_curves_from_config() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("curves.toml");
    fs::write(
        &config_path,
        r##"
        [canvas]
        width = 220
        height = 200
        background = "#ffffff"

        [layout]
        directed_curves = true
        directed_curve_factor = 0.9

        [export]
        pretty = false
        illustrator_safe = false
        "##,
    )
    .expect("Failed to write config");

    let input = demos_dir().join("directed_curves.toml");
    let output = temp_dir.path().join("curves.svg");
    run(&args_for(&input, &output, Some(&config_path))).expect("Rendering failed");

    let svg = fs::read_to_string(&output).expect("Failed to read output");
    assert_eq!(svg.matches("<path").count(), 6);
    assert_eq!(svg.matches("<text").count(), 4);
    assert!(!svg.contains("<line"));
}

#[test]
fn e2e_missing_config_is_an_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_dir().join("ring.toml");
    let output = temp_dir.path().join("ring.svg");
    let config = temp_dir.path().join("absent.toml");

    assert!(run(&args_for(&input, &output, Some(&config))).is_err());
}
