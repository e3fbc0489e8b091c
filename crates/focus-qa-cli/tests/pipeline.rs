//! Pipeline integration tests using synthetic images.
//!
//! Runs the full binary over generated images: scoring, strategies and the
//! calibrate-then-check workflow.

#![allow(clippy::unwrap_used, clippy::float_cmp, deprecated)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use focus_qa_core::ImageInfo;
use focus_qa_test_support::{write_png, SyntheticImageBuilder};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Create a temporary directory with the given synthetic images.
fn create_test_images(images: &[(&str, ImageInfo)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, info) in images {
        write_png(info, &dir.path().join(name)).unwrap();
    }
    dir
}

fn focus_qa(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("focus-qa").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir);
    cmd
}

fn jsonl(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn reference_corpus() -> TempDir {
    create_test_images(&[
        ("ref_checker.png", SyntheticImageBuilder::checkerboard(96, 96)),
        ("ref_fine.png", SyntheticImageBuilder::checkerboard_with_cell_size(96, 96, 2)),
        ("ref_bars.png", SyntheticImageBuilder::vertical_bars(96, 96, 3)),
        ("ref_hbars.png", SyntheticImageBuilder::horizontal_bars(96, 96, 6)),
    ])
}

// === Sharp / Blurry ===

#[test]
fn test_sharp_image_not_blurry() {
    let dir = create_test_images(&[("sharp.png", SyntheticImageBuilder::sharp_image())]);

    let output = focus_qa(dir.path()).arg(dir.path()).output().unwrap();
    let results = jsonl(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["status"], "scored");
    assert_eq!(results[0]["is_blurry"], false);
    assert!(results[0]["score"].as_f64().unwrap() > 90.0);
}

#[test]
fn test_flat_image_blurry() {
    let dir = create_test_images(&[("flat.png", SyntheticImageBuilder::blurry_image())]);

    let output = focus_qa(dir.path()).arg(dir.path()).output().unwrap();
    let results = jsonl(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(results[0]["is_blurry"], true);
    assert_eq!(results[0]["score"], 0.0);
}

#[test]
fn test_mixed_batch_reports_every_image() {
    let dir = create_test_images(&[
        ("a.png", SyntheticImageBuilder::sharp_image()),
        ("b.png", SyntheticImageBuilder::blurry_image()),
        ("c.png", SyntheticImageBuilder::vertical_bars(128, 128, 2)),
    ]);

    let output = focus_qa(dir.path()).arg(dir.path()).output().unwrap();
    let results = jsonl(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    let verdicts: Vec<bool> = results
        .iter()
        .map(|r| r["is_blurry"].as_bool().unwrap())
        .collect();
    assert_eq!(verdicts, vec![false, true, false]);
}

#[test]
fn test_blur_lowers_raw_scores() {
    let sharp = SyntheticImageBuilder::checkerboard_with_cell_size(128, 128, 16);
    let blurred = SyntheticImageBuilder::box_blurred(&sharp, 4);
    let dir = create_test_images(&[("1_sharp.png", sharp), ("2_blurred.png", blurred)]);

    let output = focus_qa(dir.path()).arg(dir.path()).output().unwrap();
    let results = jsonl(&output.stdout);

    let raw = |i: usize, key: &str| {
        results[i]["details"]["composite"]["raw"][key]
            .as_f64()
            .unwrap()
    };
    for key in ["laplacian", "gradient", "tenengrad"] {
        assert!(raw(1, key) < raw(0, key), "{key} should drop after blur");
    }
    assert!(results[1]["score"].as_f64().unwrap() <= results[0]["score"].as_f64().unwrap());
}

#[test]
fn test_corrupt_file_becomes_error_record() {
    let dir = create_test_images(&[("a_sharp.png", SyntheticImageBuilder::sharp_image())]);
    std::fs::write(dir.path().join("b_broken.png"), b"not a png").unwrap();

    let output = focus_qa(dir.path())
        .arg("--quiet")
        .arg(dir.path())
        .output()
        .unwrap();
    let results = jsonl(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["status"], "error");
    assert!(results[1]["path"].as_str().unwrap().ends_with("b_broken.png"));
    assert!(!results[1]["message"].as_str().unwrap().is_empty());
    assert!(results[1].get("score").is_none());
}

// === Patch Strategies ===

#[test]
fn test_patch_strategies_on_half_sharp() {
    let dir = create_test_images(&[("half.png", SyntheticImageBuilder::half_sharp(128, 128))]);

    let score_with = |strategy: &str| {
        let output = focus_qa(dir.path())
            .args(["--strategy", strategy])
            .arg(dir.path())
            .output()
            .unwrap();
        let results = jsonl(&output.stdout);
        assert_eq!(results[0]["strategy"], strategy);
        results[0].clone()
    };

    let average = score_with("average");
    let subject = score_with("subject-focus");
    let max = score_with("max-focus");

    let avg_score = average["score"].as_f64().unwrap();
    let subject_score = subject["score"].as_f64().unwrap();
    assert!(subject_score > avg_score, "{subject_score} <= {avg_score}");
    assert!(max["score"].as_f64().unwrap() >= subject_score);

    let patch = &average["details"]["patch"];
    assert_eq!(patch["patch_count"], 64);
    assert_eq!(patch["sharp_patch_count"], 32);
    assert_eq!(patch["min_focus"], 0.0);
    let map = patch["blur_map"].as_array().unwrap();
    assert_eq!(map.len(), 8);
    assert_eq!(map[0][7], 0.0);
    assert!(map[0][0].as_f64().unwrap() > 30.0);
}

#[test]
fn test_peak_focus_default_threshold() {
    let dir = create_test_images(&[("half.png", SyntheticImageBuilder::half_sharp(128, 128))]);

    let output = focus_qa(dir.path())
        .args(["--strategy", "peak-focus"])
        .arg(dir.path())
        .output()
        .unwrap();
    let results = jsonl(&output.stdout);

    assert_eq!(results[0]["algorithm"], "patch");
    assert_eq!(results[0]["threshold"], 75.0);
    assert_eq!(
        results[0]["score"],
        results[0]["details"]["patch"]["peak_focus"]
    );
}

#[test]
fn test_patch_too_small_for_grid_is_error_record() {
    let dir = create_test_images(&[("small.png", SyntheticImageBuilder::checkerboard(8, 8))]);

    let output = focus_qa(dir.path())
        .args(["--strategy", "median", "--grid-size", "16", "--quiet"])
        .arg(dir.path())
        .output()
        .unwrap();
    let results = jsonl(&output.stdout);

    assert_eq!(results[0]["status"], "error");
    assert_eq!(output.status.code(), Some(0));
}

// === Calibration ===

#[test]
fn test_calibrate_then_check() {
    let corpus = reference_corpus();
    let work = tempfile::tempdir().unwrap();
    let cal_path: PathBuf = work.path().join("cal.json");

    focus_qa(work.path())
        .args(["calibrate", "--quiet", "--output"])
        .arg(&cal_path)
        .arg(corpus.path())
        .assert()
        .success();
    assert!(cal_path.exists());

    let images = create_test_images(&[
        ("a_sharp.png", SyntheticImageBuilder::checkerboard(96, 96)),
        ("b_flat.png", SyntheticImageBuilder::uniform_gray(96, 96, 90)),
    ]);
    let output = focus_qa(work.path())
        .arg("--calibration")
        .arg(&cal_path)
        .arg(images.path())
        .output()
        .unwrap();
    let results = jsonl(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(results[0]["calibrated"], true);
    assert_eq!(results[0]["threshold"], 25.0);
    assert_eq!(results[1]["is_blurry"], true);
    for r in &results {
        let score = r["score"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score));
    }
}

#[test]
fn test_calibrate_stdout_is_camel_case_json() {
    let corpus = reference_corpus();

    let output = focus_qa(corpus.path())
        .args(["calibrate", "--quiet"])
        .arg(corpus.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["sampleSize"], 4);
    assert_eq!(stats["totalSamples"], 4);
    assert_eq!(stats["patchMode"], false);
    assert_eq!(stats["version"], "1.0");
    for measure in ["laplacian", "gradient", "tenengrad", "variance"] {
        let p5 = stats[measure]["p5"].as_f64().unwrap();
        let p95 = stats[measure]["p95"].as_f64().unwrap();
        assert!(p95 >= p5, "{measure}");
    }
}

#[test]
fn test_patch_calibration_with_composite_fails() {
    let corpus = reference_corpus();
    let cal_path = corpus.path().join("patch_cal.json");

    focus_qa(corpus.path())
        .args(["calibrate", "--quiet", "--patch-mode", "--grid-size", "4", "--output"])
        .arg(&cal_path)
        .arg(corpus.path())
        .assert()
        .success();

    let images = create_test_images(&[("a.png", SyntheticImageBuilder::sharp_image())]);

    focus_qa(corpus.path())
        .args(["--algorithm", "composite", "--calibration"])
        .arg(&cal_path)
        .arg(images.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("calibration"));

    let output = focus_qa(corpus.path())
        .args(["--strategy", "average", "--grid-size", "4", "--calibration"])
        .arg(&cal_path)
        .arg(images.path())
        .output()
        .unwrap();
    let results = jsonl(&output.stdout);
    assert_eq!(results[0]["calibrated"], true);
    assert_eq!(results[0]["status"], "scored");
}

#[test]
fn test_calibrate_empty_corpus_fails() {
    let dir = tempfile::tempdir().unwrap();

    focus_qa(dir.path())
        .args(["calibrate", "--quiet"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Calibration failed"));
}
