//! Config construction: builder defaults, validation, and JSON loading.

use pinscrape::{HarvestConfig, SortStrategy};
use tempfile::TempDir;

#[test]
fn builder_applies_documented_defaults() {
    let config = HarvestConfig::builder()
        .storage_dir("./downloads")
        .query("vintage posters")
        .build()
        .unwrap();

    assert_eq!(config.query(), "vintage posters");
    assert_eq!(config.min_score(), 500);
    assert_eq!(config.target_count(), 100);
    assert_eq!(config.sort(), SortStrategy::Relevance);
    assert!(!config.randomize_sort());
    assert_eq!(config.step_delay_bounds(), (1.0, 3.0));
    assert!(config.headless());
    assert_eq!(config.initial_scrolls(), 3);
    assert_eq!(config.rng_seed(), None);
    assert!(config.download_images());
    assert_eq!(
        config.history_file(),
        config.storage_dir().join(".harvest_history.json")
    );
    assert_eq!(config.report_file(), None);
}

#[test]
fn builder_overrides_stick() {
    let config = HarvestConfig::builder()
        .storage_dir("/tmp/harvest")
        .query("q")
        .min_score(1000)
        .target_count(5)
        .sort(SortStrategy::Popular)
        .randomize_sort(0.5)
        .step_delay_secs(0.0, 0.0)
        .headless(false)
        .rng_seed(42)
        .download_images(false)
        .history_file("/tmp/custom_history.json")
        .build()
        .unwrap();

    assert_eq!(config.min_score(), 1000);
    assert_eq!(config.target_count(), 5);
    assert_eq!(config.sort(), SortStrategy::Popular);
    assert!(config.randomize_sort());
    assert_eq!(config.randomize_sort_probability(), 0.5);
    assert_eq!(config.rng_seed(), Some(42));
    assert!(!config.headless());
    assert!(!config.download_images());
    assert_eq!(
        config.history_file(),
        std::path::PathBuf::from("/tmp/custom_history.json")
    );
}

#[test]
fn blank_query_is_rejected() {
    let result = HarvestConfig::builder()
        .storage_dir("./downloads")
        .query("   ")
        .build();
    assert!(result.is_err());
}

#[test]
fn zero_target_is_rejected() {
    let result = HarvestConfig::builder()
        .storage_dir("./downloads")
        .query("q")
        .target_count(0)
        .build();
    assert!(result.is_err());
}

#[test]
fn out_of_range_probability_is_rejected() {
    let result = HarvestConfig::builder()
        .storage_dir("./downloads")
        .query("q")
        .randomize_sort(1.5)
        .build();
    assert!(result.is_err());
}

#[test]
fn inverted_delay_bounds_are_rejected() {
    let result = HarvestConfig::builder()
        .storage_dir("./downloads")
        .query("q")
        .step_delay_secs(3.0, 1.0)
        .build();
    assert!(result.is_err());
}

#[tokio::test]
async fn json_file_loads_with_partial_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    tokio::fs::write(
        &path,
        r#"{
            "storage_dir": "./out",
            "query": "mid century chairs",
            "min_score": 2000,
            "sort": "latest"
        }"#,
    )
    .await
    .unwrap();

    let config = HarvestConfig::from_json_file(&path).await.unwrap();
    assert_eq!(config.query(), "mid century chairs");
    assert_eq!(config.min_score(), 2000);
    assert_eq!(config.sort(), SortStrategy::Latest);
    // Unspecified fields keep their defaults.
    assert_eq!(config.target_count(), 100);
    assert!(config.headless());
}

#[tokio::test]
async fn json_file_without_query_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    tokio::fs::write(&path, r#"{"storage_dir": "./out"}"#)
        .await
        .unwrap();
    assert!(HarvestConfig::from_json_file(&path).await.is_err());
}

#[tokio::test]
async fn missing_and_malformed_files_are_errors() {
    let dir = TempDir::new().unwrap();
    assert!(
        HarvestConfig::from_json_file(dir.path().join("nope.json"))
            .await
            .is_err()
    );

    let path = dir.path().join("config.json");
    tokio::fs::write(&path, "{not json").await.unwrap();
    assert!(HarvestConfig::from_json_file(&path).await.is_err());
}
