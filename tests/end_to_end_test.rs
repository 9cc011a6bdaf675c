use anyhow::Result;
use httpmock::prelude::*;
use image::{ImageFormat, Rgba, RgbaImage};
use map_watch::report::html;
use map_watch::{FailurePolicy, RunOutcome, UpdateStatus, WatchError, WatchSettings};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

const VALID_KEY: &str = "AIzaSyD-test_key_0123456789abcdefghij";

fn png(fill: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(60, 30, Rgba(fill));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn settings_in(dir: &Path, endpoint: String, key_variable: &str) -> WatchSettings {
    let mut settings = WatchSettings {
        registry_path: dir.join("images.json"),
        reference_dir: dir.join("old_images"),
        candidate_dir: dir.join("new_images"),
        env_file: dir.join(".env"),
        report_path: dir.join("image_comparison.html"),
        ..WatchSettings::default()
    };
    settings.api.endpoint = endpoint;
    settings.api.key_variable = key_variable.to_string();
    settings
}

fn write_key(dir: &Path, key_variable: &str, key: &str) {
    std::fs::write(dir.join(".env"), format!("{}={}\n", key_variable, key)).unwrap();
}

fn read_registry(dir: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(dir.join("images.json")).unwrap()).unwrap()
}

#[tokio::test]
async fn test_first_run_is_new_and_second_run_is_unchanged() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_STOCKHOLM";
    write_key(dir, key_variable, VALID_KEY);
    std::fs::write(
        dir.join("images.json"),
        r#"[{"lat": "59.33", "long": "18.06", "zoom": 17, "name": "Stockholm"}]"#,
    )?;

    let server = MockServer::start_async().await;
    let image = png([20, 120, 40, 255]);
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/staticmap")
                .query_param("zoom", "17")
                .query_param("size", "600x300")
                .query_param("maptype", "hybrid")
                .query_param("markers", "color:red|label:S|59.33,18.06")
                .query_param("key", VALID_KEY);
            then.status(200)
                .header("Content-Type", "image/png")
                .body(&image);
        })
        .await;

    let settings = settings_in(dir, server.url("/staticmap"), key_variable);

    // first run: no reference yet
    let RunOutcome::Completed(report) = map_watch::app::run(&settings).await? else {
        panic!("first run should complete");
    };
    assert_eq!(report.results.len(), 1);
    let first = &report.results[0];
    assert_eq!(first.name, "Stockholm");
    assert_eq!(first.location, "59.33, 18.06");
    assert_eq!(first.status, UpdateStatus::New);

    let reference_path = dir.join("old_images").join("59_33_18_06.jpg");
    assert_eq!(std::fs::read(&reference_path)?, image);
    assert!(dir.join("new_images").join("59_33_18_06.jpg").exists());

    let registry = read_registry(dir);
    let first_pull = registry[0]["last_pulled"].as_str().unwrap().to_string();
    assert!(registry[0].get("last_changed").is_none());
    assert_eq!(registry[0]["zoom"], 17);

    // second run: same image from the API
    let RunOutcome::Completed(report) = map_watch::app::run(&settings).await? else {
        panic!("second run should complete");
    };
    assert_eq!(report.results[0].status, UpdateStatus::Unchanged);
    assert_eq!(std::fs::read(&reference_path)?, image);

    let registry = read_registry(dir);
    assert!(registry[0].get("last_changed").is_none());
    assert!(registry[0]["last_pulled"].as_str().unwrap() >= first_pull.as_str());

    api_mock.assert_hits_async(2).await;

    // nothing changed, so no comparison page
    assert!(html::write_report(&settings.report_path, &report.results).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_changed_image_is_promoted_and_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_CHANGED";
    write_key(dir, key_variable, VALID_KEY);
    std::fs::write(
        dir.join("images.json"),
        r#"[{"lat": -1.0, "long": 2.0, "name": "Quarry"}]"#,
    )?;

    let before = png([0, 0, 0, 255]);
    let after = png([0, 0, 10, 255]);
    std::fs::create_dir_all(dir.join("old_images"))?;
    std::fs::write(dir.join("old_images").join("n1_0_2_0.jpg"), &before)?;

    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/staticmap")
                .query_param("zoom", "17")
                .query_param("markers", "color:red|label:S|-1.0,2.0");
            then.status(200)
                .header("Content-Type", "image/png")
                .body(&after);
        })
        .await;

    let settings = settings_in(dir, server.url("/staticmap"), key_variable);
    let RunOutcome::Completed(report) = map_watch::app::run(&settings).await? else {
        panic!("run should complete");
    };
    api_mock.assert_async().await;

    assert_eq!(report.results[0].status, UpdateStatus::Changed);
    assert_eq!(report.results[0].location, "-1.0, 2.0");
    assert_eq!(std::fs::read(dir.join("old_images").join("n1_0_2_0.jpg"))?, after);

    let registry = read_registry(dir);
    assert_eq!(registry[0]["last_changed"], registry[0]["last_pulled"]);
    assert_eq!(registry[0]["lat"], -1.0);

    let written = html::write_report(&settings.report_path, &report.results).await?;
    assert_eq!(written.as_deref(), Some(settings.report_path.as_path()));
    let page = std::fs::read_to_string(&settings.report_path)?;
    assert!(page.contains("Quarry (-1.0, 2.0)"));
    assert_eq!(page.matches("data:image/png;base64,").count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_key_aborts_before_any_request() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_ABSENT";
    std::fs::write(
        dir.join("images.json"),
        r#"[{"lat": "59.33", "long": "18.06", "name": "Stockholm"}]"#,
    )?;

    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/staticmap");
            then.status(200).body("unexpected");
        })
        .await;

    let settings = settings_in(dir, server.url("/staticmap"), key_variable);
    let err = map_watch::app::run(&settings).await.unwrap_err();

    assert!(matches!(err, WatchError::MissingApiKey { .. }));
    assert_eq!(
        std::fs::read_to_string(dir.join(".env"))?,
        format!("{}=<your_key_here>\n", key_variable)
    );
    assert_eq!(api_mock.hits_async().await, 0);
    assert!(!dir.join("old_images").exists());
    Ok(())
}

#[tokio::test]
async fn test_malformed_key_aborts_with_distinct_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_SHORT";
    write_key(dir, key_variable, "too-short");

    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/staticmap");
            then.status(200).body("unexpected");
        })
        .await;

    let settings = settings_in(dir, server.url("/staticmap"), key_variable);
    let err = map_watch::app::run(&settings).await.unwrap_err();

    assert!(matches!(err, WatchError::InvalidApiKey { .. }));
    assert!(err.user_friendly_message().starts_with("Invalid"));
    assert_eq!(api_mock.hits_async().await, 0);
    // registry is never touched when the key is bad
    assert!(!dir.join("images.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_registry_writes_template_and_skips_fetching() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_TEMPLATE";
    write_key(dir, key_variable, VALID_KEY);

    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/staticmap");
            then.status(200).body("unexpected");
        })
        .await;

    let settings = settings_in(dir, server.url("/staticmap"), key_variable);
    let outcome = map_watch::app::run(&settings).await?;

    assert!(matches!(outcome, RunOutcome::TemplateCreated(ref path) if path == &settings.registry_path));
    let registry = read_registry(dir);
    assert_eq!(registry.as_array().unwrap().len(), 2);
    assert_eq!(registry[0]["name"], "Location 1");
    assert_eq!(registry[1]["zoom"], 10);
    assert_eq!(api_mock.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_registry_reports_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_EMPTY";
    write_key(dir, key_variable, VALID_KEY);
    std::fs::write(dir.join("images.json"), "[]")?;

    let settings = settings_in(dir, "http://127.0.0.1:1/staticmap".to_string(), key_variable);
    let outcome = map_watch::app::run(&settings).await?;

    assert!(matches!(outcome, RunOutcome::NoLocations));
    assert!(!dir.join("old_images").exists());
    Ok(())
}

const TWO_LOCATIONS: &str = r#"[
    {"lat": "10", "long": "20", "name": "Rejected"},
    {"lat": "30", "long": "40", "name": "Accepted"}
]"#;

async fn mock_one_rejection(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/staticmap")
                .query_param("markers", "color:red|label:S|10,20");
            then.status(403).body("The provided API key is invalid.");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/staticmap")
                .query_param("markers", "color:red|label:S|30,40");
            then.status(200)
                .header("Content-Type", "image/png")
                .body(png([1, 2, 3, 255]));
        })
        .await;
}

#[tokio::test]
async fn test_failing_location_does_not_block_the_rest() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_PARTIAL";
    write_key(dir, key_variable, VALID_KEY);
    std::fs::write(dir.join("images.json"), TWO_LOCATIONS)?;

    let server = MockServer::start_async().await;
    mock_one_rejection(&server).await;

    let settings = settings_in(dir, server.url("/staticmap"), key_variable);
    let RunOutcome::Completed(report) = map_watch::app::run(&settings).await? else {
        panic!("run should complete");
    };

    let statuses: Vec<UpdateStatus> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![UpdateStatus::Failed, UpdateStatus::New]);
    assert!(report.results[0].detail.as_deref().unwrap().contains("403"));

    let registry = read_registry(dir);
    assert!(registry[0].get("last_pulled").is_none());
    assert!(registry[1].get("last_pulled").is_some());
    Ok(())
}

#[tokio::test]
async fn test_fail_fast_aborts_and_keeps_registry() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_FAIL_FAST";
    write_key(dir, key_variable, VALID_KEY);
    std::fs::write(dir.join("images.json"), TWO_LOCATIONS)?;

    let server = MockServer::start_async().await;
    mock_one_rejection(&server).await;

    let mut settings = settings_in(dir, server.url("/staticmap"), key_variable);
    settings.failure_policy = FailurePolicy::Abort;
    let err = map_watch::app::run(&settings).await.unwrap_err();

    assert!(matches!(err, WatchError::Api { status: 403, .. }));
    assert_eq!(std::fs::read_to_string(dir.join("images.json"))?, TWO_LOCATIONS);
    assert!(!dir.join("old_images").join("30_40.jpg").exists());
    Ok(())
}

#[tokio::test]
async fn test_registry_untouched_when_every_location_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    let key_variable = "MAP_WATCH_E2E_KEY_ALL_FAILED";
    write_key(dir, key_variable, VALID_KEY);
    std::fs::write(dir.join("images.json"), TWO_LOCATIONS)?;

    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/staticmap");
            then.status(403).body("The provided API key is invalid.");
        })
        .await;

    let settings = settings_in(dir, server.url("/staticmap"), key_variable);
    let RunOutcome::Completed(report) = map_watch::app::run(&settings).await? else {
        panic!("run should complete");
    };

    api_mock.assert_hits_async(2).await;
    assert_eq!(report.failed().count(), 2);
    assert!(!report.has_pulls());
    assert_eq!(std::fs::read_to_string(dir.join("images.json"))?, TWO_LOCATIONS);
    assert!(!dir.join("new_images").join("10_20.jpg").exists());
    Ok(())
}
