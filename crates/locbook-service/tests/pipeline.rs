//! End-to-end tests: events and imports flowing into history and rendered files.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use locbook_service::{AppState, Config, api, commands, ingest};
use locbook_store::HistoryStore;
use locbook_types::Bucket;
use tower::ServiceExt;

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.history_path = dir.join("data").join("history.snapshot");
    config.output.heatmap_path = dir.join("map.js");
    config.output.live_geojson_path = dir.join("realtime.geojson");
    config
}

fn location(lon: f64, lat: f64, tst: i64, tid: &str) -> String {
    format!(
        r#"{{"_type":"location","lon":{},"lat":{},"tst":{},"tid":"{}"}}"#,
        lon, lat, tst, tid
    )
}

#[tokio::test]
async fn test_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let state = AppState::new(HistoryStore::new(), config.clone());
    for (i, (lon, lat)) in [(13.40495, 52.52003), (13.40504, 52.51996), (2.3522, 48.8566)]
        .into_iter()
        .enumerate()
    {
        let raw = location(lon, lat, 1_700_000_000 + i as i64 * 60, "phone1");
        ingest::handle(&state, raw.as_bytes()).await.unwrap();
    }
    let before = state.history.lock().await.clone();
    assert_eq!(before.size(), 2);
    assert_eq!(before.observation_count(), 3);

    let restored = HistoryStore::load(&config.storage.history_path).unwrap();
    assert_eq!(restored, before);

    // A restarted service keeps accumulating on top of the restored history.
    let state = AppState::new(restored, config.clone());
    ingest::handle(&state, location(13.405, 52.52, 1_700_100_000, "phone2").as_bytes())
        .await
        .unwrap();

    let history = state.history.lock().await;
    assert_eq!(history.weight(&Bucket::new(13.405, 52.52, 4)), 3);

    let js = std::fs::read_to_string(&config.output.heatmap_path).unwrap();
    assert!(js.contains("[52.52,13.405,3]"));
    assert!(js.contains("[48.8566,2.3522,1]"));
}

#[tokio::test]
async fn test_concurrent_posts_are_all_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(HistoryStore::new(), config_in(dir.path()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = api::router().with_state(Arc::clone(&state));
        handles.push(tokio::spawn(async move {
            let body = location(13.40495, 52.52003, 1_700_000_000 + i, "phone1");
            let request = Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::from(body))
                .unwrap();
            app.oneshot(request).await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let history = state.history.lock().await;
    assert_eq!(history.size(), 1);
    assert_eq!(history.observation_count(), 16);

    let restored = HistoryStore::load(dir.path().join("data").join("history.snapshot")).unwrap();
    assert_eq!(restored, *history);
}

#[test]
fn test_import_then_export() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let records: Vec<String> = (0..250)
        .map(|i| {
            format!(
                r#"{{"timestampMs":"{}","latitudeE7":{},"longitudeE7":{}}}"#,
                1_700_000_000_000i64 + i * 3_600_000,
                525_200_000 + (i % 10) * 10_000,
                134_050_000
            )
        })
        .collect();
    let export = dir.path().join("Location History.json");
    std::fs::write(
        &export,
        format!(r#"{{"locations":[{}],"version":1}}"#, records.join(",")),
    )
    .unwrap();

    let mut history = HistoryStore::new();
    history.add(Bucket::new(13.405, 52.52, 4), "2020-01-01", "12-00-00");
    let size_before = history.size();
    let observations_before = history.observation_count();

    let count = commands::import_google(&mut history, &config, &export).unwrap();
    assert_eq!(count, 250);
    assert_eq!(history.observation_count(), observations_before + 250);
    assert!(history.size() <= size_before + 250);
    assert_eq!(history.size(), 10);

    let out = dir.path().join("export.geojson");
    commands::export_geojson(&history, &out).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["features"].as_array().unwrap().len(), 10);

    let reloaded = HistoryStore::load(&config.storage.history_path).unwrap();
    assert_eq!(reloaded, history);
}
