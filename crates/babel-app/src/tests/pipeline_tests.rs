use std::sync::atomic::Ordering;

use babel_types::{AppEvent, CaptureRegion, ReadMode, Rect, ScreenRegion, SqlParams};
use serde_json::json;
use tokio::sync::broadcast;

use super::fakes::{harness, harness_with, session, test_config};
use crate::events::info::handle_get_info;
use crate::pipeline::{PipelineError, take_shot};

fn region(x: i32, y: i32, width: i32, height: i32) -> CaptureRegion {
    CaptureRegion {
        x,
        y,
        width,
        height,
    }
}

/// Every event sent so far, without waiting.
fn drain(rx: &mut broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

fn captured(events: &[AppEvent]) -> Vec<(String, Option<String>)> {
    events
        .iter()
        .filter_map(|event| match event {
            AppEvent::CapturedText { text, translated } => Some((text.clone(), translated.clone())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn full_pipeline_maps_recognizes_normalizes_and_translates() {
    let h = harness();
    let (events, mut rx) = broadcast::channel(32);
    h.ocr.set_text("こん\u{3000}にちは");

    let translated = take_shot(&h.state, &events, &session(1), region(10, 20, 100, 50))
        .await
        .unwrap();

    assert_eq!(translated, "EN-US:こんにちは");
    assert_eq!(
        *h.screen.captured.lock().unwrap(),
        vec![ScreenRegion {
            x: 10,
            y: 20,
            width: 100,
            height: 50
        }]
    );
    assert_eq!(h.ocr.journal(), vec!["create:jpn", "terminate:jpn"]);
    assert_eq!(
        captured(&drain(&mut rx)),
        vec![("こんにちは".to_string(), Some("EN-US:こんにちは".to_string()))]
    );
}

#[tokio::test]
async fn capture_is_offset_by_work_area_origin() {
    let h = harness_with(test_config(), Rect::new(0, 40, 1920, 1000));
    let (events, _rx) = broadcast::channel(32);

    take_shot(&h.state, &events, &session(1), region(10, 20, 100, 50))
        .await
        .unwrap();

    let captured = h.screen.captured.lock().unwrap();
    assert_eq!((captured[0].x, captured[0].y), (10, 60));
}

#[tokio::test]
async fn translation_failure_still_delivers_recognized_text() {
    let h = harness();
    let (events, mut rx) = broadcast::channel(32);
    h.ocr.set_text("猫");
    h.translator.fail.store(true, Ordering::SeqCst);

    let err = take_shot(&h.state, &events, &session(1), region(0, 0, 10, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Translation { .. }));
    assert_eq!(err.kind(), "translation");
    assert_eq!(err.recognized(), Some("猫"));
    assert_eq!(captured(&drain(&mut rx)), vec![("猫".to_string(), None)]);
    // The worker was torn down even though a later stage failed
    assert_eq!(h.ocr.active.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_recognition_skips_translation() {
    let h = harness();
    let (events, mut rx) = broadcast::channel(32);
    h.ocr.set_text(" \n ");

    let translated = take_shot(&h.state, &events, &session(1), region(0, 0, 10, 10))
        .await
        .unwrap();

    assert_eq!(translated, "");
    assert_eq!(h.translator.calls.load(Ordering::SeqCst), 0);
    assert!(drain(&mut rx).contains(&AppEvent::ShotStatus {
        status: "No text found".into(),
        capturing: false
    }));
}

#[tokio::test]
async fn negative_region_is_a_capture_error() {
    let h = harness();
    let (events, _rx) = broadcast::channel(32);

    let err = take_shot(&h.state, &events, &session(1), region(0, 0, -5, 10))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "capture");
    assert!(h.screen.captured.lock().unwrap().is_empty());
    assert!(h.ocr.journal().is_empty());
}

#[tokio::test]
async fn auto_save_stores_result_in_session_folder() {
    let mut config = test_config();
    config.pipeline.auto_save = true;
    let h = harness_with(config, Rect::new(0, 0, 800, 600));
    let (events, _rx) = broadcast::channel(32);

    let folder_id = h
        .state
        .store
        .write("INSERT INTO folders (title) VALUES ('Inbox')", SqlParams::None)
        .await
        .unwrap()
        .last_insert_rowid;
    h.ocr.set_text("犬");

    take_shot(&h.state, &events, &session(folder_id), region(0, 0, 10, 10))
        .await
        .unwrap();

    // Queue is FIFO: once this no-op lands the auto-save has too
    h.state
        .store
        .write("UPDATE folders SET title = title WHERE 0", SqlParams::None)
        .await
        .unwrap();

    let rows = h
        .state
        .store
        .read(
            ReadMode::All,
            "SELECT folder_id, source_text, deepl_translated FROM translations".into(),
            SqlParams::None,
        )
        .await
        .unwrap();
    assert_eq!(
        rows,
        json!([{ "folder_id": folder_id, "source_text": "犬", "deepl_translated": "EN-US:犬" }])
    );
}

#[tokio::test]
async fn get_info_reports_session_and_counters() {
    let h = harness();
    let (events, _rx) = broadcast::channel(32);

    let info = handle_get_info(&h.state).await.unwrap();
    assert!(info.as_str().unwrap().starts_with("No overlay open"));

    h.state.overlay().open(session(7), h.screen.work_area);
    take_shot(&h.state, &events, &session(7), region(0, 0, 10, 10))
        .await
        .unwrap();
    h.translator.fail.store(true, Ordering::SeqCst);
    let _ = take_shot(&h.state, &events, &session(7), region(0, 0, 10, 10)).await;

    let info = handle_get_info(&h.state).await.unwrap();
    let info = info.as_str().unwrap();
    assert!(info.contains("Current folder id: 7"));
    assert!(info.contains("Current source: Japanese (jpn / JA)"));
    assert!(info.contains("Shots: 2 (errors: 1)"));
}
