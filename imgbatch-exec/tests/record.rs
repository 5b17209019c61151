mod support;

use std::sync::Arc;

use imgbatch_core::{GenerationConfig, Seed};
use imgbatch_exec::executor::{NoOpEventSink, TaskExecutor};
use imgbatch_exec::record::{GenerationRecord, JsonlRecordSink, RecordSink, RecordStatus};
use support::{task, Failure, ScriptedHttpClient};

fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn record_contains_prompt_destination_config_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("logs").join("gen.jsonl");
    let sink = JsonlRecordSink::open(&log).await.unwrap();

    let cfg = Arc::new(GenerationConfig {
        negative_prompt: Some("blurry".to_string()),
        ..Default::default()
    });
    let t = task(0, "a red barn", dir.path().join("barn.jpeg"), cfg);
    sink.append(&GenerationRecord::for_task(&t, Seed::Fixed(12345), RecordStatus::Success))
        .await
        .unwrap();

    let lines = read_lines(&log);
    assert_eq!(lines.len(), 1);
    let r = &lines[0];
    assert_eq!(r["prompt"], "a red barn");
    assert_eq!(r["model"], "flux");
    assert_eq!(r["width"], 1024);
    assert_eq!(r["height"], 1024);
    assert_eq!(r["seed"], 12345);
    assert_eq!(r["negative_prompt"], "blurry");
    assert_eq!(r["nologo"], true);
    assert_eq!(r["private"], false);
    assert_eq!(r["safe"], false);
    assert_eq!(r["enhance"], true);
    assert_eq!(r["status"], "success");
    assert!(r["output_file"].as_str().unwrap().ends_with("barn.jpeg"));
    assert!(r["timestamp"].is_string());
}

#[tokio::test]
async fn reopening_appends_instead_of_truncating() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("gen.jsonl");
    let t = task(0, "x", dir.path().join("x.jpeg"), Arc::new(GenerationConfig::default()));

    for status in [RecordStatus::Success, RecordStatus::Failure] {
        let sink = JsonlRecordSink::open(&log).await.unwrap();
        sink.append(&GenerationRecord::for_task(&t, Seed::Random(99999), status))
            .await
            .unwrap();
    }

    let lines = read_lines(&log);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["status"], "failure");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_never_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("gen.jsonl");
    let sink = Arc::new(JsonlRecordSink::open(&log).await.unwrap());
    let long_prompt = "x".repeat(64 * 1024);

    let mut handles = Vec::new();
    for i in 0..32 {
        let sink = sink.clone();
        let prompt = format!("{i}-{long_prompt}");
        let out = dir.path().join(format!("{i}.jpeg"));
        handles.push(tokio::spawn(async move {
            let t = task(i, &prompt, out, Arc::new(GenerationConfig::default()));
            sink.append(&GenerationRecord::for_task(&t, Seed::Fixed(10000), RecordStatus::Success))
                .await
                .unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let lines = read_lines(&log);
    assert_eq!(lines.len(), 32);
}

#[tokio::test(start_paused = true)]
async fn executor_logs_final_outcome_only() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("gen.jsonl");
    let sink = Arc::new(JsonlRecordSink::open(&log).await.unwrap());

    let http = Arc::new(ScriptedHttpClient::always_failing(Failure::Timeout));
    let executor = TaskExecutor::new(http, Arc::new(NoOpEventSink)).with_records(sink);
    let cfg = Arc::new(GenerationConfig {
        retries: 2,
        save: false,
        ..Default::default()
    });

    let outcome = executor
        .execute(&task(0, "fog", dir.path().join("fog.jpeg"), cfg))
        .await;

    assert!(!outcome.succeeded);
    let lines = read_lines(&log);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["status"], "failure");
    assert_eq!(lines[0]["prompt"], "fog");
}

#[tokio::test(start_paused = true)]
async fn panicking_attempt_still_produces_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("gen.jsonl");
    let sink = Arc::new(JsonlRecordSink::open(&log).await.unwrap());

    let http = Arc::new(ScriptedHttpClient::new(1, Failure::Panic));
    let executor = TaskExecutor::new(http.clone(), Arc::new(NoOpEventSink)).with_records(sink);
    let cfg = Arc::new(GenerationConfig {
        retries: 3,
        save: false,
        ..Default::default()
    });

    let outcome = executor
        .execute(&task(0, "static", dir.path().join("static.jpeg"), cfg))
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(http.total_calls(), 2);
    let lines = read_lines(&log);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["status"], "success");
}
