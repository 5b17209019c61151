mod support;

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use imgbatch_core::{aggregate, plan, PlanOptions, TaskOutcome};
use imgbatch_exec::executor::{Coordinator, Event, NoOpEventSink, TaskExecutor, WorkerLimits};
use support::{config, Failure, RecordingEventSink, ScriptedHttpClient};

fn prompts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("prompt number {i}")).collect()
}

fn sorted(mut outcomes: Vec<TaskOutcome>) -> Vec<TaskOutcome> {
    outcomes.sort_by_key(|o| o.task_index);
    outcomes
}

fn coordinator(http: Arc<ScriptedHttpClient>, events: Arc<RecordingEventSink>) -> Coordinator {
    let executor = Arc::new(TaskExecutor::new(http, events.clone()));
    Coordinator::new(executor, events)
}

#[tokio::test(start_paused = true)]
async fn returns_one_outcome_per_task_for_one_and_two_workers() {
    for workers in [1, 2] {
        for n in [1, 2, 5, 9] {
            let http = Arc::new(ScriptedHttpClient::always_ok());
            let c = coordinator(http, Arc::new(RecordingEventSink::default()));
            let plan = plan(&prompts(n), &PlanOptions::default(), config(0, false)).unwrap();

            let outcomes = c.run(plan.tasks, workers).await;

            assert_eq!(outcomes.len(), n, "workers={workers} n={n}");
            let indices: HashSet<usize> = outcomes.iter().map(|o| o.task_index).collect();
            assert_eq!(indices.len(), n);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_two_requests_in_flight() {
    let http = Arc::new(ScriptedHttpClient::always_ok().with_latency(Duration::from_millis(100)));
    let c = coordinator(http.clone(), Arc::new(RecordingEventSink::default()));
    let plan = plan(&prompts(8), &PlanOptions::default(), config(0, false)).unwrap();

    let outcomes = c.run(plan.tasks, 16).await;

    assert_eq!(outcomes.len(), 8);
    assert_eq!(http.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn requesting_more_than_cap_matches_requesting_cap() {
    let run = |workers: usize| async move {
        let http = Arc::new(ScriptedHttpClient::new(1, Failure::Status(500)));
        let c = coordinator(http, Arc::new(RecordingEventSink::default()));
        let plan = plan(&prompts(4), &PlanOptions::default(), config(2, false)).unwrap();
        sorted(c.run(plan.tasks, workers).await)
    };

    assert_eq!(run(2).await, run(7).await);
}

#[tokio::test(start_paused = true)]
async fn clamping_is_reported_but_not_an_error() {
    let events = Arc::new(RecordingEventSink::default());
    let c = coordinator(Arc::new(ScriptedHttpClient::always_ok()), events.clone());
    let plan = plan(&prompts(3), &PlanOptions::default(), config(0, false)).unwrap();

    let outcomes = c.run(plan.tasks, 5).await;

    assert!(aggregate(&outcomes).is_success());
    let evs = events.snapshot();
    assert!(evs
        .iter()
        .any(|e| matches!(e, Event::WorkersClamped { requested: 5, effective: 2 })));
    assert!(evs
        .iter()
        .any(|e| matches!(e, Event::RunStarted { total_tasks: 3, workers: 2 })));
    assert!(matches!(
        evs.last(),
        Some(Event::RunFinished { total: 3, succeeded: 3 })
    ));
}

#[tokio::test(start_paused = true)]
async fn single_task_runs_sequentially_even_with_two_workers() {
    let events = Arc::new(RecordingEventSink::default());
    let c = coordinator(Arc::new(ScriptedHttpClient::always_ok()), events.clone());
    let plan = plan(&prompts(1), &PlanOptions::default(), config(0, false)).unwrap();

    c.run(plan.tasks, 2).await;

    assert!(events
        .snapshot()
        .iter()
        .any(|e| matches!(e, Event::RunStarted { workers: 1, .. })));
}

#[tokio::test(start_paused = true)]
async fn configurable_cap_allows_more_workers() {
    let http = Arc::new(ScriptedHttpClient::always_ok().with_latency(Duration::from_millis(50)));
    let executor = Arc::new(TaskExecutor::new(http.clone(), Arc::new(NoOpEventSink)));
    let c = Coordinator::new(executor, Arc::new(NoOpEventSink)).with_limits(WorkerLimits::new(4));
    let plan = plan(&prompts(8), &PlanOptions::default(), config(0, false)).unwrap();

    c.run(plan.tasks, 4).await;

    assert_eq!(http.max_in_flight.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn panicking_attempts_are_retried_then_counted_as_failures() {
    for workers in [1, 2] {
        let http = Arc::new(ScriptedHttpClient::always_failing(Failure::Panic));
        let c = coordinator(http.clone(), Arc::new(RecordingEventSink::default()));
        let plan = plan(&prompts(3), &PlanOptions::default(), config(1, false)).unwrap();

        let outcomes = c.run(plan.tasks, workers).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| !o.succeeded && o.attempts == 2));
        assert_eq!(http.total_calls(), 6, "workers={workers}");
    }
}

#[tokio::test(start_paused = true)]
async fn single_task_run_does_not_report_clamping() {
    let events = Arc::new(RecordingEventSink::default());
    let c = coordinator(Arc::new(ScriptedHttpClient::always_ok()), events.clone());
    let plan = plan(&prompts(1), &PlanOptions::default(), config(0, false)).unwrap();

    let outcomes = c.run(plan.tasks, 5).await;

    assert!(aggregate(&outcomes).is_success());
    let evs = events.snapshot();
    assert!(!evs.iter().any(|e| matches!(e, Event::WorkersClamped { .. })));
    assert!(evs
        .iter()
        .any(|e| matches!(e, Event::RunStarted { total_tasks: 1, workers: 1 })));
}

#[tokio::test(start_paused = true)]
async fn always_failing_api_exhausts_retries_for_every_task() {
    let http = Arc::new(ScriptedHttpClient::always_failing(Failure::Status(500)));
    let c = coordinator(http.clone(), Arc::new(RecordingEventSink::default()));
    let plan = plan(&prompts(2), &PlanOptions::default(), config(2, false)).unwrap();

    let outcomes = c.run(plan.tasks, 2).await;

    let result = aggregate(&outcomes);
    assert_eq!(result.total, 2);
    assert_eq!(result.succeeded, 0);
    assert_eq!(http.total_calls(), 6);
    assert!(outcomes.iter().all(|o| o.attempts == 3));
}
