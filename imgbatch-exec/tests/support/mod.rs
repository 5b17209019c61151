#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use imgbatch_core::{GenerationConfig, Task};
use imgbatch_exec::executor::{Event, EventSink, HttpClient, HttpError, HttpResponse};
use url::Url;

/// Scripted generation API: each prompt fails `fail_first` times, then
/// succeeds. `fail_first = u32::MAX` never succeeds.
pub struct ScriptedHttpClient {
    fail_first: u32,
    failure: Failure,
    latency: Duration,
    calls: std::sync::Mutex<HashMap<String, u32>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

#[derive(Clone, Copy)]
pub enum Failure {
    Status(u16),
    Timeout,
    Panic,
}

impl ScriptedHttpClient {
    pub fn new(fail_first: u32, failure: Failure) -> Self {
        Self {
            fail_first,
            failure,
            latency: Duration::ZERO,
            calls: std::sync::Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn always_ok() -> Self {
        Self::new(0, Failure::Status(500))
    }

    pub fn always_failing(failure: Failure) -> Self {
        Self::new(u32::MAX, failure)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls_for(&self, path: &str) -> u32 {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn post(&self, url: Url, _timeout: Duration) -> Result<HttpResponse, HttpError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            let c = calls.entry(url.path().to_string()).or_insert(0);
            *c += 1;
            *c
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if n <= self.fail_first {
            return match self.failure {
                Failure::Status(s) => Ok(HttpResponse { status: s, body: vec![] }),
                Failure::Timeout => Err(HttpError::Timeout),
                Failure::Panic => panic!("simulated defect in attempt"),
            };
        }
        Ok(HttpResponse {
            status: 200,
            body: b"\xFF\xD8fake-jpeg".to_vec(),
        })
    }
}

#[derive(Default)]
pub struct RecordingEventSink {
    pub events: std::sync::Mutex<Vec<Event>>,
}

impl RecordingEventSink {
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn config(retries: u32, save: bool) -> Arc<GenerationConfig> {
    Arc::new(GenerationConfig {
        retries,
        retry_delay: Duration::from_secs(5),
        save,
        ..Default::default()
    })
}

pub fn task(index: usize, prompt: &str, output: PathBuf, config: Arc<GenerationConfig>) -> Task {
    Task {
        index,
        prompt_index: index,
        repeat_index: 0,
        prompt: prompt.to_string(),
        output,
        config,
    }
}
