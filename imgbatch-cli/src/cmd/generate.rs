use std::sync::Arc;
use std::time::Duration;

use imgbatch_core::{
    aggregate, parse_base_url, plan, ConfigError, GenerationConfig, GenerationFlags, PlanOptions,
    DEFAULT_BASE_URL,
};
use imgbatch_exec::executor::{
    CompositeEventSink, Coordinator, EventSink, HttpClient, ReqwestHttpClient, TaskExecutor,
    TracingEventSink, WorkerLimits,
};
use imgbatch_exec::record::{JsonlRecordSink, RecordSink};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::prompts::{load_prompts, PromptSource};
use crate::Cli;

use super::progress::ProgressEventSink;

const BASE_URL_ENV: &str = "IMGBATCH_BASE_URL";

#[derive(Serialize)]
struct GenerateResult {
    status: &'static str,
    total: usize,
    succeeded: usize,
    failed: usize,
}

pub async fn generate_cmd(cli: Cli) -> i32 {
    let format = cli.output.format;
    let narrate = format == OutputFormat::Text && !cli.output.quiet;

    let config = match build_config(&cli) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            print_error(format, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };

    let source = PromptSource::detect(&cli.prompt);
    if narrate {
        match &source {
            PromptSource::Stdin => eprintln!("Reading prompt from standard input..."),
            PromptSource::File(p) => eprintln!("Reading prompt from file: {}", p.display()),
            PromptSource::Literal(_) => {}
        }
    }
    let prompts = match load_prompts(&source, std::io::stdin().lock()) {
        Ok(p) => p,
        Err(e) => {
            print_error(format, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let options = PlanOptions {
        count: cli.batch.count,
        output: cli.batch.output.clone(),
    };
    let plan = match plan(&prompts, &options, config.clone()) {
        Ok(p) => p,
        Err(e) => {
            print_error(format, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };

    if narrate {
        if plan.is_batch() {
            eprintln!("Batch mode activated: Found {} prompts.", plan.prompt_count);
        }
        if plan.count > 1 {
            eprintln!("Count mode activated: Will generate {} images per prompt.", plan.count);
        }
    }

    if let Some(dir) = plan.output_dir.as_deref().filter(|_| config.save) {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            print_error(
                format,
                &format!("failed to create output directory {}: {e}", dir.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    }

    let records: Option<Arc<dyn RecordSink>> = match &config.log_file {
        Some(path) => match JsonlRecordSink::open(path).await {
            Ok(sink) => Some(Arc::new(sink)),
            Err(e) => {
                print_error(format, &e.to_string());
                return exit_codes::RUNTIME_ERROR;
            }
        },
        None => None,
    };

    let http: Arc<dyn HttpClient> = match ReqwestHttpClient::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            print_error(format, &format!("failed to create HTTP client: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let mut sinks = CompositeEventSink::new();
    sinks.add(Arc::new(TracingEventSink));
    if narrate {
        sinks.add(Arc::new(ProgressEventSink::new(plan.len())));
    }
    let event_sink: Arc<dyn EventSink> = Arc::new(sinks);

    let mut executor = TaskExecutor::new(http, event_sink.clone());
    if let Some(records) = records {
        executor = executor.with_records(records);
    }
    let coordinator = Coordinator::new(Arc::new(executor), event_sink)
        .with_limits(WorkerLimits::new(cli.batch.max_workers_cap));

    let outcomes = coordinator.run(plan.tasks, cli.batch.threads).await;
    let result = aggregate(&outcomes);

    if format == OutputFormat::Text {
        if !cli.output.quiet {
            if result.is_success() {
                println!(
                    "Generation finished. All {} images generated successfully.",
                    result.succeeded
                );
            } else {
                println!(
                    "Generation finished. {}/{} images generated successfully.",
                    result.succeeded, result.total
                );
            }
        }
    } else {
        let res = GenerateResult {
            status: if result.is_success() { "succeeded" } else { "failed" },
            total: result.total,
            succeeded: result.succeeded,
            failed: result.failed(),
        };
        print_result(format, cli.output.quiet, &res);
    }

    if result.is_success() {
        exit_codes::SUCCESS
    } else {
        exit_codes::RUN_FAILED
    }
}

fn build_config(cli: &Cli) -> Result<GenerationConfig, ConfigError> {
    let args = &cli.generation;
    let raw_base = args
        .base_url
        .clone()
        .or_else(|| std::env::var(BASE_URL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Ok(GenerationConfig {
        base_url: parse_base_url(&raw_base)?,
        model: args.model.clone(),
        size: args.size,
        seed: args.seed,
        flags: GenerationFlags {
            nologo: !args.logo,
            private: args.private,
            safe: args.safe,
            enhance: !args.no_enhance,
        },
        negative_prompt: args.negative.clone(),
        referrer: args.referrer.clone(),
        save: !cli.batch.no_save,
        retries: cli.retry.retries,
        retry_delay: Duration::from_secs(cli.retry.retry_delay),
        timeout: Duration::from_secs(cli.retry.timeout),
        log_file: cli.log.log_file.clone(),
    })
}
