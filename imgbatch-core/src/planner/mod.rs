mod naming;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::error::PlanError;

#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Copies generated per prompt.
    pub count: usize,
    /// Output file (single artifact) or directory (any run).
    pub output: Option<PathBuf>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            count: 1,
            output: None,
        }
    }
}

/// One unit of work. Immutable once planned.
#[derive(Debug, Clone)]
pub struct Task {
    pub index: usize,
    pub prompt_index: usize,
    pub repeat_index: usize,
    pub prompt: String,
    pub output: PathBuf,
    pub config: Arc<GenerationConfig>,
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub tasks: Vec<Task>,
    pub prompt_count: usize,
    pub count: usize,
    /// Directory the tasks write into, when one was requested for a
    /// multi-artifact run. It may not exist yet.
    pub output_dir: Option<PathBuf>,
}

impl Plan {
    pub fn is_batch(&self) -> bool {
        self.prompt_count > 1
    }

    pub fn is_multi(&self) -> bool {
        self.prompt_count > 1 || self.count > 1
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

pub fn plan(
    prompts: &[String],
    options: &PlanOptions,
    config: Arc<GenerationConfig>,
) -> Result<Plan, PlanError> {
    plan_with_rng(prompts, options, config, &mut fastrand::Rng::new())
}

/// Expands prompts × count into tasks, in prompt order then repeat order.
pub fn plan_with_rng(
    prompts: &[String],
    options: &PlanOptions,
    config: Arc<GenerationConfig>,
    rng: &mut fastrand::Rng,
) -> Result<Plan, PlanError> {
    if prompts.is_empty() {
        return Err(PlanError::EmptyPrompts);
    }
    if options.count == 0 {
        return Err(PlanError::ZeroCount);
    }

    let is_multi = prompts.len() > 1 || options.count > 1;
    let output = options.output.as_deref();

    let output_dir = match (is_multi, output) {
        (true, Some(path)) if is_file_target(path) => {
            return Err(PlanError::OutputIsFile(path.to_path_buf()));
        }
        (true, Some(path)) => Some(path.to_path_buf()),
        _ => None,
    };

    let mut tasks = Vec::with_capacity(prompts.len() * options.count);
    for (i, prompt) in prompts.iter().enumerate() {
        for j in 0..options.count {
            let dest = if is_multi {
                naming::under(output_dir.as_deref(), naming::multi(i, j, rng))
            } else {
                single_destination(output, rng)
            };
            let index = tasks.len();
            tasks.push(Task {
                index,
                prompt_index: i,
                repeat_index: j,
                prompt: prompt.clone(),
                output: dest,
                config: config.clone(),
            });
        }
    }

    Ok(Plan {
        tasks,
        prompt_count: prompts.len(),
        count: options.count,
        output_dir,
    })
}

fn single_destination(output: Option<&Path>, rng: &mut fastrand::Rng) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => naming::under(Some(path), naming::single(rng)),
        Some(path) => path.to_path_buf(),
        None => naming::under(None, naming::single(rng)),
    }
}

/// A path names a file when it is an existing non-directory, or when it does
/// not exist yet and its last component carries an extension.
fn is_file_target(path: &Path) -> bool {
    if path.exists() {
        return !path.is_dir();
    }
    path.extension().is_some()
}
