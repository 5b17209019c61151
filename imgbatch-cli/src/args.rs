use std::path::PathBuf;

use clap::Args;
use imgbatch_core::ImageSize;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct GenerationArgs {
    /// The model to use for generation.
    #[arg(long, short = 'm', default_value = imgbatch_core::DEFAULT_MODEL)]
    pub model: String,
    /// Image size in WxH format (e.g., 512x512).
    #[arg(long, short = 'S', default_value = "1024x1024", value_parser = parse_size)]
    pub size: ImageSize,
    /// Fixed seed. A random seed is drawn per image when omitted.
    #[arg(long, short = 's')]
    pub seed: Option<u64>,
    /// Add a logo to the image.
    #[arg(long)]
    pub logo: bool,
    /// Make the image private.
    #[arg(long)]
    pub private: bool,
    /// Enable safe mode.
    #[arg(long)]
    pub safe: bool,
    /// Disable prompt enhancement (enabled by default).
    #[arg(long)]
    pub no_enhance: bool,
    #[arg(long)]
    pub referrer: Option<String>,
    /// The negative prompt.
    #[arg(long, short = 'n')]
    pub negative: Option<String>,
    /// Generation API base URL. Falls back to IMGBATCH_BASE_URL.
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Output file, or directory when generating more than one image.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    /// Do not save the images to disk.
    #[arg(long)]
    pub no_save: bool,
    /// Number of images to generate per prompt.
    #[arg(long, short = 'c', default_value_t = 1)]
    pub count: usize,
    /// Concurrent workers for batch generation (capped by the service limit).
    #[arg(long, short = 't', default_value_t = 1)]
    pub threads: usize,
    #[arg(long, default_value_t = imgbatch_exec::DEFAULT_MAX_WORKERS, hide = true)]
    pub max_workers_cap: usize,
}

#[derive(Debug, Args, Clone)]
pub struct RetryArgs {
    /// Number of times to retry generation on failure.
    #[arg(long, short = 'r', default_value_t = 3)]
    pub retries: u32,
    /// Delay in seconds between retries.
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,
    /// Timeout for each API request in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
}

#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Append one JSON record per image to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[arg(long, short)]
    pub quiet: bool,
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_size(value: &str) -> Result<ImageSize, String> {
    value.parse::<ImageSize>().map_err(|e| e.to_string())
}
