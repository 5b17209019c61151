use clap::Parser;

mod args;
mod cmd;
mod exit_codes;
mod logging;
mod output;
mod prompts;

pub use args::*;

/// Generate images in bulk from a remote generation API.
#[derive(Debug, Parser)]
#[command(name = "imgbatch", version, about = "Generate images using Pollinations AI")]
pub struct Cli {
    /// A prompt string, a path to a file with one prompt per line, or '-' to read stdin.
    pub prompt: String,
    #[command(flatten)]
    pub generation: GenerationArgs,
    #[command(flatten)]
    pub batch: BatchArgs,
    #[command(flatten)]
    pub retry: RetryArgs,
    #[command(flatten)]
    pub log: LogArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.output.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(cmd::generate::generate_cmd(cli));
    std::process::exit(exit_code);
}
