use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    Stdin,
    File(PathBuf),
    Literal(String),
}

impl PromptSource {
    /// `-` selects stdin; an existing file is read line by line; anything else
    /// is the prompt itself.
    pub fn detect(arg: &str) -> Self {
        if arg == "-" {
            PromptSource::Stdin
        } else if Path::new(arg).is_file() {
            PromptSource::File(PathBuf::from(arg))
        } else {
            PromptSource::Literal(arg.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("failed to read prompts from {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read prompt from standard input: {0}")]
    Stdin(#[source] std::io::Error),
}

/// Resolves a source to its prompts. Blank prompts are dropped, so the result
/// may be empty. File lines are kept as written apart from the line ending.
pub fn load_prompts(source: &PromptSource, stdin: impl Read) -> Result<Vec<String>, PromptError> {
    let prompts = match source {
        PromptSource::Literal(p) => vec![p.trim().to_string()],
        PromptSource::Stdin => {
            let mut buf = String::new();
            let mut stdin = stdin;
            stdin.read_to_string(&mut buf).map_err(PromptError::Stdin)?;
            vec![buf.trim().to_string()]
        }
        PromptSource::File(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| PromptError::File {
                path: path.clone(),
                source,
            })?;
            content.lines().map(str::to_string).collect()
        }
    };
    Ok(prompts.into_iter().filter(|p| !p.trim().is_empty()).collect())
}
