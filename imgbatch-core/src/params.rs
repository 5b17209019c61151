use std::ops::RangeInclusive;

use serde::Serialize;
use url::Url;

use crate::config::GenerationConfig;
use crate::error::ConfigError;

/// Random seeds always have between 5 and 8 decimal digits.
pub const SEED_RANGE: RangeInclusive<u64> = 10_000..=99_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Seed {
    Fixed(u64),
    Random(u64),
}

impl Seed {
    /// Uses the configured seed when present, otherwise draws one from [`SEED_RANGE`].
    pub fn resolve(config: &GenerationConfig, rng: &mut fastrand::Rng) -> Self {
        match config.seed {
            Some(s) => Seed::Fixed(s),
            None => Seed::Random(rng.u64(SEED_RANGE)),
        }
    }

    pub fn value(self) -> u64 {
        match self {
            Seed::Fixed(v) | Seed::Random(v) => v,
        }
    }
}

/// Boolean query parameters understood by the generation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFlag {
    NoLogo,
    Private,
    Safe,
    Enhance,
    /// Inert; always sent disabled.
    Json,
}

impl QueryFlag {
    pub const ALL: [QueryFlag; 5] = [
        QueryFlag::NoLogo,
        QueryFlag::Private,
        QueryFlag::Safe,
        QueryFlag::Enhance,
        QueryFlag::Json,
    ];

    pub fn key(self) -> &'static str {
        match self {
            QueryFlag::NoLogo => "nologo",
            QueryFlag::Private => "private",
            QueryFlag::Safe => "safe",
            QueryFlag::Enhance => "enhance",
            QueryFlag::Json => "json",
        }
    }

    pub fn encode(value: bool) -> &'static str {
        if value {
            "True"
        } else {
            "False"
        }
    }

    fn value_in(self, config: &GenerationConfig) -> bool {
        match self {
            QueryFlag::NoLogo => config.flags.nologo,
            QueryFlag::Private => config.flags.private,
            QueryFlag::Safe => config.flags.safe,
            QueryFlag::Enhance => config.flags.enhance,
            QueryFlag::Json => false,
        }
    }
}

/// A fully-specified generation request: endpoint, query, and the seed it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub url: Url,
    pub seed: Seed,
}

impl GenerationRequest {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

pub fn build_request(
    prompt: &str,
    config: &GenerationConfig,
    seed: Seed,
) -> Result<GenerationRequest, ConfigError> {
    let encoded: String = url::form_urlencoded::byte_serialize(prompt.as_bytes()).collect();
    let mut url = config
        .base_url
        .join(&encoded)
        .map_err(|e| ConfigError::RequestUrl(e.to_string()))?;

    {
        let mut q = url.query_pairs_mut();
        q.append_pair("model", &config.model);
        q.append_pair("width", &config.size.width.to_string());
        q.append_pair("height", &config.size.height.to_string());
        q.append_pair("seed", &seed.value().to_string());
        for flag in QueryFlag::ALL {
            q.append_pair(flag.key(), QueryFlag::encode(flag.value_in(config)));
        }
        q.append_pair("messages", "[]");
        q.append_pair("referrer", config.effective_referrer());
        if let Some(negative) = config.effective_negative_prompt() {
            q.append_pair("negative", negative);
        }
    }

    Ok(GenerationRequest { url, seed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_encoding_matches_api_form() {
        assert_eq!(QueryFlag::encode(true), "True");
        assert_eq!(QueryFlag::encode(false), "False");
    }

    #[test]
    fn prompt_is_escaped_into_the_path() {
        let cfg = GenerationConfig::default();
        let req = build_request("a cat/dog?", &cfg, Seed::Fixed(12345)).unwrap();
        assert_eq!(req.url.path(), "/prompt/a+cat%2Fdog%3F");
    }
}
