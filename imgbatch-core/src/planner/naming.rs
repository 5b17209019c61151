use std::path::{Path, PathBuf};

const EXTENSION: &str = "jpeg";
const DISAMBIGUATOR_MAX: u32 = 1_000_000;

pub(super) fn multi(prompt_index: usize, repeat_index: usize, rng: &mut fastrand::Rng) -> String {
    format!(
        "prompt_{prompt_index}_count_{repeat_index}_{}.{EXTENSION}",
        rng.u32(0..=DISAMBIGUATOR_MAX)
    )
}

pub(super) fn single(rng: &mut fastrand::Rng) -> String {
    format!("image_{}.{EXTENSION}", rng.u32(0..=DISAMBIGUATOR_MAX))
}

pub(super) fn under(dir: Option<&Path>, file_name: String) -> PathBuf {
    match dir {
        Some(d) => d.join(file_name),
        None => PathBuf::from(file_name),
    }
}
