use crate::config::{CollectorConfig, ProvenanceConfig};
use crate::context::CiVariables;
use crate::hash::DigestConfig;
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

/// The required context fields of a typical push build.
pub fn required_vars() -> CiVariables {
    [
        ("repository", "org/repo"),
        ("ref", "refs/heads/main"),
        ("sha", "abc123"),
        ("run_id", "42"),
        ("job", "build"),
        ("workflow", "ci"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn finished_on() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 9, 15, 0).unwrap()
}

pub fn config_with_concurrency(concurrency: usize) -> ProvenanceConfig {
    ProvenanceConfig {
        collector: CollectorConfig {
            digest: DigestConfig::default(),
            concurrency: NonZeroUsize::new(concurrency).unwrap(),
        },
        ..ProvenanceConfig::default()
    }
}

pub fn write_artifact(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
