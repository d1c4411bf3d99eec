use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dinobot_training::checkpoint::{Checkpoint, CheckpointSink};
use serde::Serialize;

use crate::util::Output;

/// On-disk layout of a checkpoint.
#[derive(Debug, Serialize)]
struct CheckpointRecord<'a> {
    name: &'a str,
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    checkpoint: &'a Checkpoint<'a>,
}

/// Writes every checkpoint of a run to `<dir>/<name>.json`, replacing the previous one.
#[derive(Debug, Clone)]
pub struct CheckpointFile {
    name: String,
    path: PathBuf,
}

impl CheckpointFile {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            path: dir.join(format!("{name}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointSink for CheckpointFile {
    type Error = anyhow::Error;

    fn save(&mut self, checkpoint: &Checkpoint<'_>) -> Result<(), Self::Error> {
        let record = CheckpointRecord {
            name: &self.name,
            saved_at: Utc::now(),
            checkpoint,
        };
        Output::open(self.path.clone())?.write_json(&record)?;
        log::debug!("checkpoint written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use crate::util;

    use super::*;

    #[test]
    fn test_checkpoint_is_overwritten_wholesale() {
        let dir = env::temp_dir().join(format!("dinobot-checkpoint-{}", std::process::id()));
        let mut sink = CheckpointFile::new(&dir, "logistic-run");
        assert_eq!(sink.path(), dir.join("logistic-run.json"));

        let thetas = vec![vec![0.0, 1.0], vec![0.5, 1.5]];
        for iteration in [1, 2] {
            let checkpoint = Checkpoint {
                iteration,
                theta: &[1.0, 2.0],
                costs: &[-3.0],
                thetas: &thetas[..iteration],
            };
            sink.save(&checkpoint).unwrap();
        }

        let saved: serde_json::Value = util::read_json_file("checkpoint", sink.path()).unwrap();
        assert_eq!(saved["name"], "logistic-run");
        assert_eq!(saved["iteration"], 2);
        assert_eq!(saved["theta"], serde_json::json!([1.0, 2.0]));
        assert_eq!(saved["costs"], serde_json::json!([-3.0]));
        assert_eq!(saved["thetas"].as_array().map(Vec::len), Some(2));
        assert!(saved["saved_at"].is_string());

        fs::remove_dir_all(dir).unwrap();
    }
}
