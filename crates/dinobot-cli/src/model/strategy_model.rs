use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dinobot_evaluator::policy::{PolicyFamily, StrategySource};
use serde::{Deserialize, Serialize};

use crate::util;

/// A trained strategy vector, persisted as `<models-dir>/<family>.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategyModel {
    pub family: PolicyFamily,
    pub trained_at: DateTime<Utc>,
    pub final_cost: f32,
    pub strategy: Vec<f32>,
}

/// Directory holding one [`StrategyModel`] per policy family.
#[derive(Debug, Clone)]
pub struct ModelDir {
    dir: PathBuf,
}

impl ModelDir {
    pub fn new<P>(dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { dir: dir.into() }
    }

    pub fn model_path(&self, family: PolicyFamily) -> PathBuf {
        self.dir.join(format!("{family}.json"))
    }

    pub fn read(&self, family: PolicyFamily) -> anyhow::Result<StrategyModel> {
        read_model_file(self.model_path(family))
    }
}

impl StrategySource for ModelDir {
    fn load_strategy(&self, family: PolicyFamily) -> Option<Vec<f32>> {
        let path = self.model_path(family);
        if !path.exists() {
            return None;
        }
        match self.read(family) {
            Ok(model) if model.family == family => {
                log::info!("loaded {family} strategy from {}", path.display());
                Some(model.strategy)
            }
            Ok(model) => {
                log::warn!(
                    "{} holds a {} strategy, expected {family}",
                    path.display(),
                    model.family
                );
                None
            }
            Err(err) => {
                log::warn!("{err:#}");
                None
            }
        }
    }
}

pub fn read_model_file<P>(path: P) -> anyhow::Result<StrategyModel>
where
    P: AsRef<Path>,
{
    util::read_json_file("strategy model", path)
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use crate::util::Output;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        env::temp_dir().join(format!("dinobot-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_model_path_is_family_specific() {
        let models = ModelDir::new("models");
        assert_eq!(
            models.model_path(PolicyFamily::Threshold),
            Path::new("models/threshold.json")
        );
        assert_eq!(
            models.model_path(PolicyFamily::Logistic),
            Path::new("models/logistic.json")
        );
    }

    #[test]
    fn test_missing_model_is_none() {
        let models = ModelDir::new(temp_dir("missing"));
        assert_eq!(models.load_strategy(PolicyFamily::Logistic), None);
    }

    #[test]
    fn test_saved_model_is_loaded_for_its_family_only() {
        let dir = temp_dir("saved");
        let models = ModelDir::new(&dir);
        let model = StrategyModel {
            family: PolicyFamily::Logistic,
            trained_at: Utc::now(),
            final_cost: -42.5,
            strategy: vec![74.8, -0.8, -0.95, 0.95],
        };
        Output::save_json(&model, Some(models.model_path(PolicyFamily::Logistic))).unwrap();

        assert_eq!(models.read(PolicyFamily::Logistic).unwrap(), model);
        assert_eq!(
            models.load_strategy(PolicyFamily::Logistic),
            Some(vec![74.8, -0.8, -0.95, 0.95])
        );
        assert_eq!(models.load_strategy(PolicyFamily::Threshold), None);

        // A file under the wrong name is not trusted.
        fs::copy(
            models.model_path(PolicyFamily::Logistic),
            models.model_path(PolicyFamily::Threshold),
        )
        .unwrap();
        assert_eq!(models.load_strategy(PolicyFamily::Threshold), None);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_corrupt_model_is_ignored() {
        let dir = temp_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let models = ModelDir::new(&dir);
        fs::write(models.model_path(PolicyFamily::Threshold), "{ not json").unwrap();
        assert_eq!(models.load_strategy(PolicyFamily::Threshold), None);
        fs::remove_dir_all(dir).unwrap();
    }
}
