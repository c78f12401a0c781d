use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::MovieId;

use super::SimilarityModel;

/// On-disk name of the model artifact
const ARTIFACT_FILE: &str = "item_similarity_model.json";

/// Persisted form of the model: the similarity matrix and its item index
/// live in one file so neither can exist without the other.
#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    movie_ids: Vec<MovieId>,
    matrix: Vec<Vec<f64>>,
}

/// Persists and loads the trained similarity model.
///
/// The storage directory is injected at construction; nothing is resolved
/// against the process working directory. Saves go through a temp file and
/// rename, so readers either see the previous artifact or the complete new
/// one, never a partial write.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn artifact_path(&self) -> PathBuf {
        self.dir.join(ARTIFACT_FILE)
    }

    pub fn save(&self, model: &SimilarityModel) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;

        let artifact = ModelArtifact {
            movie_ids: model.movie_ids().to_vec(),
            matrix: model.matrix().to_vec(),
        };

        let path = self.artifact_path();
        let tmp = path.with_extension("json.tmp");
        let writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(writer, &artifact)?;
        fs::rename(&tmp, &path)?;

        tracing::info!(
            path = %path.display(),
            num_items = model.num_items(),
            "Saved similarity model artifact"
        );
        Ok(())
    }

    /// Loads the persisted model, validating that matrix and item index
    /// still agree in shape.
    pub fn load(&self) -> AppResult<SimilarityModel> {
        let path = self.artifact_path();
        if !path.exists() {
            return Err(AppError::ModelUnavailable(format!(
                "no model artifact at {}",
                path.display()
            )));
        }

        let reader = BufReader::new(File::open(&path)?);
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        let model = SimilarityModel::new(artifact.matrix, artifact.movie_ids)?;

        tracing::info!(
            path = %path.display(),
            num_items = model.num_items(),
            "Loaded similarity model artifact"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> SimilarityModel {
        let matrix = vec![
            vec![1.0, 0.8, 0.1],
            vec![0.8, 1.0, 0.05],
            vec![0.1, 0.05, 1.0],
        ];
        SimilarityModel::new(matrix, vec![10, 20, 30]).unwrap()
    }

    #[test]
    fn test_save_then_load_round_trips_losslessly() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());

        let model = sample_model();
        store.save(&model).unwrap();
        let loaded = store.load().unwrap();

        // Exact float and ordering preservation
        assert_eq!(loaded.movie_ids(), model.movie_ids());
        assert_eq!(loaded.matrix(), model.matrix());
    }

    #[test]
    fn test_load_missing_artifact_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());

        assert!(matches!(
            store.load(),
            Err(AppError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_load_corrupt_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ARTIFACT_FILE), "not json").unwrap();

        let store = ModelStore::new(dir.path());
        assert!(store.load().is_err());
    }

    #[test]
    fn test_save_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());

        store.save(&sample_model()).unwrap();

        let smaller =
            SimilarityModel::new(vec![vec![1.0, 0.5], vec![0.5, 1.0]], vec![1, 2]).unwrap();
        store.save(&smaller).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.movie_ids(), &[1, 2]);
    }
}
