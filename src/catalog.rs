//! Word catalog loading.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::models::{Catalog, Level, WordPair};
use crate::quiz::{QuizError, MIN_POOL_SIZE};

/// Word list shipped with the binary.
const BUNDLED_WORDS: &str = include_str!("../bundled/words.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read word list {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed word list")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate level id '{0}'")]
    DuplicateLevel(String),
}

impl Catalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_WORDS)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        for level in &catalog.levels {
            if !seen.insert(level.id.as_str()) {
                return Err(CatalogError::DuplicateLevel(level.id.clone()));
            }
        }

        info!(levels = catalog.levels.len(), "loaded word catalog");
        Ok(catalog)
    }

    pub fn level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Words of a level, provided there are enough distinct ones to build a quiz.
    pub fn pool_for(&self, id: &str) -> Result<&[WordPair], QuizError> {
        let level = self
            .level(id)
            .ok_or_else(|| QuizError::UnknownLevel(id.to_string()))?;

        let distinct = level
            .words
            .iter()
            .map(WordPair::key)
            .collect::<HashSet<_>>()
            .len();
        if distinct < MIN_POOL_SIZE {
            return Err(QuizError::NotEnoughWords {
                level: level.id.clone(),
                found: distinct,
                required: MIN_POOL_SIZE,
            });
        }

        Ok(&level.words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_is_usable() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.levels.is_empty());
        for level in &catalog.levels {
            assert!(catalog.pool_for(&level.id).is_ok(), "level {} too small", level.id);
        }
    }

    #[test]
    fn small_level_is_reported() {
        let catalog = Catalog::from_json(
            r#"{"levels":[{"id":"tiny","name":"Tiny","words":[
                {"en":"a","ja":"あ"},{"en":"b","ja":"い"},{"en":"B ","ja":"い"}]}]}"#,
        )
        .unwrap();

        match catalog.pool_for("tiny") {
            Err(QuizError::NotEnoughWords { found, required, .. }) => {
                assert_eq!(found, 2);
                assert_eq!(required, MIN_POOL_SIZE);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unknown_level_is_reported() {
        let catalog = Catalog::bundled().unwrap();
        assert!(matches!(
            catalog.pool_for("nope"),
            Err(QuizError::UnknownLevel(_))
        ));
    }

    #[test]
    fn duplicate_level_ids_are_rejected() {
        let result = Catalog::from_json(
            r#"{"levels":[{"id":"x","name":"One","words":[]},{"id":"x","name":"Two","words":[]}]}"#,
        );
        assert!(matches!(result, Err(CatalogError::DuplicateLevel(id)) if id == "x"));
    }

    #[test]
    fn malformed_catalog_fails() {
        assert!(matches!(
            Catalog::from_json("{\"levels\": 3}"),
            Err(CatalogError::Parse(_))
        ));
    }
}
