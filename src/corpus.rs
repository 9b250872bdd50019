//! Training corpus loading and validation.
//!
//! The corpus file is a JSON array of groups, each naming one routing
//! target and the prompts associated with it:
//!
//! ```json
//! [
//!   {"model": "fast", "prompts": ["hi", "yo"]},
//!   {"model": "smart", "prompts": ["explain quantum mechanics"]}
//! ]
//! ```

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// One labeled routing example after flattening the grouped source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub prompt: String,
    pub label: String,
}

/// A group in the corpus file: one routing target and its prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusGroup {
    pub model: String,
    pub prompts: Vec<String>,
}

/// Ordered sequence of training examples.
#[derive(Debug, Clone, Default)]
pub struct TrainingCorpus {
    examples: Vec<TrainingExample>,
}

impl TrainingCorpus {
    /// Loads and flattens the grouped corpus file. A missing file or a
    /// malformed/misskeyed document is a validation error; any other
    /// I/O failure propagates as a persistence error.
    pub fn load(path: &Path) -> Result<Self, RouterError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                RouterError::Validation(format!("file not found: {}", path.display()))
            } else {
                RouterError::persistence(path, e)
            }
        })?;
        let groups: Vec<CorpusGroup> = serde_json::from_str(&raw)
            .map_err(|e| RouterError::Validation(format!("invalid training data format: {e}")))?;

        let mut examples = Vec::new();
        for group in groups {
            for prompt in group.prompts {
                examples.push(TrainingExample {
                    prompt,
                    label: group.model.clone(),
                });
            }
        }
        Ok(Self { examples })
    }

    /// Checks the flattened corpus: at least one example, no blank
    /// prompt, no blank label. Fails fast so training never runs on
    /// partially valid data.
    pub fn validate(&self) -> Result<(), RouterError> {
        if self.examples.is_empty() {
            return Err(RouterError::Validation("training data is empty".to_string()));
        }
        if self.examples.iter().any(|e| e.prompt.trim().is_empty()) {
            return Err(RouterError::Validation(
                "training data contains empty prompts".to_string(),
            ));
        }
        if self.examples.iter().any(|e| e.label.trim().is_empty()) {
            return Err(RouterError::Validation(
                "training data contains empty labels".to_string(),
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    pub fn prompts(&self) -> Vec<&str> {
        self.examples.iter().map(|e| e.prompt.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.examples.iter().map(|e| e.label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_flattens_groups_in_order() {
        let file = write_corpus(
            r#"[
                {"model": "fast", "prompts": ["hi", "yo"]},
                {"model": "smart", "prompts": ["explain quantum mechanics"]}
            ]"#,
        );
        let corpus = TrainingCorpus::load(file.path()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.prompts(), vec!["hi", "yo", "explain quantum mechanics"]);
        assert_eq!(corpus.labels(), vec!["fast", "fast", "smart"]);
        corpus.validate().unwrap();
    }

    #[test]
    fn test_load_missing_file_is_validation_error() {
        let err = TrainingCorpus::load(Path::new("/nonexistent/training_data.json")).unwrap_err();
        assert!(matches!(err, RouterError::Validation(_)));
    }

    #[test]
    fn test_load_malformed_json_is_validation_error() {
        let file = write_corpus("{not json");
        let err = TrainingCorpus::load(file.path()).unwrap_err();
        assert!(matches!(err, RouterError::Validation(_)));
    }

    #[test]
    fn test_load_missing_grouping_key_is_validation_error() {
        let file = write_corpus(r#"[{"prompts": ["hi"]}]"#);
        let err = TrainingCorpus::load(file.path()).unwrap_err();
        assert!(matches!(err, RouterError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_empty_corpus() {
        let corpus = TrainingCorpus::default();
        assert!(matches!(corpus.validate(), Err(RouterError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_blank_prompt() {
        let file = write_corpus(r#"[{"model": "fast", "prompts": ["hi", "   "]}]"#);
        let corpus = TrainingCorpus::load(file.path()).unwrap();
        assert!(matches!(corpus.validate(), Err(RouterError::Validation(_))));
    }
}
