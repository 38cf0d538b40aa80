use std::{collections::HashSet, fmt::Display, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_MODELS: [(&str, &str); 3] = [
    ("gpt-4", "GPT-4"),
    ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
    ("claude-3", "Claude 3"),
];

/// Identifier of a downstream language model.
/// Opaque to the client; the query endpoint decides what it means.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(Arc<str>);

impl ModelId {
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_ref())
    }
}

impl AsRef<str> for ModelId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    pub id: ModelId,
    /// Shown in the model picker. Falls back to the id.
    #[serde(default)]
    label: Option<String>,
}

impl ModelOption {
    pub fn new(id: impl AsRef<str>, label: impl ToString) -> Self {
        ModelOption {
            id: ModelId(id.as_ref().into()),
            label: Some(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }
}

/// The closed set of models a user can pick from.
/// Never empty, never holds the same id twice,
/// and the first entry is the initial selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ModelOption>", into = "Vec<ModelOption>")]
pub struct ModelCatalog {
    options: Arc<[ModelOption]>,
}

impl ModelCatalog {
    pub fn new(options: impl IntoIterator<Item = ModelOption>) -> Result<Self> {
        let options: Arc<[ModelOption]> = options.into_iter().collect();

        if options.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(options.len());
        if let Some(duplicate) = options.iter().find(|option| !seen.insert(&option.id)) {
            return Err(Error::DuplicateModel(duplicate.id.to_string()));
        }

        Ok(ModelCatalog { options })
    }

    pub fn options(&self) -> &[ModelOption] {
        &self.options
    }

    pub fn default_model(&self) -> &ModelId {
        &self.options[0].id
    }

    pub fn get(&self, index: usize) -> Option<&ModelOption> {
        self.options.get(index)
    }

    pub fn position(&self, id: &ModelId) -> Option<usize> {
        self.options.iter().position(|option| &option.id == id)
    }

    /// Look up a model by its raw identifier.
    /// Anything outside the configured set is rejected.
    pub fn resolve(&self, id: &str) -> Result<ModelId> {
        self.options
            .iter()
            .find(|option| option.id.as_str() == id)
            .map(|option| option.id.clone())
            .ok_or_else(|| Error::UnknownModel(id.to_string()))
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let options: Arc<[ModelOption]> = DEFAULT_MODELS
            .iter()
            .map(|(id, label)| ModelOption::new(id, label))
            .collect();
        ModelCatalog { options }
    }
}

impl TryFrom<Vec<ModelOption>> for ModelCatalog {
    type Error = Error;

    fn try_from(options: Vec<ModelOption>) -> Result<Self> {
        ModelCatalog::new(options)
    }
}

impl From<ModelCatalog> for Vec<ModelOption> {
    fn from(catalog: ModelCatalog) -> Self {
        catalog.options.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn default_catalog_starts_with_gpt_4() {
        let catalog = ModelCatalog::default();

        assert_eq!(catalog.default_model().as_str(), "gpt-4");
        assert_eq!(catalog.options().len(), 3);
        assert_eq!(catalog.get(1).map(ModelOption::label), Some("GPT-3.5 Turbo"));
    }

    #[rstest]
    #[case("gpt-4", true)]
    #[case("claude-3", true)]
    #[case("GPT-4", false)]
    #[case("", false)]
    #[case("meta-llama/Meta-Llama-3.1-70B-Instruct", false)]
    fn resolve_only_known_models(#[case] id: &str, #[case] known: bool) {
        let catalog = ModelCatalog::default();

        assert_eq!(catalog.resolve(id).is_ok(), known);
    }

    #[test]
    fn rejects_empty_catalog() {
        let result = ModelCatalog::new([]);

        assert!(matches!(result, Err(Error::EmptyCatalog)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = ModelCatalog::new([
            ModelOption::new("gpt-4", "GPT-4"),
            ModelOption::new("gpt-4", "also GPT-4"),
        ]);

        assert!(matches!(result, Err(Error::DuplicateModel(id)) if id == "gpt-4"));
    }

    #[test]
    fn deserialize_catalog_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            models: ModelCatalog,
        }

        let toml = r#"
            [[models]]
            id = "meta-llama/Meta-Llama-3.1-8B-Instruct"
            label = "Llama 3.1 8B"

            [[models]]
            id = "meta-llama/Meta-Llama-3.1-70B-Instruct"
        "#;

        let wrapper: Wrapper = toml::from_str(toml).unwrap();
        let catalog = wrapper.models;

        assert_eq!(
            catalog.default_model().as_str(),
            "meta-llama/Meta-Llama-3.1-8B-Instruct"
        );
        assert_eq!(catalog.options()[0].label(), "Llama 3.1 8B");
        assert_eq!(
            catalog.options()[1].label(),
            "meta-llama/Meta-Llama-3.1-70B-Instruct"
        );
    }

    #[test]
    fn deserialize_empty_catalog_fails() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[allow(dead_code)]
            models: ModelCatalog,
        }

        let result: std::result::Result<Wrapper, _> = toml::from_str("models = []");

        assert!(result.is_err());
    }
}
