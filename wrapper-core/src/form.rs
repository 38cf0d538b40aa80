use crate::{endpoint::QueryRequest, model::ModelId};

/// What the user has typed and picked so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormInput {
    text: String,
    model: ModelId,
}

impl FormInput {
    pub fn new(model: ModelId) -> Self {
        FormInput {
            text: String::new(),
            model,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Callers are responsible for checking `model` against the catalog.
    pub(crate) fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    /// Whitespace counts as text; only a truly empty field is blocked.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn to_request(&self) -> QueryRequest {
        QueryRequest {
            text: self.text.as_str().into(),
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::model::ModelCatalog;

    #[rstest]
    #[case("", false)]
    #[case(" ", true)]
    #[case("\n", true)]
    #[case("hi", true)]
    fn has_text(#[case] text: &str, #[case] expected: bool) {
        let mut form = FormInput::new(ModelCatalog::default().default_model().clone());
        form.set_text(text);

        assert_eq!(form.has_text(), expected);
    }

    #[test]
    fn request_carries_text_and_model() {
        let catalog = ModelCatalog::default();
        let mut form = FormInput::new(catalog.default_model().clone());
        form.set_text("hi");
        form.set_model(catalog.resolve("claude-3").unwrap());

        let request = form.to_request();

        assert_eq!(request.text.as_ref(), "hi");
        assert_eq!(request.model.as_str(), "claude-3");
    }
}
