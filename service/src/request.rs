/// Body of a proofreading request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofreadRequest {
    /// Locale tag sent as the `language` form field.
    pub language: String,
    /// Extracted plain text sent as the `text` form field.
    pub text: String,
}

impl ProofreadRequest {
    /// Build a request, normalizing the language tag with [`normalize_language`].
    pub fn new(language: &str, text: impl Into<String>) -> Self {
        Self {
            language: normalize_language(language),
            text: text.into(),
        }
    }

    /// Form fields in the order the service expects them.
    pub fn form(&self) -> [(&'static str, &str); 2] {
        [("language", &self.language), ("text", &self.text)]
    }
}

/// The service has no bare `en` model, so it is sent as `en-US`.
pub fn normalize_language(language: &str) -> String {
    let language = language.trim();
    if language.eq_ignore_ascii_case("en") {
        return "en-US".to_string();
    }
    language.to_string()
}
