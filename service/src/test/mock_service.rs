//! Mock proofreading service for testing.
//!
//! Replays programmed responses in order without touching the network, and
//! records every request it receives. Also provides [`response_xml`] for
//! writing service bodies in tests without hand-escaping attributes.

use crate::{
    request::ProofreadRequest,
    transport::{ProofreadService, ServiceError},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};

/// Body returned once the programmed responses run out.
const EMPTY_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?><matches></matches>"#;

/// Mock transport with programmed responses.
///
/// Clones share state, so a test can keep one handle for assertions while the
/// code under test owns another.
#[derive(Clone, Default)]
pub struct MockService {
    inner: Arc<Mutex<MockServiceInner>>,
}

#[derive(Default)]
struct MockServiceInner {
    responses: VecDeque<MockResponse>,
    requests: Vec<ProofreadRequest>,
}

enum MockResponse {
    Body(String),
    Unavailable(String),
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn respond_with(self, body: impl Into<String>) -> Self {
        self.inner
            .lock()
            .responses
            .push_back(MockResponse::Body(body.into()));
        self
    }

    /// Queue a successful response built from `errors`.
    pub fn respond_with_errors(self, errors: &[MockError]) -> Self {
        self.respond_with(response_xml(errors))
    }

    /// Queue a failure.
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        self.inner
            .lock()
            .responses
            .push_back(MockResponse::Unavailable(message.into()));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ProofreadRequest> {
        self.inner.lock().requests.clone()
    }
}

#[async_trait]
impl ProofreadService for MockService {
    async fn check(&self, request: &ProofreadRequest) -> Result<String, ServiceError> {
        let mut inner = self.inner.lock();
        inner.requests.push(request.clone());
        match inner.responses.pop_front() {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Unavailable(message)) => Err(ServiceError::Unavailable(message)),
            None => Ok(EMPTY_RESPONSE.to_string()),
        }
    }
}

/// One `<error>` record in a mock response.
#[derive(Debug, Clone)]
pub struct MockError {
    pub offset: String,
    pub length: String,
    pub rule_id: String,
    pub message: String,
    pub category: String,
    pub replacements: Option<String>,
    pub sub_id: Option<String>,
    pub url: Option<String>,
}

impl MockError {
    pub fn new(offset: usize, length: usize, rule_id: impl Into<String>) -> Self {
        Self {
            offset: offset.to_string(),
            length: length.to_string(),
            rule_id: rule_id.into(),
            message: "Possible error".to_string(),
            category: "Misc".to_string(),
            replacements: None,
            sub_id: None,
            url: None,
        }
    }

    /// Raw `offset` attribute, for malformed-record tests.
    pub fn raw_offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = offset.into();
        self
    }

    /// Raw `errorlength` attribute, for malformed-record tests.
    pub fn raw_length(mut self, length: impl Into<String>) -> Self {
        self.length = length.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// `#`-delimited replacement list.
    pub fn replacements(mut self, replacements: impl Into<String>) -> Self {
        self.replacements = Some(replacements.into());
        self
    }

    pub fn sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<error offset="{}" errorlength="{}" ruleId="{}" msg="{}" category="{}""#,
            escape(&self.offset),
            escape(&self.length),
            escape(&self.rule_id),
            escape(&self.message),
            escape(&self.category),
        );
        for (name, value) in [
            ("replacements", &self.replacements),
            ("subId", &self.sub_id),
            ("url", &self.url),
        ] {
            if let Some(value) = value {
                xml.push_str(&format!(r#" {name}="{}""#, escape(value)));
            }
        }
        xml.push_str("/>");
        xml
    }
}

/// Render a complete service response containing `errors` in order.
pub fn response_xml(errors: &[MockError]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><matches>"#);
    for error in errors {
        xml.push_str(&error.to_xml());
    }
    xml.push_str("</matches>");
    xml
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_attributes_in_order() {
        let xml = response_xml(&[MockError::new(4, 5, "UPPERCASE_SENTENCE_START")
            .message("Start with \"uppercase\" & period")
            .replacements("A#B")]);

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"offset="4" errorlength="5""#));
        assert!(xml.contains(r#"msg="Start with &quot;uppercase&quot; &amp; period""#));
        assert!(xml.contains(r#"replacements="A#B""#));
        assert!(!xml.contains("url="));
    }

    #[tokio::test]
    async fn replays_in_order_then_falls_back_to_empty() {
        let mock = MockService::new()
            .respond_with("first")
            .fail_with("offline");
        let request = ProofreadRequest::new("en", "x");

        assert_eq!(mock.check(&request).await.unwrap(), "first");
        assert!(matches!(
            mock.check(&request).await,
            Err(ServiceError::Unavailable(message)) if message == "offline"
        ));
        assert_eq!(mock.check(&request).await.unwrap(), EMPTY_RESPONSE);
        assert_eq!(mock.requests().len(), 3);
    }
}
