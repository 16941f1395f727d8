use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compare::structural_eq;
use crate::dom::{Document, parse};
use crate::error::MatchError;

/// An incoming request carrying the comparison subject.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }
}

/// Yields the string to be parsed as the subject document.
///
/// Must be deterministic and side-effect free. Absent content is a fatal
/// fault, not a negative match.
pub trait RequestExtractor: Send + Sync {
    fn extract<'r>(&self, request: &'r Request) -> Result<Cow<'r, str>, MatchError>;
}

/// Extracts the whole request body as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyExtractor;

impl RequestExtractor for BodyExtractor {
    fn extract<'r>(&self, request: &'r Request) -> Result<Cow<'r, str>, MatchError> {
        if request.body.is_empty() {
            return Err(MatchError::AbsentContent { name: "body" });
        }
        match std::str::from_utf8(&request.body) {
            Ok(text) => Ok(Cow::Borrowed(text)),
            // An undecodable body is a content problem, not a fault; the
            // lossy text simply will not match any well-formed reference.
            Err(_) => Ok(Cow::Owned(String::from_utf8_lossy(&request.body).into_owned())),
        }
    }
}

/// Yields the reference document's bytes, resolved in the context of the
/// current request (the content may be request-parameterized).
///
/// Resolution failure is fatal — "reference unavailable" must stay
/// distinguishable from "reference present but content differs".
pub trait Resource: Send + Sync {
    /// Resource kind identity, used for configuration scoping.
    fn id(&self) -> &str;

    fn read_for(&self, request: Option<&Request>) -> Result<Vec<u8>, MatchError>;

    /// Apply a configuration, yielding the transformed resource, or an
    /// equivalent of `self` when the configuration does not apply.
    fn apply(&self, config: &MatchConfig) -> Arc<dyn Resource>;
}

/// A fixed, in-memory reference document.
#[derive(Debug, Clone)]
pub struct TextResource {
    content: String,
}

impl TextResource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl Resource for TextResource {
    fn id(&self) -> &str {
        "text"
    }

    fn read_for(&self, _request: Option<&Request>) -> Result<Vec<u8>, MatchError> {
        Ok(self.content.clone().into_bytes())
    }

    fn apply(&self, _config: &MatchConfig) -> Arc<dyn Resource> {
        Arc::new(self.clone())
    }
}

/// A reference document read from disk. The file is reread on every match,
/// so edits between requests take effect without rebinding.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileResource {
    fn id(&self) -> &str {
        "file"
    }

    fn read_for(&self, _request: Option<&Request>) -> Result<Vec<u8>, MatchError> {
        std::fs::read(&self.path).map_err(|source| MatchError::Resource {
            id: format!("file:{}", self.path.display()),
            source,
        })
    }

    fn apply(&self, config: &MatchConfig) -> Arc<dyn Resource> {
        match config {
            MatchConfig::FileRoot(root) => Arc::new(FileResource {
                path: root.join(&self.path),
            }),
        }
    }
}

/// A configuration scope that may rebind matchers to transformed resources.
#[derive(Debug, Clone)]
pub enum MatchConfig {
    /// Re-root relative file resource paths under the given directory.
    FileRoot(PathBuf),
}

impl MatchConfig {
    /// Whether this configuration targets resources of the given identity.
    pub fn is_for(&self, resource_id: &str) -> bool {
        match self {
            MatchConfig::FileRoot(_) => resource_id == "file",
        }
    }
}

/// Decides whether a request body and a configured reference document are
/// structurally equivalent XML.
///
/// Each call parses both sides afresh; no tree or parser state survives a
/// call, so a shared matcher is safe to use from concurrent requests.
#[derive(Clone)]
pub struct XmlMatcher {
    extractor: Arc<dyn RequestExtractor>,
    resource: Arc<dyn Resource>,
}

impl XmlMatcher {
    pub fn new(extractor: Arc<dyn RequestExtractor>, resource: Arc<dyn Resource>) -> Self {
        Self { extractor, resource }
    }

    /// Matcher over the whole request body against an in-memory reference.
    pub fn of_text(reference: impl Into<String>) -> Self {
        Self::new(Arc::new(BodyExtractor), Arc::new(TextResource::new(reference)))
    }

    /// Matcher over the whole request body against a file on disk.
    pub fn of_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(BodyExtractor), Arc::new(FileResource::new(path)))
    }

    /// The verdict: `Ok(true)`/`Ok(false)` for content outcomes, `Err` only
    /// for extraction or resource-resolution faults.
    ///
    /// A parse failure on either side is a legitimate negative match and is
    /// swallowed, never surfaced.
    pub fn matches(&self, request: &Request) -> Result<bool, MatchError> {
        let subject = self.extractor.extract(request)?;
        let reference = self.resource.read_for(Some(request))?;

        let Some(subject) = parse_normalized(subject.as_bytes()) else {
            return Ok(false);
        };
        let Some(reference) = parse_normalized(&reference) else {
            return Ok(false);
        };
        Ok(structural_eq(&subject, &reference))
    }

    /// Rebind to a transformed reference resource if `config` targets this
    /// matcher's resource identity; otherwise an unchanged clone. Existing
    /// matchers are never mutated.
    pub fn apply_config(&self, config: &MatchConfig) -> XmlMatcher {
        if config.is_for(self.resource.id()) {
            return XmlMatcher {
                extractor: Arc::clone(&self.extractor),
                resource: self.resource.apply(config),
            };
        }
        self.clone()
    }
}

fn parse_normalized(data: &[u8]) -> Option<Document> {
    let mut doc = parse(data).ok()?;
    doc.normalize();
    Some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_equivalent_body() {
        let matcher = XmlMatcher::of_text("<a><b>1</b></a>");
        assert!(matcher.matches(&Request::new("<a><b>1</b></a>")).unwrap());
    }

    #[test]
    fn test_matches_swallows_subject_parse_failure() {
        let matcher = XmlMatcher::of_text("<a><b>1</b></a>");
        assert!(!matcher.matches(&Request::new("<a><b>1</b>")).unwrap());
    }

    #[test]
    fn test_matches_swallows_reference_parse_failure() {
        let matcher = XmlMatcher::of_text("<not<xml");
        assert!(!matcher.matches(&Request::new("<a/>")).unwrap());
    }

    #[test]
    fn test_empty_body_is_fatal() {
        let matcher = XmlMatcher::of_text("<a/>");
        let err = matcher.matches(&Request::default()).unwrap_err();
        assert!(matches!(err, MatchError::AbsentContent { name: "body" }));
    }

    #[test]
    fn test_missing_file_resource_is_fatal_not_negative() {
        let matcher = XmlMatcher::of_file("/nonexistent/reference.xml");
        let err = matcher.matches(&Request::new("<a/>")).unwrap_err();
        assert!(matches!(err, MatchError::Resource { .. }));
    }

    #[test]
    fn test_apply_config_rebinds_file_resource() {
        let matcher = XmlMatcher::of_file("stub.xml");
        let rebound = matcher.apply_config(&MatchConfig::FileRoot(PathBuf::from("/srv/stubs")));
        // The rebound matcher resolves under the new root; the original is
        // untouched and keeps resolving the bare path.
        let err = rebound.matches(&Request::new("<a/>")).unwrap_err();
        match err {
            MatchError::Resource { id, .. } => {
                assert!(id.contains("/srv/stubs"));
            }
            other => panic!("expected resource fault, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_config_ignores_untargeted_resource() {
        let matcher = XmlMatcher::of_text("<a/>");
        let rebound = matcher.apply_config(&MatchConfig::FileRoot(PathBuf::from("/srv/stubs")));
        assert!(rebound.matches(&Request::new("<a/>")).unwrap());
    }

    #[test]
    fn test_body_extractor_borrows_utf8_body() {
        let request = Request::new("<a/>");
        let text = BodyExtractor.extract(&request).unwrap();
        assert_eq!(text, "<a/>");
    }
}
