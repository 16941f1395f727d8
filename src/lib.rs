pub mod compare;
pub mod dom;
pub mod error;
pub mod matcher;
pub mod normalize;

pub use compare::structural_eq;
pub use dom::{Document, Element, Name, Node, parse, parse_str};
pub use error::{MatchError, ParseError};
pub use matcher::{
    BodyExtractor, FileResource, MatchConfig, Request, RequestExtractor, Resource, TextResource,
    XmlMatcher,
};
pub use normalize::normalize;

/// Decide whether two XML byte buffers are structurally equivalent:
/// parse both, strip comments and whitespace-only text, compare.
///
/// Unlike [`XmlMatcher::matches`], parse failures are surfaced here — the
/// silent-negative rule is matcher policy, not a property of comparison.
pub fn equivalent(subject: &[u8], reference: &[u8]) -> Result<bool, ParseError> {
    let mut subject = parse(subject)?;
    let mut reference = parse(reference)?;
    subject.normalize();
    reference.normalize();
    Ok(structural_eq(&subject, &reference))
}
