use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::ParseError;

// ---- Data types ----

/// A namespace-resolved name: the resolved namespace URI plus the local
/// part. Prefix spelling never participates in identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name {
    pub ns: Option<String>,
    pub local: String,
}

impl Name {
    pub fn new(ns: Option<&str>, local: &str) -> Self {
        Self {
            ns: ns.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// A name with no namespace.
    pub fn local(local: &str) -> Self {
        Self::new(None, local)
    }
}

/// A node in the document tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Present after parsing, removed by normalization, never compared.
    Comment(String),
}

/// An element: resolved name, attributes in declaration order, children in
/// source order. `xmlns` declarations are not recorded as attributes.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: Name,
    pub attributes: Vec<(Name, String)>,
    pub children: Vec<Node>,
}

/// A parsed document. Always holds exactly one root element.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Element,
}

// ---- Parsing ----

/// Strip UTF-8 BOM (EF BB BF) from the beginning of the text if present.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}

/// Parse an XML document from raw bytes. Input must be UTF-8.
///
/// A fresh reader is constructed per call, so concurrent parses never share
/// state. No partial tree is returned on error.
pub fn parse(data: &[u8]) -> Result<Document, ParseError> {
    let text = String::from_utf8(data.to_vec())?;
    parse_str(strip_bom(&text))
}

/// Parse an XML document from a string slice.
pub fn parse_str(xml: &str) -> Result<Document, ParseError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().check_end_names = true;
    let mut builder = TreeBuilder::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event()? {
            // Prolog/epilog misc: declaration, doctype and processing
            // instructions carry no content for comparison purposes.
            (_, Event::Decl(_)) | (_, Event::DocType(_)) | (_, Event::PI(_)) => {}

            (res, Event::Start(e)) => {
                if builder.is_at_top_level() && root.is_some() {
                    return Err(ParseError::malformed("multiple root elements"));
                }
                // Consume the resolution before touching the reader again;
                // it holds the reader's namespace state borrowed.
                let name = element_name(res, &e)?;
                let attributes = collect_attributes(&reader, &e)?;
                builder.start(Element {
                    name,
                    attributes,
                    children: Vec::new(),
                });
            }
            (res, Event::Empty(e)) => {
                if builder.is_at_top_level() && root.is_some() {
                    return Err(ParseError::malformed("multiple root elements"));
                }
                let name = element_name(res, &e)?;
                let attributes = collect_attributes(&reader, &e)?;
                builder.start(Element {
                    name,
                    attributes,
                    children: Vec::new(),
                });
                if let Some(closed) = builder.end()? {
                    root = Some(closed);
                }
            }
            (_, Event::End(_)) => {
                if let Some(closed) = builder.end()? {
                    root = Some(closed);
                }
            }
            (_, Event::Text(e)) => builder.text(&e.unescape()?)?,
            (_, Event::CData(e)) => {
                let content = String::from_utf8(e.into_inner().into_owned())?;
                builder.cdata(&content)?;
            }
            (_, Event::Comment(e)) => {
                // Comment content is taken raw: entities are not recognized
                // inside comments, and a bare `&` is legal there.
                let content = String::from_utf8(e.into_inner().into_owned())?;
                builder.comment(&content);
            }

            (_, Event::Eof) => break,
        }
    }

    if !builder.is_at_top_level() {
        return Err(ParseError::malformed("premature end of document"));
    }
    match root {
        Some(root) => Ok(Document { root }),
        None => Err(ParseError::malformed("missing root element")),
    }
}

fn element_name(res: ResolveResult, e: &BytesStart) -> Result<Name, ParseError> {
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    resolved_name(res, local)
}

fn collect_attributes(
    reader: &NsReader<&[u8]>,
    e: &BytesStart,
) -> Result<Vec<(Name, String)>, ParseError> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            // Namespace declarations are parse artifacts, not content.
            continue;
        }
        let (attr_res, attr_local) = reader.resolve_attribute(attr.key);
        let attr_name = resolved_name(
            attr_res,
            String::from_utf8_lossy(attr_local.as_ref()).into_owned(),
        )?;
        let value = attr.unescape_value()?.into_owned();
        attributes.push((attr_name, value));
    }
    Ok(attributes)
}

fn resolved_name(res: ResolveResult, local: String) -> Result<Name, ParseError> {
    match res {
        ResolveResult::Bound(ns) => Ok(Name {
            ns: Some(String::from_utf8_lossy(ns.into_inner()).into_owned()),
            local,
        }),
        ResolveResult::Unbound => Ok(Name { ns: None, local }),
        ResolveResult::Unknown(prefix) => Err(ParseError::UnboundPrefix {
            prefix: String::from_utf8_lossy(&prefix).into_owned(),
        }),
    }
}

// ---- Tree assembly ----

/// Assembles a tree from reader events: a stack of open elements plus a
/// pending text buffer that coalesces adjacent text and CDATA fragments
/// into one `Text` node per contiguous run.
struct TreeBuilder {
    stack: Vec<Element>,
    pending_text: Option<String>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            pending_text: None,
        }
    }

    fn is_at_top_level(&self) -> bool {
        self.stack.is_empty()
    }

    /// Append any pending coalesced text run to the innermost open element.
    fn flush_text(&mut self) {
        if let Some(text) = self.pending_text.take() {
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(Node::Text(text));
            }
        }
    }

    fn start(&mut self, element: Element) {
        self.flush_text();
        self.stack.push(element);
    }

    /// Close the innermost open element. Returns it when it was the root.
    fn end(&mut self) -> Result<Option<Element>, ParseError> {
        self.flush_text();
        let closed = self
            .stack
            .pop()
            .ok_or_else(|| ParseError::malformed("close tag without matching open tag"))?;
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(Node::Element(closed));
                Ok(None)
            }
            None => Ok(Some(closed)),
        }
    }

    fn text(&mut self, content: &str) -> Result<(), ParseError> {
        if self.stack.is_empty() {
            // Only whitespace may appear between the prolog, the root
            // element and the epilog.
            if content.trim().is_empty() {
                return Ok(());
            }
            return Err(ParseError::malformed("content outside of root element"));
        }
        self.append_text(content);
        Ok(())
    }

    fn cdata(&mut self, content: &str) -> Result<(), ParseError> {
        if self.stack.is_empty() {
            return Err(ParseError::malformed("CDATA outside of root element"));
        }
        self.append_text(content);
        Ok(())
    }

    fn comment(&mut self, content: &str) {
        // A comment does not break a text run. The node is emitted ahead of
        // the merged run; its position is never significant because comments
        // are stripped before comparison.
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(Node::Comment(content.to_string()));
        }
    }

    fn append_text(&mut self, content: &str) {
        match &mut self.pending_text {
            Some(text) => text.push_str(content),
            None => self.pending_text = Some(content.to_string()),
        }
    }
}
