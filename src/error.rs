/// Errors raised while parsing a document into a tree.
///
/// The matcher swallows these into a negative verdict; the library helper
/// and the CLI surface them.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to parse XML")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid UTF-8 content")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unbound namespace prefix: {prefix}")]
    UnboundPrefix { prefix: String },

    #[error("malformed document: {reason}")]
    MalformedDocument { reason: String },
}

impl ParseError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedDocument {
            reason: reason.into(),
        }
    }
}

/// Fatal matcher faults: the reference resource or the request subject
/// could not be obtained at all.
///
/// Deliberately distinct from [`ParseError`]: a body that fails to parse is
/// a legitimate negative match, while an unreachable reference resource is a
/// configuration problem the caller must see.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("failed to read reference resource `{id}`")]
    Resource {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no {name} content present in request")]
    AbsentContent { name: &'static str },
}
