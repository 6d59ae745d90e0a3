//! Small helpers shared by the XML capability parsers.

use quick_xml::events::BytesStart;

use viewer_common::{DocumentKind, ViewerError, ViewerResult};

/// Element path from the document root, by local name (namespace prefixes dropped).
#[derive(Debug, Default)]
pub(crate) struct ElementPath(Vec<String>);

impl ElementPath {
    pub fn push(&mut self, e: &BytesStart<'_>) {
        self.0
            .push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    /// True when the innermost elements match `suffix`, outermost first.
    pub fn ends_with(&self, suffix: &[&str]) -> bool {
        self.0.len() >= suffix.len()
            && self.0[self.0.len() - suffix.len()..]
                .iter()
                .zip(suffix)
                .all(|(have, want)| have == want)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Attribute value by local name, unescaped.
pub(crate) fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

pub(crate) fn parse_f64(kind: DocumentKind, field: &str, value: &str) -> ViewerResult<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| ViewerError::parse(kind, format!("invalid number for {}: '{}'", field, value)))
}

/// Parse an OWS corner ("x y") into two numbers.
pub(crate) fn parse_corner(kind: DocumentKind, value: &str) -> ViewerResult<(f64, f64)> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(x), Some(y)) => Ok((parse_f64(kind, "corner", x)?, parse_f64(kind, "corner", y)?)),
        _ => Err(ViewerError::parse(kind, format!("invalid corner: '{}'", value))),
    }
}

pub(crate) fn xml_error(kind: DocumentKind, position: usize, err: quick_xml::Error) -> ViewerError {
    ViewerError::parse(
        kind,
        format!("XML parsing error at position {}: {:?}", position, err),
    )
}
