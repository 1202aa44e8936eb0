//! Comment-marker wire format.
//!
//! The server-side renderer delimits head components with comment nodes
//! carrying machine-readable attribute strings:
//!
//! ```html
//! <!-- data-uri="domain.com/components/foo/instances/bar" -->
//! <!-- data-editable="head" --> … <!-- data-editable-end -->
//! ```
//!
//! This client never invents markers; it only parses the ones the renderer
//! emitted. Formatting exists for fixtures and tests.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Start of a single component's run: `data-uri="<uri>"`
    Component { uri: String },
    /// Start of a component list: `data-editable="<path>"`
    ListStart { path: String },
    /// End of a component list: `data-editable-end`
    ListEnd,
}

fn component_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"data-uri="([^"]+)""#).unwrap())
}

fn list_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"data-editable="([^"]+)""#).unwrap())
}

/// Parse comment text into a marker; `None` for ordinary comments
pub fn parse_marker(text: &str) -> Option<Marker> {
    if let Some(caps) = component_re().captures(text) {
        return Some(Marker::Component {
            uri: caps[1].to_string(),
        });
    }
    if let Some(caps) = list_start_re().captures(text) {
        return Some(Marker::ListStart {
            path: caps[1].to_string(),
        });
    }
    if text.contains("data-editable-end") {
        return Some(Marker::ListEnd);
    }
    None
}

pub fn format_marker(marker: &Marker) -> String {
    match marker {
        Marker::Component { uri } => format!(r#"data-uri="{}""#, uri),
        Marker::ListStart { path } => format!(r#"data-editable="{}""#, path),
        Marker::ListEnd => "data-editable-end".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_component_marker() {
        assert_eq!(
            parse_marker(r#" data-uri="domain.com/components/foo" "#),
            Some(Marker::Component {
                uri: "domain.com/components/foo".to_string()
            })
        );
    }

    #[test]
    fn test_parse_list_markers() {
        assert_eq!(
            parse_marker(r#"data-editable="head""#),
            Some(Marker::ListStart {
                path: "head".to_string()
            })
        );
        assert_eq!(parse_marker("data-editable-end"), Some(Marker::ListEnd));
    }

    #[test]
    fn test_ordinary_comments_are_not_markers() {
        assert_eq!(parse_marker("just a comment"), None);
        assert_eq!(parse_marker(""), None);
    }

    #[test]
    fn test_round_trip() {
        for marker in [
            Marker::Component {
                uri: "domain.com/components/foo@published".to_string(),
            },
            Marker::ListStart {
                path: "head".to_string(),
            },
            Marker::ListEnd,
        ] {
            assert_eq!(parse_marker(&format_marker(&marker)), Some(marker));
        }
    }
}
