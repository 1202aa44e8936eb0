//! Component reference parsing.
//!
//! References use fixed-position string conventions rather than a general
//! url parser: the grammar is small and the store guarantees it.

use crate::error::UriError;
use serde::{Deserialize, Serialize};
use std::fmt;

const COMPONENTS_SEGMENT: &str = "/components/";
const INSTANCES_SEGMENT: &str = "/instances/";
const PAGES_SEGMENT: &str = "/pages/";
const LAYOUTS_SEGMENT: &str = "/layouts/";

/// Version qualifier selecting a non-draft snapshot of a uri
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    Published,
    Scheduled,
    Other(String),
}

impl Version {
    pub fn parse(s: &str) -> Self {
        match s {
            "published" => Version::Published,
            "scheduled" => Version::Scheduled,
            other => Version::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Version::Published => "published",
            Version::Scheduled => "scheduled",
            Version::Other(s) => s,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed component reference: name, optional instance, optional version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub name: String,
    pub instance: Option<String>,
    pub version: Option<Version>,
}

/// Extract the segment following `marker`, up to the next `/` or `@`.
/// Empty segments yield `None`, never empty strings.
fn segment_after<'a>(uri: &'a str, marker: &str) -> Option<&'a str> {
    let start = uri.find(marker)? + marker.len();
    let rest = &uri[start..];
    let end = rest.find(['/', '@']).unwrap_or(rest.len());
    let seg = &rest[..end];
    if seg.is_empty() {
        None
    } else {
        Some(seg)
    }
}

/// Component name: the path segment after `/components/`
pub fn component_name(uri: &str) -> Option<&str> {
    segment_after(uri, COMPONENTS_SEGMENT)
}

/// Instance id: the path segment after `/instances/`
pub fn instance_id(uri: &str) -> Option<&str> {
    segment_after(uri, INSTANCES_SEGMENT)
}

/// Version suffix after `@`, if any
pub fn version(uri: &str) -> Option<Version> {
    let at = uri.rfind('@')?;
    let suffix = &uri[at + 1..];
    if suffix.is_empty() {
        None
    } else {
        Some(Version::parse(suffix))
    }
}

/// The uri with any `@…` version suffix removed (the draft address)
pub fn strip_version(uri: &str) -> &str {
    match uri.rfind('@') {
        Some(at) => &uri[..at],
        None => uri,
    }
}

/// Swap the version suffix. `None` returns the bare draft uri.
pub fn replace_version(uri: &str, version: Option<&Version>) -> String {
    let base = strip_version(uri);
    match version {
        Some(v) => format!("{}@{}", base, v),
        None => base.to_string(),
    }
}

pub fn is_component(uri: &str) -> bool {
    uri.contains(COMPONENTS_SEGMENT)
}

pub fn is_page(uri: &str) -> bool {
    uri.contains(PAGES_SEGMENT)
}

pub fn is_layout(uri: &str) -> bool {
    uri.contains(LAYOUTS_SEGMENT)
}

/// Parse a full component reference from a uri
pub fn parse_component_ref(uri: &str) -> Result<ComponentRef, UriError> {
    let name = component_name(uri)
        .ok_or_else(|| UriError::NotAComponent(uri.to_string()))?
        .to_string();

    Ok(ComponentRef {
        name,
        instance: instance_id(uri).map(str::to_string),
        version: version(uri),
    })
}

/// Human-readable label for a component name: `share-tools` → `Share Tools`
pub fn label(name: &str) -> String {
    name.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
