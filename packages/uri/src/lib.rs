//! # Amphora URI utilities
//!
//! Content-addressing identifiers for the editing layer.
//!
//! Everything in the content store is addressed by a **uri**: a string like
//! `domain.com/components/share-tools/instances/a1b2@published` with no
//! protocol and no port. A **url** is the fully-qualified form used on the
//! wire. The two are deliberately distinct types of string, and the API
//! layer asserts which one it was handed before any network call.
//!
//! Parsing is fixed-position: the component name is the path segment after
//! `/components/`, the instance id the segment after `/instances/`, and the
//! version the suffix after `@`.

mod convert;
mod error;
mod refs;

pub use convert::{
    assert_uri, assert_url, decode_uri, encode_uri, uri_to_url, url_to_uri,
};
pub use error::UriError;
pub use refs::{
    component_name, instance_id, is_component, is_layout, is_page, label,
    parse_component_ref, replace_version, strip_version, version, ComponentRef, Version,
};
