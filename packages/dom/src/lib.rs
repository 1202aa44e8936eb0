//! # Amphora DOM
//!
//! A minimal sibling-ordered node tree plus the head-component reconciler.
//!
//! Components that render into `<head>` (meta tags, styles, structured-data
//! blocks) have no element of their own to carry identifying attributes, so
//! the server-side renderer delimits them with paired comment markers. This
//! crate locates, removes and replaces the runs of nodes between those
//! markers.
//!
//! ## Layering
//!
//! - [`node`]: a generic arena document — nodes with explicit sibling order,
//!   detach/insert primitives, cross-document import.
//! - [`marker`]: the comment-text wire format (`data-uri="…"`,
//!   `data-editable="…"`, `data-editable-end`). The only module that knows
//!   the attribute-string syntax.
//! - [`head`]: the locator/reconciler, written against parsed [`marker::Marker`]
//!   values and the generic tree.

pub mod head;
pub mod marker;
pub mod node;

mod error;

pub use error::DomError;
pub use node::{Document, NodeData, NodeId};
