//! Head-component locator/reconciler.
//!
//! Walks comment nodes to find component and list boundaries inside
//! `<head>`, and replaces the runs of nodes between them. Lookups are
//! O(head size) walks; head reconciliation is infrequent, so no index is
//! kept.

use crate::error::DomError;
use crate::marker::{parse_marker, Marker};
use crate::node::{Document, NodeData, NodeId};
use serde::Serialize;
use tracing::debug;

/// A component list found in the head, with its ordered members
#[derive(Debug, Clone, Serialize)]
pub struct HeadList {
    pub path: String,
    #[serde(skip)]
    pub start: NodeId,
    pub components: Vec<ListMember>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListMember {
    pub uri: String,
    pub label: String,
    #[serde(skip)]
    pub node: NodeId,
}

fn marker_at(doc: &Document, id: NodeId) -> Option<Marker> {
    match doc.data(id) {
        NodeData::Comment(text) => parse_marker(text),
        _ => None,
    }
}

/// First head comment in document order whose marker names `uri`
pub fn component_node(doc: &Document, uri: &str) -> Option<NodeId> {
    let head = doc.head()?;
    doc.descendants(head).into_iter().find(|&id| {
        matches!(marker_at(doc, id), Some(Marker::Component { uri: found }) if found == uri)
    })
}

/// Last node of the component whose start marker is `start`.
///
/// Walks forward through siblings until another component's start marker or
/// a list's end marker; the node before that terminator is the component's
/// last node. `None` means the markup has no terminator and is malformed.
pub fn component_end(doc: &Document, start: NodeId) -> Option<NodeId> {
    let mut prev = start;
    let mut cur = doc.next_sibling(start);
    while let Some(id) = cur {
        match marker_at(doc, id) {
            Some(Marker::Component { .. }) | Some(Marker::ListEnd) => return Some(prev),
            _ => {
                prev = id;
                cur = doc.next_sibling(id);
            }
        }
    }
    None
}

/// Start marker of the component list editable at `path`
pub fn list_start(doc: &Document, path: &str) -> Option<NodeId> {
    let head = doc.head()?;
    doc.descendants(head).into_iter().find(|&id| {
        matches!(marker_at(doc, id), Some(Marker::ListStart { path: found }) if found == path)
    })
}

/// The `data-editable-end` marker paired with `start`
pub fn list_end(doc: &Document, start: NodeId) -> Option<NodeId> {
    let mut cur = doc.next_sibling(start);
    while let Some(id) = cur {
        if matches!(marker_at(doc, id), Some(Marker::ListEnd)) {
            return Some(id);
        }
        cur = doc.next_sibling(id);
    }
    None
}

/// Detach the component run `start..=end`, returning the removed nodes in
/// order so callers can diff them against the replacement. `None` when the
/// run has no terminator.
pub fn remove_component(doc: &mut Document, start: NodeId) -> Option<Vec<NodeId>> {
    let end = component_end(doc, start)?;
    Some(detach_run(doc, start, end, true))
}

/// Detach a list's nodes from the start marker up to (not including) the
/// end marker. `None` when the end marker is missing.
pub fn remove_list(doc: &mut Document, start: NodeId) -> Option<Vec<NodeId>> {
    let end = list_end(doc, start)?;
    Some(detach_run(doc, start, end, false))
}

fn detach_run(doc: &mut Document, start: NodeId, end: NodeId, inclusive: bool) -> Vec<NodeId> {
    let mut removed = Vec::new();
    let mut cur = Some(start);
    while let Some(id) = cur {
        if id == end && !inclusive {
            break;
        }
        let next = doc.next_sibling(id);
        doc.detach(id);
        removed.push(id);
        if id == end {
            break;
        }
        cur = next;
    }
    removed
}

/// Replace the head component at `uri` with `fragment` (a run of root nodes
/// in `src`). The replacement is cloned node-by-node into this document —
/// markup fetched over the network cannot be inserted by reference across
/// documents.
///
/// Returns the removed run. A missing start marker or terminator is
/// unrecoverable markup corruption.
pub fn replace_component(
    doc: &mut Document,
    uri: &str,
    src: &Document,
    fragment: &[NodeId],
) -> Result<Vec<NodeId>, DomError> {
    let start = component_node(doc, uri).ok_or_else(|| DomError::ComponentNotFound(uri.to_string()))?;

    // Anchor for re-insertion: the node just before the old run (the end of
    // the prior component or the list's start marker), or the head itself
    // when the run is first.
    let anchor = doc.prev_sibling(start);
    let parent = doc.parent(start);

    let removed = remove_component(doc, start)
        .ok_or_else(|| DomError::MalformedRegion(uri.to_string()))?;

    debug!(uri, removed = removed.len(), inserted = fragment.len(), "replacing head component");

    let mut insert_after = anchor;
    for &root in fragment {
        let copy = doc.import_subtree(src, root);
        match insert_after {
            Some(anchor) => doc.insert_after(anchor, copy),
            None => {
                let parent = parent.or_else(|| doc.head()).expect("head exists");
                doc.prepend_child(parent, copy);
            }
        }
        insert_after = Some(copy);
    }

    Ok(removed)
}

/// Enumerate every component list in the head
pub fn lists_in_head(doc: &Document) -> Vec<HeadList> {
    let Some(head) = doc.head() else {
        return Vec::new();
    };
    doc.descendants(head)
        .into_iter()
        .filter_map(|id| match marker_at(doc, id) {
            Some(Marker::ListStart { path }) => Some(HeadList {
                components: list_members(doc, id),
                path,
                start: id,
            }),
            _ => None,
        })
        .collect()
}

/// Ordered component refs between a list's start and end markers, each with
/// a human-readable label derived from the component name
pub fn list_members(doc: &Document, start: NodeId) -> Vec<ListMember> {
    let mut members = Vec::new();
    let mut cur = doc.next_sibling(start);
    while let Some(id) = cur {
        match marker_at(doc, id) {
            Some(Marker::ListEnd) => break,
            Some(Marker::Component { uri }) => {
                let label = amphora_uri::component_name(&uri)
                    .map(amphora_uri::label)
                    .unwrap_or_else(|| uri.clone());
                members.push(ListMember { uri, label, node: id });
                cur = doc.next_sibling(id);
            }
            _ => cur = doc.next_sibling(id),
        }
    }
    members
}
