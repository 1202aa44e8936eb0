//! The canonical state tree.
//!
//! One mutable tree, owned exclusively by the [`crate::Store`] and written
//! only through mutation handlers. Component and page data are untyped JSON
//! trees (their shape belongs to each component's schema, not to this
//! crate); everything around them is typed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    pub page: PageState,
    pub layout: LayoutState,
    /// Component uri → data object; the set of live components on the page
    pub components: HashMap<String, Value>,
    pub ui: UiState,
    pub undo: UndoState,
    /// Deep-link mirror of the currently open form
    pub url: Option<FormTarget>,
    pub validation: Validation,
    pub lists: HashMap<String, ListState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageState {
    pub uri: String,
    /// The page's component-reference graph
    pub data: Value,
    pub state: PublishState,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            uri: String::new(),
            data: json!({}),
            state: PublishState::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutState {
    pub uri: String,
    pub state: PublishState,
}

/// Publish/schedule/url metadata for a page or layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishState {
    pub published: bool,
    pub scheduled: bool,
    pub published_url: Option<String>,
    pub publish_time: Option<DateTime<Utc>>,
    pub scheduled_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiState {
    /// The single active edit form; `None` means no form open
    pub current_form: Option<FormState>,
    pub current_selection: Option<String>,
    pub current_focus: Option<Focus>,
    pub current_pane: Option<String>,
    pub current_drawer: Option<String>,
    /// Depth of active progress brackets (publish, schedule, …)
    pub progress: u32,
    pub notifications: Vec<Notification>,
    pub next_notification_id: u64,
}

/// The single currently-open editing surface, bound to one field path of
/// one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub uri: String,
    pub path: String,
    /// Sparse overlay over the canonical component data; only touched
    /// branches are present
    pub fields: Value,
    pub schema: Value,
    pub inline: bool,
    pub pos: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus {
    pub uri: String,
    pub path: String,
}

/// Cursor position inside the undo history. The entries themselves are
/// owned by the undo engine; `at_start`/`at_end` are derived, never set
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoState {
    pub cursor: usize,
    pub at_start: bool,
    pub at_end: bool,
}

impl Default for UndoState {
    fn default() -> Self {
        Self {
            cursor: 0,
            at_start: true,
            at_end: true,
        }
    }
}

/// Identity of the active form as seen by the deep-link hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTarget {
    pub component: String,
    pub instance: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Validation {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub level: IssueLevel,
    pub uri: Option<String>,
    pub path: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
}

/// An async-loaded named list (e.g. a site-wide category list)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListState {
    pub is_loading: bool,
    pub error: Option<String>,
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    /// Action the UI can offer to re-invoke (e.g. retry a failed save)
    pub retry: Option<RetryAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryAction {
    SavePage,
}
