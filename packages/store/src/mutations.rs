//! # State mutations
//!
//! Every write to the state tree goes through one of these handlers.
//!
//! ## Mutation semantics
//!
//! 1. **Pure**: a mutation is `(state, payload) → state` with no I/O. All
//!    network work happens in actions before anything is committed.
//! 2. **Infallible**: payloads are validated by the committing action, so
//!    handlers never fail. Applying to a state that makes the mutation
//!    meaningless (closing an already-closed form, editing with no form
//!    open) is a no-op.
//! 3. **Ordered**: mutations apply synchronously in commit order; there is
//!    no batching or coalescing.

use crate::fields::write_field;
use crate::history::Snapshot;
use crate::state::{
    Focus, FormState, FormTarget, Issue, ListState, NotificationLevel, Notification,
    PublishState, RetryAction, State, UndoState,
};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum Mutation {
    /// Hydrate the empty bootstrap state from server-rendered data
    Preload {
        page_uri: String,
        page_data: Value,
        page_state: PublishState,
        layout_uri: String,
        layout_state: PublishState,
        components: HashMap<String, Value>,
    },

    /// Open (or silently replace) the single active edit form
    OpenForm(FormState),
    CloseForm,
    /// Write one field of the active form's sparse overlay
    UpdateFormData { path: String, value: Value },

    UpdateComponent { uri: String, data: Value },
    UpdatePageData { data: Value },
    /// Roll the page data back to a pre-save snapshot
    RevertPageData { data: Value },

    Select { el: String },
    Unselect,
    Focus(Focus),
    Unfocus,
    OpenPane { name: String },
    ClosePane,
    OpenDrawer { name: String },
    CloseDrawer,

    /// Mirror the active form identity into `state.url`
    UpdateHash { uri: String, path: String },
    ClearHash,

    /// Move the cursor back one entry and restore its snapshot
    Undo { snapshot: Snapshot, end: usize },
    /// Move the cursor forward one entry and restore its snapshot
    Redo { snapshot: Snapshot, end: usize },
    /// Unconditionally position the cursor against a caller-supplied end
    SetCursor { cursor: usize, end: usize },

    UpdateValidation {
        errors: Vec<Issue>,
        warnings: Vec<Issue>,
    },

    ListLoading { name: String },
    ListLoaded { name: String, items: Vec<Value> },
    ListError { name: String, error: String },

    UpdatePageState(PublishState),
    UpdateLayoutState(PublishState),

    StartProgress,
    FinishProgress,

    AddNotification {
        level: NotificationLevel,
        message: String,
        retry: Option<RetryAction>,
    },
    DismissNotification { id: u64 },
}

/// `at_start`/`at_end` are derived; recompute on every cursor change
fn recompute_cursor_flags(undo: &mut UndoState, end: usize) {
    undo.at_start = undo.cursor == 0;
    undo.at_end = undo.cursor >= end;
}

impl Mutation {
    pub fn apply(self, state: &mut State) {
        match self {
            Mutation::Preload {
                page_uri,
                page_data,
                page_state,
                layout_uri,
                layout_state,
                components,
            } => {
                state.page.uri = page_uri;
                state.page.data = page_data;
                state.page.state = page_state;
                state.layout.uri = layout_uri;
                state.layout.state = layout_state;
                state.components = components;
            }

            Mutation::OpenForm(form) => {
                state.ui.current_form = Some(form);
            }

            Mutation::CloseForm => {
                state.ui.current_form = None;
            }

            Mutation::UpdateFormData { path, value } => {
                let State { ui, components, .. } = state;
                if let Some(form) = &mut ui.current_form {
                    let canonical = components.get(&form.uri);
                    write_field(
                        &mut form.fields,
                        canonical.unwrap_or(&Value::Null),
                        &path,
                        value,
                    );
                }
            }

            Mutation::UpdateComponent { uri, data } => {
                state.components.insert(uri, data);
            }

            Mutation::UpdatePageData { data } | Mutation::RevertPageData { data } => {
                state.page.data = data;
            }

            Mutation::Select { el } => {
                state.ui.current_selection = Some(el);
            }

            Mutation::Unselect => {
                state.ui.current_selection = None;
            }

            Mutation::Focus(focus) => {
                state.ui.current_focus = Some(focus);
            }

            Mutation::Unfocus => {
                state.ui.current_focus = None;
            }

            Mutation::OpenPane { name } => {
                state.ui.current_pane = Some(name);
            }

            Mutation::ClosePane => {
                state.ui.current_pane = None;
            }

            Mutation::OpenDrawer { name } => {
                state.ui.current_drawer = Some(name);
            }

            Mutation::CloseDrawer => {
                state.ui.current_drawer = None;
            }

            Mutation::UpdateHash { uri, path } => {
                let component = amphora_uri::component_name(&uri)
                    .unwrap_or(uri.as_str())
                    .to_string();
                state.url = Some(FormTarget {
                    component,
                    instance: amphora_uri::instance_id(&uri).map(str::to_string),
                    path,
                });
            }

            Mutation::ClearHash => {
                state.url = None;
            }

            Mutation::Undo { snapshot, end } => {
                state.undo.cursor -= 1;
                recompute_cursor_flags(&mut state.undo, end);
                state.components = snapshot.components;
                state.page.data = snapshot.page_data;
            }

            Mutation::Redo { snapshot, end } => {
                state.undo.cursor += 1;
                recompute_cursor_flags(&mut state.undo, end);
                state.components = snapshot.components;
                state.page.data = snapshot.page_data;
            }

            Mutation::SetCursor { cursor, end } => {
                state.undo.cursor = cursor;
                recompute_cursor_flags(&mut state.undo, end);
            }

            Mutation::UpdateValidation { errors, warnings } => {
                state.validation.errors = errors;
                state.validation.warnings = warnings;
            }

            Mutation::ListLoading { name } => {
                let list = state.lists.entry(name).or_insert_with(ListState::default);
                list.is_loading = true;
                list.error = None;
            }

            Mutation::ListLoaded { name, items } => {
                state.lists.insert(
                    name,
                    ListState {
                        is_loading: false,
                        error: None,
                        items,
                    },
                );
            }

            Mutation::ListError { name, error } => {
                let list = state.lists.entry(name).or_insert_with(ListState::default);
                list.is_loading = false;
                list.error = Some(error);
            }

            Mutation::UpdatePageState(publish) => {
                state.page.state = publish;
            }

            Mutation::UpdateLayoutState(publish) => {
                state.layout.state = publish;
            }

            Mutation::StartProgress => {
                state.ui.progress += 1;
            }

            Mutation::FinishProgress => {
                state.ui.progress = state.ui.progress.saturating_sub(1);
            }

            Mutation::AddNotification {
                level,
                message,
                retry,
            } => {
                let id = state.ui.next_notification_id;
                state.ui.next_notification_id += 1;
                state.ui.notifications.push(Notification {
                    id,
                    level,
                    message,
                    retry,
                });
            }

            Mutation::DismissNotification { id } => {
                state.ui.notifications.retain(|n| n.id != id);
            }
        }
    }
}
