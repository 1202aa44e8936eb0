//! # Store actions
//!
//! Actions are the impure layer: they call the content store, then commit
//! mutations in a fixed order. Failures come back as `Err`, never as a
//! panic, and any rollback/notification commits happen before the error is
//! returned.

use crate::error::StoreError;
use crate::fields::merge_overlay;
use crate::history::Snapshot;
use crate::mutations::Mutation;
use crate::registry::run_validators;
use crate::state::{Focus, FormState, NotificationLevel, Position, PublishState, RetryAction};
use crate::store::Store;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Server-rendered data the state is hydrated from at bootstrap
#[derive(Debug, Clone)]
pub struct PreloadData {
    pub page_uri: String,
    pub page_data: Value,
    pub page_state: PublishState,
    pub layout_uri: String,
    pub layout_state: PublishState,
    pub components: HashMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct FormOpen {
    pub uri: String,
    pub path: String,
    pub schema: Value,
    /// Initial overlay; defaults to empty (branches are seeded on first
    /// write)
    pub fields: Option<Value>,
    pub inline: bool,
    pub pos: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// A newer save for the same target arrived inside the debounce
    /// window; this call did not hit the network
    Superseded,
}

impl Store {
    /// Hydrate the empty bootstrap state and seed the undo history with
    /// the initial snapshot.
    pub fn preload(&self, data: PreloadData) {
        let snapshot = Snapshot {
            components: data.components.clone(),
            page_data: data.page_data.clone(),
        };

        self.commit(Mutation::Preload {
            page_uri: data.page_uri,
            page_data: data.page_data,
            page_state: data.page_state,
            layout_uri: data.layout_uri,
            layout_state: data.layout_state,
            components: data.components,
        });

        self.history.lock().unwrap().reset(snapshot);
        self.commit(Mutation::SetCursor { cursor: 0, end: 0 });
    }

    // --- form lifecycle ---
    //
    // The active form identity is one value: opening drives
    // `ui.current_form`, `state.url` and the location hash together;
    // closing clears all three.

    pub fn open_form(&self, open: FormOpen) {
        let form = FormState {
            fields: open.fields.unwrap_or_else(|| json!({})),
            uri: open.uri.clone(),
            path: open.path.clone(),
            schema: open.schema,
            inline: open.inline,
            pos: open.pos,
        };
        self.commit(Mutation::OpenForm(form));
        self.commit(Mutation::UpdateHash {
            uri: open.uri,
            path: open.path,
        });
        self.run_validation();
    }

    pub fn close_form(&self) {
        let open = self.with_state(|s| s.ui.current_form.is_some());
        if !open {
            return;
        }
        self.commit(Mutation::CloseForm);
        self.commit(Mutation::ClearHash);
    }

    /// Write one field of the active form and re-run validation
    pub fn update_form_data(&self, path: &str, value: Value) {
        self.commit(Mutation::UpdateFormData {
            path: path.to_string(),
            value,
        });
        self.run_validation();
    }

    /// Merge the active form's overlay into its component and save it
    pub async fn save_form(&self) -> Result<(), StoreError> {
        let (uri, merged) = self.with_state(|s| {
            let form = s.ui.current_form.as_ref().ok_or(StoreError::NoForm)?;
            let mut canonical = s
                .components
                .get(&form.uri)
                .cloned()
                .unwrap_or_else(|| json!({}));
            merge_overlay(&mut canonical, &form.fields);
            Ok::<_, StoreError>((form.uri.clone(), canonical))
        })?;

        self.update_component(&uri, merged).await
    }

    /// Commit new component data, record the undo snapshot, and mirror the
    /// write to the remote store.
    pub async fn update_component(&self, uri: &str, data: Value) -> Result<(), StoreError> {
        self.commit(Mutation::UpdateComponent {
            uri: uri.to_string(),
            data: data.clone(),
        });
        self.push_history_snapshot();

        if let Err(e) = self.content.save(uri, &data).await {
            warn!(uri, error = %e, "component save failed");
            self.commit(Mutation::AddNotification {
                level: NotificationLevel::Error,
                message: format!("Could not save component: {}", e),
                retry: None,
            });
            return Err(e.into());
        }
        Ok(())
    }

    /// Commit new page data, record the undo snapshot, and save the page —
    /// debounced per target, trailing edge, so rapid successive edits
    /// collapse into a single network write.
    ///
    /// On a failed write the page data is rolled back to this call's
    /// pre-save snapshot and a retryable notification is added.
    pub async fn save_page(&self, data: Value) -> Result<SaveOutcome, StoreError> {
        let (page_uri, pre_save) =
            self.with_state(|s| (s.page.uri.clone(), s.page.data.clone()));
        if page_uri.is_empty() {
            return Err(StoreError::NoPage);
        }

        self.commit(Mutation::UpdatePageData { data });
        self.push_history_snapshot();

        let generation = {
            let mut generations = self.save_generation.lock().unwrap();
            let entry = generations.entry(page_uri.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        tokio::time::sleep(self.options.save_debounce).await;

        let current = *self
            .save_generation
            .lock()
            .unwrap()
            .get(&page_uri)
            .unwrap_or(&0);
        if current != generation {
            debug!(uri = %page_uri, "page save superseded inside debounce window");
            return Ok(SaveOutcome::Superseded);
        }

        let latest = self.with_state(|s| s.page.data.clone());
        if let Err(e) = self.content.save(&page_uri, &latest).await {
            warn!(uri = %page_uri, error = %e, "page save failed, rolling back");
            self.commit(Mutation::RevertPageData { data: pre_save });
            self.commit(Mutation::AddNotification {
                level: NotificationLevel::Error,
                message: format!("Could not save page: {}", e),
                retry: Some(RetryAction::SavePage),
            });
            return Err(e.into());
        }
        Ok(SaveOutcome::Saved)
    }

    // --- undo/redo ---

    /// Step back one history entry. No-op at the start of history.
    pub async fn undo(&self) -> Result<(), StoreError> {
        let (at_start, cursor, prev) = self.with_state(|s| {
            (
                s.undo.at_start,
                s.undo.cursor,
                Snapshot {
                    components: s.components.clone(),
                    page_data: s.page.data.clone(),
                },
            )
        });
        if at_start {
            return Ok(());
        }

        let (snapshot, end) = {
            let history = self.history.lock().unwrap();
            (history.get(cursor - 1).cloned(), history.end())
        };
        let Some(snapshot) = snapshot else {
            return Ok(());
        };

        self.commit(Mutation::Undo {
            snapshot: snapshot.clone(),
            end,
        });
        self.save_restored(&snapshot, &prev).await
    }

    /// Step forward one history entry. No-op at the end of history.
    pub async fn redo(&self) -> Result<(), StoreError> {
        let (at_end, cursor, prev) = self.with_state(|s| {
            (
                s.undo.at_end,
                s.undo.cursor,
                Snapshot {
                    components: s.components.clone(),
                    page_data: s.page.data.clone(),
                },
            )
        });
        if at_end {
            return Ok(());
        }

        let (snapshot, end) = {
            let history = self.history.lock().unwrap();
            (history.get(cursor + 1).cloned(), history.end())
        };
        let Some(snapshot) = snapshot else {
            return Ok(());
        };

        self.commit(Mutation::Redo {
            snapshot: snapshot.clone(),
            end,
        });
        self.save_restored(&snapshot, &prev).await
    }

    /// Mirror a restored snapshot to the remote store, writing only what
    /// the restore actually changed.
    async fn save_restored(&self, snapshot: &Snapshot, prev: &Snapshot) -> Result<(), StoreError> {
        for (uri, data) in &snapshot.components {
            if prev.components.get(uri) != Some(data) {
                self.content.save(uri, data).await?;
            }
        }
        if snapshot.page_data != prev.page_data {
            let page_uri = self.with_state(|s| s.page.uri.clone());
            if !page_uri.is_empty() {
                self.content.save(&page_uri, &snapshot.page_data).await?;
            }
        }
        Ok(())
    }

    /// Record the current components + page data as a new history entry,
    /// discarding any redo tail past the cursor.
    pub(crate) fn push_history_snapshot(&self) {
        let (cursor, snapshot) = self.with_state(|s| {
            (
                s.undo.cursor,
                Snapshot {
                    components: s.components.clone(),
                    page_data: s.page.data.clone(),
                },
            )
        });

        let (new_cursor, end) = {
            let mut history = self.history.lock().unwrap();
            let new_cursor = history.push_after(cursor, snapshot);
            (new_cursor, history.end())
        };
        self.commit(Mutation::SetCursor {
            cursor: new_cursor,
            end,
        });
    }

    // --- ui pointers ---

    pub fn select(&self, el: &str) {
        self.commit(Mutation::Select { el: el.to_string() });
    }

    pub fn unselect(&self) {
        self.commit(Mutation::Unselect);
    }

    pub fn focus(&self, uri: &str, path: &str) {
        self.commit(Mutation::Focus(Focus {
            uri: uri.to_string(),
            path: path.to_string(),
        }));
    }

    pub fn unfocus(&self) {
        self.commit(Mutation::Unfocus);
    }

    pub fn open_pane(&self, name: &str) {
        self.commit(Mutation::OpenPane {
            name: name.to_string(),
        });
    }

    pub fn close_pane(&self) {
        self.commit(Mutation::ClosePane);
    }

    pub fn open_drawer(&self, name: &str) {
        self.commit(Mutation::OpenDrawer {
            name: name.to_string(),
        });
    }

    pub fn close_drawer(&self) {
        self.commit(Mutation::CloseDrawer);
    }

    pub fn dismiss_notification(&self, id: u64) {
        self.commit(Mutation::DismissNotification { id });
    }

    // --- lists & validation ---

    /// Load a named site-wide list from `{prefix}/lists/{name}`
    pub async fn load_list(&self, name: &str) -> Result<(), StoreError> {
        self.commit(Mutation::ListLoading {
            name: name.to_string(),
        });

        let uri = format!("{}/lists/{}", self.options.site_prefix, name);
        match self.content.get_object(&uri).await {
            Ok(Value::Array(items)) => {
                self.commit(Mutation::ListLoaded {
                    name: name.to_string(),
                    items,
                });
                Ok(())
            }
            Ok(other) => {
                let error = format!("Expected a list, got: {}", other);
                self.commit(Mutation::ListError {
                    name: name.to_string(),
                    error: error.clone(),
                });
                Err(StoreError::Api(amphora_api::ApiError::InvalidBody {
                    url: uri,
                    message: error,
                }))
            }
            Err(e) => {
                self.commit(Mutation::ListError {
                    name: name.to_string(),
                    error: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Run every registered validator and commit the results
    pub fn run_validation(&self) {
        let (errors, warnings) = self.with_state(|s| run_validators(&self.validators, s));
        self.commit(Mutation::UpdateValidation { errors, warnings });
    }
}
