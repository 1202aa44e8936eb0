//! The store: canonical state plus everything injected around it.
//!
//! Explicitly constructed and passed to whoever needs it — never a module
//! global. The state tree is the only shared mutable resource; it lives
//! behind a mutex owned here and is written exclusively by
//! [`Store::commit`].

use crate::hash::{format_hash, HashState, LocationHash, NoopLocation};
use crate::history::History;
use crate::mutations::Mutation;
use crate::progress::{NoopProgress, ProgressReporter};
use crate::registry::{Registry, Validator};
use crate::state::State;
use amphora_api::ContentStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

pub type Subscriber = Box<dyn Fn(&State) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Site prefix uri (e.g. `domain.com`) for schedule/uri-index/list
    /// resources
    pub site_prefix: String,
    /// Trailing-edge delay for debounced page-metadata saves
    pub save_debounce: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            site_prefix: String::new(),
            save_debounce: Duration::from_millis(500),
        }
    }
}

pub struct Store {
    state: Mutex<State>,
    pub(crate) history: Mutex<History>,
    subscribers: Mutex<Vec<Subscriber>>,
    pub(crate) content: Arc<ContentStore>,
    pub(crate) location: Arc<dyn LocationHash>,
    pub(crate) progress: Arc<dyn ProgressReporter>,
    pub(crate) validators: Registry<dyn Validator>,
    pub(crate) options: StoreOptions,
    /// Per-target generation counters for debounced saves
    pub(crate) save_generation: Mutex<HashMap<String, u64>>,
}

impl Store {
    pub fn builder(content: Arc<ContentStore>) -> StoreBuilder {
        StoreBuilder::new(content)
    }

    /// Apply a mutation and notify subscribers with the post-mutation
    /// state. Mutations apply synchronously, in the exact order committed.
    pub fn commit(&self, mutation: Mutation) {
        // location-hash and progress mirrors are driven from the committed
        // mutation, never from actions
        enum Mirror {
            None,
            Hash,
            ClearHash,
            ProgressBegin,
            ProgressFinish,
        }
        let mirror = match &mutation {
            Mutation::UpdateHash { .. } => Mirror::Hash,
            Mutation::ClearHash => Mirror::ClearHash,
            Mutation::StartProgress => Mirror::ProgressBegin,
            Mutation::FinishProgress => Mirror::ProgressFinish,
            _ => Mirror::None,
        };

        let mut state = self.state.lock().unwrap();
        mutation.apply(&mut state);

        match mirror {
            Mirror::Hash => {
                if let Some(target) = &state.url {
                    self.location.set(&format_hash(&HashState::Form(target.clone())));
                }
            }
            Mirror::ClearHash => self.location.clear(),
            Mirror::ProgressBegin => self.progress.begin(),
            Mirror::ProgressFinish => self.progress.finish(),
            Mirror::None => {}
        }

        let subscribers = self.subscribers.lock().unwrap();
        for subscriber in subscribers.iter() {
            subscriber(&state);
        }
    }

    /// Subscribe to every committed mutation. Subscribers run synchronously
    /// inside the commit and must not call back into the store.
    pub fn subscribe(&self, subscriber: Subscriber) {
        self.subscribers.lock().unwrap().push(subscriber);
    }

    /// Read access without cloning
    pub fn with_state<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.state.lock().unwrap())
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> State {
        self.state.lock().unwrap().clone()
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }
}

pub struct StoreBuilder {
    content: Arc<ContentStore>,
    location: Arc<dyn LocationHash>,
    progress: Arc<dyn ProgressReporter>,
    validators: Registry<dyn Validator>,
    options: StoreOptions,
}

impl StoreBuilder {
    pub fn new(content: Arc<ContentStore>) -> Self {
        Self {
            content,
            location: Arc::new(NoopLocation),
            progress: Arc::new(NoopProgress),
            validators: Registry::new(),
            options: StoreOptions::default(),
        }
    }

    pub fn location(mut self, location: Arc<dyn LocationHash>) -> Self {
        self.location = location;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn validator(mut self, name: &str, validator: Arc<dyn Validator>) -> Self {
        self.validators.register(name, validator);
        self
    }

    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Store {
        debug!(site = %self.options.site_prefix, "store created");
        Store {
            state: Mutex::new(State::default()),
            history: Mutex::new(History::new()),
            subscribers: Mutex::new(Vec::new()),
            content: self.content,
            location: self.location,
            progress: self.progress,
            validators: self.validators,
            options: self.options,
            save_generation: Mutex::new(HashMap::new()),
        }
    }
}
