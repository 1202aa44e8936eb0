//! # Amphora store
//!
//! The single source of truth for the editing session.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ ui event / deep link                        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ action: async, impure                       │
//! │  - calls the content store                  │
//! │  - commits 0+ mutations, in fixed order     │
//! │  - resolves/rejects to signal completion    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutation: pure state transform              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ subscribers: re-render / reconcile the DOM  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **One tree**: page, components, layout, form, undo, hash, validation
//!    and list state all live in [`State`], written only by mutations.
//! 2. **Actions own I/O**: network calls happen before commits; a failed
//!    save rolls its mutation back and leaves a retryable notification.
//! 3. **History is owned by the engine**: snapshots are cloned in and
//!    cloned out; nothing outside [`history`] touches the entries.
//! 4. **Injected collaborators**: the content client, location-hash sink,
//!    progress reporter and validator registry are constructor arguments —
//!    there are no ambient globals.

pub mod fields;
pub mod hash;
pub mod history;
pub mod lists;
pub mod mutations;
pub mod progress;
pub mod registry;
pub mod state;

mod actions;
mod error;
mod publish;
mod store;

pub use actions::{FormOpen, PreloadData, SaveOutcome};
pub use error::StoreError;
pub use hash::{parse_hash, format_hash, HashState, LocationHash, MenuState};
pub use history::Snapshot;
pub use mutations::Mutation;
pub use progress::ProgressReporter;
pub use registry::{Registry, Validator};
pub use state::State;
pub use store::{Store, StoreBuilder, StoreOptions};
