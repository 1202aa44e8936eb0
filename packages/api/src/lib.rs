//! # Amphora API client
//!
//! Maps store operations onto a URI-addressed content store: a REST-ish
//! JSON/text service where everything is keyed by uris like
//! `domain.com/components/foo/instances/bar`.
//!
//! Transport is a seam: [`Transport`] is the one async trait the client
//! speaks, [`HttpTransport`] is the production `reqwest` implementation,
//! and [`mock::MockTransport`] records calls for tests.
//!
//! Every operation asserts its input is a uri (never a url) before
//! resolving it for the wire — a mixed-up address is a programmer error
//! raised before any network call.

mod client;
mod config;
mod error;
mod transport;

pub mod mock;

pub use client::ContentStore;
pub use config::ApiConfig;
pub use error::ApiError;
pub use transport::{HttpTransport, Method, Request, Response, Transport};
