//! In-memory transport for tests.
//!
//! Records every request (so call order can be asserted) and answers from a
//! list of rules checked in insertion order. Unmatched requests get an
//! empty-object 200.

use crate::error::ApiError;
use crate::transport::{Method, Request, Response, Transport};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockOutcome {
    Respond { status: u16, body: String },
    /// 200 whose final url differs from the requested one (e.g. a login
    /// redirect)
    RedirectTo { final_url: String },
    Timeout,
}

#[derive(Debug, Clone)]
struct Rule {
    method: Option<Method>,
    url_contains: String,
    outcome: MockOutcome,
}

#[derive(Default)]
pub struct MockTransport {
    rules: Mutex<Vec<Rule>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, method: Option<Method>, url_contains: &str, status: u16, body: &str) {
        self.push_rule(method, url_contains, MockOutcome::Respond {
            status,
            body: body.to_string(),
        });
    }

    pub fn timeout_on(&self, method: Option<Method>, url_contains: &str) {
        self.push_rule(method, url_contains, MockOutcome::Timeout);
    }

    pub fn redirect_to(&self, url_contains: &str, final_url: &str) {
        self.push_rule(None, url_contains, MockOutcome::RedirectTo {
            final_url: final_url.to_string(),
        });
    }

    fn push_rule(&self, method: Option<Method>, url_contains: &str, outcome: MockOutcome) {
        self.rules.lock().unwrap().push(Rule {
            method,
            url_contains: url_contains.to_string(),
            outcome,
        });
    }

    /// Everything sent through this transport, in call order
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// `"METHOD url"` pairs, convenient for order assertions
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url))
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, req: Request) -> Result<Response, ApiError> {
        self.requests.lock().unwrap().push(req.clone());

        let outcome = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|rule| {
                rule.method.map_or(true, |m| m == req.method)
                    && req.url.contains(&rule.url_contains)
            })
            .map(|rule| rule.outcome.clone());

        match outcome {
            Some(MockOutcome::Respond { status, body }) => Ok(Response {
                status,
                body,
                final_url: req.url,
            }),
            Some(MockOutcome::RedirectTo { final_url }) => Ok(Response {
                status: 200,
                body: String::new(),
                final_url,
            }),
            Some(MockOutcome::Timeout) => Err(ApiError::Timeout(req.url)),
            None => Ok(Response {
                status: 200,
                body: "{}".to_string(),
                final_url: req.url,
            }),
        }
    }
}
