//! Deep-link hash wire format.
//!
//! The browser location hash is `key=value&key=value` with no leading `#`
//! and no trailing `&`. Two shapes exist: menu mode (`tab`, `sites`,
//! `status`, `query`) and form mode (`component`, `instance`, `path`),
//! discriminated by whether the first segment's key is the reserved menu
//! keyword.

use crate::state::FormTarget;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// First-segment key that marks a menu-mode hash
pub const MENU_KEYWORD: &str = "tab";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashState {
    Menu(MenuState),
    Form(FormTarget),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuState {
    pub tab: String,
    pub sites: Option<String>,
    pub status: Option<String>,
    pub query: Option<String>,
}

fn pairs(hash: &str) -> Vec<(&str, &str)> {
    hash.trim_start_matches('#')
        .split('&')
        .filter(|seg| !seg.is_empty())
        .filter_map(|seg| seg.split_once('='))
        .collect()
}

pub fn parse_hash(hash: &str) -> Option<HashState> {
    let pairs = pairs(hash);
    let first_key = pairs.first()?.0;

    let get = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    };

    if first_key == MENU_KEYWORD {
        Some(HashState::Menu(MenuState {
            tab: get(MENU_KEYWORD)?,
            sites: get("sites"),
            status: get("status"),
            query: get("query"),
        }))
    } else {
        Some(HashState::Form(FormTarget {
            component: get("component")?,
            instance: get("instance"),
            path: get("path").unwrap_or_default(),
        }))
    }
}

pub fn format_hash(state: &HashState) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    match state {
        HashState::Menu(menu) => {
            pairs.push((MENU_KEYWORD.to_string(), menu.tab.clone()));
            if let Some(sites) = &menu.sites {
                pairs.push(("sites".to_string(), sites.clone()));
            }
            if let Some(status) = &menu.status {
                pairs.push(("status".to_string(), status.clone()));
            }
            if let Some(query) = &menu.query {
                pairs.push(("query".to_string(), query.clone()));
            }
        }
        HashState::Form(form) => {
            pairs.push(("component".to_string(), form.component.clone()));
            if let Some(instance) = &form.instance {
                pairs.push(("instance".to_string(), instance.clone()));
            }
            pairs.push(("path".to_string(), form.path.clone()));
        }
    }
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Rebuild the component uri a form-mode hash points at, so a deep link
/// can reopen the form it describes
pub fn form_uri_from_target(site_prefix: &str, target: &FormTarget) -> String {
    match &target.instance {
        Some(instance) => format!(
            "{}/components/{}/instances/{}",
            site_prefix, target.component, instance
        ),
        None => format!("{}/components/{}", site_prefix, target.component),
    }
}

/// Where the formatted hash gets mirrored. In a browser shell this is the
/// address bar; tests use [`RecordingLocation`].
pub trait LocationHash: Send + Sync {
    fn set(&self, hash: &str);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct NoopLocation;

impl LocationHash for NoopLocation {
    fn set(&self, _hash: &str) {}
    fn clear(&self) {}
}

/// Records every mirror call, newest last; `None` marks a clear
#[derive(Debug, Default)]
pub struct RecordingLocation {
    pub changes: Mutex<Vec<Option<String>>>,
}

impl LocationHash for RecordingLocation {
    fn set(&self, hash: &str) {
        self.changes.lock().unwrap().push(Some(hash.to_string()));
    }

    fn clear(&self) {
        self.changes.lock().unwrap().push(None);
    }
}
