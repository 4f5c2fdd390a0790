//! UI preferences and view state.
//!
//! Per-page background images and the sidebar collapse flag are persisted
//! next to the session. Modal visibility is process-local and never
//! written to disk.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::store::{KeyValueStore, StoreError};

const BACKGROUND_PREFIX: &str = "background:";
const KEY_SIDEBAR: &str = "sidebar_collapsed";

/// Persisted UI preferences.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    kv: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Set the background image URL for `page` (e.g. `dashboard`, `clients`).
    ///
    /// The URL is stored exactly as given. A blank URL clears the page's
    /// background.
    pub fn set_background(&self, page: &str, url: &str) -> Result<(), StoreError> {
        let page = normalize_page(page)?;
        if url.trim().is_empty() {
            return self.kv.remove(&background_key(&page));
        }
        self.kv.set(&background_key(&page), url)
    }

    /// Background image URL for `page`, if one was set.
    pub fn background(&self, page: &str) -> Result<Option<String>, StoreError> {
        let page = normalize_page(page)?;
        Ok(self.kv.get(&background_key(&page))?.filter(|u| !u.is_empty()))
    }

    pub fn remove_background(&self, page: &str) -> Result<(), StoreError> {
        let page = normalize_page(page)?;
        self.kv.remove(&background_key(&page))
    }

    /// All configured backgrounds, keyed by page.
    pub fn backgrounds(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let mut out = BTreeMap::new();
        for key in self.kv.keys()? {
            if let Some(page) = key.strip_prefix(BACKGROUND_PREFIX) {
                if let Some(url) = self.kv.get(&key)? {
                    out.insert(page.to_string(), url);
                }
            }
        }
        Ok(out)
    }

    pub fn sidebar_collapsed(&self) -> Result<bool, StoreError> {
        Ok(self.kv.get(KEY_SIDEBAR)?.as_deref() == Some("true"))
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<(), StoreError> {
        self.kv.set(KEY_SIDEBAR, if collapsed { "true" } else { "false" })
    }

    /// Flip the sidebar flag and return the new value.
    pub fn toggle_sidebar(&self) -> Result<bool, StoreError> {
        let next = !self.sidebar_collapsed()?;
        self.set_sidebar_collapsed(next)?;
        Ok(next)
    }
}

fn background_key(page: &str) -> String {
    format!("{BACKGROUND_PREFIX}{page}")
}

fn normalize_page(page: &str) -> Result<String, StoreError> {
    let page = page.trim().to_ascii_lowercase();
    if page.is_empty() {
        return Err(StoreError::Malformed {
            key: BACKGROUND_PREFIX.into(),
            reason: "page key must not be empty".into(),
        });
    }
    Ok(page)
}

/// Which modals are currently open.
#[derive(Debug, Clone, Default)]
pub struct ModalState {
    open: Arc<Mutex<BTreeSet<String>>>,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, name: &str) {
        self.open.lock().insert(name.to_string());
    }

    pub fn close(&self, name: &str) {
        self.open.lock().remove(name);
    }

    /// Toggle and return whether the modal is now open.
    pub fn toggle(&self, name: &str) -> bool {
        let mut open = self.open.lock();
        if open.remove(name) {
            false
        } else {
            open.insert(name.to_string());
            true
        }
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.open.lock().contains(name)
    }

    pub fn close_all(&self) {
        self.open.lock().clear();
    }
}
