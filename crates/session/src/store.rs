//! Session state storage seam.

use std::collections::HashMap;
use std::sync::Mutex;

/// Key under which the password-validation timestamp is persisted, as a
/// decimal epoch-milliseconds string. The sole persisted artifact of the
/// guard; absent or unparseable means "no valid session".
pub const PASSWORD_TIMESTAMP_KEY: &str = "bureauPasswordTimestamp";

/// Tab-scoped key/value store the guard persists into.
///
/// Injected explicitly (no ambient singleton): initialized when the guard is
/// constructed, read on every protected-path check. No cross-instance
/// synchronization is attempted; two tabs may disagree about validity.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn clear(&self, key: &str);
}

/// In-memory store, the default for a single dashboard session.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    fn clear(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}
