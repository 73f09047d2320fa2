//! Access to the URL fragment the controller is started with

use std::sync::Mutex;

pub trait Location: Send + Sync {
    /// Current fragment, with or without its leading `#`
    fn fragment(&self) -> String;

    /// Remove the fragment, e.g. after consuming an OAuth payload
    fn clear_fragment(&self);
}

/// Location held in memory
#[derive(Debug, Default)]
pub struct MemoryLocation {
    fragment: Mutex<String>,
}

impl MemoryLocation {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: Mutex::new(fragment.into()),
        }
    }

    pub fn set_fragment(&self, fragment: impl Into<String>) {
        *self.lock() = fragment.into();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, String> {
        self.fragment.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> String {
        self.lock().clone()
    }

    fn clear_fragment(&self) {
        self.lock().clear();
    }
}
