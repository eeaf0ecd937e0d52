use crate::entry::LogEntry;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Bounded in-memory capture log shared by all request handlers.
///
/// Cloning the store clones the handle, not the contents; every clone
/// reads and writes the same buffer. One mutex guards the sequence, so
/// `append` and `snapshot` are mutually exclusive and a snapshot can
/// never observe a half-applied eviction.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    window: usize,
}

impl CaptureStore {
    /// `window` is the maximum number of retained entries. Must be
    /// positive; configuration validation rejects zero before a store
    /// is ever built.
    pub fn new(window: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(window))),
            window,
        }
    }

    /// Append `entry` as the newest element, evicting oldest-first once
    /// the window is exceeded. Always succeeds.
    pub fn append(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.push_back(entry);
        while entries.len() > self.window {
            entries.pop_front();
        }
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}
