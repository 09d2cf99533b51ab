use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::StateStore;
use crate::models::AlertState;

/// In-process store for tests; clones share the same record
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    state: Arc<Mutex<AlertState>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStateStore {
    pub fn with_state(state: AlertState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn snapshot(&self) -> AlertState {
        self.state.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read(&self) -> AlertState {
        self.snapshot()
    }

    async fn write(&self, state: &AlertState) {
        *self.state.lock().unwrap() = state.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}
