//! In-process set store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::QueueResult;
use crate::store::SetStore;

/// Set store held in memory, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySetStore {
    sets: Mutex<HashMap<String, HashSet<String>>>,
}

impl MemorySetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the members of `key`, for inspection.
    pub async fn members(&self, key: &str) -> Vec<String> {
        let sets = self.sets.lock().await;
        sets.get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SetStore for MemorySetStore {
    async fn add(&self, key: &str, member: &str) -> QueueResult<bool> {
        let mut sets = self.sets.lock().await;
        Ok(sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn pop(&self, key: &str) -> QueueResult<Option<String>> {
        let mut sets = self.sets.lock().await;
        let Some(set) = sets.get_mut(key) else {
            return Ok(None);
        };
        let member = set.iter().next().cloned();
        if let Some(ref m) = member {
            set.remove(m);
        }
        Ok(member)
    }

    async fn cardinality(&self, key: &str) -> QueueResult<u64> {
        let sets = self.sets.lock().await;
        Ok(sets.get(key).map_or(0, |set| set.len() as u64))
    }
}
