//! Caller-owned cache of consolidated datasets.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::pipeline::{Consolidation, Consolidator, PipelineConfig};

/// Consolidated datasets keyed by the configuration that produced them.
///
/// Source files are assumed not to change while an entry is held; call
/// [`invalidate`](Self::invalidate) or [`clear`](Self::clear) when they do.
/// Failed consolidations are not cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<String, Arc<Consolidation>>,
}

impl DatasetCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached dataset for `config`, if any.
    pub fn get(&self, config: &PipelineConfig) -> Result<Option<Arc<Consolidation>>> {
        let key = config.fingerprint()?;
        Ok(self.entries.get(&key).cloned())
    }

    /// Return the cached dataset for `config`, consolidating it on first use.
    pub fn get_or_consolidate(&mut self, config: &PipelineConfig) -> Result<Arc<Consolidation>> {
        let key = config.fingerprint()?;
        if let Some(hit) = self.entries.get(&key) {
            debug!(key = %key, "dataset cache hit");
            return Ok(Arc::clone(hit));
        }

        let consolidation = Arc::new(Consolidator::new(config.clone()).consolidate()?);
        self.entries.insert(key, Arc::clone(&consolidation));
        Ok(consolidation)
    }

    /// Forget the dataset for `config`. Returns whether one was cached.
    pub fn invalidate(&mut self, config: &PipelineConfig) -> Result<bool> {
        let key = config.fingerprint()?;
        Ok(self.entries.remove(&key).is_some())
    }

    /// Forget every dataset.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
