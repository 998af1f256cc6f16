use std::collections::BTreeMap;

use crate::base::Base;
use crate::formula::FormulaEvaluator;
use crate::note::Note;
use crate::selection::QueryEngine;
use crate::types::identifiers::{BaseId, CollectionVersion};
use crate::types::query_result::ViewResult;

/// Hit and miss counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Memoized view results for one note collection version.
///
/// Entries are keyed by Base id, so a caller that re-parses a Base under the
/// same id must call [`QueryCache::invalidate_base`].
#[derive(Debug, Default)]
pub struct QueryCache {
    pub(super) version: Option<CollectionVersion>,
    pub(super) entries: BTreeMap<(BaseId, String), ViewResult>,
    pub(super) stats: CacheStats,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a view, reusing a previous result for the same Base, view
    /// and collection version.
    pub fn query_view<F>(
        &mut self,
        engine: &QueryEngine<F>,
        base: &Base,
        view_name: Option<&str>,
        notes: &[Note],
        version: &CollectionVersion,
    ) -> Option<ViewResult>
    where
        F: FormulaEvaluator,
    {
        self.observe_version(version);

        let views = engine.views(base);
        let view = match view_name {
            Some(name) => views.iter().find(|view| view.name == name)?,
            None => views.first()?,
        };
        let key = (base.id.clone(), view.name.clone());

        if let Some(hit) = self.entries.get(&key) {
            self.stats.hits += 1;
            log::trace!("cache hit for base `{}` view `{}`", base.id, view.name);
            return Some(hit.clone());
        }

        self.stats.misses += 1;
        let result = engine.query_view(base, Some(&view.name), notes)?;
        self.entries.insert(key, result.clone());
        Some(result)
    }

    pub fn version(&self) -> Option<&CollectionVersion> {
        self.version.as_ref()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
