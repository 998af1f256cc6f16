use crate::cache::cache::QueryCache;
use crate::types::identifiers::{BaseId, CollectionVersion};

impl QueryCache {
    /// Drop every entry computed against a different collection version.
    pub(super) fn observe_version(&mut self, version: &CollectionVersion) {
        if self.version.as_ref() == Some(version) {
            return;
        }
        if !self.entries.is_empty() {
            log::debug!(
                "collection version changed to {}; evicting {} cached view(s)",
                version.as_str(),
                self.entries.len()
            );
        }
        self.entries.clear();
        self.version = Some(version.clone());
    }

    /// Forget every view of one Base, e.g. after its document was edited.
    pub fn invalidate_base(&mut self, id: &BaseId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(base, _), _| base != id);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.version = None;
    }
}
