use std::collections::HashSet;
use std::hash::Hash;

use camino::Utf8PathBuf;

use crate::domain::SemanticCategory;

/// Identity of a rendered figure inside one catalog section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FigureKey {
    pub category: SemanticCategory,
    pub base_name: String,
}

/// Set of assets already placed during the current run.
#[derive(Debug, Clone)]
pub struct DedupLedger<K> {
    seen: HashSet<K>,
}

impl<K: Eq + Hash> DedupLedger<K> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    pub fn seen(&self, key: &K) -> bool {
        self.seen.contains(key)
    }

    pub fn mark_seen(&mut self, key: K) {
        self.seen.insert(key);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<K: Eq + Hash> Default for DedupLedger<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Data files are keyed by absolute destination path.
pub type DataFileLedger = DedupLedger<Utf8PathBuf>;
pub type FigureLedger = DedupLedger<FigureKey>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figures_dedup_per_category() {
        let mut ledger = FigureLedger::new();
        let key = FigureKey {
            category: SemanticCategory::ERegion,
            base_name: "Electron ne.png".to_string(),
        };
        assert!(!ledger.seen(&key));
        ledger.mark_seen(key.clone());
        assert!(ledger.seen(&key));

        let other_section = FigureKey {
            category: SemanticCategory::FRegion,
            ..key
        };
        assert!(!ledger.seen(&other_section));
        assert_eq!(ledger.len(), 1);
    }
}
