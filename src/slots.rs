use camino::Utf8PathBuf;

use crate::domain::SemanticCategory;
use crate::error::CatalogError;
use crate::store::AssetStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub category: SemanticCategory,
    pub path_name: String,
    pub dir: Utf8PathBuf,
}

/// Hands out one output directory per category for a single experiment run.
///
/// `Data Files` and `Additional Plots` are always present under fixed names. Every
/// other category gets `Path<N>` on first sight, `N` being the number of slots
/// known once it is added.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    root: Utf8PathBuf,
    assigned: Vec<(SemanticCategory, String)>,
}

impl SlotAllocator {
    pub fn new(root: Utf8PathBuf) -> Self {
        let assigned = [
            SemanticCategory::DataFiles,
            SemanticCategory::AdditionalPlots,
        ]
        .into_iter()
        .filter_map(|category| {
            category
                .fixed_path()
                .map(|path| (category, path.to_string()))
        })
        .collect();
        Self { root, assigned }
    }

    /// Returns the memoized path name for `category`, assigning one if needed.
    pub fn assign(&mut self, category: SemanticCategory) -> String {
        if let Some((_, path)) = self.assigned.iter().find(|(known, _)| *known == category) {
            return path.clone();
        }
        let path = match category.fixed_path() {
            Some(fixed) => fixed.to_string(),
            None => format!("Path{}", self.assigned.len() + 1),
        };
        self.assigned.push((category, path.clone()));
        path
    }

    /// Assigns the slot and makes sure its directory exists.
    pub fn allocate(
        &mut self,
        category: SemanticCategory,
        store: &dyn AssetStore,
    ) -> Result<Slot, CatalogError> {
        let path_name = self.assign(category);
        let dir = self.root.join(&path_name);
        store.ensure_dir(&dir)?;
        Ok(Slot {
            category,
            path_name,
            dir,
        })
    }
}
