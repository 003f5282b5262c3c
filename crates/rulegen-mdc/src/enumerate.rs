//! Work enumeration: catalog × ledger × filters → flat work list

use rulegen_core::ProgressLedger;

use crate::catalog::Catalog;
use crate::work::WorkItem;

/// Optional target filters, combined with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub library: Option<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.subcategory.is_none() && self.library.is_none()
    }
}

/// Expand the catalog into work items in document order, dropping entries
/// excluded by the filters and entries already completed per the ledger.
/// Returns the work list plus the count of already-completed entries.
///
/// Failed entries are re-enumerated; an empty result is not an error.
pub fn enumerate(
    catalog: &Catalog,
    ledger: &ProgressLedger,
    filters: &Filters,
) -> (Vec<WorkItem>, usize) {
    let mut items = Vec::new();
    let mut skipped = 0usize;

    for category in catalog.categories() {
        if filters
            .category
            .as_ref()
            .is_some_and(|c| *c != category.name)
        {
            continue;
        }
        for subcategory in &category.subcategories {
            if filters
                .subcategory
                .as_ref()
                .is_some_and(|s| *s != subcategory.name)
            {
                continue;
            }
            for library in &subcategory.libraries {
                if filters.library.as_ref().is_some_and(|l| l != library) {
                    continue;
                }
                let item = WorkItem::new(&category.name, &subcategory.name, library);
                if ledger.is_completed(&item.key()) {
                    log::debug!("Skipping already processed library: {library}");
                    skipped += 1;
                    continue;
                }
                items.push(item);
            }
        }
    }

    if skipped > 0 {
        log::info!("{skipped} libraries already completed, skipping");
    }
    (items, skipped)
}
