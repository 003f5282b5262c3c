//! Library catalog: category → subcategory → ordered list of names.
//!
//! Loaded once at startup from JSON. The document order is the
//! enumeration order, so parsing goes through `serde_json`'s
//! order-preserving maps before validation flattens it into vectors.

use std::path::Path;

use anyhow::{Context, Result};

/// Read-only, order-preserving three-level catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone)]
pub struct Subcategory {
    pub name: String,
    pub libraries: Vec<String>,
}

impl Catalog {
    /// Load and validate the catalog file. Any problem here is fatal for
    /// the run: there is no meaningful work without a catalog.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read catalog {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Malformed catalog {}", path.display()))
    }

    /// Parse a catalog from a JSON string (exposed for tests).
    pub fn from_json_str(content: &str) -> Result<Self> {
        let root: serde_json::Value = serde_json::from_str(content).context("invalid JSON")?;
        let root = root.as_object().context("top level must be an object")?;

        let mut categories = Vec::with_capacity(root.len());
        for (cat_name, subs) in root {
            let subs = subs
                .as_object()
                .with_context(|| format!("category {cat_name:?} must be an object"))?;
            let mut subcategories = Vec::with_capacity(subs.len());
            for (sub_name, libs) in subs {
                let libs = libs
                    .as_array()
                    .with_context(|| format!("subcategory {cat_name:?}/{sub_name:?} must be an array"))?;
                let libraries = libs
                    .iter()
                    .map(|v| {
                        v.as_str().map(String::from).with_context(|| {
                            format!("library names in {cat_name:?}/{sub_name:?} must be strings")
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                subcategories.push(Subcategory {
                    name: sub_name.clone(),
                    libraries,
                });
            }
            categories.push(Category {
                name: cat_name.clone(),
                subcategories,
            });
        }
        Ok(Self { categories })
    }

    /// Categories in document order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// True iff the exact triple exists in the catalog.
    pub fn contains(&self, category: &str, subcategory: &str, name: &str) -> bool {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .and_then(|c| c.subcategories.iter().find(|s| s.name == subcategory))
            .is_some_and(|s| s.libraries.iter().any(|l| l == name))
    }

    /// Total number of library entries.
    pub fn len(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.subcategories)
            .map(|s| s.libraries.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
