//! Work item identity: the category/subcategory/name triple

/// One library to generate a rule document for.
///
/// Identity is the full triple; items are created by enumeration and
/// discarded after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub category: String,
    pub subcategory: String,
    pub name: String,
}

impl WorkItem {
    pub fn new(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            name: name.into(),
        }
    }

    /// Ledger key for this item. Deterministic; fields containing `/`
    /// could collide, which is an accepted limitation of the key scheme.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.category, self.subcategory, self.name)
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.subcategory, self.name)
    }
}

/// Sanitize a library name into a filesystem-safe stem: lowercase, every
/// run of characters outside `[a-z0-9-]` collapsed to a single `-`,
/// leading/trailing `-` stripped.
pub fn sanitize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut in_run = false;
    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_with_slash() {
        let item = WorkItem::new("frontend", "react", "react");
        assert_eq!(item.key(), "frontend/react/react");
    }

    #[test]
    fn key_deterministic() {
        let a = WorkItem::new("backend", "flask", "flask-restful");
        let b = WorkItem::new("backend", "flask", "flask-restful");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn sanitize_spaces_and_punctuation() {
        assert_eq!(sanitize_name("React Router!"), "react-router");
    }

    #[test]
    fn sanitize_strips_edge_dashes() {
        assert_eq!(sanitize_name("  --Foo--  "), "foo");
    }

    #[test]
    fn sanitize_collapses_runs() {
        assert_eq!(sanitize_name("C++ / STL"), "c-stl");
        assert_eq!(sanitize_name("Vue.js 3"), "vue-js-3");
    }

    #[test]
    fn sanitize_keeps_interior_dashes() {
        assert_eq!(sanitize_name("scikit-learn"), "scikit-learn");
    }

    #[test]
    fn sanitize_all_invalid_yields_empty() {
        assert_eq!(sanitize_name("!!!"), "");
    }
}
