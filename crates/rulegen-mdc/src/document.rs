//! Document post-processing and file emission.
//!
//! Output layout: `output_dir/category/subcategory/<sanitized-name>.mdc`.
//! Two distinct library names can sanitize to the same stem within a
//! subcategory; the last writer wins (accepted limitation).

use std::path::{Path, PathBuf};

use crate::api::LookupResult;
use crate::schema::RuleDoc;
use crate::work::{WorkItem, sanitize_name};

/// Front-matter delimiter line
const DELIMITER: &str = "---";

/// Strip code-fence markers and any duplicated leading front-matter block
/// from LLM-produced content. Models often wrap the body in a fenced
/// block or repeat the header we render ourselves.
pub fn clean_content(raw: &str) -> String {
    let mut content = raw.trim().replace("```yaml", "").replace("```", "");
    content = content.trim().to_string();

    if content.starts_with(DELIMITER) {
        // Drop everything through the second delimiter occurrence
        if let Some(pos) = content[DELIMITER.len()..].find(DELIMITER) {
            let end = DELIMITER.len() + pos + DELIMITER.len();
            content = content[end..].trim().to_string();
        }
    }
    content
}

/// Render the final document: synthesized header from the rule's
/// description and glob pattern, then the cleaned body.
pub fn render_document(doc: &RuleDoc) -> String {
    format!(
        "---\ndescription: {}\nglobs: {}\n---\n{}",
        doc.description,
        doc.glob_pattern,
        clean_content(&doc.content)
    )
}

/// Path the document for `item` is written to.
pub fn document_path(output_dir: &Path, item: &WorkItem) -> PathBuf {
    output_dir
        .join(&item.category)
        .join(&item.subcategory)
        .join(format!("{}.mdc", sanitize_name(&item.name)))
}

/// Write the rendered document, creating intermediate directories as
/// needed (existing directories are not an error).
pub fn write_document(output_dir: &Path, item: &WorkItem, doc: &RuleDoc) -> std::io::Result<PathBuf> {
    let path = document_path(output_dir, item);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, render_document(doc))?;
    Ok(path)
}

/// Persist the raw lookup result next to the run for auditability.
pub fn save_lookup_result(
    results_dir: &Path,
    library: &str,
    result: &LookupResult,
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(results_dir)?;
    let path = results_dir.join(format!("{}-result.json", sanitize_name(library)));
    let json = serde_json::to_string_pretty(result).expect("lookup result serializes");
    std::fs::write(&path, json)?;
    Ok(path)
}
