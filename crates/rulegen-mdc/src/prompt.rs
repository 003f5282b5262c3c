//! Prompt assembly for the synthesis call.
//!
//! Two branches: when the lookup produced enough material the prompt
//! asks the model to synthesize and expand it; when it came back thin
//! the prompt asks the model to generate from its own knowledge.

use std::path::Path;

use crate::api::LookupResult;
use crate::work::WorkItem;

/// Minimum answer length for the lookup-backed branch
const MIN_ANSWER_LEN: usize = 100;

/// Minimum combined citation text length for the lookup-backed branch
const MIN_CITATION_LEN: usize = 200;

/// Used when the instructions file is missing or unreadable
const FALLBACK_INSTRUCTIONS: &str =
    "Create rules with clear descriptions and appropriate glob patterns.";

/// Query string sent to the lookup service for a library.
pub fn lookup_query(library: &str) -> String {
    format!("{library} best practices coding standards")
}

/// Load the rule-authoring instructions, falling back to a minimal
/// default when the file is absent (logged, not fatal).
pub fn load_instructions(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!(
                "Could not read instructions file {}: {e}, using fallback",
                path.display()
            );
            FALLBACK_INSTRUCTIONS.to_string()
        }
    }
}

/// Combined text of all citations that carry text, joined by blank lines.
pub fn citation_text(lookup: &LookupResult) -> String {
    let texts: Vec<&str> = lookup
        .citations
        .iter()
        .filter_map(|c| c.text.as_deref())
        .filter(|t| !t.is_empty())
        .collect();
    texts.join("\n\n")
}

/// Whether the lookup came back too thin to ground the synthesis on.
pub fn is_thin(lookup: &LookupResult) -> bool {
    lookup.answer.trim().len() < MIN_ANSWER_LEN
        && citation_text(lookup).trim().len() < MIN_CITATION_LEN
}

/// Build the synthesis prompt for one item.
///
/// `chunk_size` caps how much citation text is inlined.
pub fn build_prompt(
    item: &WorkItem,
    lookup: &LookupResult,
    instructions: &str,
    chunk_size: usize,
) -> String {
    let context_section = if is_thin(lookup) {
        format!(
            "I need you to research and generate comprehensive best practices for {name} \
             from your knowledge.\n\n\
             Please be extremely thorough and detailed, covering all aspects of {name} \
             development.\n\
             Your guidance should be useful for both beginners and experienced developers.\n",
            name = item.name
        )
    } else {
        let citations = citation_text(lookup);
        let truncated = truncate_chars(&citations, chunk_size);
        format!(
            "Based on the following information about {name} best practices:\n\n\
             Search results:\n{answer}\n\n\
             Additional information from citations:\n{truncated}\n\n\
             Please synthesize, enhance, and expand upon this information to create the \
             most comprehensive guide possible.\n\
             Add any important best practices that might be missing from the search results.\n",
            name = item.name,
            answer = lookup.answer,
        )
    };

    format!(
        "Create a comprehensive rule file for the {name} library following these guidelines:\n\n\
         {instructions}\n\n\
         Library Information:\n\
         - Name: {name}\n\
         - Category: {category}\n\
         - Subcategory: {subcategory}\n\n\
         {context_section}\n\
         Your task is to create an EXTREMELY DETAILED and COMPREHENSIVE guide that covers:\n\n\
         1. Code Organization and Structure: directory layout, file naming, module\n\
            organization, component architecture, code splitting.\n\
         2. Common Patterns and Anti-patterns: design patterns specific to {name},\n\
            recommended approaches, code smells to avoid, state management, error handling.\n\
         3. Performance Considerations: optimization techniques, memory management,\n\
            bundle size, lazy loading.\n\
         4. Security Best Practices: common vulnerabilities, input validation,\n\
            authentication patterns, secure API communication.\n\
         5. Testing Approaches: unit, integration, and end-to-end strategies, test\n\
            organization, mocking.\n\
         6. Common Pitfalls and Gotchas: frequent mistakes, edge cases,\n\
            version-specific issues, debugging strategies.\n\
         7. Tooling and Environment: recommended tools, build configuration, linting,\n\
            CI/CD integration.\n\n\
         Format your response as a valid JSON object with exactly these keys:\n\
         - name: a short descriptive name for the rule (e.g., \"{name} Best Practices\")\n\
         - glob_pattern: the most appropriate glob pattern for this library's file types\n\
         - description: a clear 1-2 sentence description of what the rule covers\n\
         - content: the formatted rule content with comprehensive best practices in markdown\n",
        name = item.name,
        category = item.category,
        subcategory = item.subcategory,
    )
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Citation;

    fn item() -> WorkItem {
        WorkItem::new("frontend", "react", "react")
    }

    fn rich_lookup() -> LookupResult {
        LookupResult {
            answer: "a".repeat(200),
            citations: vec![Citation {
                text: Some("b".repeat(300)),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn query_embeds_library_name() {
        assert_eq!(
            lookup_query("react"),
            "react best practices coding standards"
        );
    }

    #[test]
    fn empty_lookup_is_thin() {
        assert!(is_thin(&LookupResult::default()));
    }

    #[test]
    fn long_answer_alone_is_not_thin() {
        let lookup = LookupResult {
            answer: "a".repeat(150),
            citations: vec![],
        };
        assert!(!is_thin(&lookup));
    }

    #[test]
    fn long_citations_alone_are_not_thin() {
        let lookup = LookupResult {
            answer: String::new(),
            citations: vec![Citation {
                text: Some("c".repeat(250)),
                ..Default::default()
            }],
        };
        assert!(!is_thin(&lookup));
    }

    #[test]
    fn short_answer_and_citations_are_thin() {
        let lookup = LookupResult {
            answer: "short".into(),
            citations: vec![Citation {
                text: Some("tiny".into()),
                ..Default::default()
            }],
        };
        assert!(is_thin(&lookup));
    }

    #[test]
    fn citation_text_joins_with_blank_lines() {
        let lookup = LookupResult {
            answer: String::new(),
            citations: vec![
                Citation {
                    text: Some("first".into()),
                    ..Default::default()
                },
                Citation {
                    text: None,
                    ..Default::default()
                },
                Citation {
                    text: Some("second".into()),
                    ..Default::default()
                },
            ],
        };
        assert_eq!(citation_text(&lookup), "first\n\nsecond");
    }

    #[test]
    fn thin_lookup_takes_from_knowledge_branch() {
        let prompt = build_prompt(&item(), &LookupResult::default(), "instructions", 1000);
        assert!(prompt.contains("from your knowledge"));
        assert!(!prompt.contains("Search results:"));
    }

    #[test]
    fn rich_lookup_takes_synthesis_branch() {
        let prompt = build_prompt(&item(), &rich_lookup(), "instructions", 1000);
        assert!(prompt.contains("Search results:"));
        assert!(!prompt.contains("from your knowledge"));
    }

    #[test]
    fn prompt_includes_identity_and_instructions() {
        let prompt = build_prompt(&item(), &rich_lookup(), "THE-INSTRUCTIONS", 1000);
        assert!(prompt.contains("Name: react"));
        assert!(prompt.contains("Category: frontend"));
        assert!(prompt.contains("Subcategory: react"));
        assert!(prompt.contains("THE-INSTRUCTIONS"));
    }

    #[test]
    fn citation_text_truncated_to_chunk_size() {
        let prompt = build_prompt(&item(), &rich_lookup(), "i", 50);
        // 300 chars of citation text, only 50 may appear
        assert!(!prompt.contains(&"b".repeat(51)));
        assert!(prompt.contains(&"b".repeat(50)));
    }

    #[test]
    fn truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn load_instructions_falls_back_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let text = load_instructions(&dir.path().join("missing.txt"));
        assert_eq!(text, FALLBACK_INSTRUCTIONS);
    }

    #[test]
    fn load_instructions_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instructions.txt");
        std::fs::write(&path, "custom rules").unwrap();
        assert_eq!(load_instructions(&path), "custom rules");
    }
}
