//! # Suggestion Pass
//!
//! Applies tracked replacement suggestions to heading paragraphs.
//!
//! What text to suggest is not decided here: a `SuggestionPolicy` is
//! passed in and keyed by the running index of modified paragraphs, so
//! selection is deterministic and testable in isolation. The bundled
//! `CyclingPolicy` is a placeholder, not a content-generation algorithm.

use tracing::debug;

use crate::document::Document;

/// Decides the replacement text for one paragraph.
///
/// `index` is the running count of paragraphs already modified in this
/// pass; returning `None` leaves the paragraph untouched.
pub trait SuggestionPolicy {
    fn suggest(&self, index: usize, original: &str) -> Option<String>;
}

/// Placeholder policy cycling through three rewrite flavors by position
#[derive(Debug, Default, Clone, Copy)]
pub struct CyclingPolicy;

impl SuggestionPolicy for CyclingPolicy {
    fn suggest(&self, index: usize, original: &str) -> Option<String> {
        let suggestion = match index % 3 {
            0 => format!("{} (Refined)", original),
            1 => format!("✨ {}", original),
            _ => original.to_uppercase(),
        };
        Some(suggestion)
    }
}

/// Replace each heading paragraph's content with a tracked deletion of
/// the original text immediately followed by a tracked insertion of the
/// policy's suggestion. Enables revision tracking on the document so
/// later edits are captured too. Returns how many paragraphs changed.
pub fn suggest_changes(
    document: &mut Document,
    policy: &dyn SuggestionPolicy,
    author: &str,
) -> usize {
    document.enable_track_revisions();

    let headings: Vec<(usize, String)> = document
        .tree()
        .paragraphs
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            p.style
                .as_deref()
                .is_some_and(|style| style.starts_with("Heading"))
        })
        .map(|(index, p)| (index, p.text()))
        .collect();

    let mut modified = 0;
    for (paragraph_index, original) in headings {
        let Some(replacement) = policy.suggest(modified, &original) else {
            continue;
        };

        let deletion = document.create_deletion(&original, author);
        let insertion = document.create_insertion(&replacement, author);

        let paragraph = &mut document.tree_mut().paragraphs[paragraph_index];
        paragraph.clear_content();
        paragraph.children.push(deletion);
        paragraph.children.push(insertion);
        modified += 1;
    }

    debug!(author, suggestions = modified, "applied tracked suggestions");
    modified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::Change;
    use std::path::PathBuf;

    fn document_with_headings() -> Document {
        let source = concat!(
            "<w:document><w:body>",
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>"#,
            "<w:p><w:r><w:t>Body text stays put.</w:t></w:r></w:p>",
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Details</w:t></w:r></w:p>"#,
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Closing</w:t></w:r></w:p>"#,
            "</w:body></w:document>",
        );
        Document::from_source(PathBuf::from("test.xml"), source).unwrap()
    }

    #[test]
    fn test_cycling_policy_flavors() {
        let policy = CyclingPolicy;

        assert_eq!(policy.suggest(0, "Intro").unwrap(), "Intro (Refined)");
        assert_eq!(policy.suggest(1, "Intro").unwrap(), "✨ Intro");
        assert_eq!(policy.suggest(2, "Intro").unwrap(), "INTRO");
        assert_eq!(policy.suggest(3, "Intro").unwrap(), "Intro (Refined)");
    }

    #[test]
    fn test_only_headings_are_touched() {
        let mut doc = document_with_headings();

        let modified = suggest_changes(&mut doc, &CyclingPolicy, "AI_Reviewer");

        assert_eq!(modified, 3);
        assert_eq!(
            doc.tree().paragraphs[1].text(),
            "Body text stays put.",
        );
        assert_eq!(doc.tree().paragraphs[1].children.len(), 1);
        assert!(doc.tree().track_revisions);
    }

    #[test]
    fn test_suggestions_scan_as_updates() {
        let mut doc = document_with_headings();
        suggest_changes(&mut doc, &CyclingPolicy, "AI_Reviewer");

        let changes = doc.changes();
        assert_eq!(changes.len(), 3);
        match &changes[0] {
            Change::Update {
                original,
                replacement,
                author,
                ..
            } => {
                assert_eq!(original, "Intro");
                assert_eq!(replacement, "Intro (Refined)");
                assert_eq!(author, "AI_Reviewer");
            }
            other => panic!("expected update, got {:?}", other),
        }
        match &changes[1] {
            Change::Update { replacement, .. } => assert_eq!(replacement, "✨ Details"),
            other => panic!("expected update, got {:?}", other),
        }
        match &changes[2] {
            Change::Update { replacement, .. } => assert_eq!(replacement, "CLOSING"),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_policy_index_counts_modified_paragraphs_only() {
        struct SkipFirst;
        impl SuggestionPolicy for SkipFirst {
            fn suggest(&self, index: usize, original: &str) -> Option<String> {
                if original == "Intro" {
                    None
                } else {
                    Some(format!("{}-{}", original, index))
                }
            }
        }

        let mut doc = document_with_headings();
        let modified = suggest_changes(&mut doc, &SkipFirst, "AI_Reviewer");

        assert_eq!(modified, 2);
        // The skipped heading keeps its plain run
        assert_eq!(doc.tree().paragraphs[0].text(), "Intro");
        // Indexes restart from the first paragraph actually modified
        match &doc.changes()[0] {
            Change::Update { replacement, .. } => assert_eq!(replacement, "Details-0"),
            other => panic!("expected update, got {:?}", other),
        }
    }
}
