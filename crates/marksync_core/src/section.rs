//! Heading-based document sectioning.
//!
//! Sections are the units the merger compares across the local and remote
//! variants of a document. Ids derive from heading text (slugs), never from
//! byte offsets, so the same section is recognized on both sides even when
//! surrounding content moved.

/// A contiguous document section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Content-derived id: the heading slug, or `preamble` for text before
    /// the first heading. Duplicate slugs get `-2`, `-3`, ... suffixes in
    /// document order.
    pub id: String,
    /// Heading line text without the `#` markers, if any.
    pub heading: Option<String>,
    /// Full section text, heading line included.
    pub text: String,
}

/// Splits markdown content into sections at ATX headings.
///
/// Headings inside fenced code blocks do not start sections.
pub fn split_sections(content: &str) -> Vec<Section> {
    let mut sections: Vec<(Option<String>, String)> = Vec::new();
    let mut current = String::new();
    let mut current_heading: Option<String> = None;
    let mut started = false;
    let mut in_fence = false;

    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        if !in_fence && heading_text(line).is_some() {
            if started && !current.is_empty() {
                sections.push((current_heading.take(), std::mem::take(&mut current)));
            }
            current_heading = heading_text(line).map(str::to_owned);
            started = true;
        }
        current.push_str(line);
        current.push('\n');
        started = started || !line.trim().is_empty();
    }
    if !current.trim().is_empty() || !sections.is_empty() {
        sections.push((current_heading, current));
    }

    assign_ids(sections)
}

fn assign_ids(sections: Vec<(Option<String>, String)>) -> Vec<Section> {
    let mut seen: Vec<String> = Vec::new();
    sections
        .into_iter()
        .map(|(heading, text)| {
            let base = heading
                .as_deref()
                .map(slugify)
                .unwrap_or_else(|| "preamble".to_owned());
            let count = seen.iter().filter(|s| **s == base).count();
            seen.push(base.clone());
            let id = if count == 0 {
                base
            } else {
                format!("{base}-{}", count + 1)
            };
            Section { id, heading, text }
        })
        .collect()
}

/// Returns the heading text of an ATX heading line, if it is one.
fn heading_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) {
        trimmed[hashes..].strip_prefix(' ').map(str::trim)
    } else {
        None
    }
}

/// Lowercase-alphanumeric slug of a heading, words joined by `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_headings() {
        let doc = "intro text\n\n# Alpha\n\na body\n\n## Beta\n\nb body\n";
        let sections = split_sections(doc);
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["preamble", "alpha", "beta"]);
        assert!(sections[1].text.contains("a body"));
        assert_eq!(sections[1].heading.as_deref(), Some("Alpha"));
    }

    #[test]
    fn no_preamble_when_doc_opens_with_heading() {
        let sections = split_sections("# Only\n\nbody\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, "only");
    }

    #[test]
    fn duplicate_headings_get_suffixes() {
        let doc = "# Notes\n\none\n\n# Notes\n\ntwo\n";
        let sections = split_sections(doc);
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["notes", "notes-2"]);
    }

    #[test]
    fn code_fence_hides_headings() {
        let doc = "# Real\n\n```\n# not a heading\n```\n\ntail\n";
        let sections = split_sections(doc);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].text.contains("# not a heading"));
    }

    #[test]
    fn ids_are_offset_free() {
        // The same section content yields the same id regardless of what
        // precedes it.
        let a = split_sections("# Target\n\nbody\n");
        let b = split_sections("junk before\n\n# Target\n\nbody\n");
        assert_eq!(a[0].id, b[1].id);
    }

    #[test]
    fn slugify_basics() {
        assert_eq!(slugify("Quarterly Plan (Q3)"), "quarterly-plan-q3");
        assert_eq!(slugify("***"), "section");
    }

    #[test]
    fn empty_document_has_no_sections() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n").is_empty());
    }
}
