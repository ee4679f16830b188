//! Markdown rendering of grouped annotations.
//!
//! The document is a flat sequence of page sections. Each section is a
//! heading plus one Markdown list entry per annotation; multi-line highlight
//! text stays inside its list item via two-space continuation indents, and
//! screenshots embed their data URL directly in an image reference so the
//! export is a single self-contained file.

use tracing::debug;

use crate::annotation::{Annotation, AnnotationBody};
use crate::artifact::{file_stem, ExportArtifact};
use crate::error::ExportError;
use crate::pipeline::group::{PageGroup, PageKey};

/// Heading text for the bucket of annotations with no resolvable page.
const UNASSIGNED_HEADING: &str = "(no page)";

/// Render grouped annotations to a Markdown artifact.
///
/// `file_name` is the source document's display name; the artifact is named
/// `annotations_{stem}.md`. Groups must come from
/// [`crate::pipeline::group::group_by_page`] so entries are already in
/// reading order.
pub fn render_markdown(
    groups: &[PageGroup<'_>],
    file_name: &str,
) -> Result<ExportArtifact, ExportError> {
    if groups.iter().all(|g| g.annotations.is_empty()) {
        return Err(ExportError::EmptyInput);
    }

    let mut out = String::new();
    let mut screenshot_counter = 0usize;

    for (group_index, group) in groups.iter().enumerate() {
        if group.annotations.is_empty() {
            continue;
        }
        if group_index > 0 {
            out.push('\n');
        }
        match group.key {
            PageKey::Page(n) => out.push_str(&format!("## Page {n}\n\n")),
            PageKey::Unassigned => out.push_str(&format!("## {UNASSIGNED_HEADING}\n\n")),
        }
        for (entry_index, annotation) in group.annotations.iter().enumerate() {
            if entry_index > 0 {
                out.push('\n');
            }
            push_entry(&mut out, annotation, &mut screenshot_counter);
        }
    }

    debug!(
        bytes = out.len(),
        screenshots = screenshot_counter,
        "markdown rendered"
    );
    Ok(ExportArtifact::new(
        out.into_bytes(),
        format!("annotations_{}.md", file_stem(file_name)),
    ))
}

fn push_entry(out: &mut String, annotation: &Annotation, screenshot_counter: &mut usize) {
    match &annotation.body {
        AnnotationBody::Screenshot { screenshot } => {
            *screenshot_counter += 1;
            out.push_str("- Screenshot\n");
            out.push_str(&format!(
                "  ![Screenshot {}]({})\n",
                screenshot_counter, screenshot.data_url
            ));
        }
        AnnotationBody::Text { content, .. } => {
            push_bullet(out, "- ", &content.text);
        }
    }
    if let Some(comment) = annotation.comment_text() {
        out.push('\n');
        push_bullet(out, "  Comment: ", comment);
    }
}

/// Emit `text` as one list-item block: `prefix` on the first line, two-space
/// continuation indent on the rest. Lines are split on any newline
/// convention and trimmed; empty text still yields the bare prefix so every
/// stored annotation produces a visible entry.
fn push_bullet(out: &mut String, prefix: &str, text: &str) {
    let mut lines = text
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|l| !l.is_empty());
    match lines.next() {
        Some(first) => {
            out.push_str(prefix);
            out.push_str(first);
            out.push('\n');
            for line in lines {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        None => {
            out.push_str(prefix.trim_end());
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::group::group_by_page;
    use crate::pipeline::order::order_annotations;

    fn render(input: &[Annotation]) -> String {
        let ordered = order_annotations(input);
        let groups = group_by_page(&ordered);
        let artifact = render_markdown(&groups, "paper.pdf").expect("render");
        String::from_utf8(artifact.bytes).expect("utf-8")
    }

    #[test]
    fn empty_groups_fail_with_empty_input() {
        let err = render_markdown(&[], "paper.pdf").unwrap_err();
        assert!(matches!(err, ExportError::EmptyInput));
    }

    #[test]
    fn artifact_name_prefixes_the_stem() {
        let input = vec![Annotation::text_on_page("a", "x", 1)];
        let ordered = order_annotations(&input);
        let groups = group_by_page(&ordered);
        let artifact = render_markdown(&groups, "my paper.pdf").unwrap();
        assert_eq!(artifact.file_name, "annotations_my paper.md");
    }

    #[test]
    fn multiline_content_indents_continuation_lines() {
        // "Hello\nWorld" must come out as "- Hello" then "  World".
        let input = vec![Annotation::text_on_page("a", "Hello\nWorld", 1)];
        let md = render(&input);
        assert_eq!(md, "## Page 1\n\n- Hello\n  World\n");
    }

    #[test]
    fn empty_content_emits_a_bare_bullet() {
        let input = vec![Annotation::text_on_page("a", "", 1)];
        let md = render(&input);
        assert_eq!(md, "## Page 1\n\n-\n");
    }

    #[test]
    fn comment_renders_as_indented_continuation_block() {
        let input = vec![Annotation::text_on_page("a", "quoted", 2).with_comment("my note")];
        let md = render(&input);
        assert_eq!(md, "## Page 2\n\n- quoted\n\n  Comment: my note\n");
    }

    #[test]
    fn screenshot_embeds_data_url_with_counter_alt_text() {
        let input = vec![
            Annotation::screenshot("s1", "data:image/png;base64,AAAA").with_page_relative_y(0.1),
            Annotation::screenshot("s2", "data:image/png;base64,BBBB").with_page_relative_y(0.2),
        ];
        let md = render(&input);
        assert!(md.contains("- Screenshot\n  ![Screenshot 1](data:image/png;base64,AAAA)"));
        assert!(md.contains("- Screenshot\n  ![Screenshot 2](data:image/png;base64,BBBB)"));
    }

    #[test]
    fn groups_are_separated_by_one_blank_line() {
        let input = vec![
            Annotation::text_on_page("a", "one", 1),
            Annotation::text_on_page("b", "two", 2),
        ];
        let md = render(&input);
        assert_eq!(md, "## Page 1\n\n- one\n\n## Page 2\n\n- two\n");
    }

    #[test]
    fn unassigned_heading_uses_placeholder_and_comes_last() {
        let input = vec![
            Annotation::text("floating", "lost"),
            Annotation::text_on_page("pinned", "found", 3),
        ];
        let md = render(&input);
        let page_pos = md.find("## Page 3").unwrap();
        let unassigned_pos = md.find("## (no page)").unwrap();
        assert!(page_pos < unassigned_pos);
    }

    #[test]
    fn same_page_screenshots_keep_insertion_order() {
        let input = vec![
            Annotation::screenshot("first", "data:image/png;base64,AAAA"),
            Annotation::screenshot("second", "data:image/png;base64,BBBB"),
        ];
        let md = render(&input);
        let a = md.find("AAAA").unwrap();
        let b = md.find("BBBB").unwrap();
        assert!(a < b);
    }
}
