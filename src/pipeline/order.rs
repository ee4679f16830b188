//! Reading-order sort.
//!
//! One sort shared by both exporters, so Markdown and PDF always agree on
//! sequence. The key is `(page, vertical offset, original index)`:
//!
//! * page: unresolved pages map to a `u64::MAX` sentinel and sort last;
//! * vertical offset: unresolved offsets map to `+∞` and sort to the end of
//!   their page;
//! * original index: creation order, the final tie-break, which also makes
//!   the whole sort deterministic for equal keys.

use tracing::debug;

use crate::annotation::Annotation;
use crate::pipeline::position::{resolve_page_number, resolve_vertical_offset};

/// Sentinel page key for annotations whose page cannot be resolved.
/// Strictly greater than any real page number, so they sort last.
const UNASSIGNED_PAGE: u64 = u64::MAX;

/// Sort annotations into reading order, borrowing from the input slice.
///
/// The input is never mutated; the returned references preserve creation
/// order among annotations whose page and offset tie.
pub fn order_annotations(annotations: &[Annotation]) -> Vec<&Annotation> {
    let mut decorated: Vec<(u64, f64, usize, &Annotation)> = annotations
        .iter()
        .enumerate()
        .map(|(index, annotation)| {
            let page = resolve_page_number(annotation)
                .map(u64::from)
                .unwrap_or(UNASSIGNED_PAGE);
            let offset = resolve_vertical_offset(annotation).unwrap_or(f64::INFINITY);
            (page, offset, index, annotation)
        })
        .collect();

    // total_cmp gives a total order even if a non-finite offset slips
    // through; the index component makes every key unique.
    decorated.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.total_cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    debug!(count = decorated.len(), "annotations ordered");
    decorated.into_iter().map(|(_, _, _, a)| a).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(ordered: &[&'a Annotation]) -> Vec<&'a str> {
        ordered.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn sorts_by_page_then_offset() {
        let input = vec![
            Annotation::text_on_page("p3", "c", 3).with_page_relative_y(0.1),
            Annotation::text_on_page("p1-low", "a", 1).with_page_relative_y(0.8),
            Annotation::text_on_page("p1-high", "b", 1).with_page_relative_y(0.2),
        ];
        let ordered = order_annotations(&input);
        assert_eq!(ids(&ordered), ["p1-high", "p1-low", "p3"]);
    }

    #[test]
    fn unassigned_page_sorts_after_every_numbered_page() {
        let input = vec![
            Annotation::text("nowhere", "x"),
            Annotation::text_on_page("p9", "y", 9).with_page_relative_y(0.99),
        ];
        let ordered = order_annotations(&input);
        assert_eq!(ids(&ordered), ["p9", "nowhere"]);
    }

    #[test]
    fn unresolved_offset_sorts_to_end_of_its_page() {
        // Same page: one resolvable offset, one not.
        let input = vec![
            Annotation::text_on_page("no-offset", "x", 2),
            Annotation::text_on_page("bottom", "y", 2).with_page_relative_y(0.95),
        ];
        let ordered = order_annotations(&input);
        assert_eq!(ids(&ordered), ["bottom", "no-offset"]);
    }

    #[test]
    fn ties_preserve_creation_order() {
        let input = vec![
            Annotation::text_on_page("first", "a", 1).with_page_relative_y(0.5),
            Annotation::text_on_page("second", "b", 1).with_page_relative_y(0.5),
            Annotation::text_on_page("third", "c", 1).with_page_relative_y(0.5),
        ];
        let ordered = order_annotations(&input);
        assert_eq!(ids(&ordered), ["first", "second", "third"]);
    }

    #[test]
    fn multiple_unassigned_keep_creation_order() {
        let input = vec![
            Annotation::text("u1", "a"),
            Annotation::text("u2", "b"),
            Annotation::text("u3", "c"),
        ];
        let ordered = order_annotations(&input);
        assert_eq!(ids(&ordered), ["u1", "u2", "u3"]);
    }

    #[test]
    fn input_slice_is_not_reordered() {
        let input = vec![
            Annotation::text_on_page("b", "x", 2),
            Annotation::text_on_page("a", "y", 1),
        ];
        let _ = order_annotations(&input);
        assert_eq!(input[0].id, "b");
    }
}
