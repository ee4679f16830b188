//! Grouping ordered annotations into per-page buckets.

use std::collections::BTreeMap;

use crate::annotation::Annotation;
use crate::pipeline::position::resolve_page_number;

/// Bucket key for a page group.
///
/// The derived `Ord` puts `Page(n)` variants in ascending numeric order and
/// `Unassigned` after all of them, which is exactly the emission order both
/// renderers want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageKey {
    Page(u32),
    Unassigned,
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageKey::Page(n) => write!(f, "Page {n}"),
            PageKey::Unassigned => write!(f, "(no page)"),
        }
    }
}

/// One page's worth of annotations, already in reading order.
#[derive(Debug)]
pub struct PageGroup<'a> {
    pub key: PageKey,
    pub annotations: Vec<&'a Annotation>,
}

/// Partition an already-ordered slice of annotations into page groups.
///
/// Pages come out ascending with the unassigned bucket last; order within
/// each group is the input order. Pages with no annotations simply do not
/// appear. Must be fed the output of
/// [`crate::pipeline::order::order_annotations`]; grouping does not re-sort
/// within buckets.
pub fn group_by_page<'a>(ordered: &[&'a Annotation]) -> Vec<PageGroup<'a>> {
    let mut buckets: BTreeMap<PageKey, Vec<&'a Annotation>> = BTreeMap::new();
    for annotation in ordered {
        let key = match resolve_page_number(annotation) {
            Some(n) => PageKey::Page(n),
            None => PageKey::Unassigned,
        };
        buckets.entry(key).or_default().push(annotation);
    }
    buckets
        .into_iter()
        .map(|(key, annotations)| PageGroup { key, annotations })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::order::order_annotations;

    #[test]
    fn groups_come_out_in_ascending_page_order() {
        let input = vec![
            Annotation::text_on_page("a", "x", 5),
            Annotation::text_on_page("b", "y", 2),
            Annotation::text_on_page("c", "z", 5),
        ];
        let ordered = order_annotations(&input);
        let groups = group_by_page(&ordered);
        let keys: Vec<PageKey> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, [PageKey::Page(2), PageKey::Page(5)]);
        assert_eq!(groups[1].annotations.len(), 2);
    }

    #[test]
    fn unassigned_bucket_is_last() {
        let input = vec![
            Annotation::text("floating", "x"),
            Annotation::text_on_page("pinned", "y", 1),
        ];
        let ordered = order_annotations(&input);
        let groups = group_by_page(&ordered);
        assert_eq!(groups.last().map(|g| g.key), Some(PageKey::Unassigned));
    }

    #[test]
    fn intra_group_order_is_preserved() {
        let input = vec![
            Annotation::text_on_page("top", "x", 1).with_page_relative_y(0.1),
            Annotation::text_on_page("mid", "y", 1).with_page_relative_y(0.5),
            Annotation::text_on_page("low", "z", 1).with_page_relative_y(0.9),
        ];
        let ordered = order_annotations(&input);
        let groups = group_by_page(&ordered);
        let ids: Vec<&str> = groups[0].annotations.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["top", "mid", "low"]);
    }

    #[test]
    fn page_key_ordering_is_numeric_then_unassigned() {
        assert!(PageKey::Page(2) < PageKey::Page(10));
        assert!(PageKey::Page(u32::MAX) < PageKey::Unassigned);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let groups = group_by_page(&[]);
        assert!(groups.is_empty());
    }
}
