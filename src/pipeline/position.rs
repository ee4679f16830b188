//! Position resolution: extracting a usable page number and vertical offset
//! from the loose persisted geometry.
//!
//! Annotations accumulate position data from several generations of the
//! capture code, so the same fact can live at different nesting levels or be
//! missing outright. Both resolvers are total functions: they walk a fixed
//! precedence chain and return `None` when nothing usable is found. A `None`
//! never blocks export; the orderer sends such annotations to the end.

use crate::annotation::{Annotation, AnnotationBody, Rect};

/// Resolve the page an annotation belongs to.
///
/// Precedence, first hit wins:
/// 1. `screenshot.pageNumber` (screenshot annotations only)
/// 2. `position.pageNumber`
/// 3. `position.boundingRect.pageNumber`
/// 4. the first `pageNumber` found scanning `position.rects` in stored order
///
/// A highlight whose rects span a page break therefore sorts under the page
/// where it begins, matching on-screen reading order.
pub fn resolve_page_number(annotation: &Annotation) -> Option<u32> {
    match &annotation.body {
        AnnotationBody::Screenshot { screenshot } => screenshot.page_number,
        AnnotationBody::Text { position, .. } => {
            let pos = position.as_ref()?;
            pos.page_number
                .or_else(|| pos.bounding_rect.as_ref().and_then(|r| r.page_number))
                .or_else(|| pos.rects.iter().find_map(|r| r.page_number))
        }
    }
}

/// Resolve the annotation's normalized vertical offset within its page,
/// a value in `[0, 1]` where 0 is the top edge.
///
/// Precedence, first hit wins:
/// 1. the top-level `pageRelativeY` shortcut, if finite
/// 2. `screenshot.pageRelativeY`, if finite (screenshot annotations)
/// 3. the minimum normalized top over `boundingRect` and every rect, i.e.
///    the highest point of the selection, so multi-line highlights sort by
///    where they start
pub fn resolve_vertical_offset(annotation: &Annotation) -> Option<f64> {
    if let Some(y) = annotation.page_relative_y.filter(|y| y.is_finite()) {
        return Some(y);
    }
    match &annotation.body {
        AnnotationBody::Screenshot { screenshot } => {
            screenshot.page_relative_y.filter(|y| y.is_finite())
        }
        AnnotationBody::Text { position, .. } => {
            let pos = position.as_ref()?;
            pos.bounding_rect
                .iter()
                .chain(pos.rects.iter())
                .filter_map(normalized_top)
                .min_by(f64::total_cmp)
        }
    }
}

/// Normalize one rect's vertical coordinate.
///
/// Order of interpretation:
/// - `y1` already in `[0, 1]` is taken as-is (pre-normalized by capture).
/// - Otherwise `top / height` when `height > 0`, clamped into `[0, 1]` to
///   absorb small overshoots from selections touching the page edge.
/// - Otherwise a raw `top` already in `[0, 1]` is trusted.
///
/// A pixel-valued `top` with no usable `height` stays unresolved: without
/// the page height there is no defensible scale for it.
fn normalized_top(rect: &Rect) -> Option<f64> {
    if let Some(y1) = rect.y1.filter(|v| v.is_finite() && (0.0..=1.0).contains(v)) {
        return Some(y1);
    }
    let top = rect.top.filter(|v| v.is_finite())?;
    match rect.height.filter(|h| h.is_finite() && *h > 0.0) {
        Some(height) => Some((top / height).clamp(0.0, 1.0)),
        None if (0.0..=1.0).contains(&top) => Some(top),
        None => None,
    }
}
