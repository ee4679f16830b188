//! The export pipeline, stage by stage.
//!
//! ```text
//!   [Annotation]              snapshot slice, creation order
//!        │
//!        ▼
//!   position ─── resolve_page_number / resolve_vertical_offset
//!        │        (total functions; looseness degrades to None)
//!        ▼
//!   order ────── stable sort by (page, vertical, original index)
//!        │
//!        ▼
//!   group ────── per-page buckets, pages ascending, unassigned last
//!        │
//!        ├──────────────► markdown ──► ExportArtifact (.md)
//!        │
//!        ▼
//!   measure ──── concurrent screenshot decode (async, failures tolerated)
//!        │
//!        ▼
//!   pdf ──────── paginated lopdf document ──► ExportArtifact (.pdf)
//! ```
//!
//! The ordering and grouping stages are shared verbatim by both renderers, so
//! the two artifacts always present annotations in the same sequence. Only
//! the PDF path is async: its measurement pre-pass decodes every screenshot
//! off the async threads before any layout begins.

pub mod group;
pub mod markdown;
pub mod measure;
pub mod order;
pub mod pdf;
pub mod position;
pub mod text;
