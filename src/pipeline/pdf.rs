//! PDF rendering of grouped annotations.
//!
//! The document is assembled object by object with `lopdf`: a pages tree, a
//! catalog, two Type 1 font objects referencing the built-in Helvetica
//! family, one zlib-compressed content stream per page, and one image
//! XObject per embedded screenshot. Using the reader-built-in fonts keeps
//! the artifact small and sidesteps font embedding entirely; the matching
//! width metrics live in [`crate::pipeline::text`].
//!
//! Layout is a single downward cursor pass over the grouped annotations.
//! Text blocks wrap and may split across page boundaries line by line;
//! screenshot blocks (image plus trailing comment) are atomic and move to a
//! fresh page when they do not fit the remaining space.

use std::io::Write;

use chrono::Utc;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::annotation::{AnnotationBody, Screenshot};
use crate::artifact::{file_stem, ExportArtifact};
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportFormat};
use crate::pipeline::group::{PageGroup, PageKey};
use crate::pipeline::measure::{decode_screenshot, DecodedImage, DecodedImages};
use crate::pipeline::text::{measure_text_width, wrap_text};

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// Gap below the document header block.
const HEADER_GAP: f32 = 18.0;
/// Gap above a page-group heading (when not at the top of a page).
const HEADING_GAP: f32 = 14.0;
/// Gap between consecutive annotation entries.
const ENTRY_GAP: f32 = 8.0;
/// Gap between an entry and its trailing comment block.
const COMMENT_GAP: f32 = 3.0;

/// Render grouped annotations into a single PDF artifact.
///
/// `decoded` is the output of the measurement pre-pass
/// ([`crate::pipeline::measure::decode_screenshots`]); screenshots missing
/// from it are laid out at fallback size and re-decoded at embed time, and
/// only an embed-time failure aborts the export. The artifact is named
/// `{stem} - highlights.pdf`.
pub fn render_pdf(
    groups: &[PageGroup<'_>],
    file_name: &str,
    config: &ExportConfig,
    decoded: &DecodedImages,
) -> Result<ExportArtifact, ExportError> {
    if groups.iter().all(|g| g.annotations.is_empty()) {
        return Err(ExportError::EmptyInput);
    }

    let mut writer = PageWriter::new(config);
    writer.draw_header(file_name);

    for group in groups {
        if group.annotations.is_empty() {
            continue;
        }
        let heading = match group.key {
            PageKey::Page(n) => format!("Page {n}"),
            PageKey::Unassigned => "(no page)".to_string(),
        };
        writer.draw_group_heading(&heading);

        for (entry_index, annotation) in group.annotations.iter().enumerate() {
            if entry_index > 0 {
                writer.advance(ENTRY_GAP);
            }
            match &annotation.body {
                AnnotationBody::Text { content, .. } => {
                    writer.draw_text_entry(&content.text, annotation.comment_text());
                }
                AnnotationBody::Screenshot { screenshot } => {
                    let pixels = decoded.get(&annotation.id);
                    writer.draw_screenshot_entry(
                        &annotation.id,
                        screenshot,
                        pixels,
                        annotation.comment_text(),
                    )?;
                }
            }
        }
    }

    let bytes = writer.finish()?;
    debug!(bytes = bytes.len(), "pdf rendered");
    Ok(ExportArtifact::new(
        bytes,
        format!("{} - highlights.pdf", file_stem(file_name)),
    ))
}

/// Size a screenshot in points, clamped into the content box.
///
/// Priority: capture-time CSS dimensions, then decoded intrinsic pixels
/// scaled by the device pixel ratio, then the configured fallback width at a
/// 4:3 aspect. The result is only ever scaled down uniformly, never
/// distorted.
pub(crate) fn screenshot_size(
    shot: &Screenshot,
    decoded: Option<&DecodedImage>,
    config: &ExportConfig,
) -> (f32, f32) {
    let css = shot
        .css_width
        .zip(shot.css_height)
        .filter(|(w, h)| w.is_finite() && h.is_finite() && *w > 0.0 && *h > 0.0);
    let (mut width, mut height) = if let Some((w, h)) = css {
        (w as f32 * config.px_to_pt, h as f32 * config.px_to_pt)
    } else if let Some(image) = decoded {
        let dpr = shot
            .device_pixel_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(1.0) as f32;
        (
            image.width as f32 / dpr * config.px_to_pt,
            image.height as f32 / dpr * config.px_to_pt,
        )
    } else {
        (
            config.fallback_image_width_pt,
            config.fallback_image_width_pt * 0.75,
        )
    };
    if width > config.content_width() {
        let scale = config.content_width() / width;
        width *= scale;
        height *= scale;
    }
    if height > config.content_height() {
        let scale = config.content_height() / height;
        width *= scale;
        height *= scale;
    }
    (width, height)
}

/// Incremental page-by-page document builder.
///
/// `cursor` is the distance in points from the top edge to the top of the
/// next block; PDF's bottom-left origin is converted at draw time.
struct PageWriter<'a> {
    doc: Document,
    config: &'a ExportConfig,
    pages_id: ObjectId,
    font_regular_id: ObjectId,
    font_bold_id: ObjectId,
    page_ids: Vec<ObjectId>,
    ops: Vec<Operation>,
    xobjects: Vec<(String, ObjectId)>,
    image_seq: usize,
    cursor: f32,
    flush_error: Option<ExportError>,
}

impl<'a> PageWriter<'a> {
    fn new(config: &'a ExportConfig) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            config,
            pages_id,
            font_regular_id,
            font_bold_id,
            page_ids: Vec::new(),
            ops: Vec::new(),
            xobjects: Vec::new(),
            image_seq: 0,
            cursor: config.margin_pt,
            flush_error: None,
        }
    }

    fn content_bottom(&self) -> f32 {
        self.config.page_height_pt - self.config.margin_pt
    }

    fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    /// Start a new page if `needed` points do not fit below the cursor.
    /// At the top of a fresh page the block is placed regardless, so a
    /// block taller than a whole page still renders instead of looping.
    fn ensure_room(&mut self, needed: f32) {
        if self.cursor + needed > self.content_bottom() && self.cursor > self.config.margin_pt {
            self.flush_page();
        }
    }

    fn draw_header(&mut self, file_name: &str) {
        self.draw_line(file_name, FONT_BOLD, self.config.title_font_size);
        let timestamp = self
            .config
            .timestamp
            .unwrap_or_else(Utc::now)
            .format("Exported %Y-%m-%d %H:%M UTC")
            .to_string();
        self.advance(4.0);
        self.draw_line(&timestamp, FONT_REGULAR, self.config.body_font_size);
        self.advance(HEADER_GAP);
    }

    fn draw_group_heading(&mut self, heading: &str) {
        if self.cursor > self.config.margin_pt {
            self.advance(HEADING_GAP);
        }
        // Keep the heading attached to at least one following line.
        let size = self.config.heading_font_size;
        self.ensure_room(size * self.config.line_height_factor + self.config.body_line_height());
        self.draw_line(heading, FONT_BOLD, size);
        self.advance(6.0);
    }

    /// A highlighted text entry: hanging-indent bullet, splittable across
    /// pages line by line, plus an optional trailing comment block.
    fn draw_text_entry(&mut self, text: &str, comment: Option<&str>) {
        let size = self.config.body_font_size;
        let indent = measure_text_width("- ", size);
        let lines = wrap_text(text, size, self.config.content_width() - indent);
        for (i, line) in lines.iter().enumerate() {
            let (prefix, x_offset) = if i == 0 { ("- ", 0.0) } else { ("", indent) };
            self.ensure_room(self.config.body_line_height());
            let rendered = if prefix.is_empty() {
                line.clone()
            } else {
                // Empty content still shows a lone marker.
                format!("{}{}", prefix, line).trim_end().to_string()
            };
            self.draw_line_at(&rendered, FONT_REGULAR, size, x_offset);
        }
        if let Some(comment) = comment {
            self.draw_comment(comment, indent);
        }
    }

    /// A screenshot entry: the image and any trailing comment placed as one
    /// atomic unit.
    fn draw_screenshot_entry(
        &mut self,
        id: &str,
        shot: &Screenshot,
        pixels: Option<&DecodedImage>,
        comment: Option<&str>,
    ) -> Result<(), ExportError> {
        let (width, height) = screenshot_size(shot, pixels, self.config);

        let size = self.config.body_font_size;
        let indent = measure_text_width("- ", size);
        let comment_lines = comment
            .map(|c| {
                wrap_text(
                    &format!("Comment: {c}"),
                    size,
                    self.config.content_width() - indent,
                )
            })
            .unwrap_or_default();
        let comment_height = if comment_lines.is_empty() {
            0.0
        } else {
            COMMENT_GAP + comment_lines.len() as f32 * self.config.body_line_height()
        };
        self.ensure_room(height + comment_height);

        let fallback;
        let image = match pixels {
            Some(image) => image,
            // The pre-pass missed this one; a failure here is fatal since
            // the image cannot be embedded at all.
            None => {
                fallback = decode_screenshot(shot).map_err(|detail| {
                    ExportError::ImageDecode {
                        id: id.to_string(),
                        detail,
                    }
                })?;
                &fallback
            }
        };
        self.draw_image(image, width, height)?;

        for (i, line) in comment_lines.iter().enumerate() {
            if i == 0 {
                self.advance(COMMENT_GAP);
            }
            self.draw_line_at(line, FONT_REGULAR, size, indent);
        }
        Ok(())
    }

    fn draw_comment(&mut self, comment: &str, indent: f32) {
        let size = self.config.body_font_size;
        let lines = wrap_text(
            &format!("Comment: {comment}"),
            size,
            self.config.content_width() - indent,
        );
        self.advance(COMMENT_GAP);
        for line in lines {
            self.ensure_room(self.config.body_line_height());
            self.draw_line_at(&line, FONT_REGULAR, size, indent);
        }
    }

    fn draw_line(&mut self, text: &str, font: &str, size: f32) {
        self.draw_line_at(text, font, size, 0.0);
    }

    /// Draw one line of text at the cursor and advance past it.
    fn draw_line_at(&mut self, text: &str, font: &str, size: f32, x_offset: f32) {
        let line_height = size * self.config.line_height_factor;
        let x = self.config.margin_pt + x_offset;
        // Baseline sits one em below the block top; the Y axis flips to
        // PDF's bottom-left origin here.
        let y = self.config.page_height_pt - (self.cursor + size);
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_win_ansi(text))],
        ));
        self.ops.push(Operation::new("ET", vec![]));
        self.advance(line_height);
    }

    /// Embed RGB pixels as an XObject and draw it at the cursor.
    fn draw_image(
        &mut self,
        image: &DecodedImage,
        width: f32,
        height: f32,
    ) -> Result<(), ExportError> {
        let data = compress(&image.rgb)?;
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            data,
        );
        let id = self.doc.add_object(stream);
        self.image_seq += 1;
        let name = format!("Im{}", self.image_seq);
        self.xobjects.push((name.clone(), id));

        let x = self.config.margin_pt;
        let y = self.config.page_height_pt - (self.cursor + height);
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                width.into(),
                Object::Integer(0),
                Object::Integer(0),
                height.into(),
                x.into(),
                y.into(),
            ],
        ));
        self.ops.push(Operation::new("Do", vec![name.as_str().into()]));
        self.ops.push(Operation::new("Q", vec![]));
        self.advance(height);
        Ok(())
    }

    /// Close the current page: compress its content stream, attach its
    /// resources, reset the cursor.
    fn flush_page(&mut self) {
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let encoded = match content.encode().map_err(render_failed) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.flush_error.get_or_insert(e);
                return;
            }
        };
        let compressed = match compress(&encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.flush_error.get_or_insert(e);
                return;
            }
        };
        let content_id = self.doc.add_object(Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            compressed,
        ));

        let mut fonts = Dictionary::new();
        fonts.set(FONT_REGULAR, Object::Reference(self.font_regular_id));
        fonts.set(FONT_BOLD, Object::Reference(self.font_bold_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        if !self.xobjects.is_empty() {
            let mut xobjects = Dictionary::new();
            for (name, id) in self.xobjects.drain(..) {
                xobjects.set(name, Object::Reference(id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                self.config.page_width_pt.into(),
                self.config.page_height_pt.into(),
            ],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.page_ids.push(page_id);
        self.cursor = self.config.margin_pt;
    }

    /// Flush the final page, build the pages tree and catalog, serialize.
    fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        self.flush_page();
        if let Some(e) = self.flush_error.take() {
            return Err(e);
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).map_err(render_failed)?;
        Ok(bytes)
    }
}

fn render_failed(e: impl std::fmt::Display) -> ExportError {
    ExportError::RenderFailed {
        format: ExportFormat::Pdf,
        detail: e.to_string(),
    }
}

fn compress(bytes: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(render_failed)?;
    encoder.finish().map_err(render_failed)
}

/// Encode text for a WinAnsiEncoding `Tj` string.
///
/// ASCII and Latin-1 pass through; the CP1252 punctuation block (curly
/// quotes, dashes, ellipsis) maps to its code points; anything else becomes
/// `?` rather than corrupting the string.
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2026}' => 0x85,
            '\u{2122}' => 0x99,
            _ => b'?',
        })
        .collect()
}
