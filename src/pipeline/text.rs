//! Text measurement and word wrapping for the PDF renderer.
//!
//! The report is set in the fourteen built-in PDF Type 1 fonts' Helvetica,
//! which every conforming reader ships, so no font file is embedded. The
//! price is that width metrics must live here: the table below carries the
//! standard Helvetica advance widths (thousandths of an em) for the printable
//! ASCII range. Characters outside the table measure at a conservative
//! default so wraps err on the early side rather than overflowing the margin.
//!
//! Bold headings reuse the same table. Helvetica-Bold runs a few percent
//! wider, but headings are short and never wrap in practice, so a second
//! table is not worth carrying.

/// Advance widths for ASCII 0x20..=0x7E in 1/1000 em units.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, // space ! " # $ % & ' ( )
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556, // * + , - . / 0 1 2 3
    556, 556, 556, 556, 556, 556, 278, 278, 584, 584, // 4 5 6 7 8 9 : ; < =
    584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, // > ? @ A B C D E F G
    722, 278, 500, 667, 556, 833, 722, 778, 667, 778, // H I J K L M N O P Q
    722, 667, 611, 722, 667, 944, 667, 667, 611, 278, // R S T U V W X Y Z [
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556, // \ ] ^ _ ` a b c d e
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // f g h i j k l m n o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, // p q r s t u v w x y
    500, 334, 260, 334, 584, // z { | } ~
];

/// Width used for characters outside the table (matches lowercase average).
const DEFAULT_WIDTH: u16 = 556;

/// Measured width of `text` set at `font_size` points.
pub fn measure_text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    units as f32 * font_size / 1000.0
}

fn char_width(c: char) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        HELVETICA_WIDTHS[(code - 0x20) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Greedy word wrap of `text` into lines at most `max_width` points wide
/// when set at `font_size`.
///
/// Words longer than a whole line are split at character boundaries so a
/// pathological token (a long URL, say) cannot force an overflowing line.
/// Runs of whitespace collapse to single spaces; the result never contains
/// empty lines except for an empty input, which yields a single empty line
/// so paragraphs keep their vertical slot.
pub fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let space_width = measure_text_width(" ", font_size);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        for piece in split_oversized(word, font_size, max_width) {
            let piece_width = measure_text_width(&piece, font_size);
            let needed = if current.is_empty() {
                piece_width
            } else {
                current_width + space_width + piece_width
            };
            if !current.is_empty() && needed > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if current.is_empty() {
                current_width = piece_width;
            } else {
                current.push(' ');
                current_width += space_width + piece_width;
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Break a single word into chunks that each fit on one line.
fn split_oversized(word: &str, font_size: f32, max_width: f32) -> Vec<String> {
    if measure_text_width(word, font_size) <= max_width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut chunk = String::new();
    let mut chunk_width = 0.0_f32;
    for c in word.chars() {
        let w = measure_text_width(&c.to_string(), font_size);
        if !chunk.is_empty() && chunk_width + w > max_width {
            pieces.push(std::mem::take(&mut chunk));
            chunk_width = 0.0;
        }
        chunk.push(c);
        chunk_width += w;
    }
    if !chunk.is_empty() {
        pieces.push(chunk);
    }
    pieces
}
