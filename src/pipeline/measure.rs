//! Concurrent screenshot decoding, run before PDF layout begins.
//!
//! Screenshot sizing wants intrinsic pixel dimensions and embedding wants raw
//! pixels, and both come from the same decode, so the pre-pass does the full
//! decode once per screenshot and the renderer reuses the result for both
//! purposes. Decoding is CPU-bound; each decode runs inside
//! `spawn_blocking` and a bounded `buffer_unordered` fan-out keeps several in
//! flight without saturating the blocking pool.
//!
//! Failure here is not fatal. A screenshot that cannot be decoded is logged
//! and omitted from the result map; the renderer falls back to its configured
//! default size for layout and only errors if the image is still unreadable
//! when it must actually be embedded.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::annotation::{Annotation, Screenshot};

/// A fully decoded screenshot: tightly packed RGB8 pixels plus dimensions.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decoded screenshots keyed by annotation id.
pub type DecodedImages = HashMap<String, DecodedImage>;

/// Decode every screenshot among `ordered`, at most `concurrency` at a time.
///
/// Returns only the successful decodes; failures are logged per screenshot
/// and the whole pass always completes.
pub async fn decode_screenshots(ordered: &[&Annotation], concurrency: usize) -> DecodedImages {
    let jobs: Vec<(String, Screenshot)> = ordered
        .iter()
        .filter_map(|a| a.screenshot_data().map(|s| (a.id.clone(), s.clone())))
        .collect();
    if jobs.is_empty() {
        return DecodedImages::new();
    }
    debug!(count = jobs.len(), concurrency, "decoding screenshots");

    let results: Vec<(String, Result<DecodedImage, String>)> =
        stream::iter(jobs.into_iter().map(|(id, shot)| async move {
            let joined =
                tokio::task::spawn_blocking(move || decode_screenshot(&shot)).await;
            let result = match joined {
                Ok(r) => r,
                Err(e) => Err(format!("decode task failed: {e}")),
            };
            (id, result)
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut decoded = DecodedImages::new();
    for (id, result) in results {
        match result {
            Ok(image) => {
                decoded.insert(id, image);
            }
            Err(detail) => {
                warn!(id = %id, %detail, "screenshot decode failed; using fallback size");
            }
        }
    }
    decoded
}

/// Decode one screenshot's data URL into RGB8 pixels.
///
/// Synchronous; the async fan-out above wraps it in `spawn_blocking`, and the
/// PDF renderer calls it directly as a last resort at embed time.
pub fn decode_screenshot(shot: &Screenshot) -> Result<DecodedImage, String> {
    let bytes = data_url_payload(&shot.data_url)?;
    let image = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    let rgb = image.to_rgb8();
    let (width, height) = (rgb.width(), rgb.height());
    if width == 0 || height == 0 {
        return Err("image has zero dimension".into());
    }
    Ok(DecodedImage {
        rgb: rgb.into_raw(),
        width,
        height,
    })
}

/// Extract and base64-decode the payload of a `data:` URL.
fn data_url_payload(data_url: &str) -> Result<Vec<u8>, String> {
    if !data_url.starts_with("data:") {
        return Err("not a data URL".into());
    }
    let (_, encoded) = data_url
        .split_once("base64,")
        .ok_or_else(|| "data URL is not base64-encoded".to_string())?;
    BASE64
        .decode(encoded.trim())
        .map_err(|e| format!("invalid base64 payload: {e}"))
}

/// A real PNG of the given size wrapped as a data URL. Test fixture shared
/// by the renderer tests.
#[cfg(test)]
pub(crate) fn png_data_url(width: u32, height: u32) -> String {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([180, 40, 40]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("in-memory png encode");
    format!("data:image/png;base64,{}", BASE64.encode(&buf))
}
