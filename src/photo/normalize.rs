/// Photo normalization
///
/// Decodes a captured photo once, bounds its shorter edge to 1920px and
/// re-encodes it as a JPEG data URL ready to be stored on a location:
/// - decode failures are scoped to the photo (`SnapError::Decode`)
/// - an unusable pixel surface or encoder fails with `SnapError::Surface`
use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::io::Cursor;
use tracing::{debug, warn};

use super::data_url::{encode_data_url, JPEG_MIME};
use crate::error::{SnapError, SnapResult};

/// Upper bound for the shorter edge of a stored photo
pub const MAX_SHORT_EDGE: u32 = 1920;

/// JPEG quality for stored photos (0.95)
const STORE_QUALITY: u8 = 95;

/// A normalized photo with its final pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPhoto {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Outcome of normalizing a batch of captured files
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    /// Successful photos, in input order
    pub photos: Vec<String>,
    /// Input index and cause for every dropped file
    pub rejected: Vec<(usize, SnapError)>,
}

/// Target dimensions for a `width` x `height` source.
///
/// Sources whose shorter edge is already within bounds pass through unchanged.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    let shorter = width.min(height);
    if shorter <= MAX_SHORT_EDGE {
        return (width, height);
    }

    let ratio = MAX_SHORT_EDGE as f64 / shorter as f64;
    let scale = |v: u32| ((v as f64 * ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Decode a payload upright, applying its EXIF orientation
fn decode_upright(bytes: &[u8]) -> SnapResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| SnapError::decode(format!("read photo: {e}")))?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Normalize one raw payload (any format the `image` crate can decode).
///
/// Dimensions are taken after EXIF orientation, so portrait phone captures
/// stay portrait.
pub fn normalize_photo(bytes: &[u8]) -> SnapResult<NormalizedPhoto> {
    let img = decode_upright(bytes)?;
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(SnapError::surface(format!(
            "cannot allocate a {src_w}x{src_h} surface"
        )));
    }

    let (width, height) = target_dimensions(src_w, src_h);
    let img = if (width, height) == (src_w, src_h) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    let jpeg = encode_jpeg(&img, STORE_QUALITY)?;
    debug!(src_w, src_h, width, height, bytes = jpeg.len(), "normalized photo");

    Ok(NormalizedPhoto {
        data_url: encode_data_url(JPEG_MIME, &jpeg),
        width,
        height,
    })
}

/// Encode pixels as baseline JPEG; alpha is dropped.
pub(crate) fn encode_jpeg(img: &DynamicImage, quality: u8) -> SnapResult<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| SnapError::surface(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

/// Normalize every file concurrently, keeping input order in the result.
pub async fn normalize_batch(files: Vec<Vec<u8>>) -> NormalizedBatch {
    let results = run_ordered(files, |bytes| {
        normalize_photo(&bytes).map(|photo| photo.data_url)
    })
    .await;

    let mut batch = NormalizedBatch::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(url) => batch.photos.push(url),
            Err(err) => {
                warn!(index, error = %err, "dropping photo from batch");
                batch.rejected.push((index, err));
            }
        }
    }
    batch
}

/// Run `work` on every input in its own blocking task.
///
/// All tasks are started before any is awaited, and handles are awaited in
/// input order, so completion order never affects result order.
pub(crate) async fn run_ordered<I, T, F>(inputs: Vec<I>, work: F) -> Vec<SnapResult<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> SnapResult<T> + Clone + Send + 'static,
{
    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let work = work.clone();
            tokio::task::spawn_blocking(move || work(input))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle
            .await
            .map_err(|e| SnapError::surface(format!("normalize task failed: {e}")))
            .and_then(|r| r);
        results.push(result);
    }
    results
}
