/// Before/after report composite
///
/// This module handles:
/// - Laying out a location's photo pairs (layout.rs)
/// - Planning the drawing steps as a display list (draw.rs)
/// - Rasterizing and JPEG-encoding the composite (raster.rs)
/// - Sharing or saving the finished file (deliver.rs)

pub mod deliver;
pub mod draw;
pub mod layout;
pub mod raster;

use chrono::{NaiveDate, Utc};
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;
use tracing::{debug, warn};

use crate::error::{SnapError, SnapResult};
use crate::photo::data_url::{decode_data_url, encode_data_url, JPEG_MIME, PNG_MIME};
use crate::state::data::Location;
use draw::{plan_report, PanelImage, ReportContent};
use layout::ReportLayout;

pub use deliver::{Delivered, Delivery, ShareTarget};

/// An encoded composite ready to hand to the platform
#[derive(Debug, Clone, PartialEq)]
pub struct ReportImage {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    /// Pixel size of the encoded image
    pub width: u32,
    pub height: u32,
}

/// `{name}_report_{YYYY-MM-DD}.jpg`, with path-hostile characters replaced
pub fn report_filename(name: &str, date: NaiveDate) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    format!("{safe}_report_{}.jpg", date.format("%Y-%m-%d"))
}

/// Footer date, `YYYY.MM.DD`
pub fn footer_date(date: NaiveDate) -> String {
    date.format("%Y.%m.%d").to_string()
}

/// Decode one stored photo for drawing.
///
/// JPEG and PNG payloads are embedded as-is; anything else is re-encoded
/// as PNG so the rasterizer can read it.
pub fn decode_panel(src: &str) -> SnapResult<PanelImage> {
    let bytes = decode_data_url(src)?;
    let format = image::guess_format(&bytes)?;
    let img = image::load_from_memory_with_format(&bytes, format)?;
    let (width, height) = img.dimensions();

    let href = match format {
        ImageFormat::Jpeg => encode_data_url(JPEG_MIME, &bytes),
        ImageFormat::Png => encode_data_url(PNG_MIME, &bytes),
        _ => {
            let mut png = Cursor::new(Vec::new());
            img.write_to(&mut png, ImageFormat::Png)
                .map_err(|e| SnapError::decode(format!("re-encode panel: {e}")))?;
            encode_data_url(PNG_MIME, &png.into_inner())
        }
    };

    Ok(PanelImage {
        href,
        width,
        height,
    })
}

/// Decode every photo of a sequence; failures become empty panels
fn decode_panels(photos: &[String], side: &str) -> Vec<Option<PanelImage>> {
    photos
        .iter()
        .enumerate()
        .map(|(index, src)| match decode_panel(src) {
            Ok(panel) => Some(panel),
            Err(err) => {
                warn!(side, index, error = %err, "panel photo unreadable, using placeholder");
                None
            }
        })
        .collect()
}

/// Render the composite for `location` as of `date`.
///
/// Returns `Ok(None)` for a location without photos. Unreadable photos
/// degrade to placeholders; only a surface failure aborts.
pub fn compose_report(location: &Location, date: NaiveDate) -> SnapResult<Option<ReportImage>> {
    let Some(layout) = ReportLayout::new(location.pair_count()) else {
        debug!(location = %location.name, "no photos, nothing to compose");
        return Ok(None);
    };

    let before = decode_panels(&location.before, "before");
    let after = decode_panels(&location.after, "after");
    let date_label = footer_date(date);
    let content = ReportContent {
        title: &location.name,
        date_label: &date_label,
        before: &before,
        after: &after,
    };

    let ops = plan_report(&layout, &content);
    let bytes = raster::rasterize(&layout, &ops)?;
    let (width, height) = layout.pixel_size();
    debug!(
        location = %location.name,
        pairs = layout.pairs(),
        ops = ops.len(),
        bytes = bytes.len(),
        "composed report"
    );

    Ok(Some(ReportImage {
        filename: report_filename(&location.name, date),
        mime: JPEG_MIME,
        bytes,
        width,
        height,
    }))
}

/// Compose today's report for `location` off the async thread and deliver it.
///
/// The location itself is never modified.
pub async fn generate_report(
    location: &Location,
    delivery: &Delivery,
) -> SnapResult<Option<Delivered>> {
    let owned = location.clone();
    let date = Utc::now().date_naive();
    let report = tokio::task::spawn_blocking(move || compose_report(&owned, date))
        .await
        .map_err(|e| SnapError::surface(format!("compose task failed: {e}")))??;

    match report {
        Some(report) => delivery.deliver(&report).await.map(Some),
        None => Ok(None),
    }
}
