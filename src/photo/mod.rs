/// Captured photo handling
///
/// This module handles:
/// - Decoding captured photos of any size and format
/// - Bounding them to a storable resolution
/// - Encoding them as self-contained data URLs

pub mod data_url;
pub mod normalize;

pub use data_url::{decode_data_url, encode_data_url};
pub use normalize::{normalize_batch, normalize_photo, NormalizedBatch, NormalizedPhoto};
