//! Thumbnail generation for detected faces.
//!
//! Crops face bounding boxes out of a source photo and persists them as
//! JPEG files. Everything here is local image work; the remote service is
//! never involved.

use std::path::Path;

use anyhow::{bail, Context, Result};
use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::warn;

use crate::models::{DetectedFace, FaceRectangle};

/// Crop a face rectangle out of a source image.
///
/// Fails when the rectangle has zero area or does not lie fully within the
/// source bounds.
pub fn crop_thumbnail(source: &DynamicImage, rect: FaceRectangle) -> Result<DynamicImage> {
    let (width, height) = source.dimensions();

    if rect.width == 0 || rect.height == 0 {
        bail!(
            "Face rectangle {}x{} has zero area",
            rect.width,
            rect.height
        );
    }
    // checked_add: wire rectangles can be large enough to overflow u32
    let right = rect.left.checked_add(rect.width);
    let bottom = rect.top.checked_add(rect.height);
    if right.map_or(true, |r| r > width) || bottom.map_or(true, |b| b > height) {
        bail!(
            "Face rectangle {},{} {}x{} exceeds source bounds {}x{}",
            rect.left,
            rect.top,
            rect.width,
            rect.height,
            width,
            height
        );
    }

    Ok(source.crop_imm(rect.left, rect.top, rect.width, rect.height))
}

/// Generate thumbnails for a batch of detected faces.
///
/// A failure on one face is logged and that face skipped; the rest of the
/// batch still produces thumbnails.
pub fn generate_thumbnails(faces: &[DetectedFace], source: &DynamicImage) -> Vec<DynamicImage> {
    let mut thumbnails = Vec::with_capacity(faces.len());

    for face in faces {
        match crop_thumbnail(source, face.face_rectangle) {
            Ok(thumbnail) => thumbnails.push(thumbnail),
            Err(e) => {
                warn!(face_id = ?face.face_id, error = %e, "Skipping thumbnail for face");
            }
        }
    }

    thumbnails
}

/// Persist a thumbnail as JPEG.
pub fn save_thumbnail(thumbnail: &DynamicImage, path: &Path) -> Result<()> {
    // JPEG has no alpha channel; flatten before encoding
    let rgb = DynamicImage::ImageRgb8(thumbnail.to_rgb8());
    rgb.save_with_format(path, ImageFormat::Jpeg)
        .with_context(|| format!("Failed to save thumbnail to {}", path.display()))
}

/// Load a previously saved thumbnail.
pub fn load_thumbnail(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("Failed to load thumbnail from {}", path.display()))
}

// ============================================================================
// Tests
// ============================================================================
