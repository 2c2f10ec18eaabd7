//! Smart-collage assembly.
//!
//! When the primary pick's orientation disagrees with the device, a
//! complementary photo is fetched and the two are composited into
//! equal half-slots. The complement query excludes history plus the
//! primary, retries once without history, and finally reuses the
//! primary twice.

use framecast_core::collage;
use framecast_core::error::CoreError;
use framecast_core::geometry::Orientation;
use framecast_core::types::DbId;
use image::DynamicImage;

use super::selector::{PhotoSource, Selector};

/// Fetch one or two photos and composite when orientations mismatch.
///
/// Returns the (possibly composited) image plus every served image ID
/// for history recording — the primary ID appears twice when it fills
/// both slots.
pub async fn assemble(
    selector: &Selector<'_>,
    logical_w: i64,
    logical_h: i64,
    source: PhotoSource,
    exclude: &[DbId],
    device_id: Option<DbId>,
) -> Result<(DynamicImage, Vec<DbId>), CoreError> {
    let device_portrait = logical_h > logical_w;

    let primary = selector.select(source, device_id, exclude).await?;
    let (pw, ph) = (primary.image.width(), primary.image.height());
    let photo_portrait = ph > pw;

    // Orientation matches: no collage needed.
    if photo_portrait == device_portrait {
        return Ok((primary.image, vec![primary.id]));
    }

    // Mismatch: both slots take the complement of the device
    // orientation (portrait device stacks two landscapes, and vice
    // versa).
    let target = if device_portrait {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };

    let mut exclude_with_primary: Vec<DbId> = exclude.to_vec();
    exclude_with_primary.push(primary.id);

    let mut complement = selector
        .select_with_orientation(target, source, &exclude_with_primary)
        .await?;

    if complement.as_ref().map(|c| c.id) == Some(primary.id) || complement.is_none() {
        tracing::debug!(
            target = %target,
            "Complement pick failed with history exclusion, retrying without history"
        );
        complement = selector
            .select_with_orientation(target, source, &[primary.id])
            .await?;
    }

    let (second_image, second_id) = match complement {
        Some(c) if c.id != primary.id => (c.image, c.id),
        _ => {
            tracing::debug!(target = %target, "No distinct complement found, using primary twice");
            (primary.image.clone(), primary.id)
        }
    };

    let width = logical_w as u32;
    let height = logical_h as u32;
    let composited = if device_portrait {
        collage::vertical(&primary.image, &second_image, width, height)
    } else {
        collage::horizontal(&primary.image, &second_image, width, height)
    };

    Ok((
        DynamicImage::ImageRgba8(composited),
        vec![primary.id, second_id],
    ))
}
