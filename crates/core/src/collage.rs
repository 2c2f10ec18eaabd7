//! Cover-fit drawing and two-photo collage compositing.

use image::imageops::FilterType;
use image::{imageops, DynamicImage, RgbaImage};

use crate::layout::Rect;

/// Scale-and-center-crop `src` to exactly `width` x `height`.
pub fn cover_resize(src: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    src.resize_to_fill(width, height, FilterType::Lanczos3)
        .to_rgba8()
}

/// Draw `src` into `rect` of `dst` with cover fit.
pub fn draw_cover(dst: &mut RgbaImage, rect: Rect, src: &DynamicImage) {
    let fitted = cover_resize(src, rect.w, rect.h);
    imageops::overlay(dst, &fitted, i64::from(rect.x), i64::from(rect.y));
}

/// Stack two photos into equal top/bottom slots (portrait canvas).
pub fn vertical(top: &DynamicImage, bottom: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let slot = height / 2;
    let mut dst = RgbaImage::new(width, height);
    draw_cover(&mut dst, Rect::new(0, 0, width, slot), top);
    draw_cover(&mut dst, Rect::new(0, slot, width, height - slot), bottom);
    dst
}

/// Place two photos into equal left/right slots (landscape canvas).
pub fn horizontal(left: &DynamicImage, right: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let slot = width / 2;
    let mut dst = RgbaImage::new(width, height);
    draw_cover(&mut dst, Rect::new(0, 0, slot, height), left);
    draw_cover(&mut dst, Rect::new(slot, 0, width - slot, height), right);
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        let img = RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_cover_resize_exact_dimensions() {
        let src = solid(1600, 900, [10, 20, 30]);
        let out = cover_resize(&src, 480, 800);
        assert_eq!(out.dimensions(), (480, 800));
    }

    #[test]
    fn test_vertical_collage_slots() {
        let red = solid(640, 480, [255, 0, 0]);
        let blue = solid(640, 480, [0, 0, 255]);
        let out = vertical(&red, &blue, 480, 800);
        assert_eq!(out.dimensions(), (480, 800));
        // Top slot is red, bottom slot is blue.
        assert_eq!(out.get_pixel(240, 100).0[0], 255);
        assert_eq!(out.get_pixel(240, 700).0[2], 255);
    }

    #[test]
    fn test_horizontal_collage_slots() {
        let red = solid(480, 640, [255, 0, 0]);
        let blue = solid(480, 640, [0, 0, 255]);
        let out = horizontal(&red, &blue, 800, 480);
        assert_eq!(out.dimensions(), (800, 480));
        assert_eq!(out.get_pixel(100, 240).0[0], 255);
        assert_eq!(out.get_pixel(700, 240).0[2], 255);
    }

    #[test]
    fn test_vertical_collage_odd_height_covers_canvas() {
        let a = solid(100, 100, [1, 2, 3]);
        let out = vertical(&a, &a, 480, 801);
        assert_eq!(out.dimensions(), (480, 801));
        // Bottom row must still be drawn despite the odd split.
        assert_eq!(out.get_pixel(0, 800).0[3], 255);
    }
}
