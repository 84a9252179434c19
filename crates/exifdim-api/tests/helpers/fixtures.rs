//! Test fixtures: in-memory images and EXIF readers.

use std::io::Cursor;

use exif::{In, Tag};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

/// RGBA PNG with a simple gradient
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 16) as u8, (y * 16) as u8, 128, 200])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encode png fixture");
    out.into_inner()
}

/// Baseline JPEG without any metadata
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 64]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg)
        .expect("encode jpeg fixture");
    out.into_inner()
}

/// Read PixelXDimension/PixelYDimension back from a JPEG
pub fn read_pixel_dimensions(jpeg: &[u8]) -> (Option<u32>, Option<u32>) {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(jpeg))
        .expect("response should carry EXIF");
    let get = |tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
    };
    (get(Tag::PixelXDimension), get(Tag::PixelYDimension))
}
