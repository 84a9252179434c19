//! JPEG normalization and EXIF segment splicing

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, ImageReader};
use img_parts::jpeg::{markers, Jpeg, JpegSegment};
use img_parts::ImageEXIF;

use crate::error::RewriteError;
use crate::validator::ValidationError;

/// Prefix of an EXIF APP1 payload
pub const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Largest payload a single JPEG segment can carry (length field minus itself)
pub const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

/// JPEG bytes ready for metadata editing
#[derive(Debug, Clone)]
pub struct NormalizedJpeg {
    pub bytes: Bytes,
    pub source_format: ImageFormat,
    pub transcoded: bool,
}

/// Guess the encoded format from the leading bytes
pub fn sniff_format(data: &[u8]) -> Result<ImageFormat, ValidationError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.format())
        .ok_or(ValidationError::UnrecognizedFormat)
}

/// Make sure `data` is a JPEG, transcoding other formats at `quality`.
///
/// JPEG input is only header-checked and passed through untouched.
pub fn ensure_jpeg(data: Bytes, quality: u8) -> Result<NormalizedJpeg, RewriteError> {
    let format = sniff_format(&data)?;

    if format == ImageFormat::Jpeg {
        let (width, height) = ImageReader::with_format(Cursor::new(&data[..]), ImageFormat::Jpeg)
            .into_dimensions()
            .map_err(|e| ValidationError::UndecodableImage(e.to_string()))?;
        tracing::debug!(width, height, "Input is already JPEG");
        return Ok(NormalizedJpeg {
            bytes: data,
            source_format: format,
            transcoded: false,
        });
    }

    let img = image::load_from_memory_with_format(&data, format)
        .map_err(|e| ValidationError::UndecodableImage(e.to_string()))?;

    tracing::debug!(
        source_format = ?format,
        width = img.width(),
        height = img.height(),
        quality,
        "Transcoding input to JPEG"
    );

    let encoded = encode_jpeg(&img, quality)?;
    Ok(NormalizedJpeg {
        bytes: encoded,
        source_format: format,
        transcoded: true,
    })
}

/// Encode to baseline JPEG using mozjpeg. Alpha is discarded.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, RewriteError> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| RewriteError::Encoding(format!("jpeg encoder failed to start: {}", e)))?;
    comp.write_scanlines(&rgb_img)
        .map_err(|e| RewriteError::Encoding(format!("jpeg encoder failed: {}", e)))?;
    let jpeg_data = comp
        .finish()
        .map_err(|e| RewriteError::Encoding(format!("jpeg encoder failed to finish: {}", e)))?;

    Ok(Bytes::from(jpeg_data))
}

/// Split JPEG bytes into segments
pub fn parse_jpeg(data: Bytes) -> Result<Jpeg, ValidationError> {
    Jpeg::from_bytes(data).map_err(|e| ValidationError::UndecodableImage(e.to_string()))
}

/// Replace every EXIF segment with `tiff`, placed directly after SOI
pub fn splice_exif(jpeg: &mut Jpeg, tiff: &[u8]) -> Result<(), RewriteError> {
    let payload_len = EXIF_HEADER.len() + tiff.len();
    if payload_len > MAX_SEGMENT_PAYLOAD {
        return Err(RewriteError::Encoding(format!(
            "EXIF block of {} bytes does not fit in a JPEG segment (max {})",
            payload_len, MAX_SEGMENT_PAYLOAD
        )));
    }

    let mut contents = Vec::with_capacity(payload_len);
    contents.extend_from_slice(EXIF_HEADER);
    contents.extend_from_slice(tiff);

    jpeg.set_exif(None);
    jpeg.segments_mut().insert(
        0,
        JpegSegment::new_with_contents(markers::APP1, Bytes::from(contents)),
    );
    Ok(())
}

/// Serialize segments back into a JPEG file
pub fn encode(jpeg: Jpeg) -> Bytes {
    jpeg.encoder().bytes()
}
