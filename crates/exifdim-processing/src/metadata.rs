//! In-memory EXIF metadata container
//!
//! Wraps the fields parsed by `kamadak-exif` so they can be edited and written
//! back with its (experimental) TIFF writer. Structural fields that the writer
//! synthesizes itself (IFD pointers, thumbnail offsets, strip/tile offsets) are
//! not kept as fields; the embedded thumbnail JPEG is kept as raw bytes.

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Context, Field, In, Tag, Value};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;

/// Standard metadata groups of an EXIF block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataGroup {
    /// IFD0 ("0th"): the primary image attributes
    Primary,
    /// The Exif sub-IFD
    Exif,
    /// The GPS sub-IFD
    Gps,
    /// The Interoperability sub-IFD
    Interop,
    /// IFD1 ("1st"): thumbnail attributes
    Thumbnail,
}

impl MetadataGroup {
    pub const ALL: [MetadataGroup; 5] = [
        MetadataGroup::Primary,
        MetadataGroup::Exif,
        MetadataGroup::Gps,
        MetadataGroup::Interop,
        MetadataGroup::Thumbnail,
    ];

    /// Group a parsed field belongs to, if it is one we can round-trip
    pub fn of(field: &Field) -> Option<Self> {
        match field.tag.context() {
            Context::Tiff if field.ifd_num == In::PRIMARY => Some(MetadataGroup::Primary),
            Context::Tiff if field.ifd_num == In::THUMBNAIL => Some(MetadataGroup::Thumbnail),
            Context::Exif => Some(MetadataGroup::Exif),
            Context::Gps => Some(MetadataGroup::Gps),
            Context::Interop => Some(MetadataGroup::Interop),
            _ => None,
        }
    }
}

/// Errors raised while serializing a container
#[derive(Debug, thiserror::Error)]
pub enum ExifError {
    #[error("failed to parse EXIF: {0}")]
    Parse(#[source] exif::Error),

    #[error("failed to serialize EXIF: {0}")]
    Serialize(#[source] exif::Error),
}

/// Editable set of EXIF fields
#[derive(Debug, Clone)]
pub struct ExifContainer {
    fields: Vec<Field>,
    thumbnail: Option<Vec<u8>>,
    little_endian: bool,
}

impl Default for ExifContainer {
    fn default() -> Self {
        Self::empty()
    }
}

impl ExifContainer {
    /// A container with every group present but empty (big-endian on write)
    pub fn empty() -> Self {
        Self {
            fields: Vec::new(),
            thumbnail: None,
            little_endian: false,
        }
    }

    /// Parse a raw TIFF-structured EXIF block (without the `Exif\0\0` prefix)
    pub fn parse(tiff: &[u8]) -> Result<Self, ExifError> {
        let exif = exif::Reader::new()
            .read_raw(tiff.to_vec())
            .map_err(ExifError::Parse)?;

        let thumbnail = thumbnail_bytes(&exif);

        let mut fields = Vec::with_capacity(exif.fields().len());
        let mut dropped = 0usize;
        for field in exif.fields() {
            if is_structural(field.tag) {
                continue;
            }
            if matches!(field.value, Value::Unknown(..)) || MetadataGroup::of(field).is_none() {
                dropped += 1;
                continue;
            }
            fields.push(field.clone());
        }

        if dropped > 0 {
            tracing::debug!(dropped, "Dropped EXIF fields that cannot be re-serialized");
        }

        Ok(Self {
            fields,
            thumbnail,
            little_endian: exif.little_endian(),
        })
    }

    /// Read the container of a JPEG.
    ///
    /// A missing or unparsable EXIF segment yields an empty container.
    pub fn from_jpeg(jpeg: &Jpeg) -> Self {
        let Some(raw) = jpeg.exif() else {
            tracing::debug!("No EXIF segment present, starting from an empty container");
            return Self::empty();
        };

        match Self::parse(&raw) {
            Ok(container) => container,
            Err(e) => {
                tracing::debug!(error = %e, "Existing EXIF is unreadable, starting from an empty container");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn little_endian(&self) -> bool {
        self.little_endian
    }

    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    /// Fields belonging to one group, in stored order
    pub fn fields_in(&self, group: MetadataGroup) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(move |f| MetadataGroup::of(f) == Some(group))
    }

    pub fn get(&self, tag: Tag, ifd_num: In) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.tag == tag && f.ifd_num == ifd_num)
    }

    pub fn get_u32(&self, tag: Tag, ifd_num: In) -> Option<u32> {
        self.get(tag, ifd_num).and_then(|f| f.value.get_uint(0))
    }

    /// Set a single LONG value, replacing every previous occurrence of the tag
    pub fn set_u32(&mut self, tag: Tag, ifd_num: In, value: u32) {
        self.fields
            .retain(|f| !(f.tag == tag && f.ifd_num == ifd_num));
        self.fields.push(Field {
            tag,
            ifd_num,
            value: Value::Long(vec![value]),
        });
    }

    /// Serialize to a TIFF-structured EXIF block (without the `Exif\0\0` prefix)
    pub fn to_tiff_bytes(&self) -> Result<Vec<u8>, ExifError> {
        let mut writer = Writer::new();
        for field in &self.fields {
            writer.push_field(field);
        }
        if let Some(thumbnail) = &self.thumbnail {
            writer.set_jpeg(thumbnail, In::THUMBNAIL);
        }

        let mut buf = Cursor::new(Vec::new());
        writer
            .write(&mut buf, self.little_endian)
            .map_err(ExifError::Serialize)?;
        Ok(buf.into_inner())
    }
}

/// Tags describing the file layout rather than the image
fn is_structural(tag: Tag) -> bool {
    [
        Tag::ExifIFDPointer,
        Tag::GPSInfoIFDPointer,
        Tag::InteropIFDPointer,
        Tag::JPEGInterchangeFormat,
        Tag::JPEGInterchangeFormatLength,
        Tag::StripOffsets,
        Tag::StripByteCounts,
        Tag::TileOffsets,
        Tag::TileByteCounts,
    ]
    .contains(&tag)
}

fn thumbnail_bytes(exif: &exif::Exif) -> Option<Vec<u8>> {
    let offset = exif
        .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let len = exif
        .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let end = offset.checked_add(len)?;
    exif.buf().get(offset..end).map(<[u8]>::to_vec)
}
