//! EXIF orientation lookup and correction.

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIF orientation (tag 0x0112) as a transform to undo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Normal,
    MirroredHorizontal,
    Rotated180,
    MirroredVertical,
    MirroredHorizontalAnd270CW,
    Rotated90CW,
    MirroredHorizontalAnd90CW,
    Rotated270CW,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Self::MirroredHorizontal,
            3 => Self::Rotated180,
            4 => Self::MirroredVertical,
            5 => Self::MirroredHorizontalAnd270CW,
            6 => Self::Rotated90CW,
            7 => Self::MirroredHorizontalAnd90CW,
            8 => Self::Rotated270CW,
            _ => Self::Normal,
        }
    }
}

impl Orientation {
    /// Rotate/flip `image` so it displays upright.
    #[must_use]
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => image,
            Self::MirroredHorizontal => image.fliph(),
            Self::Rotated180 => image.rotate180(),
            Self::MirroredVertical => image.flipv(),
            Self::MirroredHorizontalAnd270CW => image.fliph().rotate270(),
            Self::Rotated90CW => image.rotate90(),
            Self::MirroredHorizontalAnd90CW => image.fliph().rotate90(),
            Self::Rotated270CW => image.rotate270(),
        }
    }
}

/// Reads EXIF data relevant to thumbnailing.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Orientation stored in the file, if any.
    ///
    /// Returns `None` if the file has no EXIF data or if extraction fails.
    pub fn orientation(path: &Path) -> Option<Orientation> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let exif = Reader::new().read_from_container(&mut reader).ok()?;

        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| x as u32),
                Value::Long(v) => v.first().copied(),
                _ => None,
            })
            .map(Orientation::from)
    }
}
