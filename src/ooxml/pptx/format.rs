//! Image formats a slide can embed.

use crate::ooxml::opc::constants::content_type;
use image::ImageReader;
use std::io::Cursor;

/// Image format types PowerPoint renders natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Content type of the media part.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => content_type::PNG,
            Self::Jpeg => content_type::JPEG,
            Self::Gif => content_type::GIF,
            Self::Bmp => content_type::BMP,
            Self::Tiff => content_type::TIFF,
        }
    }

    /// Extension used for the media partname.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Detect image format from bytes (magic number detection).
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF8
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        // BM
        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        // TIFF, little-endian or big-endian
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        None
    }
}

/// Image bytes ready to become a media part, with their pixel size.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl EmbeddedImage {
    /// Probe `bytes` for format and pixel dimensions.
    ///
    /// Formats PowerPoint cannot render but the decoder understands (WebP
    /// and friends) are re-encoded as PNG. Anything undecodable is an error.
    pub fn probe(bytes: Vec<u8>) -> Result<Self, image::ImageError> {
        match ImageFormat::detect_from_bytes(&bytes) {
            Some(format) => {
                let (width, height) = ImageReader::new(Cursor::new(bytes.as_slice()))
                    .with_guessed_format()?
                    .into_dimensions()?;
                Ok(Self {
                    bytes,
                    format,
                    width,
                    height,
                })
            },
            None => {
                let decoded = image::load_from_memory(&bytes)?;
                let mut png = Vec::new();
                decoded.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
                Ok(Self {
                    bytes: png,
                    format: ImageFormat::Png,
                    width: decoded.width(),
                    height: decoded.height(),
                })
            },
        }
    }

    /// Width over height; zero-height images report 1.0.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}
