//! Image embedding for PDF generation.
//!
//! Screenshots reach the writer already composited and JPEG-encoded, so
//! they are embedded as-is with the DCTDecode filter; only the frame header
//! is parsed to learn dimensions and colour space.

use crate::object::Object;
use std::collections::HashMap;

/// PDF color space for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component)
    DeviceGray,
    /// RGB (3 components)
    DeviceRGB,
    /// CMYK (4 components)
    DeviceCMYK,
}

impl ColorSpace {
    /// PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// A JPEG ready for embedding as an Image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space
    pub color_space: ColorSpace,
    /// JPEG bytes
    pub data: Vec<u8>,
}

impl ImageData {
    /// Wrap baseline or progressive JPEG data.
    ///
    /// JPEG images can be embedded directly without transcoding.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self, ImageError> {
        let (width, height, color_space) = parse_jpeg_header(&data)?;
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidData(format!("JPEG has zero size {}x{}", width, height)));
        }
        Ok(Self {
            width,
            height,
            color_space,
            data,
        })
    }

    /// Build the PDF Image XObject dictionary.
    pub fn build_xobject_dict(&self) -> HashMap<String, Object> {
        let mut dict = HashMap::new();

        dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
        dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
        dict.insert("Width".to_string(), Object::Integer(self.width as i64));
        dict.insert("Height".to_string(), Object::Integer(self.height as i64));
        dict.insert(
            "ColorSpace".to_string(),
            Object::Name(self.color_space.pdf_name().to_string()),
        );
        dict.insert("BitsPerComponent".to_string(), Object::Integer(8));
        dict.insert("Filter".to_string(), Object::Name("DCTDecode".to_string()));
        if self.color_space == ColorSpace::DeviceCMYK {
            // Adobe CMYK JPEGs store inverted components
            dict.insert(
                "Decode".to_string(),
                Object::Array([1, 0, 1, 0, 1, 0, 1, 0].map(Object::Integer).to_vec()),
            );
        }
        dict.insert("Length".to_string(), Object::Integer(self.data.len() as i64));

        dict
    }

    /// The XObject as a stream object.
    pub fn to_stream(&self) -> Object {
        Object::Stream {
            dict: self.build_xobject_dict(),
            data: bytes::Bytes::from(self.data.clone()),
        }
    }
}

/// Image embedding error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Unsupported image format
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),
}

/// Parse JPEG header to extract dimensions and color space.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace), ImageError> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(ImageError::UnsupportedFormat);
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }

        let marker = data[pos + 1];
        pos += 2;

        // Skip padding
        if marker == 0xFF || marker == 0x00 {
            continue;
        }
        // Standalone markers carry no length
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            continue;
        }

        // SOF markers (Start of Frame)
        if matches!(
            marker,
            0xC0 | 0xC1
                | 0xC2
                | 0xC3
                | 0xC5
                | 0xC6
                | 0xC7
                | 0xC9
                | 0xCA
                | 0xCB
                | 0xCD
                | 0xCE
                | 0xCF
        ) {
            if pos + 8 > data.len() {
                return Err(ImageError::InvalidData("Truncated JPEG header".to_string()));
            }

            let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
            let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            let color_space = match data[pos + 7] {
                1 => ColorSpace::DeviceGray,
                4 => ColorSpace::DeviceCMYK,
                _ => ColorSpace::DeviceRGB,
            };

            return Ok((width, height, color_space));
        }

        if pos + 2 > data.len() {
            break;
        }
        let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += length;
    }

    Err(ImageError::InvalidData("Could not find JPEG dimensions".to_string()))
}
