//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer.
//!
//! Object numbers are assigned in a fixed order (catalog, page tree, fonts,
//! images in registration order, then each page with its content stream and
//! annotations, then the info dictionary), so the same pages always
//! serialize to the same bytes.

use super::content_stream::ContentStreamBuilder;
use super::image_handler::ImageData;
use super::object_serializer::{dict_map, ObjectSerializer};
use super::text_annotations::TextAnnotation;
use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::Write;

/// Resource name of the regular text font (Helvetica).
pub const FONT_REGULAR: &str = "F1";
/// Resource name of the bold text font (Helvetica-Bold).
pub const FONT_BOLD: &str = "F2";

const FONTS: [(&str, &str); 2] = [(FONT_REGULAR, "Helvetica"), (FONT_BOLD, "Helvetica-Bold")];

/// A4 portrait in points.
pub const A4: (f32, f32) = (595.0, 842.0);

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.7")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Whether to compress content streams
    pub compress: bool,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            author: None,
            subject: None,
            creator: Some(format!("snapguide {}", env!("CARGO_PKG_VERSION"))),
            compress: true,
        }
    }
}

impl PdfWriterConfig {
    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Enable or disable stream compression.
    ///
    /// When enabled, content streams are compressed using FlateDecode
    /// (zlib/deflate). Image XObjects are already DCT-encoded.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Compress data using Flate/Deflate compression.
///
/// Returns compressed bytes suitable for FlateDecode filter.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// A page being built.
#[derive(Debug)]
pub struct PdfPage {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Drawing operations
    pub content: ContentStreamBuilder,
    /// Sticky-note annotations
    pub annotations: Vec<TextAnnotation>,
}

impl PdfPage {
    fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            content: ContentStreamBuilder::new(),
            annotations: Vec::new(),
        }
    }
}

/// PDF document writer.
///
/// Builds a complete PDF document with pages, fonts, images and
/// annotations.
#[derive(Debug)]
pub struct PdfWriter {
    config: PdfWriterConfig,
    pages: Vec<PdfPage>,
    /// Image XObjects by resource name, in registration order
    images: IndexMap<String, ImageData>,
}

impl PdfWriter {
    /// Create a new PDF writer with default config.
    pub fn new() -> Self {
        Self::with_config(PdfWriterConfig::default())
    }

    /// Create a PDF writer with custom config.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            images: IndexMap::new(),
        }
    }

    /// Append a page and return its index.
    pub fn add_page(&mut self, width: f32, height: f32) -> usize {
        self.pages.push(PdfPage::new(width, height));
        self.pages.len() - 1
    }

    /// Append an A4 portrait page.
    pub fn add_a4_page(&mut self) -> usize {
        self.add_page(A4.0, A4.1)
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Mutable access to a page.
    pub fn page_mut(&mut self, index: usize) -> Option<&mut PdfPage> {
        self.pages.get_mut(index)
    }

    /// All pages, in order.
    pub fn pages_mut(&mut self) -> impl Iterator<Item = &mut PdfPage> {
        self.pages.iter_mut()
    }

    /// Register an image and return its resource name (`Im1`, `Im2`, ...).
    pub fn add_image(&mut self, image: ImageData) -> String {
        let name = format!("Im{}", self.images.len() + 1);
        self.images.insert(name.clone(), image);
        name
    }

    /// A registered image.
    pub fn image(&self, name: &str) -> Option<&ImageData> {
        self.images.get(name)
    }

    /// Build the complete PDF document.
    pub fn finish(self) -> Result<Vec<u8>> {
        let serializer = ObjectSerializer::compact();

        // Object number plan
        let catalog_id = 1u32;
        let pages_id = 2u32;
        let font_base = 3u32;
        let image_base = font_base + FONTS.len() as u32;
        let mut next_id = image_base + self.images.len() as u32;

        let image_refs: HashMap<&str, ObjectRef> = self
            .images
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), ObjectRef::new(image_base + i as u32, 0)))
            .collect();

        let font_resources: HashMap<String, Object> = FONTS
            .iter()
            .enumerate()
            .map(|(i, (res, _))| {
                (res.to_string(), Object::Reference(ObjectRef::new(font_base + i as u32, 0)))
            })
            .collect();

        let mut objects: Vec<(u32, Object)> = Vec::new();
        let mut page_refs = Vec::with_capacity(self.pages.len());

        for (i, (_, base_font)) in FONTS.iter().enumerate() {
            objects.push((
                font_base + i as u32,
                ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Font")),
                    ("Subtype", ObjectSerializer::name("Type1")),
                    ("BaseFont", ObjectSerializer::name(base_font)),
                    ("Encoding", ObjectSerializer::name("WinAnsiEncoding")),
                ]),
            ));
        }
        for (i, image) in self.images.values().enumerate() {
            objects.push((image_base + i as u32, image.to_stream()));
        }

        for (index, page) in self.pages.iter().enumerate() {
            let page_id = next_id;
            let content_id = next_id + 1;
            next_id += 2;

            let raw_content = page.content.build();
            let mut content_dict = HashMap::new();
            let content_bytes = if self.config.compress {
                content_dict.insert("Filter".to_string(), ObjectSerializer::name("FlateDecode"));
                compress_data(&raw_content)?
            } else {
                raw_content
            };
            content_dict.insert("Length".to_string(), Object::Integer(content_bytes.len() as i64));

            let mut resources = dict_map(vec![("Font", Object::Dictionary(font_resources.clone()))]);
            let mut xobjects = HashMap::new();
            for name in page.content.xobjects() {
                let image_ref = image_refs.get(name.as_str()).ok_or_else(|| {
                    Error::Pdf(format!("page {} paints unknown image {}", index + 1, name))
                })?;
                xobjects.insert(name.clone(), Object::Reference(*image_ref));
            }
            if !xobjects.is_empty() {
                resources.insert("XObject".to_string(), Object::Dictionary(xobjects));
            }

            let mut annot_refs = Vec::with_capacity(page.annotations.len());
            for annotation in &page.annotations {
                let mut dict = annotation.build();
                dict.insert("P".to_string(), Object::Reference(ObjectRef::new(page_id, 0)));
                objects.push((next_id, Object::Dictionary(dict)));
                annot_refs.push(Object::Reference(ObjectRef::new(next_id, 0)));
                next_id += 1;
            }

            let mut page_dict = dict_map(vec![
                ("Type", ObjectSerializer::name("Page")),
                ("Parent", ObjectSerializer::reference(ObjectRef::new(pages_id, 0))),
                (
                    "MediaBox",
                    ObjectSerializer::rect(0.0, 0.0, page.width as f64, page.height as f64),
                ),
                ("Contents", ObjectSerializer::reference(ObjectRef::new(content_id, 0))),
                ("Resources", Object::Dictionary(resources)),
            ]);
            if !annot_refs.is_empty() {
                page_dict.insert("Annots".to_string(), Object::Array(annot_refs));
            }

            page_refs.push(Object::Reference(ObjectRef::new(page_id, 0)));
            objects.push((page_id, Object::Dictionary(page_dict)));
            objects.push((
                content_id,
                Object::Stream {
                    dict: content_dict,
                    data: bytes::Bytes::from(content_bytes),
                },
            ));
        }

        let page_count = page_refs.len();
        objects.push((
            pages_id,
            ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Pages")),
                ("Kids", Object::Array(page_refs)),
                ("Count", ObjectSerializer::integer(page_count as i64)),
            ]),
        ));
        objects.push((
            catalog_id,
            ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Catalog")),
                ("Pages", ObjectSerializer::reference(ObjectRef::new(pages_id, 0))),
            ]),
        ));

        let info_id = next_id;
        next_id += 1;
        let mut info_entries = Vec::new();
        if let Some(title) = &self.config.title {
            info_entries.push(("Title", Object::text_string(title)));
        }
        if let Some(author) = &self.config.author {
            info_entries.push(("Author", Object::text_string(author)));
        }
        if let Some(subject) = &self.config.subject {
            info_entries.push(("Subject", Object::text_string(subject)));
        }
        if let Some(creator) = &self.config.creator {
            info_entries.push(("Creator", Object::text_string(creator)));
        }
        objects.push((info_id, ObjectSerializer::dict(info_entries)));

        objects.sort_by_key(|(id, _)| *id);

        let mut output = Vec::new();
        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut xref_offsets = Vec::with_capacity(objects.len());
        for (id, obj) in &objects {
            xref_offsets.push(output.len());
            output.extend_from_slice(&serializer.serialize_indirect(*id, 0, obj));
        }

        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", next_id)?;
        // Object 0 is always free
        writeln!(output, "0000000000 65535 f ")?;
        for offset in &xref_offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let trailer = ObjectSerializer::dict(vec![
            ("Size", ObjectSerializer::integer(next_id as i64)),
            ("Root", ObjectSerializer::reference(ObjectRef::new(catalog_id, 0))),
            ("Info", ObjectSerializer::reference(ObjectRef::new(info_id, 0))),
        ]);
        writeln!(output, "trailer")?;
        output.extend_from_slice(&serializer.serialize(&trailer));
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        write!(output, "%%EOF")?;

        Ok(output)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::raster::encode_jpeg;
    use image::{Rgba, RgbaImage};

    fn uncompressed() -> PdfWriter {
        PdfWriter::with_config(PdfWriterConfig::default().with_compress(false))
    }

    fn test_jpeg() -> ImageData {
        let img = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 255, 255]));
        ImageData::from_jpeg(encode_jpeg(&img, 80).unwrap()).unwrap()
    }

    #[test]
    fn test_create_empty_pdf() {
        let mut writer = PdfWriter::new();
        writer.add_a4_page();
        let bytes = writer.finish().unwrap();
        let content = String::from_utf8_lossy(&bytes);
        assert!(content.starts_with("%PDF-1.7"));
        assert!(content.contains("/Type /Catalog"));
        assert!(content.contains("/Type /Pages"));
        assert!(content.contains("/MediaBox [0 0 595 842]"));
        assert!(content.ends_with("%%EOF"));
    }

    #[test]
    fn test_pdf_with_text() {
        let mut writer = uncompressed();
        let page = writer.add_a4_page();
        writer
            .page_mut(page)
            .unwrap()
            .content
            .text_line(FONT_REGULAR, 12.0, "Hello, World!", 72.0, 720.0);
        let bytes = writer.finish().unwrap();
        let content = String::from_utf8_lossy(&bytes);
        assert!(content.contains("/BaseFont /Helvetica"));
        assert!(content.contains("/BaseFont /Helvetica-Bold"));
        assert!(content.contains("(Hello, World!) Tj"));
    }

    #[test]
    fn test_xobjects_only_on_pages_that_use_them() {
        let mut writer = uncompressed();
        let im = writer.add_image(test_jpeg());
        let first = writer.add_a4_page();
        writer.add_a4_page();
        writer.page_mut(first).unwrap().content.draw_image(&im, 0.0, 0.0, 40.0, 20.0);
        let bytes = writer.finish().unwrap();
        let content = String::from_utf8_lossy(&bytes);
        assert_eq!(content.matches("/XObject <</Im1 ").count(), 1);
        assert!(content.contains("/Filter /DCTDecode"));
    }

    #[test]
    fn test_unknown_image_is_error() {
        let mut writer = uncompressed();
        let page = writer.add_a4_page();
        writer.page_mut(page).unwrap().content.draw_image("Im9", 0.0, 0.0, 1.0, 1.0);
        assert!(matches!(writer.finish(), Err(Error::Pdf(_))));
    }

    #[test]
    fn test_annotations_written() {
        let mut writer = uncompressed();
        let page = writer.add_a4_page();
        writer
            .page_mut(page)
            .unwrap()
            .annotations
            .push(TextAnnotation::new(Rect::new(10.0, 10.0, 16.0, 16.0), "Reveal"));
        let bytes = writer.finish().unwrap();
        let content = String::from_utf8_lossy(&bytes);
        assert!(content.contains("/Subtype /Text"));
        assert!(content.contains("/Contents (Reveal)"));
        assert!(content.contains("/Annots ["));
    }

    #[test]
    fn test_deterministic_output() {
        let build = || {
            let mut writer = PdfWriter::with_config(PdfWriterConfig::default().with_title("Guide"));
            let im = writer.add_image(test_jpeg());
            let page = writer.add_a4_page();
            writer.page_mut(page).unwrap().content.draw_image(&im, 0.0, 0.0, 4.0, 2.0);
            writer.finish().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut writer = uncompressed();
        writer.add_a4_page();
        writer.add_a4_page();
        let bytes = writer.finish().unwrap();
        let content = String::from_utf8_lossy(&bytes).to_string();
        let xref = content.find("xref\n").unwrap();
        let entries: Vec<usize> = content[xref..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, offset) in entries.iter().enumerate() {
            assert!(content[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }
}
