//! PDF writing module.
//!
//! ## Architecture
//!
//! ```text
//! LayoutPlan (crate::pdf)
//!     ↓
//! [ContentStreamBuilder] (drawing ops → content stream bytes)
//!     ↓
//! [PdfWriter] (pages, images, annotations → PDF structure)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Example
//!
//! ```
//! use snapguide::writer::{PdfWriter, FONT_BOLD};
//!
//! let mut writer = PdfWriter::new();
//! let page = writer.add_a4_page();
//! if let Some(page) = writer.page_mut(page) {
//!     page.content.text_line(FONT_BOLD, 24.0, "Hello, World!", 72.0, 720.0);
//! }
//! let bytes = writer.finish().unwrap();
//! assert!(bytes.starts_with(b"%PDF-"));
//! ```

mod content_stream;
mod font_manager;
mod image_handler;
mod object_serializer;
mod page_template;
mod pdf_writer;
mod text_annotations;

pub use content_stream::{encode_win_ansi, ContentStreamBuilder, ContentStreamOp};
pub use font_manager::{text_width, truncate_to_width, wrap_text, Font, ELLIPSIS};
pub use image_handler::{ColorSpace, ImageData, ImageError};
pub use object_serializer::ObjectSerializer;
pub use page_template::{
    HFAlignment, HFElement, HFStyle, HeaderFooter, PageTemplate, Placeholder, PlaceholderContext,
};
pub use pdf_writer::{PdfPage, PdfWriter, PdfWriterConfig, A4, FONT_BOLD, FONT_REGULAR};
pub use text_annotations::{TextAnnotation, TextAnnotationIcon};
