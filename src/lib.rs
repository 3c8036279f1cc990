// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # snapguide
//!
//! Annotated screenshot guides rendered to print and web.
//!
//! A [`model::Document`] is an ordered list of steps, each with screenshots
//! carrying callouts (circles, numbered markers, arrows, blurs, magnifiers
//! and more) positioned in percentages of the image. The crate turns that
//! document into:
//!
//! - **PDF**: a paginated manual with cover, table of contents, two-tone
//!   step headers, screenshot pairing and footers ([`pdf`]);
//! - **HTML**: a self-contained interactive module with progress tracking,
//!   quizzes, tag highlighting, dark mode and click-to-reveal hotspots
//!   ([`html`]);
//! - **Bundle**: a ZIP with both plus a style guide, quick reference,
//!   thumbnails and a manifest ([`bundle`]).
//!
//! ## Architecture
//!
//! ```text
//! Document ──► raster (decode, resize, composite, frame, encode)
//!                 │
//!        ┌────────┴────────┐
//!        ▼                 ▼
//!   pdf::layout        html (+ overlay hotspots)
//!   pdf::render             │
//!   writer (PDF objects)    │
//!        └────────┬────────┘
//!                 ▼
//!              bundle (ZIP)
//! ```
//!
//! Every consumer of callout coordinates goes through
//! [`geometry::resolve`] (pixels) or [`geometry::css_box`] (CSS percentages),
//! which share one percentage rectangle.
//!
//! ## Quick Start
//!
//! ```
//! use snapguide::config::{ExportFormat, ExportOptions};
//! use snapguide::export::render;
//! use snapguide::model::{Document, Step};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = Document::new("Onboarding")
//!     .with_step(Step::new("s1", "Sign in"))
//!     .with_step(Step::new("s2", "Open settings"));
//!
//! let pdf = render(&doc, &ExportOptions::default())?.into_bytes();
//! assert!(pdf.starts_with(b"%PDF-"));
//!
//! let html = render(&doc, &ExportOptions::default().with_format(ExportFormat::Html))?;
//! assert_eq!(html.extension(), "html");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Cancellation
pub mod cancel;

// Export options
pub mod config;

// Coordinates and callout geometry
pub mod geometry;

// Documents, steps, screenshots, callouts
pub mod model;

// Live annotation overlay
pub mod overlay;

// Image decoding, compositing and framing
pub mod raster;

// PDF object model
pub mod object;

// PDF writing
pub mod writer;

// PDF manual
pub mod pdf;

// Interactive HTML module
pub mod html;

// ZIP training bundle
pub mod bundle;

// Export entry point
pub mod export;

pub use error::{Error, Result};
pub use export::{render, ExportOutput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
