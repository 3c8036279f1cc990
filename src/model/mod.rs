//! Document model.
//!
//! [`Document`] is the only input the renderers take. It is read-only for the
//! duration of a render; mutations arrive through [`crate::overlay`] edits
//! applied by the caller.

pub mod callout;
pub mod document;

pub use callout::{
    BlurStyle, BlurType, Callout, CalloutKind, CalloutRecord, DEFAULT_COLOR, MAX_POLYGON_SIDES,
    MIN_POLYGON_SIDES,
};
pub use document::{
    Document, DocumentMetadata, Quiz, Resource, Screenshot, SecondaryImage, Step,
};
