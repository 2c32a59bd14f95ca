//! Document model: field values as presented to the index writer.

pub mod document;

pub use document::{Document, DocumentBuilder, FieldValue};
