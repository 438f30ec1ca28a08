//! Loaders for annotation files
//!
//! Loaders only coerce file contents into the data model. Values outside an
//! enumerated label set load successfully as [`Label::Unknown`](crate::Label)
//! and are left to the validators; anything that cannot be coerced at all is
//! a fatal [`Error`](crate::Error).
//!
//! Copyright (c) 2025 Annocheck Team
//! Licensed under the Apache-2.0 license

pub mod text;
pub mod visual;

pub use text::{load_text_annotations, read_text_annotations};
pub use visual::{load_visual_annotations, parse_visual_document, VisualDataset};
