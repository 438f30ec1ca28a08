//! Annotation data model
//!
//! Enumerated label sets are closed Rust enums. A value read from a file that
//! is not part of its set loads as [`Label::Unknown`] so the rule engine can
//! report it instead of letting it pass through as an arbitrary string.
//!
//! Copyright (c) 2025 Annocheck Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed set of label values that can be parsed from free text
pub trait Vocabulary: Sized + Copy + 'static {
    /// Every member of the set, in canonical order
    const ALL: &'static [Self];

    /// Canonical snake_case spelling
    fn as_str(&self) -> &'static str;

    /// Match raw text against the set, ignoring case, surrounding
    /// whitespace, and space/hyphen versus underscore
    fn lookup(raw: &str) -> Option<Self> {
        let normalized = normalize_label(raw);
        Self::ALL
            .iter()
            .copied()
            .find(|member| member.as_str() == normalized)
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Purpose of a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BillingInquiry,
    TechnicalSupport,
    FeatureRequest,
    Cancellation,
    GeneralQuestion,
}

impl Vocabulary for Intent {
    const ALL: &'static [Self] = &[
        Intent::BillingInquiry,
        Intent::TechnicalSupport,
        Intent::FeatureRequest,
        Intent::Cancellation,
        Intent::GeneralQuestion,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Intent::BillingInquiry => "billing_inquiry",
            Intent::TechnicalSupport => "technical_support",
            Intent::FeatureRequest => "feature_request",
            Intent::Cancellation => "cancellation",
            Intent::GeneralQuestion => "general_question",
        }
    }
}

/// Annotator confidence in the assigned intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Vocabulary for Confidence {
    const ALL: &'static [Self] = &[Confidence::High, Confidence::Medium, Confidence::Low];

    fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Object class of a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MainProduct,
    SecondaryItem,
    Background,
    Packaging,
}

impl Vocabulary for Category {
    const ALL: &'static [Self] = &[
        Category::MainProduct,
        Category::SecondaryItem,
        Category::Background,
        Category::Packaging,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Category::MainProduct => "main_product",
            Category::SecondaryItem => "secondary_item",
            Category::Background => "background",
            Category::Packaging => "packaging",
        }
    }
}

macro_rules! impl_vocabulary_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_vocabulary_display!(Intent, Confidence, Category);

/// A label value as recorded in the input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label<T> {
    /// Member of the enumerated set
    Known(T),
    /// Raw text that matched no member
    Unknown(String),
}

impl<T: Vocabulary> Label<T> {
    /// Parse raw text into a label
    pub fn parse(raw: &str) -> Self {
        match T::lookup(raw) {
            Some(value) => Label::Known(value),
            None => Label::Unknown(raw.to_string()),
        }
    }

    /// The enumerated value, if recognized
    pub fn known(&self) -> Option<T> {
        match self {
            Label::Known(value) => Some(*value),
            Label::Unknown(_) => None,
        }
    }
}

impl<T: Vocabulary> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Known(value) => f.write_str(value.as_str()),
            Label::Unknown(raw) => write!(f, "{:?}", raw),
        }
    }
}

/// Identifier that may be numeric or textual
///
/// Integers order numerically and sort before strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl RecordId {
    /// Read an identifier from text, keeping canonical integers numeric
    ///
    /// `"42"` becomes `Int(42)`; `"042"`, `"+42"` and `"msg_42"` stay strings
    /// so the displayed id always matches the input.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => RecordId::Int(n),
            _ => RecordId::Str(raw.to_string()),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Str(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Str(value)
    }
}

/// One labeled message from the text dataset
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub message_id: String,
    pub text: String,
    pub intent: Label<Intent>,
    pub confidence: Label<Confidence>,
}

impl TextAnnotation {
    /// Identifier used in reports
    pub fn record_id(&self) -> RecordId {
        RecordId::parse(&self.message_id)
    }
}

/// Image metadata referenced by bounding boxes
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub image_id: RecordId,
    pub width: u32,
    pub height: u32,
    pub file_name: Option<String>,
}

impl ImageRecord {
    /// Image area in square pixels
    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }
}

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box with a non-positive side encloses nothing
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn area(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.width * self.height
        }
    }

    /// Area of the part of the box that lies inside `[0, width] x [0, height]`
    pub fn clipped_area(&self, width: f64, height: f64) -> f64 {
        let overlap_x = (self.x + self.width).min(width) - self.x.max(0.0);
        let overlap_y = (self.y + self.height).min(height) - self.y.max(0.0);
        if overlap_x <= 0.0 || overlap_y <= 0.0 {
            0.0
        } else {
            overlap_x * overlap_y
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// One bounding-box annotation from the visual dataset
#[derive(Debug, Clone, PartialEq)]
pub struct VisualAnnotation {
    /// Explicit `id` from the document, if present
    pub annotation_id: Option<RecordId>,
    pub image_id: RecordId,
    pub category: Label<Category>,
    pub bbox: BoundingBox,
    /// Recorded area; `None` means derive from the box
    pub area: Option<f64>,
    pub needs_review: bool,
}

impl VisualAnnotation {
    /// Identifier used in reports
    ///
    /// Falls back to a value derived from the image id and box so that it
    /// does not depend on the record's position in the file.
    pub fn record_id(&self) -> RecordId {
        match &self.annotation_id {
            Some(id) => id.clone(),
            None => RecordId::Str(format!("image {} {}", self.image_id, self.bbox)),
        }
    }

    /// Recorded area, or `width * height` when none was recorded
    pub fn effective_area(&self) -> f64 {
        self.area.unwrap_or_else(|| self.bbox.area())
    }
}
