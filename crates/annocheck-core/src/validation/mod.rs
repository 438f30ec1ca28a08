//! Rule engine for loaded annotations
//!
//! Per-record rules are independent: a violation on one record never changes
//! the outcome for another. The only cross-record rules are the dataset-level
//! aggregates (class balance, low-confidence share, duplicate ids, image
//! coverage), each reported once per run.
//!
//! Both entry points return violations already sorted by record and rule.
//!
//! Copyright (c) 2025 Annocheck Team
//! Licensed under the Apache-2.0 license

mod text;
mod visual;

use crate::config::ValidatorConfig;
use crate::model::{ImageRecord, TextAnnotation, VisualAnnotation};
use crate::report::Violation;

/// Applies the configured rule set to annotation collections
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }
}

/// Validate text annotations with the given thresholds
pub fn validate_text(records: &[TextAnnotation], config: &ValidatorConfig) -> Vec<Violation> {
    Validator::new(config.clone()).validate_text(records)
}

/// Validate bounding boxes against their images with the given thresholds
pub fn validate_visual(
    images: &[ImageRecord],
    annotations: &[VisualAnnotation],
    config: &ValidatorConfig,
) -> Vec<Violation> {
    Validator::new(config.clone()).validate_visual(images, annotations)
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
