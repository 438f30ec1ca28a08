//! Annocheck Core - validation for manually produced annotation datasets
//!
//! This crate loads text-intent annotations (CSV) and object-detection
//! annotations (COCO-style JSON or YAML), checks them against a fixed rule
//! set and produces a deterministic [`ValidationReport`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use annocheck_core::{run, RunConfig, ValidatorConfig};
//!
//! let config = RunConfig::new(ValidatorConfig::default())
//!     .with_text("data/annotated_texts.csv")
//!     .with_visual("data/_annotations.coco.json");
//!
//! let report = run(&config).expect("inputs should load");
//! println!(
//!     "{} violations, approval rate {:.1}%",
//!     report.violations.len(),
//!     report.summary.approval_rate * 100.0
//! );
//! ```
//!
//! ## Rules
//!
//! ### Text annotations
//! - `invalid_intent`, `invalid_confidence`: label outside its enumerated set
//! - `empty_message`: blank message text
//! - `duplicate_id`: one violation per `message_id` shared by several rows;
//!   every row holding the id counts as rejected
//! - `class_imbalance` (warning): an intent's share outside the target band
//! - `low_confidence_ratio` (warning): too many low-confidence rows
//!
//! ### Bounding boxes
//! - `invalid_category`: category outside its enumerated set
//! - `out_of_bounds`: less than the minimum visible fraction inside the image
//! - `box_too_small`: degenerate box, or area below the minimum fraction
//! - `duplicate_id`: one violation per box id shared by several boxes
//! - `background_too_large`: background box above the area ceiling
//! - `reference_missing`: box points at an unknown image
//! - `image_unannotated` (warning): image without boxes
//!
//! Copyright (c) 2025 Annocheck Team
//! Licensed under the Apache-2.0 license

pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod report;
pub mod runner;
pub mod validation;

pub use config::{BalanceBand, ScoreWeights, ValidatorConfig};
pub use error::{Error, Result};
pub use loader::{load_text_annotations, load_visual_annotations, VisualDataset};
pub use model::{
    BoundingBox, Category, Confidence, ImageRecord, Intent, Label, RecordId, TextAnnotation,
    VisualAnnotation, Vocabulary,
};
pub use report::{
    label_counts, sort_violations, summarize, InputStats, RuleId, Severity, Subject, Summary,
    ValidationReport, Violation,
};
pub use runner::{run, InputSet, RunConfig};
pub use validation::{validate_text, validate_visual, Validator};

/// Slack used for inclusive threshold comparisons on fractions
pub(crate) const TOLERANCE: f64 = 1e-9;
