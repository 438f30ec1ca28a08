//! Rules for bounding-box annotations

use super::{percent, Validator};
use crate::model::{Category, ImageRecord, Label, RecordId, VisualAnnotation, Vocabulary};
use crate::report::{sort_violations, RuleId, Subject, Violation};
use crate::TOLERANCE;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

impl Validator {
    /// Check every box against its image, then image coverage
    pub fn validate_visual(
        &self,
        images: &[ImageRecord],
        annotations: &[VisualAnnotation],
    ) -> Vec<Violation> {
        let by_id: BTreeMap<&RecordId, &ImageRecord> =
            images.iter().map(|image| (&image.image_id, image)).collect();
        let mut violations = Vec::new();

        for annotation in annotations {
            let image = by_id.get(&annotation.image_id).copied();
            self.check_box(annotation, image, &mut violations);
        }
        self.check_duplicate_visual_ids(annotations, &mut violations);
        self.check_coverage(images, annotations, &mut violations);

        sort_violations(&mut violations);
        debug!(
            images = images.len(),
            annotations = annotations.len(),
            violations = violations.len(),
            "Visual validation finished"
        );
        violations
    }

    fn check_box(
        &self,
        annotation: &VisualAnnotation,
        image: Option<&ImageRecord>,
        violations: &mut Vec<Violation>,
    ) {
        let subject = Subject::Annotation(annotation.record_id());
        let config = &self.config;

        if let Label::Unknown(raw) = &annotation.category {
            let expected: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
            violations.push(Violation::new(
                RuleId::InvalidCategory,
                subject.clone(),
                format!("category {:?} is not one of {}", raw, expected.join(", ")),
            ));
        }

        // Loading rejects unknown images; this only triggers for hand-built inputs.
        let Some(image) = image else {
            violations.push(Violation::new(
                RuleId::ReferenceMissing,
                subject,
                format!("image_id {} does not exist", annotation.image_id),
            ));
            return;
        };

        let bbox = annotation.bbox;
        if bbox.is_degenerate() {
            violations.push(Violation::new(
                RuleId::BoxTooSmall,
                subject,
                format!(
                    "degenerate box {}: width and height must be positive",
                    bbox
                ),
            ));
            return;
        }

        let visible = bbox.clipped_area(f64::from(image.width), f64::from(image.height)) / bbox.area();
        if visible + TOLERANCE < config.min_visible {
            violations.push(Violation::new(
                RuleId::OutOfBounds,
                subject.clone(),
                format!(
                    "only {} of box {} lies inside the {}x{} image, minimum is {}",
                    percent(visible),
                    bbox,
                    image.width,
                    image.height,
                    percent(config.min_visible)
                ),
            ));
        }

        let is_background = annotation.category.known() == Some(Category::Background);
        let coverage = annotation.effective_area() / image.area();
        let minimum = if is_background {
            config.min_background_area
        } else {
            config.min_box_area
        };

        if !annotation.needs_review && coverage + TOLERANCE < minimum {
            violations.push(Violation::new(
                RuleId::BoxTooSmall,
                subject.clone(),
                format!(
                    "box covers {} of the image, minimum is {}",
                    percent(coverage),
                    percent(minimum)
                ),
            ));
        }

        if is_background && coverage > config.max_background_area + TOLERANCE {
            violations.push(Violation::new(
                RuleId::BackgroundTooLarge,
                subject.clone(),
                format!(
                    "background box covers {} of the image, maximum is {}",
                    percent(coverage),
                    percent(config.max_background_area)
                ),
            ));
        }

        trace!(annotation = %subject, "Checked box");
    }

    /// Boxes sharing an id, explicit or derived, are reported once per id
    fn check_duplicate_visual_ids(&self, annotations: &[VisualAnnotation], violations: &mut Vec<Violation>) {
        let mut counts: BTreeMap<RecordId, usize> = BTreeMap::new();
        for annotation in annotations {
            *counts.entry(annotation.record_id()).or_insert(0) += 1;
        }

        for (id, count) in counts.into_iter().filter(|(_, count)| *count > 1) {
            violations.push(
                Violation::new(
                    RuleId::DuplicateId,
                    Subject::Annotation(id.clone()),
                    format!("annotation id {} appears {} times", id, count),
                )
                .affecting(count),
            );
        }
    }

    fn check_coverage(
        &self,
        images: &[ImageRecord],
        annotations: &[VisualAnnotation],
        violations: &mut Vec<Violation>,
    ) {
        let annotated: BTreeSet<&RecordId> = annotations.iter().map(|a| &a.image_id).collect();

        for image in images.iter().filter(|image| !annotated.contains(&image.image_id)) {
            let name = image
                .file_name
                .as_deref()
                .map(|f| format!(" ({})", f))
                .unwrap_or_default();
            violations.push(Violation::new(
                RuleId::ImageUnannotated,
                Subject::Image(image.image_id.clone()),
                format!("image{} has no annotations", name),
            ));
        }
    }
}
