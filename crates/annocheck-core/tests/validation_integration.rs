//! End-to-end tests: files on disk through loading, rules and summary


use annocheck_core::{
    run, BalanceBand, Error, RuleId, RunConfig, Severity, Subject, RecordId, ValidatorConfig,
};
use serde_json::json;
use test_support::{balanced_rows, single_image_document, Fixture, TextRow};

fn text_only(fixture: &Fixture, rows: &[TextRow]) -> RunConfig {
    let path = fixture.write_text("texts.csv", rows);
    RunConfig::default().with_text(path)
}

#[test]
fn test_unknown_intent_is_the_only_violation() {
    let fixture = Fixture::new();
    let mut rows = balanced_rows(8);
    rows[3].intent = "refund".to_string();

    let report = run(&text_only(&fixture, &rows)).unwrap();

    assert_eq!(report.violations.len(), 1, "{:?}", report.violations);
    let violation = &report.violations[0];
    assert_eq!(violation.rule_id, RuleId::InvalidIntent);
    assert_eq!(violation.record, Subject::Message(RecordId::from("msg_003")));
    assert_eq!(violation.severity, Severity::Error);
    assert!(!report.passed());
    assert_eq!(report.summary.total_records, 40);
    assert_eq!(report.summary.approved_records, 39);
}

#[test]
fn test_tiny_box_is_too_small() {
    let fixture = Fixture::new();
    let path = fixture.write_visual(
        "_annotations.coco.json",
        &single_image_document(&[(1, "main_product", [0.0, 0.0, 5.0, 5.0])]),
    );

    let report = run(&RunConfig::default().with_visual(path)).unwrap();

    let rules: Vec<RuleId> = report.violations.iter().map(|v| v.rule_id).collect();
    assert_eq!(rules, vec![RuleId::BoxTooSmall]);
    assert_eq!(report.violations[0].record, Subject::Annotation(RecordId::Int(1)));
    assert!(!report.passed());
}

#[test]
fn test_balanced_clean_dataset_passes() {
    let fixture = Fixture::new();
    let report = run(&text_only(&fixture, &balanced_rows(8))).unwrap();

    assert!(report.violations.is_empty(), "{:?}", report.violations);
    assert_eq!(report.summary.approval_rate, 1.0);
    assert_eq!(report.summary.quality_score, 1.0);
    assert!(report.passed());
}

#[test]
fn test_warnings_alone_do_not_fail_the_run() {
    let fixture = Fixture::new();
    let mut rows = balanced_rows(8);
    for row in rows.iter_mut().take(5) {
        row.confidence = "low".to_string();
    }

    let report = run(&text_only(&fixture, &rows)).unwrap();

    assert_eq!(report.count(RuleId::LowConfidenceRatio), 1);
    assert_eq!(report.summary.errors, 0);
    assert!(report.passed());
    assert_eq!(report.summary.approval_rate, 1.0);
}

#[test]
fn test_thresholds_are_inclusive() {
    let fixture = Fixture::new();
    // 6/40 = 15% and 10/40 = 25% sit exactly on the band edges
    let counts = [6, 10, 8, 8, 8];
    let intents = [
        "billing_inquiry",
        "technical_support",
        "feature_request",
        "cancellation",
        "general_question",
    ];
    let mut rows = Vec::new();
    for (intent, count) in intents.iter().zip(counts) {
        for _ in 0..count {
            let id = format!("m{}", rows.len());
            rows.push(TextRow::new(&id, "text", intent, "high"));
        }
    }
    // 4/40 = 10% low confidence is exactly the ceiling
    for row in rows.iter_mut().skip(20).take(4) {
        row.confidence = "low".to_string();
    }
    let text = fixture.write_text("texts.csv", &rows);

    // 10% area and 30% visibility are exactly on their minimums
    let visual = fixture.write_visual(
        "boxes.json",
        &single_image_document(&[
            (1, "packaging", [0.0, 0.0, 10.0, 100.0]),
            (2, "main_product", [70.0, 0.0, 100.0, 100.0]),
            (3, "background", [0.0, 0.0, 50.0, 100.0]),
        ]),
    );

    let report = run(&RunConfig::default().with_text(text).with_visual(visual)).unwrap();
    assert!(report.violations.is_empty(), "{:?}", report.violations);
}

#[test]
fn test_duplicate_id_reported_once() {
    let fixture = Fixture::new();
    let mut rows = balanced_rows(8);
    rows[10].message_id = "msg_000".to_string();
    rows[20].message_id = "msg_000".to_string();

    let report = run(&text_only(&fixture, &rows)).unwrap();

    assert_eq!(report.count(RuleId::DuplicateId), 1);
    let duplicate = report
        .violations
        .iter()
        .find(|v| v.rule_id == RuleId::DuplicateId)
        .unwrap();
    assert_eq!(duplicate.record, Subject::Message(RecordId::from("msg_000")));
    assert!(duplicate.message.contains("3 times"));
    assert_eq!(report.summary.approved_records, 37);
}

#[test]
fn test_every_row_sharing_an_id_is_rejected() {
    let fixture = Fixture::new();
    let mut rows = balanced_rows(8);
    rows[10].message_id = "msg_000".to_string();

    let report = run(&text_only(&fixture, &rows)).unwrap();

    assert_eq!(report.violations.len(), 1, "{:?}", report.violations);
    assert_eq!(report.summary.total_records, 40);
    assert_eq!(report.summary.approved_records, 38);
    assert_eq!(report.summary.approval_rate, 0.95);
}

#[test]
fn test_every_box_sharing_an_id_is_rejected() {
    let fixture = Fixture::new();
    let visual = fixture.write_visual(
        "boxes.json",
        &single_image_document(&[
            (5, "main_product", [0.0, 0.0, 5.0, 5.0]),
            (5, "main_product", [50.0, 50.0, 5.0, 5.0]),
            (6, "main_product", [0.0, 0.0, 50.0, 50.0]),
        ]),
    );

    let report = run(&RunConfig::default().with_visual(visual)).unwrap();

    assert_eq!(report.count(RuleId::BoxTooSmall), 2);
    assert_eq!(report.count(RuleId::DuplicateId), 1);
    assert_eq!(report.summary.total_records, 3);
    assert_eq!(report.summary.approved_records, 1);
}

#[test]
fn test_report_counts_labels() {
    let fixture = Fixture::new();
    let mut rows = balanced_rows(8);
    rows[0].intent = "refund".to_string();
    rows[1].confidence = "low".to_string();
    rows[2].confidence = "Medium".to_string();
    let text = fixture.write_text("texts.csv", &rows);
    let visual = fixture.write_visual(
        "boxes.json",
        &single_image_document(&[
            (1, "main_product", [0.0, 0.0, 50.0, 50.0]),
            (2, "main_product", [50.0, 50.0, 50.0, 50.0]),
            (3, "shelf", [0.0, 50.0, 50.0, 50.0]),
        ]),
    );

    let report = run(&RunConfig::default().with_text(text).with_visual(visual)).unwrap();
    let inputs = &report.inputs;

    assert_eq!(inputs.intents.get("billing_inquiry"), Some(&7));
    assert_eq!(inputs.intents.get("refund"), Some(&1));
    assert_eq!(inputs.intents.get("cancellation"), Some(&8));
    assert_eq!(inputs.intents.values().sum::<usize>(), 40);
    assert_eq!(inputs.confidence.get("high"), Some(&38));
    assert_eq!(inputs.confidence.get("medium"), Some(&1));
    assert_eq!(inputs.confidence.get("low"), Some(&1));
    assert_eq!(inputs.categories.get("main_product"), Some(&2));
    assert_eq!(inputs.categories.get("background"), Some(&0));
    assert_eq!(inputs.categories.get("shelf"), Some(&1));
}

#[test]
fn test_directory_with_config_file_still_discovers_dataset() {
    let fixture = Fixture::new();
    fixture.write_visual(
        "boxes.json",
        &single_image_document(&[(1, "main_product", [0.0, 0.0, 50.0, 50.0])]),
    );
    fixture.write_raw(".annocheck.yaml", "rules:\n  min_box_area: 0.1\n");

    let report = run(&RunConfig::default().with_directory(fixture.path())).unwrap();

    assert_eq!(report.inputs.visual_file, Some(fixture.path().join("boxes.json").display().to_string()));
    assert!(report.passed());
}

#[test]
fn test_report_is_idempotent() {
    let fixture = Fixture::new();
    let mut rows = balanced_rows(8);
    rows[0].intent = "refund".to_string();
    rows[1].text = "   ".to_string();
    let text = fixture.write_text("texts.csv", &rows);
    let visual = fixture.write_visual(
        "boxes.json",
        &single_image_document(&[
            (1, "main_product", [0.0, 0.0, 5.0, 5.0]),
            (2, "shelf", [90.0, 90.0, 50.0, 50.0]),
        ]),
    );
    let config = RunConfig::default().with_text(&text).with_visual(&visual);

    let first = serde_json::to_string(&run(&config).unwrap()).unwrap();
    let second = serde_json::to_string(&run(&config).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_directory_discovery_runs_both_validators() {
    let fixture = Fixture::new();
    fixture.write_text("annotated_texts.csv", &balanced_rows(8));
    fixture.write_raw(
        "_annotations.coco.yaml",
        "images:\n  - {id: 1, width: 100, height: 100}\n  - {id: 2, width: 100, height: 100}\n\
         categories:\n  - {id: 0, name: main_product}\n\
         annotations:\n  - {id: 7, image_id: 1, category_id: 0, bbox: [10, 10, 50, 50]}\n",
    );
    fixture.write_raw("notes.txt", "not an input");

    let report = run(&RunConfig::default().with_directory(fixture.path())).unwrap();

    assert_eq!(report.inputs.text_records, 40);
    assert_eq!(report.inputs.images, 2);
    assert_eq!(report.inputs.annotations, 1);
    assert_eq!(report.summary.total_records, 41);
    let rules: Vec<RuleId> = report.violations.iter().map(|v| v.rule_id).collect();
    assert_eq!(rules, vec![RuleId::ImageUnannotated]);
    assert_eq!(report.violations[0].record, Subject::Image(RecordId::Int(2)));
    assert!(report.passed());
}

#[test]
fn test_custom_thresholds_change_outcome() {
    let fixture = Fixture::new();
    let config = text_only(&fixture, &balanced_rows(8));
    let strict = RunConfig {
        rules: ValidatorConfig {
            balance_band: BalanceBand { min: 0.21, max: 0.3 },
            ..ValidatorConfig::default()
        },
        ..config.clone()
    };

    assert!(run(&config).unwrap().violations.is_empty());
    assert_eq!(run(&strict).unwrap().count(RuleId::ClassImbalance), 1);
}

#[test]
fn test_missing_column_aborts_without_report() {
    let fixture = Fixture::new();
    let text = fixture.write_raw("texts.csv", "message_id,text,confidence\nm1,hello,high\n");
    let visual = fixture.write_visual(
        "boxes.json",
        &single_image_document(&[(1, "main_product", [0.0, 0.0, 50.0, 50.0])]),
    );

    let error = run(&RunConfig::default().with_text(text).with_visual(visual)).unwrap_err();
    assert!(matches!(error, Error::Schema { ref field, .. } if field == "intent"));
    assert_eq!(error.exit_code(), 3);
}

#[test]
fn test_unknown_image_reference_is_fatal() {
    let fixture = Fixture::new();
    let visual = fixture.write_visual(
        "boxes.json",
        &json!({
            "images": [{"id": 1, "width": 100, "height": 100}],
            "annotations": [{"id": 1, "image_id": 42, "category": "packaging", "bbox": [0, 0, 50, 50]}]
        }),
    );

    let error = run(&RunConfig::default().with_visual(&visual)).unwrap_err();
    assert!(matches!(error, Error::Reference { .. }));
    assert_eq!(error.exit_code(), 5);
    assert_eq!(error.path(), Some(visual.as_path()));
}

#[test]
fn test_inputs_are_not_modified() {
    let fixture = Fixture::new();
    let mut rows = balanced_rows(8);
    rows[0].intent = "refund".to_string();
    let text = fixture.write_text("texts.csv", &rows);
    let before = std::fs::read(&text).unwrap();

    run(&RunConfig::default().with_text(&text)).unwrap();

    assert_eq!(std::fs::read(&text).unwrap(), before);
}
