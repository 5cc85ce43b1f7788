//! End-to-end edit sessions driven through the public controller API

use docedit_core::{
    Completion, EditDocumentController, EditorConfig, FieldId, FileCandidate, FormFields,
    PreviewSource, SelectionKind, TagAddition, WizardStep,
};
use docedit_core::testing::create_test_pdf;
use pretty_assertions::assert_eq;

fn page_fields(title: &str, pages: &str) -> FormFields {
    FormFields {
        title: title.into(),
        product_code: "PC-100".into(),
        publish_year: "2024".into(),
        no_of_pages: pages.into(),
        ..Default::default()
    }
}

fn untagged_document() -> EditorConfig {
    EditorConfig {
        document_id: 5,
        original_file_name: "a.pdf".into(),
        available_tags: vec!["legal".into()],
        ..Default::default()
    }
}

#[test]
fn add_tag_review_then_remove_restores_clean_state() {
    let mut controller =
        EditDocumentController::new(untagged_document(), page_fields("A", "10"), 2026);
    assert!(!controller.is_dirty());

    assert_eq!(
        controller.add_tag("draft"),
        Ok(TagAddition::Created("draft".into()))
    );

    while controller.step() != WizardStep::Review {
        controller.advance().unwrap();
    }

    let review = controller.review();
    assert_eq!(review.tags.chips.len(), 1);
    assert_eq!(review.tags.chips[0].name, "draft");
    assert!(review.tags.chips[0].is_new);
    assert_eq!(review.classifications.empty_label, Some("No classifications selected"));
    assert!(controller.is_dirty());

    assert!(controller.remove(SelectionKind::Tag, "draft"));
    assert!(!controller.is_dirty());
}

#[test]
fn replacement_file_flows_into_review_and_submission() {
    let mut controller =
        EditDocumentController::new(untagged_document(), page_fields("A", "10"), 2026);

    let ticket = controller
        .select_file(FileCandidate::new("b.pdf", "application/pdf", 2048))
        .unwrap();
    let bytes = create_test_pdf(12, Some("Bravo"));
    assert_eq!(controller.inspect_file(ticket, &bytes), Ok(Completion::Finalized));
    assert_eq!(controller.fields().get(FieldId::NoOfPages), "12");
    assert_eq!(controller.fields().get(FieldId::Title), "Bravo");

    while controller.step() != WizardStep::Review {
        controller.advance().unwrap();
    }
    let review = controller.review();
    assert!(review.file_name.changed);
    assert_eq!(review.file_size, "2 KB");
    assert!(review.pages.changed);
    assert!(review.title.changed);
    assert_eq!(
        review.preview,
        PreviewSource::Replacement {
            generation: ticket.generation(),
            scale: 1.2
        }
    );

    let plan = controller.prepare_submission().unwrap();
    assert_eq!(plan.action, "/document/edit/5");
    assert_eq!(plan.update.no_of_pages, "12");
    assert_eq!(plan.update.file_name.as_deref(), Some("b.pdf"));
}

#[test]
fn rapid_file_swaps_apply_only_the_latest() {
    let mut controller =
        EditDocumentController::new(untagged_document(), page_fields("A", "10"), 2026);

    let first = controller
        .select_file(FileCandidate::new("first.pdf", "application/pdf", 10))
        .unwrap();
    let second = controller
        .select_file(FileCandidate::new("second.pdf", "application/pdf", 10))
        .unwrap();

    // The second inspection finishes first
    controller
        .inspect_file(second, &create_test_pdf(2, None))
        .unwrap();
    assert!(controller.inspect_file(first, &create_test_pdf(8, None)).is_err());

    assert_eq!(controller.fields().get(FieldId::NoOfPages), "2");
    assert_eq!(controller.fields().get(FieldId::Title), "second");
}
