//! The edit-document controller
//!
//! [`EditDocumentController`] owns every piece of page state: the field
//! values, the wizard step, both selections, the replacement pipeline and the
//! navigation guard. The browser shell forwards events to it, re-renders from
//! [`EditDocumentController::page_view`] and drains
//! [`EditDocumentController::take_effects`].

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{parse_publish_date, EditorConfig, EditorSettings};
use crate::effects::{Effect, Notice, NoticeKind, ALREADY_EXISTS, ALREADY_EXISTS_MESSAGE};
use crate::error::{EditorError, FileAcceptanceError, ValidationError};
use crate::fields::{FieldId, FormFields};
use crate::guard::{ExitAttempt, GuardDecision, NavigationGuard, NavigationTarget};
use crate::pdf::{inspect, InspectionOutcome, LopdfBackend, PdfBackend};
use crate::review::{build_review, ReviewInput, ReviewView};
use crate::selection::{OptionView, SelectionKind, SelectionManager, SelectionView, TagAddition};
use crate::snapshot::FormSnapshot;
use crate::submission::{DocumentUpdate, SubmissionPlan};
use crate::upload::{
    finalize, Completion, FileCandidate, FileSummary, InspectionTicket, PagesInfo,
    ReplacementPipeline,
};
use crate::wizard::{Wizard, WizardStep, WizardView};

/// State of the file step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadView {
    /// Card describing the stored document
    pub show_current_file: bool,
    pub show_drop_zone: bool,
    pub inspecting: bool,
    /// Card describing the accepted replacement
    pub summary: Option<FileSummary>,
    pub pages_info: PagesInfo,
    pub title_changed: bool,
    pub pages_changed: bool,
}

/// Everything the page renders outside the review step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub wizard: WizardView,
    pub tags: SelectionView,
    pub classifications: SelectionView,
    pub tag_options: Vec<OptionView>,
    pub classification_options: Vec<OptionView>,
    pub upload: UploadView,
}

pub struct EditDocumentController {
    document_id: u64,
    original_file_name: String,
    settings: EditorSettings,
    year_options: Vec<i32>,
    fields: FormFields,
    snapshot: FormSnapshot,
    wizard: Wizard,
    tags: SelectionManager,
    classifications: SelectionManager,
    pipeline: ReplacementPipeline,
    /// A replacement was picked; the stored-document card is hidden
    choosing_file: bool,
    summary: Option<FileSummary>,
    pages_info: PagesInfo,
    title_changed: bool,
    pages_changed: bool,
    guard: NavigationGuard,
    form_changed: bool,
    effects: Vec<Effect>,
}

impl EditDocumentController {
    /// Initialize from the host page and capture the baseline snapshot.
    ///
    /// `initial_fields` are the values the server rendered into the form. The
    /// publish month/year are overwritten from the configured publish date;
    /// a year the year select does not offer stays blank.
    pub fn new(config: EditorConfig, initial_fields: FormFields, current_year: i32) -> Self {
        info!(
            document_id = config.document_id,
            tags = %config.existing_tags,
            classifications = %config.existing_classifications,
            publish_date = %config.publish_date,
            "initializing edit page"
        );

        let settings = config.settings.clone();
        let year_options = settings.year_options(current_year);

        let mut fields = initial_fields;
        if let Some(date) = parse_publish_date(&config.publish_date) {
            fields.publish_month = date.month;
            fields.publish_year = match date.year.parse::<i32>() {
                Ok(year) if year_options.contains(&year) => date.year,
                _ => {
                    warn!(year = %date.year, "publish year outside selectable range");
                    String::new()
                }
            };
        }

        let tags = SelectionManager::new(
            SelectionKind::Tag,
            config.available_tags.clone(),
            config.existing_tag_names(),
        );
        let classifications = SelectionManager::new(
            SelectionKind::Classification,
            config.available_classifications.clone(),
            config.existing_classification_names(),
        );

        let snapshot = FormSnapshot::capture(
            &fields,
            tags.selected().as_slice(),
            classifications.selected().as_slice(),
            &config.original_file_name,
        );

        Self {
            document_id: config.document_id,
            original_file_name: config.original_file_name,
            settings,
            year_options,
            fields,
            snapshot,
            wizard: Wizard::new(),
            tags,
            classifications,
            pipeline: ReplacementPipeline::new(),
            choosing_file: false,
            summary: None,
            pages_info: PagesInfo::default_hint(),
            title_changed: false,
            pages_changed: false,
            guard: NavigationGuard::new(),
            form_changed: false,
            effects: Vec::new(),
        }
    }

    pub fn document_id(&self) -> u64 {
        self.document_id
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn year_options(&self) -> &[i32] {
        &self.year_options
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    pub fn tags(&self) -> &SelectionManager {
        &self.tags
    }

    pub fn classifications(&self) -> &SelectionManager {
        &self.classifications
    }

    pub fn pipeline(&self) -> &ReplacementPipeline {
        &self.pipeline
    }

    /// Record an edit typed into one of the form inputs
    pub fn set_field(&mut self, field: FieldId, value: impl Into<String>) {
        self.fields.set(field, value);
        self.form_changed = true;
    }

    /// Authoritative dirty check against the snapshot
    pub fn is_dirty(&self) -> bool {
        self.snapshot.differs(
            &self.fields,
            self.tags.selected().as_slice(),
            self.classifications.selected().as_slice(),
            self.pipeline.file_replaced(),
        )
    }

    /// Eager flag set on every edit, cleared on confirmed exit or submit
    pub fn form_changed(&self) -> bool {
        self.form_changed
    }

    /// Drain queued effects in the order they were produced
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn alert(&mut self, code: &'static str, message: String) {
        self.effects.push(Effect::Notice(Notice {
            kind: NoticeKind::Alert,
            code,
            message,
            dismiss_after_ms: self.settings.alert_dismiss_ms,
        }));
    }

    fn tag_notice(&mut self, kind: NoticeKind, code: &'static str, message: String) {
        self.effects.push(Effect::Notice(Notice {
            kind,
            code,
            message,
            dismiss_after_ms: self.settings.tag_notice_dismiss_ms,
        }));
    }

    // Wizard

    pub fn advance(&mut self) -> Result<Option<WizardStep>, ValidationError> {
        self.wizard.advance(&self.fields).inspect_err(|e| {
            debug!(code = e.code(), "step validation failed");
            self.alert(e.code(), e.to_string());
        })
    }

    pub fn retreat(&mut self) -> Option<WizardStep> {
        self.wizard.retreat()
    }

    // Selections

    fn manager_mut(&mut self, kind: SelectionKind) -> &mut SelectionManager {
        match kind {
            SelectionKind::Tag => &mut self.tags,
            SelectionKind::Classification => &mut self.classifications,
        }
    }

    /// Flip an option. Unknown names are ignored.
    pub fn toggle(&mut self, kind: SelectionKind, name: &str) -> Option<bool> {
        let selected = self.manager_mut(kind).toggle(name)?;
        self.form_changed = true;
        Some(selected)
    }

    /// Remove a chip by name
    pub fn remove(&mut self, kind: SelectionKind, name: &str) -> bool {
        let removed = self.manager_mut(kind).remove(name);
        self.form_changed = true;
        removed
    }

    /// Free-text tag entry
    pub fn add_tag(&mut self, raw_input: &str) -> Result<TagAddition, ValidationError> {
        match self.tags.add_new(raw_input) {
            Ok(TagAddition::Created(name)) => {
                info!(%name, "tag created");
                self.effects.push(Effect::ClearTagInput);
                self.form_changed = true;
                Ok(TagAddition::Created(name))
            }
            Ok(TagAddition::Reused(name)) => {
                self.effects.push(Effect::Blink {
                    kind: SelectionKind::Tag,
                    name: name.clone(),
                    duration_ms: self.settings.blink_ms,
                });
                self.tag_notice(
                    NoticeKind::TagInfo,
                    ALREADY_EXISTS,
                    ALREADY_EXISTS_MESSAGE.to_string(),
                );
                self.effects.push(Effect::ClearTagInput);
                self.form_changed = true;
                Ok(TagAddition::Reused(name))
            }
            Err(e @ ValidationError::AlreadySelected) => {
                self.tag_notice(NoticeKind::TagInfo, e.code(), e.to_string());
                self.effects.push(Effect::ClearTagInput);
                Err(e)
            }
            Err(e) => {
                self.tag_notice(NoticeKind::TagError, e.code(), e.to_string());
                Err(e)
            }
        }
    }

    // File replacement

    /// Gate a newly picked or dropped file
    pub fn select_file(
        &mut self,
        candidate: FileCandidate,
    ) -> Result<InspectionTicket, FileAcceptanceError> {
        self.choosing_file = true;
        let had_replacement = self.pipeline.file_replaced();
        let selected = self.pipeline.select(candidate, self.settings.max_upload_bytes);
        if had_replacement {
            self.restore_stored_values();
        }
        match selected {
            Ok(ticket) => Ok(ticket),
            Err(e) => {
                self.alert(e.code(), e.to_string());
                self.effects.push(Effect::ClearFileInput);
                Err(e)
            }
        }
    }

    /// Inspect the bytes of the file `ticket` was issued for with lopdf
    pub fn inspect_file(
        &mut self,
        ticket: InspectionTicket,
        bytes: &[u8],
    ) -> Result<Completion, EditorError> {
        self.inspect_with(&LopdfBackend, ticket, bytes)
    }

    pub fn inspect_with<B: PdfBackend>(
        &mut self,
        backend: &B,
        ticket: InspectionTicket,
        bytes: &[u8],
    ) -> Result<Completion, EditorError> {
        if ticket.generation() != self.pipeline.current_generation() {
            return Err(EditorError::StaleInspection {
                ticket: ticket.generation(),
                current: self.pipeline.current_generation(),
            });
        }
        let outcome = inspect(backend, bytes);
        self.complete_inspection(ticket, outcome)
    }

    /// Apply an inspection outcome produced elsewhere
    pub fn complete_inspection(
        &mut self,
        ticket: InspectionTicket,
        outcome: InspectionOutcome,
    ) -> Result<Completion, EditorError> {
        let completion = self.pipeline.complete(ticket, outcome)?;
        match &completion {
            Completion::NeedsAcknowledgement(restrictions) => {
                self.effects.push(Effect::ShowProtectionPrompt {
                    restrictions: restrictions.clone(),
                });
            }
            Completion::Finalized => self.apply_uploaded_file(),
        }
        Ok(completion)
    }

    /// Upload a restricted file anyway
    pub fn force_upload(&mut self) -> Result<(), EditorError> {
        self.pipeline.acknowledge()?;
        self.effects.push(Effect::HideProtectionPrompt);
        self.apply_uploaded_file();
        Ok(())
    }

    /// Decline the restriction prompt. The file input is emptied, so no
    /// replacement survives.
    pub fn cancel_protected(&mut self) {
        info!("restricted file declined");
        let had_replacement = self.pipeline.file_replaced();
        self.pipeline.discard();
        if had_replacement {
            self.restore_stored_values();
        }
        self.effects.push(Effect::ClearFileInput);
        self.effects.push(Effect::HideProtectionPrompt);
    }

    /// Drop the replacement and restore the stored document's values
    pub fn change_file(&mut self) {
        info!("replacement file discarded");
        self.pipeline.discard();
        self.choosing_file = false;
        self.restore_stored_values();
        self.effects.push(Effect::ClearFileInput);
    }

    /// Put title, page count and the file card back to the stored document
    fn restore_stored_values(&mut self) {
        self.summary = None;
        self.title_changed = false;
        self.pages_changed = false;
        self.pages_info = PagesInfo::default_hint();

        let title = self.snapshot.fields.title.clone();
        let pages = self.snapshot.fields.no_of_pages.clone();
        self.write_field(FieldId::Title, title);
        self.write_field(FieldId::NoOfPages, pages);
    }

    fn write_field(&mut self, field: FieldId, value: String) {
        self.fields.set(field, value.clone());
        self.effects.push(Effect::SetField { field, value });
    }

    fn apply_uploaded_file(&mut self) {
        let Some(file) = self.pipeline.uploaded() else {
            return;
        };
        let result = finalize(
            file,
            &self.snapshot.fields.title,
            &self.snapshot.fields.no_of_pages,
        );
        info!(
            name = %result.summary.name,
            pages = ?result.page_count,
            title = %result.title,
            "replacement file applied"
        );

        if let Some(count) = result.page_count {
            self.write_field(FieldId::NoOfPages, count.to_string());
        }
        self.write_field(FieldId::Title, result.title);
        self.pages_changed = result.pages_changed;
        self.title_changed = result.title_changed;
        self.pages_info = result.pages_info;
        self.summary = Some(result.summary);
        self.form_changed = true;
    }

    // Rendering

    fn selection_views(&self) -> (SelectionView, SelectionView) {
        (
            self.tags.view(&self.snapshot.tags),
            self.classifications.view(&self.snapshot.classifications),
        )
    }

    pub fn upload_view(&self) -> UploadView {
        let replaced = self.summary.is_some();
        UploadView {
            show_current_file: !self.choosing_file,
            show_drop_zone: self.choosing_file && !replaced,
            inspecting: self.pipeline.is_inspecting(),
            summary: self.summary.clone(),
            pages_info: self.pages_info.clone(),
            title_changed: self.title_changed,
            pages_changed: self.pages_changed,
        }
    }

    pub fn page_view(&self) -> PageView {
        let (tags, classifications) = self.selection_views();
        PageView {
            wizard: self.wizard.view(),
            tags,
            classifications,
            tag_options: self.tags.options().to_vec(),
            classification_options: self.classifications.options().to_vec(),
            upload: self.upload_view(),
        }
    }

    pub fn review(&self) -> ReviewView {
        let (tags, classifications) = self.selection_views();
        build_review(
            &self.snapshot,
            ReviewInput {
                fields: &self.fields,
                uploaded: self.pipeline.uploaded(),
                tags,
                classifications,
                document_id: self.document_id,
                original_file_name: &self.original_file_name,
                view_url: self.settings.view_url(self.document_id),
                preview_scale: self.settings.preview_scale,
                notes_preview_chars: self.settings.notes_preview_chars,
            },
        )
    }

    // Navigation

    /// Route an exit attempt through the guard
    pub fn request_exit(&mut self, attempt: ExitAttempt) -> GuardDecision {
        let decision = self.guard.intercept(attempt, self.is_dirty());
        if let GuardDecision::Prompt(_) = decision {
            self.effects.push(Effect::ShowNavigationPrompt);
        }
        decision
    }

    /// The page's back button. `has_referrer` is true when history has
    /// somewhere other than this page to return to.
    pub fn go_back(&mut self, has_referrer: bool) -> GuardDecision {
        let target = if has_referrer {
            NavigationTarget::Back
        } else {
            NavigationTarget::Url(self.settings.documents_url.clone())
        };
        self.leave(target)
    }

    /// The cancel button
    pub fn cancel(&mut self) -> GuardDecision {
        self.leave(NavigationTarget::Url(self.settings.documents_url.clone()))
    }

    fn leave(&mut self, target: NavigationTarget) -> GuardDecision {
        let decision = self.request_exit(ExitAttempt::Leave(target.clone()));
        if decision == GuardDecision::Allow {
            self.effects.push(Effect::Navigate { target });
        }
        decision
    }

    pub fn confirm_navigation(&mut self) -> Option<NavigationTarget> {
        let target = self.guard.confirm()?;
        self.form_changed = false;
        self.effects.push(Effect::HideNavigationPrompt);
        self.effects.push(Effect::Navigate {
            target: target.clone(),
        });
        Some(target)
    }

    pub fn decline_navigation(&mut self) {
        self.guard.decline();
        self.effects.push(Effect::HideNavigationPrompt);
    }

    pub fn navigation_guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Validate the edit form on submit. On success the guard stands down.
    pub fn prepare_submission(&mut self) -> Result<SubmissionPlan, ValidationError> {
        let update = DocumentUpdate::build(
            &self.fields,
            self.tags.selected(),
            self.classifications.selected(),
            self.pipeline.uploaded().map(|f| f.candidate.name.as_str()),
        );
        match update {
            Ok(update) => {
                self.guard.begin_submit();
                self.form_changed = false;
                Ok(SubmissionPlan::new(
                    self.settings.edit_url(self.document_id),
                    update,
                ))
            }
            Err(e) => {
                self.alert(e.code(), e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::tests::FakeBackend;
    use crate::testing::create_test_pdf;
    use crate::pdf::{PdfInspection, Restriction};
    use crate::review::PreviewSource;
    use crate::upload::{Tone, PDF_MIME_TYPE};
    use pretty_assertions::assert_eq;

    fn config() -> EditorConfig {
        EditorConfig {
            document_id: 42,
            original_file_name: "manual.pdf".into(),
            existing_tags: "safety,hr".into(),
            existing_classifications: "Internal".into(),
            publish_date: "2021-03".into(),
            available_tags: vec!["safety".into(), "hr".into(), "finance".into()],
            available_classifications: vec!["Internal".into(), "Public".into()],
            settings: EditorSettings::default(),
        }
    }

    fn initial_fields() -> FormFields {
        FormFields {
            title: "Manual".into(),
            product_code: "M-1".into(),
            no_of_pages: "10".into(),
            ..Default::default()
        }
    }

    fn controller() -> EditDocumentController {
        EditDocumentController::new(config(), initial_fields(), 2026)
    }

    fn pdf_file(name: &str) -> FileCandidate {
        FileCandidate::new(name, PDF_MIME_TYPE, 4096)
    }

    #[test]
    fn test_initialization() {
        let c = controller();
        assert_eq!(c.fields().publish_month, "03");
        assert_eq!(c.fields().publish_year, "2021");
        assert_eq!(c.tags().selected().as_slice(), ["safety", "hr"]);
        assert_eq!(c.snapshot().classifications, vec!["Internal".to_string()]);
        assert_eq!(c.year_options().first(), Some(&2026));
        assert_eq!(c.year_options().last(), Some(&1900));
        assert!(!c.is_dirty());
        assert!(!c.form_changed());
    }

    #[test]
    fn test_out_of_range_publish_year_stays_blank() {
        let mut cfg = config();
        cfg.publish_date = "1850-06".into();
        let c = EditDocumentController::new(cfg, initial_fields(), 2026);
        assert_eq!(c.fields().publish_month, "06");
        assert_eq!(c.fields().publish_year, "");
    }

    #[test]
    fn test_field_edit_and_restore() {
        let mut c = controller();
        c.set_field(FieldId::Notes, "hello");
        assert!(c.is_dirty());
        c.set_field(FieldId::Notes, "");
        assert!(!c.is_dirty());
        assert!(c.form_changed());
    }

    #[test]
    fn test_advance_failure_raises_alert() {
        let mut c = controller();
        c.advance().unwrap();
        c.set_field(FieldId::ProductCode, " ");
        assert_eq!(
            c.advance(),
            Err(ValidationError::MissingRequired(FieldId::ProductCode))
        );
        assert_eq!(c.step(), WizardStep::Metadata);
        match c.take_effects().as_slice() {
            [Effect::Notice(notice)] => {
                assert_eq!(notice.kind, NoticeKind::Alert);
                assert_eq!(notice.message, "Product Code is required.");
                assert_eq!(notice.dismiss_after_ms, 3000);
            }
            other => panic!("unexpected effects {:?}", other),
        }
    }

    #[test]
    fn test_add_tag_paths() {
        let mut c = controller();

        assert_eq!(c.add_tag("  "), Err(ValidationError::EmptyTag));
        assert_eq!(
            c.take_effects(),
            vec![Effect::Notice(Notice {
                kind: NoticeKind::TagError,
                code: "empty",
                message: "Please enter a tag name".into(),
                dismiss_after_ms: 3000,
            })]
        );

        assert_eq!(c.add_tag("Finance"), Ok(TagAddition::Reused("finance".into())));
        let effects = c.take_effects();
        assert!(matches!(&effects[0], Effect::Blink { name, duration_ms: 1800, .. } if name == "finance"));
        assert!(effects.contains(&Effect::ClearTagInput));

        assert_eq!(c.add_tag("SAFETY"), Err(ValidationError::AlreadySelected));
        assert!(c.take_effects().contains(&Effect::ClearTagInput));

        assert_eq!(c.add_tag("Draft"), Ok(TagAddition::Created("draft".into())));
        assert_eq!(
            c.tags().selected().as_slice(),
            ["safety", "hr", "finance", "draft"]
        );
        assert!(c.is_dirty());
    }

    #[test]
    fn test_toggle_and_remove_classification() {
        let mut c = controller();
        assert_eq!(c.toggle(SelectionKind::Classification, "Public"), Some(true));
        assert!(c.is_dirty());
        assert!(c.remove(SelectionKind::Classification, "Public"));
        assert!(!c.is_dirty());
        assert_eq!(c.toggle(SelectionKind::Classification, "Missing"), None);
    }

    #[test]
    fn test_rejected_file_alerts_and_clears_input() {
        let mut c = controller();
        let err = c
            .select_file(FileCandidate::new("a.docx", "application/msword", 10))
            .unwrap_err();
        assert_eq!(err.code(), "notPdf");
        let effects = c.take_effects();
        assert!(effects.contains(&Effect::ClearFileInput));
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_readable_replacement_updates_fields() {
        let mut c = controller();
        let ticket = c.select_file(pdf_file("revised.pdf")).unwrap();
        let bytes = create_test_pdf(3, Some("Revised Manual"));
        assert_eq!(c.inspect_file(ticket, &bytes), Ok(Completion::Finalized));

        assert_eq!(c.fields().no_of_pages, "3");
        assert_eq!(c.fields().title, "Revised Manual");
        let upload = c.upload_view();
        assert!(upload.pages_changed && upload.title_changed);
        assert_eq!(upload.pages_info.tone, Tone::Warning);
        assert!(!upload.show_current_file && !upload.show_drop_zone);
        assert_eq!(upload.summary.unwrap().pages_label, "3 pages");
        assert!(c.is_dirty());

        let effects = c.take_effects();
        assert!(effects.contains(&Effect::SetField {
            field: FieldId::Title,
            value: "Revised Manual".into()
        }));
    }

    #[test]
    fn test_stale_inspection_is_ignored() {
        let mut c = controller();
        let first = c.select_file(pdf_file("first.pdf")).unwrap();
        let second = c.select_file(pdf_file("second.pdf")).unwrap();
        let bytes = create_test_pdf(2, None);

        assert!(matches!(
            c.inspect_file(first, &bytes),
            Err(EditorError::StaleInspection { .. })
        ));
        assert_eq!(c.fields().title, "Manual");

        c.inspect_file(second, &bytes).unwrap();
        assert_eq!(c.fields().title, "second");
    }

    #[test]
    fn test_restricted_file_force_upload() {
        let mut c = controller();
        let ticket = c.select_file(pdf_file("locked.pdf")).unwrap();
        let backend = FakeBackend::restricted(0);
        let completion = c.inspect_with(&backend, ticket, b"%PDF-").unwrap();
        assert!(matches!(completion, Completion::NeedsAcknowledgement(_)));
        assert!(c
            .take_effects()
            .iter()
            .any(|e| matches!(e, Effect::ShowProtectionPrompt { .. })));
        assert!(!c.is_dirty());

        c.force_upload().unwrap();
        assert_eq!(c.fields().no_of_pages, "10");
        assert_eq!(c.fields().title, "locked");
        assert_eq!(
            c.upload_view().summary.unwrap().pages_label,
            "Manual entry required"
        );
        assert!(matches!(
            c.review().preview,
            PreviewSource::Placeholder {
                note: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_protected_keeps_state() {
        let mut c = controller();
        let ticket = c.select_file(pdf_file("locked.pdf")).unwrap();
        c.complete_inspection(
            ticket,
            InspectionOutcome::Restricted(PdfInspection {
                encrypted: true,
                restrictions: vec![Restriction::PasswordProtected],
                page_count: Some(1),
                title: None,
            }),
        )
        .unwrap();
        c.cancel_protected();
        assert!(!c.pipeline().file_replaced());
        assert!(!c.is_dirty());
        assert_eq!(c.force_upload(), Err(EditorError::NoPendingFile));
    }

    #[test]
    fn test_change_file_restores_snapshot_values() {
        let mut c = controller();
        let ticket = c.select_file(pdf_file("other.pdf")).unwrap();
        c.inspect_file(ticket, &create_test_pdf(5, None)).unwrap();
        assert!(c.is_dirty());

        c.change_file();
        assert_eq!(c.fields().title, "Manual");
        assert_eq!(c.fields().no_of_pages, "10");
        let upload = c.upload_view();
        assert!(upload.show_current_file);
        assert_eq!(upload.pages_info, PagesInfo::default_hint());
        assert!(!upload.title_changed && !upload.pages_changed);
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_rejected_second_file_drops_first_replacement() {
        let mut c = controller();
        let ticket = c.select_file(pdf_file("alpha.pdf")).unwrap();
        c.inspect_file(ticket, &create_test_pdf(5, Some("Alpha"))).unwrap();
        assert_eq!(c.fields().title, "Alpha");
        c.take_effects();

        assert!(c
            .select_file(FileCandidate::new("beta.png", "image/png", 10))
            .is_err());
        assert!(c.take_effects().contains(&Effect::ClearFileInput));
        assert!(!c.pipeline().file_replaced());
        assert_eq!(c.fields().title, "Manual");
        assert_eq!(c.fields().no_of_pages, "10");
        assert!(c.upload_view().summary.is_none());
        assert!(!c.is_dirty());

        let review = c.review();
        assert_eq!(review.file_name.text, "manual.pdf");
        assert!(!review.file_name.changed);
        assert!(matches!(review.preview, PreviewSource::Original { .. }));
        let plan = c.prepare_submission().unwrap();
        assert_eq!(plan.update.file_name, None);
    }

    #[test]
    fn test_declined_second_file_drops_first_replacement() {
        let mut c = controller();
        let ticket = c.select_file(pdf_file("alpha.pdf")).unwrap();
        c.inspect_file(ticket, &create_test_pdf(5, None)).unwrap();

        let ticket = c.select_file(pdf_file("locked.pdf")).unwrap();
        assert!(c.pipeline().uploaded().is_none());
        c.inspect_with(&FakeBackend::restricted(0), ticket, b"%PDF-")
            .unwrap();
        c.cancel_protected();

        assert!(!c.pipeline().file_replaced());
        assert_eq!(c.fields().no_of_pages, "10");
        assert!(!c.is_dirty());
        assert!(c.prepare_submission().unwrap().update.file_name.is_none());
    }

    #[test]
    fn test_navigation_prompt_and_confirm() {
        let mut c = controller();
        c.set_field(FieldId::Edition, "2nd");
        let decision = c.request_exit(ExitAttempt::HistoryPop);
        assert_eq!(decision, GuardDecision::Prompt(NavigationTarget::Back));
        assert_eq!(c.take_effects(), vec![Effect::ShowNavigationPrompt]);

        assert_eq!(c.confirm_navigation(), Some(NavigationTarget::Back));
        assert!(!c.form_changed());
        assert_eq!(
            c.take_effects(),
            vec![
                Effect::HideNavigationPrompt,
                Effect::Navigate {
                    target: NavigationTarget::Back
                }
            ]
        );
    }

    #[test]
    fn test_clean_back_button_navigates_directly() {
        let mut c = controller();
        assert_eq!(c.go_back(false), GuardDecision::Allow);
        assert_eq!(
            c.take_effects(),
            vec![Effect::Navigate {
                target: NavigationTarget::Url("/documents".into())
            }]
        );
    }

    #[test]
    fn test_dirty_cancel_prompts() {
        let mut c = controller();
        c.toggle(SelectionKind::Tag, "finance");
        assert_eq!(
            c.cancel(),
            GuardDecision::Prompt(NavigationTarget::Url("/documents".into()))
        );
        c.decline_navigation();
        assert!(c.navigation_guard().pending().is_none());
        assert!(c.is_dirty());
    }

    #[test]
    fn test_submission() {
        let mut c = controller();
        c.set_field(FieldId::PublishYear, "");
        assert_eq!(
            c.prepare_submission().unwrap_err(),
            ValidationError::MissingRequired(FieldId::PublishYear)
        );
        c.set_field(FieldId::PublishYear, "2022");

        let plan = c.prepare_submission().unwrap();
        assert_eq!(plan.action, "/document/edit/42");
        assert_eq!(plan.update.tag_names, "safety,hr");
        assert_eq!(plan.update.publish_year, "2022");
        assert!(c.navigation_guard().is_submitting());
        assert_eq!(c.request_exit(ExitAttempt::Unload), GuardDecision::Allow);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn field_strategy() -> impl Strategy<Value = FieldId> {
            proptest::sample::select(FieldId::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn edit_then_restore_is_clean(field in field_strategy(), value in ".{0,20}") {
                let mut c = controller();
                let original = c.fields().get(field).to_string();
                c.set_field(field, value.clone());
                prop_assert_eq!(c.is_dirty(), value != original);
                c.set_field(field, original);
                prop_assert!(!c.is_dirty());
            }

            #[test]
            fn tag_toggle_twice_is_clean(tag in proptest::sample::select(vec!["safety", "hr", "finance"])) {
                let mut c = controller();
                c.toggle(SelectionKind::Tag, tag);
                prop_assert!(c.is_dirty());
                c.toggle(SelectionKind::Tag, tag);
                // Re-selecting a baseline tag appends it at the end
                let restored = c.tags().selected().as_slice() == c.snapshot().tags.as_slice();
                prop_assert_eq!(c.is_dirty(), !restored);
            }
        }
    }
}
