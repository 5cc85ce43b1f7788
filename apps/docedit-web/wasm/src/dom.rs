//! Projection of controller view models onto the server-rendered page
//!
//! This is the only module that looks up or mutates elements. Element ids and
//! class names are the ones the edit-document template renders.

use docedit_core::controller::UploadView;
use docedit_core::effects::{Notice, NoticeKind};
use docedit_core::review::{ReviewValue, ReviewView};
use docedit_core::selection::{OptionView, SelectionKind, SelectionView};
use docedit_core::upload::Tone;
use docedit_core::wizard::{IndicatorState, WizardView};
use docedit_core::submission::{hidden_field_id, SUBMIT_BUSY_LABEL};
use docedit_core::{FieldId, FormFields, PageView, SubmissionPlan};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, DragEvent, Element, Event, File, HtmlButtonElement, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

pub const EDIT_FORM: &str = "editForm";
pub const FILE_INPUT: &str = "fileInput";
pub const DROP_ZONE: &str = "dropZone";
pub const TAG_INPUT: &str = "newTagInput";
pub const REVIEW_CANVAS: &str = "reviewPdfCanvas";
pub const PROTECTION_MODAL: &str = "pdfProtectionModal";
pub const CONFIRMATION_MODAL: &str = "confirmationModal";
pub const CONFIRM_LEAVE_BUTTON: &str = "confirmCancelBtn";

const ALERT_STYLE: &str = "position: fixed; top: 20px; right: 20px; background: #ef4444; \
    color: white; padding: 16px 24px; border-radius: 8px; \
    box-shadow: 0 4px 12px rgba(0,0,0,0.3); z-index: 10000; \
    animation: slideInRight 0.3s ease; max-width: 400px; display: flex; \
    align-items: center; gap: 10px;";

const REVIEW_EMPTY_STYLE: &str = "color: #9ca3af; font-size: 14px;";

pub fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))
}

pub fn by_id<T: JsCast>(id: &str) -> Result<T, JsValue> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element #{} not found", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Element #{} has an unexpected type", id)))
}

fn query_all(selector: &str) -> Result<Vec<Element>, JsValue> {
    let nodes = document()?.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn create(tag: &str, class: &str) -> Result<Element, JsValue> {
    let element = document()?.create_element(tag)?;
    if !class.is_empty() {
        element.set_class_name(class);
    }
    Ok(element)
}

fn icon(class: &str) -> Result<Element, JsValue> {
    create("i", &format!("bi {}", class))
}

fn set_class(element: &Element, class: &str, on: bool) -> Result<(), JsValue> {
    element.class_list().toggle_with_force(class, on)?;
    Ok(())
}

fn set_display(id: &str, value: &str) -> Result<(), JsValue> {
    by_id::<HtmlElement>(id)?.style().set_property("display", value)
}

fn set_text(id: &str, text: &str) -> Result<(), JsValue> {
    by_id::<Element>(id)?.set_text_content(Some(text));
    Ok(())
}

/// Current value of an input, select or textarea
pub fn control_value(element: &Element) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        Some(input.value())
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        Some(select.value())
    } else {
        element.dyn_ref::<HtmlTextAreaElement>().map(|t| t.value())
    }
}

pub fn set_control_value(id: &str, value: &str) -> Result<(), JsValue> {
    let element: Element = by_id(id)?;
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        select.set_value(value);
    } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
        textarea.set_value(value);
    }
    Ok(())
}

/// Values the server rendered into the tracked inputs
pub fn read_fields() -> Result<FormFields, JsValue> {
    let mut fields = FormFields::default();
    for field in FieldId::ALL {
        let element: Element = by_id(field.as_str())?;
        fields.set(field, control_value(&element).unwrap_or_default());
    }
    Ok(fields)
}

pub fn write_fields(fields: &FormFields) -> Result<(), JsValue> {
    for field in FieldId::ALL {
        set_control_value(field.as_str(), fields.get(field))?;
    }
    Ok(())
}

pub fn populate_years(years: &[i32]) -> Result<(), JsValue> {
    let select: Element = by_id(FieldId::PublishYear.as_str())?;
    for year in years {
        let option = create("option", "")?;
        option.set_attribute("value", &year.to_string())?;
        option.set_text_content(Some(&year.to_string()));
        select.append_child(&option)?;
    }
    Ok(())
}

// Wizard

pub fn apply_wizard(view: &WizardView) -> Result<(), JsValue> {
    let active = view.active_step.to_string();
    for panel in query_all(".wizard-step-content")? {
        set_class(
            &panel,
            "active",
            panel.get_attribute("data-step").as_deref() == Some(active.as_str()),
        )?;
    }

    for item in query_all(".wizard-step")? {
        let state = item
            .get_attribute("data-step")
            .and_then(|s| s.parse::<u8>().ok())
            .and_then(|n| view.indicators.iter().find(|i| i.step == n))
            .map(|i| i.state);
        set_class(&item, "completed", state == Some(IndicatorState::Completed))?;
        set_class(&item, "active", state == Some(IndicatorState::Active))?;
    }

    let shown = |on: bool| if on { "inline-flex" } else { "none" };
    set_display("prevBtn", shown(view.show_previous))?;
    set_display("nextBtn", shown(view.show_next))?;
    set_display("submitBtn", shown(view.show_submit))?;
    Ok(())
}

// Selections

pub fn name_attribute(kind: SelectionKind) -> &'static str {
    match kind {
        SelectionKind::Tag => "data-tag-name",
        SelectionKind::Classification => "data-classification-name",
    }
}

fn selection_area(kind: SelectionKind) -> &'static str {
    match kind {
        SelectionKind::Tag => "tagsSelectionArea",
        SelectionKind::Classification => "classificationsSelectionArea",
    }
}

fn option_items(kind: SelectionKind) -> Result<Vec<Element>, JsValue> {
    query_all(&format!(".selection-item-flex[{}]", name_attribute(kind)))
}

fn find_option(kind: SelectionKind, name: &str) -> Result<Option<Element>, JsValue> {
    let attribute = name_attribute(kind);
    Ok(option_items(kind)?
        .into_iter()
        .find(|item| item.get_attribute(attribute).as_deref() == Some(name)))
}

fn new_option_item(kind: SelectionKind, name: &str) -> Result<Element, JsValue> {
    let item = create("div", "selection-item-flex")?;
    item.set_attribute(name_attribute(kind), name)?;

    let checkbox = create("input", &format!("selection-checkbox {}-checkbox", kind.as_str()))?;
    checkbox.set_attribute("type", "checkbox")?;
    checkbox.set_attribute(name_attribute(kind), name)?;
    checkbox.set_attribute("style", "display: none;")?;

    let label = create("span", "selection-label")?;
    label.set_text_content(Some(name));

    item.append_child(&checkbox)?;
    item.append_child(&label)?;
    Ok(item)
}

/// Mark options selected, adding items for options created this session
pub fn apply_options(kind: SelectionKind, options: &[OptionView]) -> Result<(), JsValue> {
    for option in options {
        let item = match find_option(kind, &option.name)? {
            Some(item) => item,
            None => {
                let area: Element = by_id(selection_area(kind))?;
                if let Some(empty) = area.query_selector(".empty-state")? {
                    empty.remove();
                }
                let item = new_option_item(kind, &option.name)?;
                area.append_child(&item)?;
                item
            }
        };
        set_class(&item, "selected", option.selected)?;
        if let Some(checkbox) = item
            .query_selector(&format!(".{}-checkbox", kind.as_str()))?
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        {
            checkbox.set_checked(option.selected);
        }
    }
    Ok(())
}

fn chip_class(kind: SelectionKind, is_new: bool) -> String {
    let mut class = String::from("selected-chip");
    if kind == SelectionKind::Classification {
        class.push_str(" classification-chip");
    }
    if is_new {
        class.push_str(" new-item");
    }
    class
}

/// Rebuild the chip strip and the hidden joined value
pub fn apply_selection(view: &SelectionView) -> Result<(), JsValue> {
    let (container_id, hidden_id) = match view.kind {
        SelectionKind::Tag => ("selectedTagsContainer", "tagNamesField"),
        SelectionKind::Classification => {
            ("selectedClassificationsContainer", "classificationNamesField")
        }
    };
    let container: Element = by_id(container_id)?;
    container.set_inner_html("");

    if let Some(label) = view.empty_label {
        let empty = create("div", "empty-state")?;
        empty.set_text_content(Some(label));
        container.append_child(&empty)?;
    }

    for chip in &view.chips {
        let element = create("span", &chip_class(view.kind, chip.is_new))?;
        element.append_child(&document()?.create_text_node(&chip.name))?;

        let remove = create("span", "chip-remove")?;
        remove.set_attribute("data-kind", view.kind.as_str())?;
        remove.set_attribute("data-name", &chip.name)?;
        remove.append_child(&icon("bi-x")?.into())?;
        element.append_child(&remove)?;

        container.append_child(&element)?;
    }

    set_control_value(hidden_id, &view.hidden_value)
}

pub fn blink(kind: SelectionKind, name: &str) -> Result<Option<Element>, JsValue> {
    let item = find_option(kind, name)?;
    if let Some(item) = &item {
        item.class_list().add_1("blink")?;
    }
    Ok(item)
}

pub fn end_blink(item: &Element) -> Result<(), JsValue> {
    item.class_list().remove_1("blink")
}

// Upload

pub fn apply_upload(view: &UploadView) -> Result<(), JsValue> {
    set_display(
        "currentFileInfo",
        if view.show_current_file { "block" } else { "none" },
    )?;

    let drop_zone: HtmlElement = by_id(DROP_ZONE)?;
    set_class(&drop_zone, "show", view.show_drop_zone)?;
    drop_zone.style().set_property(
        "display",
        if view.show_drop_zone || view.show_current_file { "" } else { "none" },
    )?;

    let uploaded: Element = by_id("fileUploadedMessage")?;
    set_class(&uploaded, "show", view.summary.is_some())?;
    if let Some(summary) = &view.summary {
        set_text("uploadedFileName", &summary.name)?;
        set_text("uploadedFileSize", &summary.size_label)?;
        set_text("uploadedFilePages", &summary.pages_label)?;
    }

    let info: Element = by_id("pagesInfoText")?;
    set_class(&info, "warning", view.pages_info.tone == Tone::Warning)?;
    let content: Element = by_id("pagesInfoTextContent")?;
    content.set_inner_html("");
    let icon_class = match view.pages_info.tone {
        Tone::Info => "bi-info-circle",
        Tone::Warning => "bi-exclamation-triangle",
    };
    content.append_child(&icon(icon_class)?.into())?;
    content.append_child(
        &document()?.create_text_node(&format!(" {}", view.pages_info.message)),
    )?;

    set_class(
        &by_id::<Element>(FieldId::Title.as_str())?,
        "changed",
        view.title_changed,
    )?;
    set_class(
        &by_id::<Element>(FieldId::NoOfPages.as_str())?,
        "changed",
        view.pages_changed,
    )?;
    Ok(())
}

pub fn apply_page(view: &PageView) -> Result<(), JsValue> {
    apply_wizard(&view.wizard)?;
    apply_options(SelectionKind::Tag, &view.tag_options)?;
    apply_options(SelectionKind::Classification, &view.classification_options)?;
    apply_selection(&view.tags)?;
    apply_selection(&view.classifications)?;
    apply_upload(&view.upload)
}

// Review

fn apply_review_value(id: &str, value: &ReviewValue) -> Result<(), JsValue> {
    let cell: Element = by_id(id)?;
    if value.changed {
        cell.set_inner_html("");
        let span = create("span", "value-changed")?;
        span.set_text_content(Some(&value.text));
        cell.append_child(&span)?;
    } else {
        cell.set_text_content(Some(&value.text));
    }
    Ok(())
}

fn apply_review_chips(id: &str, view: &SelectionView) -> Result<(), JsValue> {
    let container: Element = by_id(id)?;
    container.set_inner_html("");
    if let Some(label) = view.empty_label {
        let empty = create("span", "")?;
        empty.set_attribute("style", REVIEW_EMPTY_STYLE)?;
        empty.set_text_content(Some(label));
        container.append_child(&empty)?;
    }
    for chip in &view.chips {
        let element = create("span", &chip_class(view.kind, chip.is_new))?;
        element.set_text_content(Some(&chip.name));
        container.append_child(&element)?;
    }
    Ok(())
}

pub fn apply_review(view: &ReviewView) -> Result<(), JsValue> {
    apply_review_value("reviewFileName", &view.file_name)?;
    set_text("reviewFileSize", &view.file_size)?;
    apply_review_value("reviewFilePages", &view.pages)?;
    apply_review_value("reviewTitle", &view.title)?;
    apply_review_value("reviewProductCode", &view.product_code)?;
    apply_review_value("reviewEdition", &view.edition)?;
    apply_review_value("reviewPublishDate", &view.publish_date)?;
    apply_review_value("reviewNotes", &view.notes)?;
    apply_review_chips("reviewTags", &view.tags)?;
    apply_review_chips("reviewClassifications", &view.classifications)
}

// Notices and prompts

/// Show a notice; returns the element to hide when it expires
pub fn show_notice(notice: &Notice) -> Result<Element, JsValue> {
    match notice.kind {
        NoticeKind::Alert => {
            let alert = create("div", "")?;
            alert.set_attribute("style", ALERT_STYLE)?;
            let symbol = icon("bi-exclamation-circle-fill")?;
            symbol.set_attribute("style", "font-size: 20px;")?;
            let text = create("span", "")?;
            text.set_text_content(Some(&notice.message));
            alert.append_child(&symbol)?;
            alert.append_child(&text)?;
            document()?
                .body()
                .ok_or_else(|| JsValue::from_str("No body"))?
                .append_child(&alert)?;
            Ok(alert)
        }
        NoticeKind::TagError | NoticeKind::TagInfo => {
            let target: Element = by_id("tagErrorMessage")?;
            target.set_inner_html("");
            let icon_class = if notice.kind == NoticeKind::TagError {
                "bi-exclamation-circle"
            } else {
                "bi-info-circle"
            };
            target.append_child(&icon(icon_class)?.into())?;
            target.append_child(&document()?.create_text_node(&format!(" {}", notice.message)))?;
            target.class_list().add_1("show")?;
            Ok(target)
        }
    }
}

/// Expire a notice created by [`show_notice`]
pub fn hide_notice(kind: NoticeKind, element: &Element) -> Result<(), JsValue> {
    match kind {
        NoticeKind::Alert => element.remove(),
        NoticeKind::TagError | NoticeKind::TagInfo => element.class_list().remove_1("show")?,
    }
    Ok(())
}

pub fn hide_tag_notice() -> Result<(), JsValue> {
    by_id::<Element>("tagErrorMessage")?
        .class_list()
        .remove_1("show")
}

pub fn set_modal(id: &str, open: bool) -> Result<(), JsValue> {
    set_class(&by_id::<Element>(id)?, "show", open)
}

pub fn show_protection_prompt(restrictions: &[String]) -> Result<(), JsValue> {
    let list: Element = by_id("protectionList")?;
    list.set_inner_html("");
    for restriction in restrictions {
        let item = create("li", "")?;
        let warning = icon("bi-exclamation-triangle")?;
        warning.set_attribute("style", "color: #f59e0b; margin-right: 5px;")?;
        item.append_child(&warning)?;
        item.append_child(&document()?.create_text_node(restriction))?;
        list.append_child(&item)?;
    }
    set_modal(PROTECTION_MODAL, true)
}

/// Server-rendered flash alerts on the page
pub fn page_alerts() -> Result<Vec<Element>, JsValue> {
    query_all(".alert")
}

// Links and forms

/// Links that belong to the wizard or its dialogs rather than leaving the page
pub fn is_wizard_link(link: &Element) -> Result<bool, JsValue> {
    Ok(link.closest(".wizard-navigation")?.is_some()
        || link.closest(".wizard-content")?.is_some()
        || link.id() == CONFIRM_LEAVE_BUTTON
        || link.class_list().contains("modal-btn"))
}

/// Move dropped files onto the file input, which is what the form posts,
/// and return the first one
pub fn accept_drop(event: &Event) -> Result<Option<File>, JsValue> {
    let files = event
        .dyn_ref::<DragEvent>()
        .and_then(|drag| drag.data_transfer())
        .and_then(|transfer| transfer.files());
    let Some(files) = files else {
        return Ok(None);
    };
    by_id::<HtmlInputElement>(FILE_INPUT)?.set_files(Some(&files));
    Ok(files.get(0))
}

/// Fill hidden inputs and lock the submit button for an accepted submission
pub fn prepare_form(plan: &SubmissionPlan) -> Result<(), JsValue> {
    for (name, value) in plan.update.form_entries() {
        if let Some(id) = hidden_field_id(name) {
            set_control_value(id, value)?;
        }
    }
    let form: HtmlFormElement = by_id(EDIT_FORM)?;
    form.set_action(&plan.action);

    let button: HtmlButtonElement = by_id("submitBtn")?;
    button.set_disabled(true);
    button.set_inner_html("");
    button.append_child(&create("span", "spinner-border spinner-border-sm me-2")?.into())?;
    button.append_child(&document()?.create_text_node(SUBMIT_BUSY_LABEL))?;
    Ok(())
}


#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use docedit_core::selection::{ChipView, SelectionSet};
    use docedit_core::DocumentUpdate;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount_fixture(html: &str) -> Element {
        let host = create("div", "").unwrap();
        host.set_inner_html(html);
        document().unwrap().body().unwrap().append_child(&host).unwrap();
        host
    }

    #[wasm_bindgen_test]
    fn test_apply_selection_builds_chips_and_hidden_value() {
        let host = mount_fixture(
            r#"<div id="selectedTagsContainer"></div><input type="hidden" id="tagNamesField">"#,
        );
        let view = SelectionView {
            kind: SelectionKind::Tag,
            chips: vec![
                ChipView { name: "iso".into(), is_new: false },
                ChipView { name: "draft".into(), is_new: true },
            ],
            empty_label: None,
            hidden_value: "iso,draft".into(),
        };
        apply_selection(&view).unwrap();

        let container: Element = by_id("selectedTagsContainer").unwrap();
        assert_eq!(container.children().length(), 2);
        let remove = container
            .query_selector(".new-item .chip-remove")
            .unwrap()
            .unwrap();
        assert_eq!(remove.get_attribute("data-name").as_deref(), Some("draft"));
        let hidden: HtmlInputElement = by_id("tagNamesField").unwrap();
        assert_eq!(hidden.value(), "iso,draft");
        host.remove();
    }

    #[wasm_bindgen_test]
    fn test_drop_hands_files_to_file_input() {
        let host = mount_fixture(r#"<input type="file" id="fileInput">"#);
        let bits = js_sys::Array::of1(&JsValue::from_str("%PDF-1.4"));
        let file = File::new_with_str_sequence(&bits, "dropped.pdf").unwrap();
        let transfer = web_sys::DataTransfer::new().unwrap();
        transfer.items().add_with_file(&file).unwrap();
        let init = web_sys::DragEventInit::new();
        init.set_data_transfer(Some(&transfer));
        let drop = DragEvent::new_with_event_init_dict("drop", &init).unwrap();

        let first = accept_drop(&drop).unwrap().unwrap();
        assert_eq!(first.name(), "dropped.pdf");
        let input: HtmlInputElement = by_id(FILE_INPUT).unwrap();
        let files = input.files().unwrap();
        assert_eq!(files.length(), 1);
        assert_eq!(files.get(0).unwrap().name(), "dropped.pdf");
        host.remove();
    }

    #[wasm_bindgen_test]
    fn test_drop_without_files_leaves_input_alone() {
        let host = mount_fixture(r#"<input type="file" id="fileInput">"#);
        let drop = Event::new("drop").unwrap();
        assert!(accept_drop(&drop).unwrap().is_none());
        let input: HtmlInputElement = by_id(FILE_INPUT).unwrap();
        assert_eq!(input.files().map(|f| f.length()), Some(0));
        host.remove();
    }

    #[wasm_bindgen_test]
    fn test_prepare_form_mirrors_entries_and_locks_button() {
        let host = mount_fixture(
            r#"<form id="editForm">
                <input type="hidden" id="publishMonthField">
                <input type="hidden" id="publishYearField">
                <input type="hidden" id="tagNamesField">
                <input type="hidden" id="classificationNamesField">
                <button id="submitBtn">Update Document</button>
            </form>"#,
        );
        let fields = FormFields {
            title: "Manual".into(),
            product_code: "M-1".into(),
            publish_month: "04".into(),
            publish_year: "2023".into(),
            no_of_pages: "12".into(),
            ..Default::default()
        };
        let tags: SelectionSet = ["iso", "draft"].into_iter().collect();
        let classes: SelectionSet = ["Internal"].into_iter().collect();
        let update = DocumentUpdate::build(&fields, &tags, &classes, None).unwrap();
        prepare_form(&SubmissionPlan::new("/document/edit/7".into(), update)).unwrap();

        let value = |id: &str| by_id::<HtmlInputElement>(id).unwrap().value();
        assert_eq!(value("publishMonthField"), "04");
        assert_eq!(value("publishYearField"), "2023");
        assert_eq!(value("tagNamesField"), "iso,draft");
        assert_eq!(value("classificationNamesField"), "Internal");
        let form: HtmlFormElement = by_id(EDIT_FORM).unwrap();
        assert!(form.action().ends_with("/document/edit/7"));
        let button: HtmlButtonElement = by_id("submitBtn").unwrap();
        assert!(button.disabled());
        assert!(button.text_content().unwrap_or_default().contains(SUBMIT_BUSY_LABEL));
        host.remove();
    }

    #[wasm_bindgen_test]
    fn test_tag_notice_shows_and_hides() {
        let host = mount_fixture(r#"<div id="tagErrorMessage"></div>"#);
        let notice = Notice {
            kind: NoticeKind::TagError,
            code: "empty",
            message: "Please enter a tag name".into(),
            dismiss_after_ms: 3000,
        };
        let target = show_notice(&notice).unwrap();
        assert!(target.class_list().contains("show"));
        assert!(target
            .text_content()
            .unwrap_or_default()
            .contains("Please enter a tag name"));
        hide_notice(notice.kind, &target).unwrap();
        assert!(!target.class_list().contains("show"));
        host.remove();
    }
}
