//! Event wiring for the edit page
//!
//! Every handler forwards to the controller, then re-renders the page and
//! drains the controller's effects. No page state lives outside
//! [`EditDocumentController`].

use std::cell::RefCell;
use std::rc::Rc;

use docedit_core::{
    EditDocumentController, EditorConfig, EditorError, Effect, ExitAttempt, FieldId,
    FileCandidate, GuardDecision, NavigationTarget, PageView, PreviewSource, SelectionKind,
    WizardStep,
};
use js_sys::{Reflect, Uint8Array};
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    BeforeUnloadEvent, Element, Event, EventTarget, File, HtmlAnchorElement,
    HtmlCanvasElement, HtmlElement, HtmlFormElement, HtmlInputElement, KeyboardEvent,
};

use crate::dom;
use crate::pdf_viewer;

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

pub struct App {
    controller: RefCell<EditDocumentController>,
    /// Bytes of the latest inspected replacement, keyed by generation
    preview_bytes: RefCell<Option<(u64, Vec<u8>)>>,
}

/// Run `f` against the mounted page, if any
pub fn with_app<T>(f: impl FnOnce(&Rc<App>) -> T) -> Option<T> {
    let app = APP.with(|slot| slot.borrow().clone())?;
    Some(f(&app))
}

fn report(result: Result<(), JsValue>) {
    if let Err(e) = result {
        error!(error = ?e, "edit page handler failed");
    }
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn listen(
    target: &EventTarget,
    event: &str,
    capture: bool,
    mut handler: impl FnMut(Event) -> Result<(), JsValue> + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |e: Event| report(handler(e)));
    target.add_event_listener_with_callback_and_bool(
        event,
        closure.as_ref().unchecked_ref(),
        capture,
    )?;
    closure.forget();
    Ok(())
}

fn listen_id(
    id: &str,
    event: &str,
    handler: impl FnMut(Event) -> Result<(), JsValue> + 'static,
) -> Result<(), JsValue> {
    let target: EventTarget = dom::by_id(id)?;
    listen(&target, event, false, handler)
}

/// Run `f` once after `ms` milliseconds
fn after(ms: u32, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let callback = Closure::once_into_js(f);
    dom::window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        ms.min(i32::MAX as u32) as i32,
    )?;
    Ok(())
}

fn navigate(target: &NavigationTarget) -> Result<(), JsValue> {
    let window = dom::window()?;
    match target {
        NavigationTarget::Back => window.history()?.back(),
        NavigationTarget::Url(url) => window.location().set_href(url),
    }
}

fn has_referrer() -> Result<bool, JsValue> {
    let referrer = dom::document()?.referrer();
    Ok(!referrer.is_empty() && referrer != dom::window()?.location().href()?)
}

pub fn mount(config: EditorConfig) -> Result<(), JsValue> {
    if with_app(|_| ()).is_some() {
        return Err(JsValue::from_str("Edit page is already mounted"));
    }

    let current_year = js_sys::Date::new_0().get_full_year() as i32;
    let years = config.settings.year_options(current_year);
    dom::populate_years(&years)?;

    let fields = dom::read_fields()?;
    let controller = EditDocumentController::new(config, fields, current_year);
    dom::write_fields(controller.fields())?;
    info!(
        document_id = controller.document_id(),
        "edit page mounted"
    );

    let app = Rc::new(App {
        controller: RefCell::new(controller),
        preview_bytes: RefCell::new(None),
    });
    APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

    app.wire()?;
    app.install_globals()?;
    app.dismiss_page_alerts()?;
    app.render()
}

impl App {
    pub fn page_view(&self) -> PageView {
        self.controller.borrow().page_view()
    }

    fn render(&self) -> Result<(), JsValue> {
        dom::apply_page(&self.page_view())?;
        self.flush_effects()
    }

    fn flush_effects(&self) -> Result<(), JsValue> {
        let effects = self.controller.borrow_mut().take_effects();
        for effect in effects {
            apply_effect(effect)?;
        }
        Ok(())
    }

    fn dismiss_page_alerts(&self) -> Result<(), JsValue> {
        let delay = self.controller.borrow().settings().page_alert_dismiss_ms;
        for alert in dom::page_alerts()? {
            after(delay, move || alert.remove())?;
        }
        Ok(())
    }

    // File replacement

    fn on_file(self: &Rc<Self>, file: File) -> Result<(), JsValue> {
        let candidate = FileCandidate::new(file.name(), file.type_(), file.size() as u64);
        let ticket = self.controller.borrow_mut().select_file(candidate);
        self.render()?;
        let Ok(ticket) = ticket else {
            return Ok(());
        };

        let app = self.clone();
        spawn_local(async move {
            let bytes = match JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => Uint8Array::new(&buffer).to_vec(),
                Err(e) => {
                    warn!(error = ?e, "Could not read selected file");
                    Vec::new()
                }
            };
            let result = app.controller.borrow_mut().inspect_file(ticket, &bytes);
            match result {
                Ok(completion) => {
                    debug!(?completion, "inspection applied");
                    *app.preview_bytes.borrow_mut() = Some((ticket.generation(), bytes));
                }
                Err(e @ EditorError::StaleInspection { .. }) => debug!(error = %e, "ignored"),
                Err(e) => warn!(error = %e, "inspection rejected"),
            }
            report(app.render());
        });
        Ok(())
    }

    fn show_review(&self) -> Result<(), JsValue> {
        let review = self.controller.borrow().review();
        dom::apply_review(&review)?;

        let bytes = match review.preview {
            PreviewSource::Replacement { generation, .. } => self
                .preview_bytes
                .borrow()
                .as_ref()
                .filter(|(stored, _)| *stored == generation)
                .map(|(_, bytes)| bytes.clone()),
            _ => None,
        };
        let canvas: HtmlCanvasElement = dom::by_id(dom::REVIEW_CANVAS)?;
        let settings = self.controller.borrow().settings().clone();
        spawn_local(async move {
            report(
                pdf_viewer::show_preview(&review.preview, bytes.as_deref(), &canvas, &settings)
                    .await,
            );
        });
        Ok(())
    }

    fn add_tag(&self) -> Result<(), JsValue> {
        let input: HtmlInputElement = dom::by_id(dom::TAG_INPUT)?;
        let result = self.controller.borrow_mut().add_tag(&input.value());
        if let Err(e) = result {
            debug!(code = e.code(), "tag not added");
        }
        self.render()
    }

    fn remove(&self, kind: SelectionKind, name: &str) -> Result<(), JsValue> {
        self.controller.borrow_mut().remove(kind, name);
        self.render()
    }

    fn go_back(&self) -> Result<(), JsValue> {
        let has_referrer = has_referrer()?;
        self.controller.borrow_mut().go_back(has_referrer);
        self.render()
    }

    // Wiring

    fn wire(self: &Rc<Self>) -> Result<(), JsValue> {
        self.wire_upload()?;
        self.wire_wizard()?;
        self.wire_selections()?;
        self.wire_form()?;
        self.wire_guard()
    }

    fn wire_upload(self: &Rc<Self>) -> Result<(), JsValue> {
        let app = self.clone();
        listen_id(dom::FILE_INPUT, "change", move |_| {
            let input: HtmlInputElement = dom::by_id(dom::FILE_INPUT)?;
            match input.files().and_then(|files| files.get(0)) {
                Some(file) => app.on_file(file),
                None => Ok(()),
            }
        })?;

        listen_id(dom::DROP_ZONE, "click", |_| {
            dom::by_id::<HtmlElement>(dom::FILE_INPUT)?.click();
            Ok(())
        })?;
        for event in ["dragenter", "dragover"] {
            listen_id(dom::DROP_ZONE, event, |e| {
                e.prevent_default();
                e.stop_propagation();
                dom::by_id::<Element>(dom::DROP_ZONE)?
                    .class_list()
                    .add_1("dragover")
            })?;
        }
        listen_id(dom::DROP_ZONE, "dragleave", |e| {
            e.prevent_default();
            dom::by_id::<Element>(dom::DROP_ZONE)?
                .class_list()
                .remove_1("dragover")
        })?;
        let app = self.clone();
        listen_id(dom::DROP_ZONE, "drop", move |e| {
            e.prevent_default();
            e.stop_propagation();
            dom::by_id::<Element>(dom::DROP_ZONE)?
                .class_list()
                .remove_1("dragover")?;
            match dom::accept_drop(&e)? {
                Some(file) => app.on_file(file),
                None => Ok(()),
            }
        })?;

        let app = self.clone();
        listen_id("forceUploadBtn", "click", move |_| {
            let result = app.controller.borrow_mut().force_upload();
            if let Err(e) = result {
                warn!(error = %e, "force upload ignored");
            }
            app.render()
        })
    }

    fn wire_wizard(self: &Rc<Self>) -> Result<(), JsValue> {
        let app = self.clone();
        listen_id("nextBtn", "click", move |e| {
            e.prevent_default();
            let advanced = app.controller.borrow_mut().advance();
            app.render()?;
            if let Ok(Some(WizardStep::Review)) = advanced {
                app.show_review()?;
            }
            Ok(())
        })?;

        let app = self.clone();
        listen_id("prevBtn", "click", move |e| {
            e.prevent_default();
            app.controller.borrow_mut().retreat();
            app.render()
        })
    }

    fn wire_selections(self: &Rc<Self>) -> Result<(), JsValue> {
        let app = self.clone();
        listen_id("addTagBtn", "click", move |e| {
            e.prevent_default();
            app.add_tag()
        })?;

        let app = self.clone();
        listen_id(dom::TAG_INPUT, "keypress", move |e| {
            let enter = e
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|key| key.key() == "Enter");
            if !enter {
                return Ok(());
            }
            e.prevent_default();
            app.add_tag()
        })?;

        listen_id(dom::TAG_INPUT, "input", |_| dom::hide_tag_notice())?;

        let app = self.clone();
        let document: EventTarget = dom::document()?.into();
        listen(&document, "click", false, move |e| {
            let Some(element) = event_element(&e) else {
                return Ok(());
            };

            if let Some(remove) = element.closest(".chip-remove")? {
                let kind = remove
                    .get_attribute("data-kind")
                    .and_then(|k| SelectionKind::parse(&k));
                if let (Some(kind), Some(name)) = (kind, remove.get_attribute("data-name")) {
                    e.prevent_default();
                    return app.remove(kind, &name);
                }
                return Ok(());
            }

            if let Some(item) = element.closest(".selection-item-flex")? {
                let target = [SelectionKind::Tag, SelectionKind::Classification]
                    .into_iter()
                    .find_map(|kind| {
                        item.get_attribute(dom::name_attribute(kind))
                            .map(|name| (kind, name))
                    });
                if let Some((kind, name)) = target {
                    app.controller.borrow_mut().toggle(kind, &name);
                    return app.render();
                }
            }
            Ok(())
        })
    }

    fn wire_form(self: &Rc<Self>) -> Result<(), JsValue> {
        for event in ["input", "change"] {
            let app = self.clone();
            listen_id(dom::EDIT_FORM, event, move |e| {
                let Some(element) = event_element(&e) else {
                    return Ok(());
                };
                if let (Some(field), Some(value)) =
                    (FieldId::parse(&element.id()), dom::control_value(&element))
                {
                    app.controller.borrow_mut().set_field(field, value);
                }
                Ok(())
            })?;
        }

        let app = self.clone();
        listen_id(dom::EDIT_FORM, "submit", move |e| {
            let plan = app.controller.borrow_mut().prepare_submission();
            match plan {
                Ok(plan) => dom::prepare_form(&plan),
                Err(_) => {
                    e.prevent_default();
                    app.flush_effects()
                }
            }
        })
    }

    fn wire_guard(self: &Rc<Self>) -> Result<(), JsValue> {
        let window = dom::window()?;
        let href = window.location().href()?;
        window
            .history()?
            .push_state_with_url(&JsValue::NULL, "", Some(&href))?;

        let app = self.clone();
        listen(&window, "popstate", false, move |_| {
            let decision = app
                .controller
                .borrow_mut()
                .request_exit(ExitAttempt::HistoryPop);
            if let GuardDecision::Prompt(_) = decision {
                let window = dom::window()?;
                let href = window.location().href()?;
                window
                    .history()?
                    .push_state_with_url(&JsValue::NULL, "", Some(&href))?;
            }
            app.flush_effects()
        })?;

        let app = self.clone();
        listen(&window, "beforeunload", false, move |e| {
            let decision = app.controller.borrow_mut().request_exit(ExitAttempt::Unload);
            if decision == GuardDecision::NativePrompt {
                e.prevent_default();
                if let Some(unload) = e.dyn_ref::<BeforeUnloadEvent>() {
                    unload.set_return_value("");
                }
            }
            Ok(())
        })?;

        let document: EventTarget = dom::document()?.into();
        let app = self.clone();
        listen(&document, "click", true, move |e| {
            let Some(link) = event_element(&e)
                .map(|element| element.closest("a"))
                .transpose()?
                .flatten()
                .and_then(|link| link.dyn_into::<HtmlAnchorElement>().ok())
            else {
                return Ok(());
            };
            let href = link.href();
            if href.is_empty() {
                return Ok(());
            }
            let attempt = ExitAttempt::LinkClick {
                href,
                in_wizard: dom::is_wizard_link(&link)?,
                toggles_overlay: link.has_attribute("data-bs-toggle"),
            };
            let decision = app.controller.borrow_mut().request_exit(attempt);
            if let GuardDecision::Prompt(_) = decision {
                e.prevent_default();
                e.stop_propagation();
                e.stop_immediate_propagation();
            }
            app.flush_effects()
        })?;

        let app = self.clone();
        listen(&document, "submit", true, move |e| {
            let Some(form) = e
                .target()
                .and_then(|target| target.dyn_into::<HtmlFormElement>().ok())
            else {
                return Ok(());
            };
            if form.id() == dom::EDIT_FORM {
                return Ok(());
            }
            let attempt = ExitAttempt::FormSubmit {
                action: form.action(),
            };
            if let GuardDecision::Prompt(_) = app.controller.borrow_mut().request_exit(attempt) {
                e.prevent_default();
            }
            app.flush_effects()
        })?;

        let app = self.clone();
        listen_id("cancelBtn", "click", move |e| {
            e.prevent_default();
            app.controller.borrow_mut().cancel();
            app.flush_effects()
        })?;

        let app = self.clone();
        listen_id(dom::CONFIRM_LEAVE_BUTTON, "click", move |e| {
            e.prevent_default();
            app.controller.borrow_mut().confirm_navigation();
            app.flush_effects()
        })
    }

    /// Functions the template's inline `onclick` attributes call
    fn install_globals(self: &Rc<Self>) -> Result<(), JsValue> {
        let window = dom::window()?;

        let app = self.clone();
        install(&window, "showReplaceFileDialog", move || {
            dom::by_id::<HtmlElement>(dom::FILE_INPUT)?.click();
            app.flush_effects()
        })?;

        let app = self.clone();
        install(&window, "changeFile", move || {
            app.controller.borrow_mut().change_file();
            *app.preview_bytes.borrow_mut() = None;
            app.render()
        })?;

        for name in ["cancelProtectedPdf", "closePdfProtectionModal"] {
            let app = self.clone();
            install(&window, name, move || {
                app.controller.borrow_mut().cancel_protected();
                app.render()
            })?;
        }

        let app = self.clone();
        install(&window, "closeConfirmationModal", move || {
            app.controller.borrow_mut().decline_navigation();
            app.flush_effects()
        })?;

        let app = self.clone();
        install(&window, "goBack", move || app.go_back())?;

        for (name, kind) in [
            ("removeSelectedTag", SelectionKind::Tag),
            ("removeSelectedClassification", SelectionKind::Classification),
        ] {
            let app = self.clone();
            let closure = Closure::<dyn FnMut(String)>::new(move |item: String| {
                report(app.remove(kind, &item))
            });
            Reflect::set(&window, &JsValue::from_str(name), closure.as_ref())?;
            closure.forget();
        }
        Ok(())
    }
}

fn install(
    window: &web_sys::Window,
    name: &str,
    mut handler: impl FnMut() -> Result<(), JsValue> + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut()>::new(move || report(handler()));
    Reflect::set(window, &JsValue::from_str(name), closure.as_ref())?;
    closure.forget();
    Ok(())
}

fn apply_effect(effect: Effect) -> Result<(), JsValue> {
    match effect {
        Effect::Notice(notice) => {
            let element = dom::show_notice(&notice)?;
            let kind = notice.kind;
            after(notice.dismiss_after_ms, move || {
                report(dom::hide_notice(kind, &element))
            })
        }
        Effect::Blink {
            kind,
            name,
            duration_ms,
        } => match dom::blink(kind, &name)? {
            Some(item) => after(duration_ms, move || report(dom::end_blink(&item))),
            None => Ok(()),
        },
        Effect::SetField { field, value } => dom::set_control_value(field.as_str(), &value),
        Effect::ClearTagInput => dom::set_control_value(dom::TAG_INPUT, ""),
        Effect::ClearFileInput => dom::set_control_value(dom::FILE_INPUT, ""),
        Effect::ShowProtectionPrompt { restrictions } => {
            dom::show_protection_prompt(&restrictions)
        }
        Effect::HideProtectionPrompt => dom::set_modal(dom::PROTECTION_MODAL, false),
        Effect::ShowNavigationPrompt => dom::set_modal(dom::CONFIRMATION_MODAL, true),
        Effect::HideNavigationPrompt => dom::set_modal(dom::CONFIRMATION_MODAL, false),
        Effect::Navigate { target } => {
            info!(?target, "leaving edit page");
            navigate(&target)
        }
    }
}
